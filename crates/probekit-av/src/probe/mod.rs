//! Media inspection through the `ffprobe` CLI.
//!
//! The pipeline is: availability check, invocation (file path or stdin),
//! report decoding, stream record construction, then result assembly with
//! the duration fallback pass.

mod report;
mod result;
mod stream;
mod value;

pub use report::Report;
pub use result::ProbeResult;
pub use stream::{StreamKind, StreamRecord};
pub use value::{AttributeValue, Attributes};

use std::path::{Path, PathBuf};

use crate::command::{self, ToolCommand};
use crate::{tools, Error, ProbeConfig, Result};

/// Arguments requesting stream and format sections as JSON.
const REPORT_ARGS: [&str; 5] = [
    "-show_streams",
    "-print_format",
    "json",
    "-show_format",
    "-i",
];

/// Target argument telling the tool to read from standard input.
const STDIN_TARGET: &str = "-";

/// What to inspect: a file on disk or in-memory file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl From<PathBuf> for ProbeSource {
    fn from(path: PathBuf) -> Self {
        ProbeSource::Path(path)
    }
}

impl From<&Path> for ProbeSource {
    fn from(path: &Path) -> Self {
        ProbeSource::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for ProbeSource {
    fn from(bytes: Vec<u8>) -> Self {
        ProbeSource::Bytes(bytes)
    }
}

impl From<&[u8]> for ProbeSource {
    fn from(bytes: &[u8]) -> Self {
        ProbeSource::Bytes(bytes.to_vec())
    }
}

/// Build the tool invocation for a source.
///
/// Existing files are passed by path; byte content is piped to stdin.
fn build_command(program: &Path, source: ProbeSource, config: &ProbeConfig) -> Result<ToolCommand> {
    let mut cmd = ToolCommand::new(program.to_path_buf());
    cmd.args(REPORT_ARGS).timeout(config.timeout);

    match source {
        ProbeSource::Path(path) => {
            if !path.is_file() {
                return Err(Error::probe_failed(
                    program.display().to_string(),
                    format!("not a file: {}", path.display()),
                ));
            }
            tracing::debug!("Probing file {}", path.display());
            cmd.arg(path.to_string_lossy());
        }
        ProbeSource::Bytes(bytes) => {
            tracing::debug!("Probing {} bytes from stdin", bytes.len());
            cmd.arg(STDIN_TARGET).stdin(bytes);
        }
    }

    Ok(cmd)
}

/// A prober backed by the `ffprobe` CLI.
#[derive(Debug, Clone, Default)]
pub struct FfProbe {
    config: ProbeConfig,
}

impl FfProbe {
    /// Create a prober with an explicit configuration.
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Inspect a source.
    ///
    /// # Errors
    ///
    /// - [`Error::ToolUnavailable`] if the tool cannot be located or invoked;
    ///   nothing is probed in that case.
    /// - [`Error::ProbeFailed`] if the source is a path that is not a file,
    ///   or the tool exits unsuccessfully or times out.
    /// - [`Error::ParseError`] if the tool's output is not a conformant report.
    pub async fn probe_async(&self, source: impl Into<ProbeSource>) -> Result<ProbeResult> {
        let program = tools::resolve_tool(&self.config)?;
        tools::ensure_available(&program, self.config.timeout).await?;

        let output = build_command(&program, source.into(), &self.config)?
            .execute()
            .await?;

        let report = Report::parse(&program.display().to_string(), &output.stdout)?;
        Ok(ProbeResult::from_report(report))
    }

    /// Blocking variant of [`FfProbe::probe_async`].
    ///
    /// Inside a multi-threaded tokio runtime the current runtime is reused;
    /// otherwise a private current-thread runtime drives the probe.
    pub fn probe(&self, source: impl Into<ProbeSource>) -> Result<ProbeResult> {
        let source = source.into();
        command::block_on(move || self.probe_async(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_source_uses_path_target() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let cmd = build_command(
            Path::new("ffprobe"),
            ProbeSource::from(file.path()),
            &ProbeConfig::default(),
        )
        .unwrap();
        let args = cmd.get_args();
        assert_eq!(&args[..5], &REPORT_ARGS);
        assert_eq!(args[5], file.path().to_string_lossy());
    }

    #[test]
    fn byte_source_reads_stdin() {
        let cmd = build_command(
            Path::new("ffprobe"),
            ProbeSource::from(&b"\x1a\x45\xdf\xa3"[..]),
            &ProbeConfig::default(),
        )
        .unwrap();
        assert_eq!(cmd.get_args().last().map(String::as_str), Some("-"));
    }

    #[test]
    fn missing_path_is_probe_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_command(
            Path::new("ffprobe"),
            ProbeSource::from(dir.path().join("nope.mkv")),
            &ProbeConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ProbeFailed { .. }));
    }

    #[test]
    fn directory_path_is_probe_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_command(
            Path::new("ffprobe"),
            ProbeSource::from(dir.path()),
            &ProbeConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ProbeFailed { .. }));
    }

    #[test]
    fn unavailable_tool_fails_before_probing() {
        let dir = tempfile::tempdir().unwrap();
        let prober =
            FfProbe::new(ProbeConfig::default().with_ffprobe_path(dir.path().join("ffprobe")));
        let err = prober.probe(b"data".to_vec()).unwrap_err();
        assert!(matches!(err, Error::ToolUnavailable { .. }));
    }

    #[tokio::test]
    async fn blocking_probe_inside_current_thread_runtime() {
        let prober = FfProbe::new(ProbeConfig::default().with_ffprobe_path("nonexistent_tool_12345"));
        let err = prober.probe(b"data".to_vec()).unwrap_err();
        assert!(matches!(err, Error::ToolUnavailable { .. }));
    }
}
