//! Probe tool detection.

use crate::command::{self, ToolCommand};
use crate::{Error, ProbeConfig, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

/// Information about the probe tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool as configured.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Resolve the configured probe tool to an executable path.
///
/// A configured value containing a path separator must point at an existing
/// file; a bare name is searched for in `PATH`. No process is spawned.
///
/// # Errors
///
/// Returns [`Error::ToolUnavailable`] if the tool cannot be located.
pub fn resolve_tool(config: &ProbeConfig) -> Result<PathBuf> {
    let tool = config.tool();

    if tool.components().count() > 1 || tool.is_absolute() {
        return if tool.is_file() {
            Ok(tool.to_path_buf())
        } else {
            Err(Error::tool_unavailable(
                tool.display().to_string(),
                "no such file",
            ))
        };
    }

    which::which(tool).map_err(|e| Error::tool_unavailable(tool.display().to_string(), e.to_string()))
}

/// Verify the tool can be invoked by running `<tool> -h` with output discarded.
///
/// The check is bounded by `timeout`; a tool that does not answer in time is
/// killed.
///
/// # Errors
///
/// Returns [`Error::ToolUnavailable`] if the process cannot be spawned, exits
/// unsuccessfully or does not exit within `timeout`.
pub async fn ensure_available(path: &Path, timeout: Duration) -> Result<()> {
    let mut cmd = tokio::process::Command::new(path);
    cmd.arg("-h")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let status = tokio::time::timeout(timeout, cmd.status())
        .await
        .map_err(|_| {
            Error::tool_unavailable(
                path.display().to_string(),
                format!("help query timed out after {timeout:?}"),
            )
        })?
        .map_err(|e| Error::tool_unavailable(path.display().to_string(), e.to_string()))?;

    if !status.success() {
        return Err(Error::tool_unavailable(
            path.display().to_string(),
            format!("help query exited with {status}"),
        ));
    }

    tracing::debug!("Probe tool available at {}", path.display());
    Ok(())
}

/// Check if the configured probe tool is available and get its information.
///
/// The `-version` query is bounded by the configured timeout.
///
/// # Example
///
/// ```no_run
/// use probekit_av::{check_tool, ProbeConfig};
///
/// let info = check_tool(&ProbeConfig::default());
/// if info.available {
///     println!("ffprobe version: {:?}", info.version);
/// }
/// ```
pub fn check_tool(config: &ProbeConfig) -> ToolInfo {
    let name = config.tool().display().to_string();

    let Ok(path) = resolve_tool(config) else {
        return ToolInfo {
            name,
            available: false,
            version: None,
            path: None,
        };
    };

    let mut query = ToolCommand::new(path.clone());
    query.arg("-version").timeout(config.timeout);

    match command::block_on(|| query.execute()) {
        Ok(output) => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            ToolInfo {
                name,
                available: true,
                version,
                path: Some(path),
            }
        }
        Err(e) => {
            tracing::debug!("Version query failed: {e}");
            ToolInfo {
                name,
                available: false,
                version: None,
                path: Some(path),
            }
        }
    }
}
