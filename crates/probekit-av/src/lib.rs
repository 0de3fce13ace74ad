//! # probekit-av
//!
//! Typed access to the `ffprobe` inspection report of a media file.
//!
//! This crate provides:
//! - **Tool detection** ([`resolve_tool`], [`check_tool`]) -- locate `ffprobe`
//!   from an explicit override or `PATH`, and verify it runs.
//! - **Command execution** ([`ToolCommand`]) -- async builder with stdin
//!   piping and a bounded wait.
//! - **Probing** ([`FfProbe`]) -- probe a file path or raw bytes into a
//!   [`ProbeResult`] of format attributes and [`StreamRecord`]s.
//!
//! ## Example
//!
//! ```no_run
//! use probekit_av::probe;
//! use std::path::Path;
//!
//! let result = probe(Path::new("/path/to/video.mkv"))?;
//! for stream in result.video_streams() {
//!     println!("{:?} at {:.3} fps", stream.frame_size(), stream.frame_rate());
//! }
//! # Ok::<(), probekit_av::Error>(())
//! ```

pub mod command;
pub mod config;
mod error;
pub mod probe;
pub mod tools;

// Re-exports
pub use command::{ToolCommand, ToolOutput};
pub use config::ProbeConfig;
pub use error::{Error, Result};
pub use probe::{
    AttributeValue, Attributes, FfProbe, ProbeResult, ProbeSource, Report, StreamKind,
    StreamRecord,
};
pub use tools::{check_tool, ensure_available, resolve_tool, ToolInfo};

/// Probe a media source using the tool configured by the `FFPROBE`
/// environment variable (or `ffprobe` from `PATH`).
///
/// This is the main entry point. Use [`FfProbe::new`] to pass an explicit
/// [`ProbeConfig`] instead.
pub fn probe(source: impl Into<ProbeSource>) -> Result<ProbeResult> {
    FfProbe::new(ProbeConfig::from_env()).probe(source)
}
