//! Error types for probekit-av.

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while inspecting a media source.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The probe tool cannot be located or invoked.
    #[error("probe tool unavailable: {tool}: {message}")]
    ToolUnavailable { tool: String, message: String },

    /// The probe tool ran but did not succeed (non-zero exit, timeout, bad source).
    #[error("probe failed: {tool}: {message}")]
    ProbeFailed { tool: String, message: String },

    /// The captured report is not valid or conformant JSON.
    #[error("failed to parse {tool} report: {source}")]
    ParseError {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Create a tool unavailable error.
    pub fn tool_unavailable(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolUnavailable {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a probe failed error.
    pub fn probe_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProbeFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a parse error wrapping the underlying decode diagnostic.
    pub fn parse_error(tool: impl Into<String>, source: serde_json::Error) -> Self {
        Self::ParseError {
            tool: tool.into(),
            source,
        }
    }
}
