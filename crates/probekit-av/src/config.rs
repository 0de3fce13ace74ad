//! Probe configuration.
//!
//! [`ProbeConfig`] is passed explicitly to the prober. Reading the process
//! environment happens only in [`ProbeConfig::from_env`], so everything below
//! it can be exercised without touching environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Error, Result};

/// Name of the probe tool when no override is configured.
pub const DEFAULT_TOOL: &str = "ffprobe";

/// Environment variable overriding the probe tool path.
pub const TOOL_ENV_VAR: &str = "FFPROBE";

/// Environment variable overriding the probe timeout, in whole seconds.
pub const TIMEOUT_ENV_VAR: &str = "FFPROBE_TIMEOUT";

/// Default maximum time a single inspection may run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for locating and running the probe tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Explicit tool path or name. `None` means `ffprobe` from `PATH`.
    pub ffprobe_path: Option<PathBuf>,
    /// Maximum execution time before the tool is killed.
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ffprobe_path: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Serde helpers to (de)serialize `Duration` as whole seconds.
mod duration_secs {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl ProbeConfig {
    /// Build a config from the `FFPROBE` and `FFPROBE_TIMEOUT` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    ///
    /// Empty values are ignored. An unparsable timeout keeps the default and
    /// logs a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(TOOL_ENV_VAR).filter(|v| !v.trim().is_empty()) {
            config.ffprobe_path = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup(TIMEOUT_ENV_VAR).filter(|v| !v.trim().is_empty()) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.timeout = Duration::from_secs(secs),
                Err(e) => tracing::warn!("Ignoring {TIMEOUT_ENV_VAR}={raw:?}: {e}"),
            }
        }

        config
    }

    /// Deserialize a `ProbeConfig` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str).map_err(|e| Error::Config(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Set the probe tool path or name.
    pub fn with_ffprobe_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffprobe_path = Some(path.into());
        self
    }

    /// Set the maximum execution time.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured tool, or the default name.
    pub fn tool(&self) -> &Path {
        self.ffprobe_path
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_TOOL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ProbeConfig::default();
        assert!(config.ffprobe_path.is_none());
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.tool(), Path::new("ffprobe"));
    }

    #[test]
    fn lookup_overrides_tool_and_timeout() {
        let config = ProbeConfig::from_lookup(lookup(&[
            ("FFPROBE", "/opt/ffmpeg/bin/ffprobe"),
            ("FFPROBE_TIMEOUT", "15"),
        ]));
        assert_eq!(config.tool(), Path::new("/opt/ffmpeg/bin/ffprobe"));
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn lookup_ignores_empty_and_invalid_values() {
        let config =
            ProbeConfig::from_lookup(lookup(&[("FFPROBE", "  "), ("FFPROBE_TIMEOUT", "soon")]));
        assert_eq!(config, ProbeConfig::default());
    }

    #[test]
    fn empty_json_is_valid() {
        let config = ProbeConfig::from_json("{}").unwrap();
        assert_eq!(config, ProbeConfig::default());
    }

    #[test]
    fn json_round_trip_uses_seconds() {
        let config = ProbeConfig::default()
            .with_ffprobe_path("/usr/local/bin/ffprobe")
            .with_timeout(Duration::from_secs(30));
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"timeout\":30"));
        assert_eq!(ProbeConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn invalid_json_is_config_error() {
        let err = ProbeConfig::from_json("{\"timeout\": \"long\"}").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProbeConfig::load_or_default(Some(&dir.path().join("absent.json")));
        assert_eq!(config, ProbeConfig::default());
        assert_eq!(ProbeConfig::load_or_default(None), ProbeConfig::default());
    }

    #[test]
    fn load_or_default_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probekit.json");
        std::fs::write(&path, r#"{"ffprobe_path": "/bin/ffprobe", "timeout": 5}"#).unwrap();
        let config = ProbeConfig::load_or_default(Some(&path));
        assert_eq!(config.tool(), Path::new("/bin/ffprobe"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
