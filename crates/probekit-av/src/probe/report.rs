//! Decoding of the probe tool's JSON report.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::value::{AttributeValue, Attributes};
use crate::config::DEFAULT_TOOL;
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct RawReport {
    format: Map<String, Value>,
    streams: Vec<Map<String, Value>>,
}

/// The decoded report: format-level attributes plus one attribute map per
/// stream, in the order the tool listed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub format: Attributes,
    pub streams: Vec<Attributes>,
}

impl Report {
    /// Decode a report produced by `ffprobe`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseError`] if the bytes are not JSON, or if the
    /// `format` object or `streams` array is missing or has the wrong shape.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Self::parse(DEFAULT_TOOL, bytes)
    }

    /// Decode a report, naming `tool` in any error.
    pub fn parse(tool: &str, bytes: &[u8]) -> Result<Self> {
        let raw: RawReport =
            serde_json::from_slice(bytes).map_err(|e| Error::parse_error(tool, e))?;

        Ok(Self {
            format: flatten_section(raw.format),
            streams: raw.streams.into_iter().map(flatten_section).collect(),
        })
    }
}

/// Flatten one JSON object into scalar attributes.
///
/// Nested objects use ffprobe's flat-writer naming, so `tags.language`
/// becomes `TAG:language`.
fn flatten_section(raw: Map<String, Value>) -> Attributes {
    let mut attrs = Attributes::new();

    for (key, value) in raw {
        match value {
            Value::Object(nested) => {
                let prefix = nested_prefix(&key);
                for (inner_key, inner) in nested {
                    let name = format!("{prefix}:{inner_key}");
                    match scalar(inner) {
                        Some(v) => attrs.insert(name, v),
                        None => tracing::trace!("Skipping non-scalar report entry {name}"),
                    }
                }
            }
            other => match scalar(other) {
                Some(v) => attrs.insert(key, v),
                None => tracing::trace!("Skipping non-scalar report entry {key}"),
            },
        }
    }

    attrs
}

fn nested_prefix(key: &str) -> String {
    match key {
        "tags" => "TAG".to_string(),
        "disposition" => "DISPOSITION".to_string(),
        other => other.to_uppercase(),
    }
}

fn scalar(value: Value) -> Option<AttributeValue> {
    match value {
        Value::String(s) => Some(AttributeValue::Text(s)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(AttributeValue::Integer(i)),
            None => n.as_f64().map(AttributeValue::Float),
        },
        Value::Bool(b) => Some(AttributeValue::Integer(i64::from(b))),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
