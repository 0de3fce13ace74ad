//! One elementary stream from a probe report.
//!
//! Queries never fail: a missing or malformed field yields the documented
//! default (`None`, `0`, `0.0`) so one bad field cannot spoil the rest of
//! the inspection.

use serde::Serialize;
use std::fmt;

use super::value::{AttributeValue, Attributes};

/// Stream classification derived from `codec_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Data,
    /// Absent or unrecognized `codec_type` (e.g. attachments).
    Other,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Video => write!(f, "Video"),
            StreamKind::Audio => write!(f, "Audio"),
            StreamKind::Subtitle => write!(f, "Subtitle"),
            StreamKind::Data => write!(f, "Data"),
            StreamKind::Other => write!(f, "Other"),
        }
    }
}

/// A single stream's attributes as reported by the probe tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StreamRecord {
    attributes: Attributes,
}

impl StreamRecord {
    pub fn new(attributes: Attributes) -> Self {
        Self { attributes }
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Replace the stream duration. Only the result's fallback pass calls this.
    pub(crate) fn set_duration(&mut self, duration: AttributeValue) {
        self.attributes.insert("duration", duration);
    }

    /// Stream index within the container.
    pub fn index(&self) -> Option<u32> {
        self.attributes
            .integer("index")
            .and_then(|i| u32::try_from(i).ok())
    }

    pub fn codec_type(&self) -> Option<&str> {
        self.attributes.text("codec_type")
    }

    pub fn kind(&self) -> StreamKind {
        match self.codec_type() {
            Some("video") => StreamKind::Video,
            Some("audio") => StreamKind::Audio,
            Some("subtitle") => StreamKind::Subtitle,
            Some("data") => StreamKind::Data,
            _ => StreamKind::Other,
        }
    }

    pub fn is_video(&self) -> bool {
        self.kind() == StreamKind::Video
    }

    pub fn is_audio(&self) -> bool {
        self.kind() == StreamKind::Audio
    }

    pub fn is_subtitle(&self) -> bool {
        self.kind() == StreamKind::Subtitle
    }

    pub fn is_data(&self) -> bool {
        self.kind() == StreamKind::Data
    }

    /// Pixel dimensions `(width, height)` of a video stream.
    ///
    /// `None` for non-video streams or when either dimension is missing;
    /// `(0, 0)` when a dimension is present but not a valid size.
    pub fn frame_size(&self) -> Option<(u32, u32)> {
        if !self.is_video() {
            return None;
        }

        let width = self.get("width")?;
        let height = self.get("height")?;

        let size = |v: &AttributeValue| v.as_i64().and_then(|i| u32::try_from(i).ok());
        match (size(width), size(height)) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => Some((0, 0)),
        }
    }

    /// Pixel format of a video stream, e.g. `yuv420p`.
    pub fn pixel_format(&self) -> Option<&str> {
        if !self.is_video() {
            return None;
        }
        self.attributes.text("pix_fmt")
    }

    /// Frame count of a video or audio stream; 0 when unknown.
    pub fn frames(&self) -> u64 {
        if !(self.is_video() || self.is_audio()) {
            return 0;
        }
        self.attributes
            .integer("nb_frames")
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or(0)
    }

    /// Duration in seconds of a video or audio stream; 0.0 when unknown.
    pub fn duration_seconds(&self) -> f64 {
        if !(self.is_video() || self.is_audio()) {
            return 0.0;
        }
        self.attributes.float("duration").unwrap_or(0.0)
    }

    /// Language tag, e.g. `eng`.
    pub fn language(&self) -> Option<&str> {
        self.attributes.text("TAG:language")
    }

    /// Short codec name, e.g. `h264`.
    pub fn codec(&self) -> Option<&str> {
        self.attributes.text("codec_name")
    }

    /// Long codec name, e.g. `H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10`.
    pub fn codec_description(&self) -> Option<&str> {
        self.attributes.text("codec_long_name")
    }

    /// Codec tag, e.g. `avc1`.
    pub fn codec_tag(&self) -> Option<&str> {
        self.attributes.text("codec_tag_string")
    }

    /// Bit rate in bits per second; 0 when unknown.
    pub fn bitrate(&self) -> u64 {
        self.attributes
            .integer("bit_rate")
            .and_then(|b| u64::try_from(b).ok())
            .unwrap_or(0)
    }

    /// Average frames per second of a video stream, `nb_frames / duration`.
    ///
    /// Computed with floating-point division, so 1001 frames over 41.75s is
    /// 23.976..., not 23. Returns 0.0 when either field is missing,
    /// non-numeric, or the duration is zero.
    pub fn frame_rate(&self) -> f64 {
        if !self.is_video() {
            return 0.0;
        }

        let frames = self.attributes.float("nb_frames");
        let duration = self.attributes.float("duration");
        match (frames, duration) {
            (Some(f), Some(d)) if d != 0.0 => f / d,
            _ => 0.0,
        }
    }

    /// Frame rate as declared by the container (`avg_frame_rate`, falling
    /// back to `r_frame_rate`) for video streams.
    pub fn reported_frame_rate(&self) -> Option<f64> {
        if !self.is_video() {
            return None;
        }
        ["avg_frame_rate", "r_frame_rate"]
            .iter()
            .filter_map(|key| self.attributes.text(key))
            .find_map(parse_frame_rate)
    }

    /// Channel count of an audio stream.
    pub fn channels(&self) -> Option<u32> {
        if !self.is_audio() {
            return None;
        }
        self.attributes
            .integer("channels")
            .and_then(|c| u32::try_from(c).ok())
    }

    /// Sample rate in Hz of an audio stream.
    pub fn sample_rate(&self) -> Option<u32> {
        if !self.is_audio() {
            return None;
        }
        self.attributes
            .integer("sample_rate")
            .and_then(|s| u32::try_from(s).ok())
    }
}

fn parse_frame_rate(rate_str: &str) -> Option<f64> {
    let parts: Vec<&str> = rate_str.split('/').collect();
    if parts.len() == 2 {
        let num: f64 = parts[0].parse().ok()?;
        let den: f64 = parts[1].parse().ok()?;
        if den != 0.0 {
            return Some(num / den);
        }
        return None;
    }
    rate_str.parse().ok()
}
