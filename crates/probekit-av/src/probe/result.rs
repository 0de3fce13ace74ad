//! The assembled inspection result.

use serde::Serialize;

use super::report::Report;
use super::stream::{StreamKind, StreamRecord};
use super::value::{AttributeValue, Attributes};

/// Format attributes and streams of one inspected media source.
///
/// Video and audio sub-sequences are indices into `streams`, computed once
/// after the duration fallback pass. The result is immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    format: Attributes,
    streams: Vec<StreamRecord>,
    #[serde(skip)]
    video: Vec<usize>,
    #[serde(skip)]
    audio: Vec<usize>,
}

impl ProbeResult {
    /// Assemble a result from a decoded report.
    ///
    /// Every audio or video stream whose `duration` is missing or zero
    /// inherits the container duration from the format section.
    pub fn from_report(report: Report) -> Self {
        let Report { format, streams } = report;
        let mut streams: Vec<StreamRecord> = streams.into_iter().map(StreamRecord::new).collect();

        let container_duration = format.get("duration");
        for stream in streams
            .iter_mut()
            .filter(|s| s.is_audio() || s.is_video())
        {
            if !needs_duration(stream) {
                continue;
            }
            match container_duration {
                Some(duration) => {
                    tracing::debug!(
                        "Stream {:?} has no duration; using container duration {duration}",
                        stream.index()
                    );
                    stream.set_duration(duration.clone());
                }
                None => tracing::warn!(
                    "Stream {:?} has no duration and the format section reports none",
                    stream.index()
                ),
            }
        }

        let positions = |kind: StreamKind| -> Vec<usize> {
            streams
                .iter()
                .enumerate()
                .filter(|(_, s)| s.kind() == kind)
                .map(|(i, _)| i)
                .collect()
        };
        let video = positions(StreamKind::Video);
        let audio = positions(StreamKind::Audio);

        Self {
            format,
            streams,
            video,
            audio,
        }
    }

    /// Format-level attributes, keyed exactly as the tool reported them.
    pub fn format(&self) -> &Attributes {
        &self.format
    }

    pub fn format_attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.format.get(name)
    }

    /// All streams in reported order.
    pub fn streams(&self) -> &[StreamRecord] {
        &self.streams
    }

    pub fn video_streams(&self) -> impl Iterator<Item = &StreamRecord> + '_ {
        self.video.iter().map(move |&i| &self.streams[i])
    }

    pub fn audio_streams(&self) -> impl Iterator<Item = &StreamRecord> + '_ {
        self.audio.iter().map(move |&i| &self.streams[i])
    }

    pub fn subtitle_streams(&self) -> impl Iterator<Item = &StreamRecord> + '_ {
        self.streams.iter().filter(|s| s.is_subtitle())
    }

    pub fn data_streams(&self) -> impl Iterator<Item = &StreamRecord> + '_ {
        self.streams.iter().filter(|s| s.is_data())
    }

    /// The first video stream.
    pub fn primary_video(&self) -> Option<&StreamRecord> {
        self.video_streams().next()
    }

    /// Container duration in seconds.
    pub fn duration_seconds(&self) -> Option<f64> {
        self.format.float("duration")
    }

    /// Container bit rate in bits per second.
    pub fn bit_rate(&self) -> Option<u64> {
        self.format
            .integer("bit_rate")
            .and_then(|b| u64::try_from(b).ok())
    }

    /// Container format name, e.g. `mov,mp4,m4a,3gp,3g2,mj2`.
    pub fn format_name(&self) -> Option<&str> {
        self.format.text("format_name")
    }
}

fn needs_duration(stream: &StreamRecord) -> bool {
    match stream.get("duration") {
        None => true,
        Some(value) => value.as_f64() == Some(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "format": {"format_name": "matroska,webm", "duration": "120.5", "bit_rate": "5000000"},
        "streams": [
            {"index": 0, "codec_type": "video", "codec_name": "hevc", "nb_frames": "2892"},
            {"index": 1, "codec_type": "audio", "codec_name": "aac", "duration": "118.0"}
        ]
    }"#;

    fn result(json: &str) -> ProbeResult {
        ProbeResult::from_report(Report::from_slice(json.as_bytes()).unwrap())
    }

    #[test]
    fn end_to_end_fallback_and_partition() {
        let r = result(FIXTURE);
        let video: Vec<_> = r.video_streams().collect();
        let audio: Vec<_> = r.audio_streams().collect();
        assert_eq!(video.len(), 1);
        assert_eq!(audio.len(), 1);
        assert_eq!(video[0].duration_seconds(), 120.5);
        assert_eq!(audio[0].duration_seconds(), 118.0);
    }

    #[test]
    fn zero_duration_is_replaced() {
        let r = result(
            r#"{"format": {"duration": "60.0"},
                "streams": [
                    {"codec_type": "audio", "duration": "0.000000"},
                    {"codec_type": "video", "duration": 0}
                ]}"#,
        );
        for s in r.streams() {
            assert_eq!(s.duration_seconds(), 60.0);
        }
    }

    #[test]
    fn nonzero_and_unparsable_durations_are_kept() {
        let r = result(
            r#"{"format": {"duration": "60.0"},
                "streams": [
                    {"codec_type": "video", "duration": "59.9"},
                    {"codec_type": "audio", "duration": "N/A"}
                ]}"#,
        );
        assert_eq!(r.streams()[0].get("duration"), Some(&AttributeValue::from("59.9")));
        assert_eq!(r.streams()[1].get("duration"), Some(&AttributeValue::from("N/A")));
    }

    #[test]
    fn other_streams_are_not_touched() {
        let r = result(
            r#"{"format": {"duration": "60.0"},
                "streams": [
                    {"codec_type": "subtitle"},
                    {"codec_type": "data"},
                    {}
                ]}"#,
        );
        assert!(r.streams().iter().all(|s| s.get("duration").is_none()));
        assert_eq!(r.video_streams().count(), 0);
        assert_eq!(r.audio_streams().count(), 0);
        assert_eq!(r.subtitle_streams().count(), 1);
        assert_eq!(r.data_streams().count(), 1);
    }

    #[test]
    fn missing_container_duration_leaves_stream_alone() {
        let r = result(r#"{"format": {}, "streams": [{"codec_type": "video"}]}"#);
        assert!(r.streams()[0].get("duration").is_none());
        assert_eq!(r.streams()[0].duration_seconds(), 0.0);
    }

    #[test]
    fn partition_preserves_order() {
        let r = result(
            r#"{"format": {"duration": "10"},
                "streams": [
                    {"index": 0, "codec_type": "audio"},
                    {"index": 1, "codec_type": "video"},
                    {"index": 2, "codec_type": "subtitle"},
                    {"index": 3, "codec_type": "audio"},
                    {"index": 4, "codec_type": "video"}
                ]}"#,
        );
        let video: Vec<_> = r.video_streams().map(|s| s.index()).collect();
        let audio: Vec<_> = r.audio_streams().map(|s| s.index()).collect();
        assert_eq!(video, vec![Some(1), Some(4)]);
        assert_eq!(audio, vec![Some(0), Some(3)]);
        assert_eq!(r.primary_video().and_then(|s| s.index()), Some(1));
    }

    #[test]
    fn format_lookups() {
        let r = result(FIXTURE);
        assert_eq!(r.format_name(), Some("matroska,webm"));
        assert_eq!(r.duration_seconds(), Some(120.5));
        assert_eq!(r.bit_rate(), Some(5_000_000));
        assert_eq!(r.format_attribute("duration"), Some(&AttributeValue::from("120.5")));
        assert_eq!(r.format_attribute("size"), None);
    }

    #[test]
    fn serializes_format_and_streams() {
        let r = result(FIXTURE);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["format"]["duration"], "120.5");
        assert_eq!(json["streams"][0]["duration"], "120.5");
        assert_eq!(json["streams"][1]["codec_name"], "aac");
        assert!(json.get("video").is_none());
    }
}
