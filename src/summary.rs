//! Human-readable per-stream summaries.

use probekit_av::{ProbeResult, StreamRecord};

/// Render every stream of `result`, numbered from 1.
pub fn format_summary(name: &str, result: &ProbeResult) -> String {
    let mut out = String::new();
    for (i, stream) in result.streams().iter().enumerate() {
        write_stream(&mut out, name, i + 1, stream);
    }
    out
}

fn write_stream(out: &mut String, name: &str, number: usize, stream: &StreamRecord) {
    out.push_str(&format!("[ {name} - Stream #{number} - {} ]\n", stream.kind()));

    if stream.is_video() {
        let (width, height) = stream.frame_size().unwrap_or((0, 0));
        out.push_str(&format!("Framerate: {:.6}\n", stream.frame_rate()));
        out.push_str(&format!("Frames: {}\n", stream.frames()));
        out.push_str(&format!("Width: {width}\nHeight: {height}\n"));
    }

    out.push_str(&format!("Duration: {:.6}\n", stream.duration_seconds()));
    out.push_str(&format!("Bitrate: {}\n\n", stream.bitrate()));
}
