use crate::application::ports::{AsrError, SegmentStream};
use crate::domain::RawSegment;

/// Drains the segment stream exactly once, collecting the ordered segment
/// list (texts trimmed) and the space-joined full transcript. An error
/// item discards everything drained before it and aborts the request.
pub fn aggregate(stream: SegmentStream) -> Result<(Vec<RawSegment>, String), AsrError> {
    let mut segments = Vec::new();
    for item in stream {
        let raw = item?;
        segments.push(RawSegment {
            text: raw.text.trim().to_string(),
            ..raw
        });
    }
    let full_text = segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();
    Ok((segments, full_text))
}
