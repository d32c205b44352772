/// Rounds a value to two decimal places, the precision carried by every
/// numeric field of a finalized transcription.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A time-aligned piece of transcript as produced by the recognition
/// engine, before any rounding is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSegment {
    pub start_secs: f64,
    pub end_secs: f64,
    pub text: String,
}

/// A finalized transcript segment. Timestamps are seconds rounded to two
/// decimal places; `end >= start` and segments are ordered by
/// non-decreasing `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Segment {
    pub fn from_raw(raw: RawSegment) -> Self {
        Self {
            start: round2(raw.start_secs),
            end: round2(raw.end_secs),
            text: raw.text,
        }
    }
}
