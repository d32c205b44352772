use std::time::Duration;

use super::segment::{round2, RawSegment, Segment};

/// Language identification reported by the recognition engine.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionInfo {
    pub language: String,
    /// Confidence in `[0, 1]`.
    pub probability: f32,
}

/// The complete outcome of one transcription request. Built exactly once
/// per request; numeric fields are rounded to two decimal places here and
/// nowhere earlier.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    pub language: String,
    pub language_probability: f64,
    pub segments: Vec<Segment>,
    pub full_text: String,
    pub processing_time: f64,
}

impl Transcription {
    pub fn finalize(
        detection: DetectionInfo,
        segments: Vec<RawSegment>,
        full_text: String,
        elapsed: Duration,
    ) -> Self {
        Self {
            language: detection.language,
            language_probability: round2(f64::from(detection.probability)),
            segments: segments.into_iter().map(Segment::from_raw).collect(),
            full_text,
            processing_time: round2(elapsed.as_secs_f64()),
        }
    }
}
