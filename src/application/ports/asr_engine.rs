use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{DetectionInfo, RawSegment};

/// Immutable decoding parameters for one engine invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionConfig {
    /// Decoding search breadth; `1` means greedy decoding.
    pub beam_width: u32,
    /// `Some(code)` pins the target language; `None` asks the engine to
    /// auto-detect.
    pub language: Option<String>,
    /// Skip silence spans before decoding.
    pub vad_filter: bool,
    /// Silence shorter than this stays inside a speech span.
    pub min_silence: Duration,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            beam_width: 5,
            language: Some("vi".to_string()),
            vad_filter: true,
            min_silence: Duration::from_millis(500),
        }
    }
}

/// Finite, forward-only sequence of segments as the engine produced them.
///
/// The stream is consumed by value, exactly once; re-reading requires a
/// fresh engine invocation. A failed decode surfaces as an `Err` item,
/// after which the stream yields nothing further.
pub struct SegmentStream {
    items: VecDeque<Result<RawSegment, AsrError>>,
}

impl SegmentStream {
    pub fn empty() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub fn from_segments(segments: Vec<RawSegment>) -> Self {
        Self {
            items: segments.into_iter().map(Ok).collect(),
        }
    }

    /// A stream that yields `partial` and then fails with `error`.
    pub fn failed(partial: Vec<RawSegment>, error: AsrError) -> Self {
        let mut items: VecDeque<_> = partial.into_iter().map(Ok).collect();
        items.push_back(Err(error));
        Self { items }
    }
}

impl Iterator for SegmentStream {
    type Item = Result<RawSegment, AsrError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.items.pop_front()?;
        if item.is_err() {
            self.items.clear();
        }
        Some(item)
    }
}

/// The speech-recognition collaborator. Implementations are loaded once at
/// process startup and must be safe to share across concurrent requests.
#[async_trait]
pub trait AsrEngine: Send + Sync {
    async fn transcribe(
        &self,
        audio: &Path,
        config: &TranscriptionConfig,
    ) -> Result<(SegmentStream, DetectionInfo), AsrError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AsrError {
    #[error("audio decoding failed: {0}")]
    DecodingFailed(String),
    #[error("model loading failed: {0}")]
    ModelLoadFailed(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("worker task failed: {0}")]
    Task(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(start: f64, end: f64, text: &str) -> RawSegment {
        RawSegment {
            start_secs: start,
            end_secs: end,
            text: text.to_string(),
        }
    }

    #[test]
    fn stream_yields_segments_in_order_then_ends() {
        let mut stream =
            SegmentStream::from_segments(vec![raw(0.0, 1.0, "a"), raw(1.0, 2.0, "b")]);
        assert_eq!(stream.next().unwrap().unwrap().text, "a");
        assert_eq!(stream.next().unwrap().unwrap().text, "b");
        assert!(stream.next().is_none());
    }

    #[test]
    fn failed_stream_ends_at_the_error() {
        let mut stream = SegmentStream::failed(
            vec![raw(0.0, 1.0, "partial")],
            AsrError::InferenceFailed("corrupt frame".to_string()),
        );
        assert!(stream.next().unwrap().is_ok());
        assert!(stream.next().unwrap().is_err());
        assert!(stream.next().is_none());
    }
}
