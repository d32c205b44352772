use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// The audio decode/encode collaborator: container decoding, downmix,
/// resampling, normalization, and lossless re-encoding.
#[async_trait]
pub trait AudioCodec: Send + Sync {
    /// Produces the canonical recognition form of `input` (mono, 16 kHz,
    /// peak-normalized WAV) as a new file beside it, returning the new
    /// path.
    async fn canonicalize(&self, input: &Path) -> Result<PathBuf, AudioCodecError>;

    /// Total playable duration of `input` in seconds.
    async fn duration_secs(&self, input: &Path) -> Result<f64, AudioCodecError>;

    /// Writes the `[start_secs, end_secs)` interval of `input` to
    /// `output`, returning the duration actually written.
    async fn slice(
        &self,
        input: &Path,
        start_secs: f64,
        end_secs: f64,
        output: &Path,
    ) -> Result<f64, AudioCodecError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AudioCodecError {
    #[error("decoding failed: {0}")]
    DecodingFailed(String),
    #[error("resampling failed: {0}")]
    ResamplingFailed(String),
    #[error("encoding failed: {0}")]
    EncodingFailed(String),
    #[error("worker task failed: {0}")]
    Task(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
