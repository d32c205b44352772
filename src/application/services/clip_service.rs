use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::ports::{AudioCodec, AudioCodecError};

/// Slices an interval out of an audio file. Sibling tool of the upload
/// pipeline; shares the codec collaborator, touches nothing else.
pub struct ClipService {
    codec: Arc<dyn AudioCodec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipOutcome {
    pub output: PathBuf,
    pub duration_secs: f64,
    /// True when the requested end overran the audio and was clamped.
    pub clamped: bool,
}

impl ClipService {
    pub fn new(codec: Arc<dyn AudioCodec>) -> Self {
        Self { codec }
    }

    /// Writes `[start, end)` of `input` to `output` (or a derived path).
    /// An end past the audio's duration is clamped down with a warning;
    /// the window must satisfy `0 <= start < end` after clamping.
    pub async fn clip(
        &self,
        input: &Path,
        start_secs: f64,
        end_secs: f64,
        output: Option<PathBuf>,
    ) -> Result<ClipOutcome, ClipError> {
        if start_secs < 0.0 {
            return Err(ClipError::NegativeStart(start_secs));
        }

        let duration = self.codec.duration_secs(input).await?;
        let mut end = end_secs;
        let mut clamped = false;
        if end > duration {
            tracing::warn!(
                requested_end = end_secs,
                duration_secs = duration,
                "end overruns the audio, clamping to its duration"
            );
            end = duration;
            clamped = true;
        }
        if start_secs >= end {
            return Err(ClipError::EmptyWindow {
                start: start_secs,
                end,
            });
        }

        let output =
            output.unwrap_or_else(|| default_output_path(input, start_secs, end_secs));
        let written = self.codec.slice(input, start_secs, end, &output).await?;

        tracing::info!(
            output = %output.display(),
            duration_secs = written,
            "clip written"
        );

        Ok(ClipOutcome {
            output,
            duration_secs: written,
            clamped,
        })
    }
}

fn default_output_path(input: &Path, start: f64, end: f64) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("clip");
    input.with_file_name(format!("{stem}_clip_{start}s-{end}s.wav"))
}

#[derive(Debug, thiserror::Error)]
pub enum ClipError {
    #[error("start must be >= 0, got {0}")]
    NegativeStart(f64),
    #[error("start ({start}) must be earlier than end ({end})")]
    EmptyWindow { start: f64, end: f64 },
    #[error("codec: {0}")]
    Codec(#[from] AudioCodecError),
}
