use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::application::ports::{AsrEngine, AsrError, TranscriptionConfig};
use crate::application::services::aggregate;
use crate::domain::Transcription;

/// Invokes the recognition engine once and turns its lazy segment stream
/// into a finalized, immutable result.
pub struct TranscriptionService {
    engine: Arc<dyn AsrEngine>,
}

impl TranscriptionService {
    pub fn new(engine: Arc<dyn AsrEngine>) -> Self {
        Self { engine }
    }

    /// The elapsed time covers the engine call plus the full drain of the
    /// segment stream, since segments are produced incrementally as
    /// decoding proceeds.
    pub async fn transcribe(
        &self,
        audio: &Path,
        config: &TranscriptionConfig,
    ) -> Result<Transcription, AsrError> {
        let started = Instant::now();
        let (stream, detection) = self.engine.transcribe(audio, config).await?;
        let (segments, full_text) = aggregate(stream)?;
        let elapsed = started.elapsed();

        tracing::debug!(
            segments = segments.len(),
            language = %detection.language,
            elapsed_secs = elapsed.as_secs_f64(),
            "transcription completed"
        );

        Ok(Transcription::finalize(detection, segments, full_text, elapsed))
    }
}
