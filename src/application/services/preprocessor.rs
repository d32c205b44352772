use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::ports::{AudioCodec, AudioCodecError};

/// Prepares an uploaded file for recognition by converting it to the
/// canonical form through the codec collaborator. Preprocessing is a
/// speed/quality optimization; callers fall back to the original file
/// when it fails.
pub struct Preprocessor {
    codec: Arc<dyn AudioCodec>,
    enabled: bool,
}

impl Preprocessor {
    pub fn new(codec: Arc<dyn AudioCodec>, enabled: bool) -> Self {
        Self { codec, enabled }
    }

    /// Returns the canonicalized file path, or `None` when preprocessing
    /// is disabled by configuration.
    pub async fn canonicalize(
        &self,
        input: &Path,
    ) -> Result<Option<PathBuf>, AudioCodecError> {
        if !self.enabled {
            return Ok(None);
        }
        let output = self.codec.canonicalize(input).await?;
        tracing::debug!(
            input = %input.display(),
            output = %output.display(),
            "audio canonicalized for recognition"
        );
        Ok(Some(output))
    }
}
