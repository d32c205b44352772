use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;

use crate::application::ports::{
    AsrError, ScratchStore, ScratchStoreError, TranscriptionConfig,
};
use crate::application::services::{Preprocessor, TranscriptionService};
use crate::domain::{AudioFormat, ScratchName, Transcription};

/// One upload as received at the boundary. Chunks are collected with a
/// running total; reading stops at the size limit, so `chunks` never
/// holds more than the configured maximum.
#[derive(Debug)]
pub struct UploadRequest {
    pub filename: String,
    pub received_bytes: u64,
    pub limit_exceeded: bool,
    pub chunks: Vec<Bytes>,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_upload_bytes: u64,
    pub transcription: TranscriptionConfig,
}

/// The request-processing pipeline: validate → stage → preprocess →
/// transcribe → cleanup. Owns the lifetime of every temporary artifact a
/// request creates; nothing outlives the request.
pub struct UploadPipeline {
    store: Arc<dyn ScratchStore>,
    preprocessor: Preprocessor,
    transcriber: TranscriptionService,
    config: PipelineConfig,
}

impl UploadPipeline {
    pub fn new(
        store: Arc<dyn ScratchStore>,
        preprocessor: Preprocessor,
        transcriber: TranscriptionService,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            preprocessor,
            transcriber,
            config,
        }
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.config.max_upload_bytes
    }

    /// Runs one upload to completion. Every invocation stages fresh
    /// artifacts under fresh names; retries are independent requests.
    pub async fn handle(&self, upload: UploadRequest) -> Result<Transcription, PipelineError> {
        let format = self.validate(&upload)?;
        let name = ScratchName::generate(format);

        let mut lease = ScratchLease::new(Arc::clone(&self.store));
        let outcome = self.process(upload, &name, &mut lease).await;
        lease.release().await;
        outcome
    }

    /// All checks run before any temporary file exists.
    fn validate(&self, upload: &UploadRequest) -> Result<AudioFormat, ValidationError> {
        if upload.filename.is_empty() {
            return Err(ValidationError::EmptyFilename);
        }
        let format = AudioFormat::from_filename(&upload.filename)
            .ok_or_else(|| ValidationError::DisallowedExtension(AudioFormat::allowed_list()))?;
        if upload.limit_exceeded || upload.received_bytes > self.config.max_upload_bytes {
            return Err(ValidationError::TooLarge(self.config.max_upload_bytes));
        }
        Ok(format)
    }

    async fn process(
        &self,
        upload: UploadRequest,
        name: &ScratchName,
        lease: &mut ScratchLease,
    ) -> Result<Transcription, PipelineError> {
        let received_bytes = upload.received_bytes;
        let body = futures::stream::iter(
            upload
                .chunks
                .into_iter()
                .map(Ok::<Bytes, std::io::Error>),
        )
        .boxed();
        let staged = self.store.stage(name, body).await?;
        lease.track(staged.clone());
        tracing::debug!(
            path = %staged.display(),
            bytes = received_bytes,
            "upload staged"
        );

        let input = match self.preprocessor.canonicalize(&staged).await {
            Ok(Some(processed)) => {
                if processed != staged {
                    lease.track(processed.clone());
                }
                processed
            }
            Ok(None) => staged.clone(),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "preprocessing failed, transcribing the unprocessed upload"
                );
                staged.clone()
            }
        };

        let transcription = self
            .transcriber
            .transcribe(&input, &self.config.transcription)
            .await?;
        Ok(transcription)
    }
}

/// Scoped ownership of a request's temporary files. `release` deletes
/// every tracked path, each deletion best-effort and independent; if a
/// panic unwinds past the pipeline the `Drop` impl removes whatever is
/// still tracked.
pub struct ScratchLease {
    store: Arc<dyn ScratchStore>,
    paths: Vec<PathBuf>,
}

impl ScratchLease {
    pub fn new(store: Arc<dyn ScratchStore>) -> Self {
        Self {
            store,
            paths: Vec::new(),
        }
    }

    pub fn track(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    pub async fn release(mut self) {
        let paths: Vec<PathBuf> = self.paths.drain(..).collect();
        for path in paths {
            if let Err(err) = self.store.remove(&path).await {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to remove scratch file"
                );
            }
        }
    }
}

impl Drop for ScratchLease {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            let _ = std::fs::remove_file(&path);
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("No file provided")]
    MissingFile,
    #[error("No file selected")]
    EmptyFilename,
    #[error("Invalid file type. Allowed types: {0}")]
    DisallowedExtension(String),
    #[error("File is too large. Maximum size: {0} bytes")]
    TooLarge(u64),
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("staging: {0}")]
    Staging(#[from] ScratchStoreError),
    #[error("transcription: {0}")]
    Transcription(#[from] AsrError),
}

impl UploadRequest {
    /// Convenience constructor for an in-memory upload.
    pub fn from_bytes(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            filename: filename.into(),
            received_bytes: data.len() as u64,
            limit_exceeded: false,
            chunks: vec![data],
        }
    }
}
