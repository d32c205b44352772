mod aggregator;
mod clip_service;
mod preprocessor;
mod transcription_service;
mod upload_pipeline;

pub use aggregator::aggregate;
pub use clip_service::{ClipError, ClipOutcome, ClipService};
pub use preprocessor::Preprocessor;
pub use transcription_service::TranscriptionService;
pub use upload_pipeline::{
    PipelineConfig, PipelineError, ScratchLease, UploadPipeline, UploadRequest, ValidationError,
};
