use std::sync::Arc;

use crate::application::services::UploadPipeline;

/// Shared per-process state. The pipeline owns the collaborators (engine,
/// codec, scratch store); handlers only see this handle.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<UploadPipeline>,
}
