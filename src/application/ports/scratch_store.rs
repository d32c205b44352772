use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::ScratchName;

/// Durable scratch storage for per-request temporary artifacts.
#[async_trait::async_trait]
pub trait ScratchStore: Send + Sync {
    /// Persists the upload stream under `name`, returning the path of the
    /// staged file. A failed write leaves no partial artifact behind.
    async fn stage(
        &self,
        name: &ScratchName,
        stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<PathBuf, ScratchStoreError>;

    /// Removes a staged artifact. Removing a path that is already gone is
    /// not an error.
    async fn remove(&self, path: &Path) -> Result<(), ScratchStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ScratchStoreError {
    #[error("staging failed: {0}")]
    StagingFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
