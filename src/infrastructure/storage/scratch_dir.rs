use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::application::ports::{ScratchStore, ScratchStoreError};
use crate::domain::ScratchName;

/// Scratch storage on the local filesystem. Collision safety comes from
/// the generated names, not from locking.
pub struct ScratchDir {
    base: PathBuf,
}

impl ScratchDir {
    pub fn new(base: impl Into<PathBuf>) -> Result<Self, ScratchStoreError> {
        let base = base.into();
        std::fs::create_dir_all(&base).map_err(ScratchStoreError::Io)?;
        Ok(Self { base })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

#[async_trait::async_trait]
impl ScratchStore for ScratchDir {
    async fn stage(
        &self,
        name: &ScratchName,
        mut stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<PathBuf, ScratchStoreError> {
        let path = self.base.join(name.as_str());
        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| ScratchStoreError::StagingFailed(format!("{}: {}", path.display(), e)))?;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    let _ = tokio::fs::remove_file(&path).await;
                    return Err(ScratchStoreError::Io(e));
                }
            };
            if let Err(e) = file.write_all(&bytes).await {
                let _ = tokio::fs::remove_file(&path).await;
                return Err(ScratchStoreError::Io(e));
            }
        }

        if let Err(e) = file.flush().await {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(ScratchStoreError::Io(e));
        }

        Ok(path)
    }

    async fn remove(&self, path: &Path) -> Result<(), ScratchStoreError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ScratchStoreError::DeleteFailed(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }
}
