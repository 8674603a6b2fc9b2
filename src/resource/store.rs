//! Resource store abstraction and a local filesystem adapter

use super::reference::{generate_uid, ResourceReference};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Resource not found: {id}")]
    NotFound { id: String },

    #[error("Resource id escapes the store root: {id}")]
    InvalidId { id: String },

    #[error("Failed to read resource {id}: {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn resolve(&self, id: &str) -> Result<ResourceReference, StoreError>;

    async fn open(&self, id: &str) -> Result<Vec<u8>, StoreError>;

    /// Resolves and opens `id` together
    async fn load(&self, id: &str) -> Result<(ResourceReference, Vec<u8>), StoreError> {
        let reference = self.resolve(id).await?;
        let bytes = self.open(id).await?;
        Ok((reference, bytes))
    }
}

/// Resources are files below a root directory, addressed by relative path
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(id);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if id.is_empty() || escapes {
            return Err(StoreError::InvalidId { id: id.to_string() });
        }
        Ok(self.root.join(relative))
    }

    async fn read(&self, id: &str) -> Result<(PathBuf, Vec<u8>), StoreError> {
        let path = self.path_for(id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok((path, bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound { id: id.to_string() })
            }
            Err(source) => Err(StoreError::Io {
                id: id.to_string(),
                source,
            }),
        }
    }

    async fn describe(
        &self,
        id: &str,
        path: PathBuf,
        bytes: &[u8],
    ) -> Result<ResourceReference, StoreError> {
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|source| StoreError::Io {
                id: id.to_string(),
                source,
            })?;

        let submitted_at: DateTime<Utc> = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        let absolute = tokio::fs::canonicalize(&path).await.unwrap_or(path);
        let uri = format!("file://{}", absolute.display());
        let hash = format!("{:x}", md5::compute(bytes));
        let etag = format!("\"{}\"", hash);
        let name = absolute
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| id.to_string());

        debug!(id, uri = %uri, size = bytes.len(), "Resolved local resource");

        // Content hashes collide for identical files, so the uid is per resolve
        let uid = generate_uid(&uri);
        Ok(ResourceReference::new(uri, uid, submitted_at)
            .with_hash(hash)
            .with_etag(etag)
            .with_name(name))
    }
}

#[async_trait]
impl ResourceStore for LocalFileStore {
    async fn resolve(&self, id: &str) -> Result<ResourceReference, StoreError> {
        self.load(id).await.map(|(reference, _)| reference)
    }

    async fn open(&self, id: &str) -> Result<Vec<u8>, StoreError> {
        self.read(id).await.map(|(_, bytes)| bytes)
    }

    async fn load(&self, id: &str) -> Result<(ResourceReference, Vec<u8>), StoreError> {
        let (path, bytes) = self.read(id).await?;
        let reference = self.describe(id, path, &bytes).await?;
        Ok((reference, bytes))
    }
}
