use crate::traits::{StorageError, StorageResult, StoreBackend};
use async_trait::async_trait;
use mediastore_core::models::StoreKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage backend.
///
/// Presigning is not supported: the negotiator falls back to inline
/// transfer for downloads and rejects presigned upload requests.
#[derive(Clone)]
pub struct LocalStore {
    base_path: PathBuf,
    max_object_bytes: Option<u64>,
}

impl LocalStore {
    /// Create a new LocalStore rooted at `base_path`.
    ///
    /// `max_object_bytes` caps the size of a single object; larger puts are
    /// rejected with a quota error.
    pub async fn new(
        base_path: impl Into<PathBuf>,
        max_object_bytes: Option<u64>,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStore {
            base_path,
            max_object_bytes,
        })
    }

    /// Convert a store key to a filesystem path, rejecting keys that could
    /// escape the base directory.
    fn key_to_path(&self, store_key: &str) -> StorageResult<PathBuf> {
        if store_key.is_empty()
            || store_key.starts_with('/')
            || store_key.split('/').any(|seg| seg == "..")
        {
            return Err(StorageError::InvalidKey(format!(
                "Store key '{}' must be relative and must not contain '..'",
                store_key
            )));
        }
        Ok(self.base_path.join(store_key))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StoreBackend for LocalStore {
    async fn presign_put(&self, _store_key: &str, _expires_in: Duration) -> StorageResult<String> {
        Err(StorageError::ConfigError(
            "Presigned URLs are not supported by the local storage backend".to_string(),
        ))
    }

    async fn presign_get(&self, _store_key: &str, _expires_in: Duration) -> StorageResult<String> {
        Err(StorageError::ConfigError(
            "Presigned URLs are not supported by the local storage backend".to_string(),
        ))
    }

    async fn put_inline(&self, store_key: &str, data: Vec<u8>) -> StorageResult<()> {
        let path = self.key_to_path(store_key)?;
        let size = data.len() as u64;

        if let Some(max) = self.max_object_bytes {
            if size > max {
                return Err(StorageError::QuotaExceeded(format!(
                    "Object of {} bytes exceeds the {} byte limit",
                    size, max
                )));
            }
        }

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %store_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage put successful"
        );

        Ok(())
    }

    async fn get_inline(&self, store_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(store_key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(store_key.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %store_key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage get successful"
        );

        Ok(data)
    }

    async fn delete(&self, store_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(store_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(store_key.to_string()));
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %store_key,
            "Local storage delete successful"
        );

        Ok(())
    }

    fn supports_presign(&self) -> bool {
        false
    }

    fn backend_kind(&self) -> StoreKind {
        StoreKind::Local
    }
}
