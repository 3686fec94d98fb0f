//! Storage abstraction trait
//!
//! This module defines the StoreBackend trait that all storage backends
//! must implement, and the error type their operations surface. Failures
//! are typed and never swallowed; the transfer negotiator decides what to
//! do with them.

use async_trait::async_trait;
use mediastore_core::models::StoreKind;
use mediastore_core::MediaStoreError;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid store key: {0}")]
    InvalidKey(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for MediaStoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => MediaStoreError::NotFound(key),
            StorageError::QuotaExceeded(msg) => MediaStoreError::QuotaExceeded(msg),
            StorageError::InvalidKey(msg) | StorageError::ConfigError(msg) => {
                MediaStoreError::Validation(msg)
            }
            other => MediaStoreError::BackendUnavailable(other.to_string()),
        }
    }
}

/// Storage backend abstraction.
///
/// Backends broker access to the bytes behind a media record, either
/// inline (the service moves the bytes) or through time-limited presigned
/// URLs (the client moves them). The negotiator never holds a record lock
/// across these calls except for the synchronous inline path.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Issue a presigned PUT URL for direct client upload.
    async fn presign_put(&self, store_key: &str, expires_in: Duration) -> StorageResult<String>;

    /// Issue a presigned GET URL for direct client download.
    async fn presign_get(&self, store_key: &str, expires_in: Duration) -> StorageResult<String>;

    /// Store bytes under the given key.
    async fn put_inline(&self, store_key: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Retrieve the bytes behind the given key.
    async fn get_inline(&self, store_key: &str) -> StorageResult<Vec<u8>>;

    /// Delete the object behind the given key.
    async fn delete(&self, store_key: &str) -> StorageResult<()>;

    /// Whether this backend can issue presigned URLs.
    fn supports_presign(&self) -> bool;

    /// The backend kind this instance serves.
    fn backend_kind(&self) -> StoreKind;
}
