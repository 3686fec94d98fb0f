//! Error types module
//!
//! This module provides the core error taxonomy used throughout mediastore.
//! Single-record operations return these errors directly; the bulk engine
//! captures them per item as `(pid, error_code, message)` entries instead of
//! aborting the batch. Only `StoreUnavailable` is fatal to a whole batch.

use crate::version::RecordVersion;

#[derive(Debug, thiserror::Error)]
pub enum MediaStoreError {
    #[error("Duplicate pid: {0}")]
    DuplicatePid(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid pid format: '{pid}' does not match pattern '{pattern}'")]
    InvalidPidFormat { pid: String, pattern: String },

    #[error("Version conflict for {pid}: expected {expected}, found {actual}")]
    VersionConflict {
        pid: String,
        expected: RecordVersion,
        actual: RecordVersion,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Not ready: {0}")]
    NotReady(String),

    #[error("Cancelled before processing")]
    Cancelled,

    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),
}

impl MediaStoreError {
    /// Machine-readable error code, used in bulk failure entries and logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            MediaStoreError::DuplicatePid(_) => "DUPLICATE_PID",
            MediaStoreError::NotFound(_) => "NOT_FOUND",
            MediaStoreError::InvalidPidFormat { .. } => "INVALID_PID_FORMAT",
            MediaStoreError::VersionConflict { .. } => "VERSION_CONFLICT",
            MediaStoreError::Validation(_) => "VALIDATION_ERROR",
            MediaStoreError::BackendUnavailable(_) => "BACKEND_UNAVAILABLE",
            MediaStoreError::QuotaExceeded(_) => "QUOTA_EXCEEDED",
            MediaStoreError::NotReady(_) => "NOT_READY",
            MediaStoreError::Cancelled => "CANCELLED",
            MediaStoreError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    /// Fatal errors abort a whole bulk batch: no per-record outcome can be
    /// trusted once the record store itself is unreachable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MediaStoreError::StoreUnavailable(_))
    }

    /// Whether a caller may retry the same request unchanged.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MediaStoreError::BackendUnavailable(_)
                | MediaStoreError::StoreUnavailable(_)
                | MediaStoreError::Cancelled
        )
    }
}

impl From<validator::ValidationErrors> for MediaStoreError {
    fn from(err: validator::ValidationErrors) -> Self {
        MediaStoreError::Validation(err.to_string())
    }
}

impl From<serde_json::Error> for MediaStoreError {
    fn from(err: serde_json::Error) -> Self {
        MediaStoreError::Validation(format!("JSON parsing error: {}", err))
    }
}
