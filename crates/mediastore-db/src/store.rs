//! Record store collaborator trait.
//!
//! Durable storage for media records, identifier types, and store configs.
//! Implementations must provide a uniqueness constraint on `pid` covering
//! every stored row (deleted rows keep their pid reserved until purged) and
//! compare-and-swap semantics on the record version.

use async_trait::async_trait;
use mediastore_core::models::{IdentifierType, MediaRecord, StoreConfig};
use mediastore_core::RecordVersion;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RecordStoreError {
    /// The pid is already taken (unique constraint violation).
    #[error("pid already registered")]
    Duplicate,

    /// No row exists for the pid.
    #[error("record does not exist")]
    Missing,

    /// Compare-and-swap rejected a stale writer.
    #[error("version conflict: expected {expected}, found {actual}")]
    VersionConflict {
        expected: RecordVersion,
        actual: RecordVersion,
    },

    /// The store itself is unreachable; no record outcome can be trusted.
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

pub type RecordStoreResult<T> = Result<T, RecordStoreError>;

/// Durable storage for media records and their supporting tables.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record. Uniqueness check and reservation are one atomic
    /// operation; a concurrent insert of the same pid loses with
    /// [`RecordStoreError::Duplicate`].
    async fn insert(&self, record: MediaRecord) -> RecordStoreResult<()>;

    /// Fetch a record by pid, including logically deleted rows.
    async fn fetch(&self, pid: &str) -> RecordStoreResult<Option<MediaRecord>>;

    /// Replace a record if its stored version equals `expected`.
    async fn update(&self, expected: RecordVersion, record: MediaRecord) -> RecordStoreResult<()>;

    /// Atomically release `old_pid` and reserve `record.pid` while writing
    /// the updated record. On any failure the old row is left untouched.
    async fn rename(
        &self,
        old_pid: &str,
        expected: RecordVersion,
        record: MediaRecord,
    ) -> RecordStoreResult<()>;

    /// Physically remove a row, releasing its pid for reuse. Used by the
    /// retention job, not by the lifecycle API.
    async fn remove(&self, pid: &str) -> RecordStoreResult<bool>;

    /// Records carrying every one of the given tags.
    async fn find_by_tags(&self, tags: &[String]) -> RecordStoreResult<Vec<MediaRecord>>;

    async fn put_identifier_type(&self, ty: IdentifierType) -> RecordStoreResult<()>;

    async fn fetch_identifier_type(&self, name: &str) -> RecordStoreResult<Option<IdentifierType>>;

    async fn put_store_config(&self, config: StoreConfig) -> RecordStoreResult<()>;

    async fn fetch_store_config(&self, pk: Uuid) -> RecordStoreResult<Option<StoreConfig>>;
}
