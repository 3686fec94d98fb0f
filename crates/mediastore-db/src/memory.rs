//! In-memory record store implementation using `DashMap`.
//!
//! Reference implementation of the `RecordStore` collaborator. Data is lost
//! on process restart; production deployments put a database behind the
//! same trait and get the uniqueness constraint and CAS from it.

use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use mediastore_core::models::{IdentifierType, MediaRecord, StoreConfig};
use mediastore_core::RecordVersion;
use uuid::Uuid;

use crate::store::{RecordStore, RecordStoreError, RecordStoreResult};

/// In-memory record store.
///
/// The pid map's entry API gives atomic insert-if-absent; renames serialize
/// on a store-wide mutex held only for the two-key swap, which is the
/// in-memory equivalent of a reservation transaction.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: DashMap<String, MediaRecord>,
    identifier_types: DashMap<String, IdentifierType>,
    store_configs: DashMap<Uuid, StoreConfig>,
    rename_lock: Mutex<()>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, record: MediaRecord) -> RecordStoreResult<()> {
        match self.records.entry(record.pid.clone()) {
            Entry::Occupied(_) => Err(RecordStoreError::Duplicate),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn fetch(&self, pid: &str) -> RecordStoreResult<Option<MediaRecord>> {
        Ok(self.records.get(pid).map(|r| r.value().clone()))
    }

    async fn update(&self, expected: RecordVersion, record: MediaRecord) -> RecordStoreResult<()> {
        match self.records.entry(record.pid.clone()) {
            Entry::Vacant(_) => Err(RecordStoreError::Missing),
            Entry::Occupied(mut slot) => {
                let actual = slot.get().version();
                if actual != expected {
                    return Err(RecordStoreError::VersionConflict { expected, actual });
                }
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn rename(
        &self,
        old_pid: &str,
        expected: RecordVersion,
        record: MediaRecord,
    ) -> RecordStoreResult<()> {
        let _guard = self
            .rename_lock
            .lock()
            .map_err(|e| RecordStoreError::Unavailable(e.to_string()))?;

        let actual = match self.records.get(old_pid) {
            Some(existing) => existing.version(),
            None => return Err(RecordStoreError::Missing),
        };
        if actual != expected {
            return Err(RecordStoreError::VersionConflict { expected, actual });
        }

        // Reserve the new pid before releasing the old one; the entry API
        // makes the reservation atomic against concurrent inserts.
        match self.records.entry(record.pid.clone()) {
            Entry::Occupied(_) => return Err(RecordStoreError::Duplicate),
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
        }
        self.records.remove(old_pid);
        Ok(())
    }

    async fn remove(&self, pid: &str) -> RecordStoreResult<bool> {
        Ok(self.records.remove(pid).is_some())
    }

    async fn find_by_tags(&self, tags: &[String]) -> RecordStoreResult<Vec<MediaRecord>> {
        let matches = self
            .records
            .iter()
            .filter(|entry| tags.iter().all(|t| entry.value().tags.contains(t)))
            .map(|entry| entry.value().clone())
            .collect();
        Ok(matches)
    }

    async fn put_identifier_type(&self, ty: IdentifierType) -> RecordStoreResult<()> {
        self.identifier_types.insert(ty.name.clone(), ty);
        Ok(())
    }

    async fn fetch_identifier_type(&self, name: &str) -> RecordStoreResult<Option<IdentifierType>> {
        Ok(self.identifier_types.get(name).map(|t| t.value().clone()))
    }

    async fn put_store_config(&self, config: StoreConfig) -> RecordStoreResult<()> {
        self.store_configs.insert(config.pk, config);
        Ok(())
    }

    async fn fetch_store_config(&self, pk: Uuid) -> RecordStoreResult<Option<StoreConfig>> {
        Ok(self.store_configs.get(&pk).map(|c| c.value().clone()))
    }
}
