//! Media record repository.
//!
//! CRUD and versioned mutation of individual records. Every mutation is a
//! read-modify-write executed under the per-pid exclusive section, with a
//! compare-and-swap at the record store as the second guard. Renames go
//! through the store's atomic release-old/reserve-new operation; a failed
//! reservation leaves the record untouched.

use std::sync::Arc;

use mediastore_core::models::{
    IdentifierUpdate, MediaCreate, MediaRecord, MediaUpdate, MetadataUpdate, MutationRequest,
    StoreConfig, StoreConfigRef, StoreKeyUpdate, StoreStatus, TagUpdate,
};
use mediastore_core::{
    validation, MediaAction, MediaEvent, MediaStoreError, ProvenanceReporter, RecordVersion,
};
use serde_json::Value as JsonValue;
use validator::Validate;

use crate::locks::LockTable;
use crate::registry::IdentifierRegistry;
use crate::store::{RecordStore, RecordStoreError};

pub struct MediaRepository {
    store: Arc<dyn RecordStore>,
    registry: IdentifierRegistry,
    locks: LockTable,
    events: Arc<dyn ProvenanceReporter>,
}

impl MediaRepository {
    pub fn new(
        store: Arc<dyn RecordStore>,
        events: Arc<dyn ProvenanceReporter>,
        lock_shards: usize,
    ) -> Self {
        MediaRepository {
            registry: IdentifierRegistry::new(store.clone()),
            store,
            locks: LockTable::new(lock_shards),
            events,
        }
    }

    pub fn registry(&self) -> &IdentifierRegistry {
        &self.registry
    }

    /// Create a record in PENDING state. No backend bytes exist yet.
    pub async fn create(&self, spec: MediaCreate) -> Result<MediaRecord, MediaStoreError> {
        spec.validate()?;

        let pid = self.registry.validate(&spec.pid, spec.pid_type.trim()).await?;
        let identifiers = validation::normalize_identifiers(&spec.identifiers)?;
        validation::validate_metadata(&spec.metadata)?;
        let tags = validation::normalize_tags(&spec.tags)?;

        let config = StoreConfig::from_create(spec.store_config);
        self.store
            .put_store_config(config.clone())
            .await
            .map_err(|e| store_err(e, &pid))?;

        let record = MediaRecord::new(
            pid,
            spec.pid_type.trim().to_string(),
            config,
            identifiers,
            spec.metadata,
            tags,
        );

        // Uniqueness check and reservation are one atomic insert.
        self.store
            .insert(record.clone())
            .await
            .map_err(|e| store_err(e, &record.pid))?;

        tracing::info!(pid = %record.pid, pid_type = %record.pid_type, "Media record created");
        self.emit(&record.pid, MediaAction::Created).await;
        Ok(record)
    }

    /// Fetch a record. Logically deleted records surface as NotFound.
    pub async fn get(&self, pid: &str) -> Result<MediaRecord, MediaStoreError> {
        let pid = validation::normalize_pid(pid)?;
        self.fetch_live(&pid).await
    }

    /// Update identity and backend binding: rename, pid-type change,
    /// store-config rebinding. Rename is atomic; if the new pid cannot be
    /// reserved the record is left untouched.
    pub async fn update(
        &self,
        pid: &str,
        update: MediaUpdate,
        expected_version: Option<RecordVersion>,
    ) -> Result<MediaRecord, MediaStoreError> {
        if update.is_empty() {
            return Err(MediaStoreError::Validation(
                "update request has no fields to apply".to_string(),
            ));
        }
        let pid = validation::normalize_pid(pid)?;
        let new_pid = update
            .new_pid
            .as_deref()
            .map(validation::normalize_pid)
            .transpose()?;

        let _guards = match &new_pid {
            Some(target) => {
                let (a, b) = self.locks.acquire_pair(&pid, target).await;
                (a, b)
            }
            None => (self.locks.acquire(&pid).await, None),
        };

        let mut record = self.fetch_live(&pid).await?;
        check_expected(&record, expected_version)?;
        let cas = record.version();

        if let Some(pid_type) = &update.pid_type {
            record.pid_type = pid_type.trim().to_string();
        }
        // Re-validate the (possibly new) pid whenever identity changed.
        if new_pid.is_some() || update.pid_type.is_some() {
            let target = new_pid.clone().unwrap_or_else(|| record.pid.clone());
            self.registry.validate(&target, &record.pid_type).await?;
        }

        if let Some(config_ref) = &update.store_config {
            let config = self.resolve_store_config(config_ref, &pid).await?;
            if config != record.store_config {
                record.store_config = config;
                // Rebinding re-points the content, so it is version-bumping
                // like a store-key change.
                record.bump_version();
            }
        }

        match new_pid {
            Some(target) => {
                record.pid = target.clone();
                record.touch();
                self.store
                    .rename(&pid, cas, record.clone())
                    .await
                    .map_err(|e| match e {
                        RecordStoreError::Duplicate => MediaStoreError::DuplicatePid(target),
                        other => store_err(other, &pid),
                    })?;
                tracing::info!(old_pid = %pid, new_pid = %record.pid, "Media record renamed");
                self.emit(&record.pid, MediaAction::Renamed).await;
            }
            None => {
                record.touch();
                self.store
                    .update(cas, record.clone())
                    .await
                    .map_err(|e| store_err(e, &pid))?;
                self.emit(&record.pid, MediaAction::Updated).await;
            }
        }
        Ok(record)
    }

    /// Rename a record, releasing the old pid and reserving the new one in
    /// one step.
    pub async fn rename(
        &self,
        pid: &str,
        new_pid: &str,
        expected_version: Option<RecordVersion>,
    ) -> Result<MediaRecord, MediaStoreError> {
        self.update(
            pid,
            MediaUpdate {
                new_pid: Some(new_pid.to_string()),
                ..Default::default()
            },
            expected_version,
        )
        .await
    }

    /// Replace a record's tag set.
    pub async fn update_tags(
        &self,
        update: TagUpdate,
        expected_version: Option<RecordVersion>,
    ) -> Result<MediaRecord, MediaStoreError> {
        let pid = validation::normalize_pid(&update.pid)?;
        let tags = validation::normalize_tags(&update.tags)?;

        let _guard = self.locks.acquire(&pid).await;
        let mut record = self.fetch_live(&pid).await?;
        check_expected(&record, expected_version)?;
        let cas = record.version();

        record.tags = tags;
        record.touch();
        self.store
            .update(cas, record.clone())
            .await
            .map_err(|e| store_err(e, &pid))?;
        self.emit(&pid, MediaAction::Updated).await;
        Ok(record)
    }

    /// Re-point a record at existing backend bytes. Bumps the version,
    /// leaves the lifecycle status untouched.
    pub async fn update_store_key(
        &self,
        update: StoreKeyUpdate,
        expected_version: Option<RecordVersion>,
    ) -> Result<MediaRecord, MediaStoreError> {
        let pid = validation::normalize_pid(&update.pid)?;
        let store_key = validation::validate_store_key(&update.store_key)?;

        let _guard = self.locks.acquire(&pid).await;
        let mut record = self.fetch_live(&pid).await?;
        check_expected(&record, expected_version)?;
        let cas = record.version();

        record.store_key = Some(store_key);
        record.bump_version();
        self.store
            .update(cas, record.clone())
            .await
            .map_err(|e| store_err(e, &pid))?;
        self.emit(&pid, MediaAction::Updated).await;
        Ok(record)
    }

    /// Key-wise upsert into the secondary identifiers.
    pub async fn update_identifiers(
        &self,
        update: IdentifierUpdate,
        expected_version: Option<RecordVersion>,
    ) -> Result<MediaRecord, MediaStoreError> {
        let pid = validation::normalize_pid(&update.pid)?;
        let incoming = validation::normalize_identifiers(&update.identifiers)?;

        let _guard = self.locks.acquire(&pid).await;
        let mut record = self.fetch_live(&pid).await?;
        check_expected(&record, expected_version)?;
        let cas = record.version();

        for (key, value) in incoming {
            record.identifiers.insert(key, value);
        }
        record.touch();
        self.store
            .update(cas, record.clone())
            .await
            .map_err(|e| store_err(e, &pid))?;
        self.emit(&pid, MediaAction::Updated).await;
        Ok(record)
    }

    /// Dual-mode metadata patch: named keys are copied from `data` (and
    /// removed when absent from it); with no keys the whole document is
    /// replaced.
    pub async fn update_metadata(
        &self,
        update: MetadataUpdate,
        expected_version: Option<RecordVersion>,
    ) -> Result<MediaRecord, MediaStoreError> {
        let pid = validation::normalize_pid(&update.pid)?;

        let _guard = self.locks.acquire(&pid).await;
        let mut record = self.fetch_live(&pid).await?;
        check_expected(&record, expected_version)?;
        let cas = record.version();

        if update.keys.is_empty() {
            validation::validate_metadata(&update.data)?;
            record.metadata = update.data;
        } else {
            let data = update.data.as_object().ok_or_else(|| {
                MediaStoreError::Validation(
                    "metadata patch with keys requires an object payload".to_string(),
                )
            })?;
            if !record.metadata.is_object() {
                record.metadata = JsonValue::Object(serde_json::Map::new());
            }
            if let Some(document) = record.metadata.as_object_mut() {
                for key in &update.keys {
                    match data.get(key) {
                        Some(value) => {
                            document.insert(key.clone(), value.clone());
                        }
                        None => {
                            document.remove(key);
                        }
                    }
                }
            }
            validation::validate_metadata(&record.metadata)?;
        }

        record.touch();
        self.store
            .update(cas, record.clone())
            .await
            .map_err(|e| store_err(e, &pid))?;
        self.emit(&pid, MediaAction::Updated).await;
        Ok(record)
    }

    /// Logically delete a record (STORED/FAILED -> DELETED). The row and
    /// its pid reservation remain until the retention job purges them.
    pub async fn delete(&self, pid: &str) -> Result<MediaRecord, MediaStoreError> {
        let pid = validation::normalize_pid(pid)?;

        let _guard = self.locks.acquire(&pid).await;
        let mut record = self.fetch_live(&pid).await?;
        let cas = record.version();

        record.transition_status(StoreStatus::Deleted)?;
        self.store
            .update(cas, record.clone())
            .await
            .map_err(|e| store_err(e, &pid))?;
        tracing::info!(pid = %pid, "Media record deleted");
        self.emit(&pid, MediaAction::Deleted).await;
        Ok(record)
    }

    /// Exact-match tag search, delegated to the record store.
    pub async fn search(&self, tags: &[String]) -> Result<Vec<MediaRecord>, MediaStoreError> {
        let tags: Vec<String> = validation::normalize_tags(tags)?.into_iter().collect();
        let mut records = self
            .store
            .find_by_tags(&tags)
            .await
            .map_err(|e| MediaStoreError::StoreUnavailable(e.to_string()))?;
        records.retain(|r| r.status() != StoreStatus::Deleted);
        records.sort_by(|a, b| a.pid.cmp(&b.pid));
        Ok(records)
    }

    /// Dispatch a single bulk item.
    pub async fn apply(&self, request: &MutationRequest) -> Result<MediaRecord, MediaStoreError> {
        match request {
            MutationRequest::Tags(update) => self.update_tags(update.clone(), None).await,
            MutationRequest::StoreKey(update) => self.update_store_key(update.clone(), None).await,
            MutationRequest::Identifiers(update) => {
                self.update_identifiers(update.clone(), None).await
            }
            MutationRequest::Metadata(update) => self.update_metadata(update.clone(), None).await,
            MutationRequest::Record { pid, update } => {
                self.update(pid, update.clone(), None).await
            }
        }
    }

    // Lifecycle transitions used by the transfer negotiator. These hold the
    // per-pid lock only for the metadata write, never for a byte transfer.

    /// PENDING/FAILED -> UPLOADING, recording the negotiated store key.
    pub async fn mark_uploading(
        &self,
        pid: &str,
        store_key: String,
    ) -> Result<MediaRecord, MediaStoreError> {
        let pid = validation::normalize_pid(pid)?;
        let store_key = validation::validate_store_key(&store_key)?;

        let _guard = self.locks.acquire(&pid).await;
        let mut record = self.fetch_live(&pid).await?;
        let cas = record.version();

        record.store_key = Some(store_key);
        record.transition_status(StoreStatus::Uploading)?;
        self.store
            .update(cas, record.clone())
            .await
            .map_err(|e| store_err(e, &pid))?;
        Ok(record)
    }

    /// Transition to STORED with a version bump. Inline uploads pass the
    /// key they wrote to; presign confirmations pass `None` and keep the
    /// key recorded at negotiation time.
    pub async fn mark_stored(
        &self,
        pid: &str,
        store_key: Option<String>,
    ) -> Result<MediaRecord, MediaStoreError> {
        let pid = validation::normalize_pid(pid)?;

        let _guard = self.locks.acquire(&pid).await;
        let mut record = self.fetch_live(&pid).await?;
        let cas = record.version();

        if let Some(key) = store_key {
            record.store_key = Some(validation::validate_store_key(&key)?);
        }
        record.transition_status(StoreStatus::Stored)?;
        record.bump_version();
        self.store
            .update(cas, record.clone())
            .await
            .map_err(|e| store_err(e, &pid))?;
        tracing::info!(pid = %pid, version = %record.version(), "Media record stored");
        self.emit(&pid, MediaAction::Stored).await;
        Ok(record)
    }

    /// Any non-deleted state -> FAILED after a backend error. The record
    /// stays addressable for retry.
    pub async fn mark_failed(&self, pid: &str) -> Result<MediaRecord, MediaStoreError> {
        let pid = validation::normalize_pid(pid)?;

        let _guard = self.locks.acquire(&pid).await;
        let mut record = self.fetch_live(&pid).await?;
        let cas = record.version();

        record.transition_status(StoreStatus::Failed)?;
        self.store
            .update(cas, record.clone())
            .await
            .map_err(|e| store_err(e, &pid))?;
        tracing::warn!(pid = %pid, "Media record marked failed");
        Ok(record)
    }

    async fn fetch_live(&self, pid: &str) -> Result<MediaRecord, MediaStoreError> {
        let record = self
            .store
            .fetch(pid)
            .await
            .map_err(|e| store_err(e, pid))?
            .ok_or_else(|| MediaStoreError::NotFound(pid.to_string()))?;
        if record.status() == StoreStatus::Deleted {
            return Err(MediaStoreError::NotFound(pid.to_string()));
        }
        Ok(record)
    }

    async fn resolve_store_config(
        &self,
        config_ref: &StoreConfigRef,
        pid: &str,
    ) -> Result<StoreConfig, MediaStoreError> {
        match config_ref {
            StoreConfigRef::Existing(pk) => self
                .store
                .fetch_store_config(*pk)
                .await
                .map_err(|e| store_err(e, pid))?
                .ok_or_else(|| {
                    MediaStoreError::Validation(format!("Unknown store config '{}'", pk))
                }),
            StoreConfigRef::Inline(create) => {
                create.validate()?;
                let config = StoreConfig::from_create(create.clone());
                self.store
                    .put_store_config(config.clone())
                    .await
                    .map_err(|e| store_err(e, pid))?;
                Ok(config)
            }
        }
    }

    async fn emit(&self, pid: &str, action: MediaAction) {
        if let Err(e) = self.events.record_event(MediaEvent::new(pid, action)).await {
            tracing::warn!(error = %e, pid = %pid, "Failed to record provenance event");
        }
    }
}

fn check_expected(
    record: &MediaRecord,
    expected: Option<RecordVersion>,
) -> Result<(), MediaStoreError> {
    if let Some(expected) = expected {
        if expected != record.version() {
            return Err(MediaStoreError::VersionConflict {
                pid: record.pid.clone(),
                expected,
                actual: record.version(),
            });
        }
    }
    Ok(())
}

fn store_err(err: RecordStoreError, pid: &str) -> MediaStoreError {
    match err {
        RecordStoreError::Duplicate => MediaStoreError::DuplicatePid(pid.to_string()),
        RecordStoreError::Missing => MediaStoreError::NotFound(pid.to_string()),
        RecordStoreError::VersionConflict { expected, actual } => MediaStoreError::VersionConflict {
            pid: pid.to_string(),
            expected,
            actual,
        },
        RecordStoreError::Unavailable(msg) => MediaStoreError::StoreUnavailable(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRecordStore;
    use mediastore_core::models::{IdentifierType, StoreConfigCreate, StoreKind};
    use mediastore_core::NoOpProvenanceReporter;
    use std::collections::BTreeMap;

    async fn repository() -> MediaRepository {
        let repo = MediaRepository::new(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(NoOpProvenanceReporter),
            16,
        );
        repo.registry()
            .register_type(IdentifierType::new("doi", Some(r"10\.\d+/.+".to_string())))
            .await
            .unwrap();
        repo.registry()
            .register_type(IdentifierType::new("handle", None))
            .await
            .unwrap();
        repo
    }

    fn create_spec(pid: &str) -> MediaCreate {
        MediaCreate {
            pid: pid.to_string(),
            pid_type: "handle".to_string(),
            store_config: StoreConfigCreate {
                kind: StoreKind::Local,
                bucket: "bucket".to_string(),
                s3_url: None,
            },
            identifiers: BTreeMap::new(),
            metadata: serde_json::json!({}),
            tags: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_create_get_round_trip() {
        let repo = repository().await;
        let created = repo.create(create_spec("p1")).await.unwrap();
        assert_eq!(created.status(), StoreStatus::Pending);
        assert_eq!(created.version(), RecordVersion::initial());

        let fetched = repo.get("p1").await.unwrap();
        assert_eq!(fetched.pid, "p1");
        assert!(fetched.tags.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_pid_leaves_first_unchanged() {
        let repo = repository().await;
        let first = repo.create(create_spec("p1")).await.unwrap();

        let mut second = create_spec("p1");
        second.tags = vec!["other".to_string()];
        let err = repo.create(second).await.unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_PID");

        let fetched = repo.get("p1").await.unwrap();
        assert_eq!(fetched.pk, first.pk);
        assert!(fetched.tags.is_empty());
    }

    #[tokio::test]
    async fn test_pattern_enforcement_on_create() {
        let repo = repository().await;
        let mut spec = create_spec("not-a-doi");
        spec.pid_type = "doi".to_string();
        let err = repo.create(spec).await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PID_FORMAT");
    }

    #[tokio::test]
    async fn test_store_key_update_bumps_version_keeps_status() {
        let repo = repository().await;
        let created = repo.create(create_spec("p1")).await.unwrap();

        let updated = repo
            .update_store_key(
                StoreKeyUpdate {
                    pid: "p1".to_string(),
                    store_key: "media/existing".to_string(),
                },
                None,
            )
            .await
            .unwrap();
        assert!(updated.version() > created.version());
        assert_eq!(updated.status(), StoreStatus::Pending);
        assert_eq!(updated.store_key.as_deref(), Some("media/existing"));
    }

    #[tokio::test]
    async fn test_stale_expected_version_rejected() {
        let repo = repository().await;
        let created = repo.create(create_spec("p1")).await.unwrap();
        let stale = created.version();

        repo.update_store_key(
            StoreKeyUpdate {
                pid: "p1".to_string(),
                store_key: "media/a".to_string(),
            },
            Some(stale),
        )
        .await
        .unwrap();

        let err = repo
            .update_store_key(
                StoreKeyUpdate {
                    pid: "p1".to_string(),
                    store_key: "media/b".to_string(),
                },
                Some(stale),
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VERSION_CONFLICT");

        // Record unchanged by the failed write.
        let fetched = repo.get("p1").await.unwrap();
        assert_eq!(fetched.store_key.as_deref(), Some("media/a"));
    }

    #[tokio::test]
    async fn test_rename_conflict_is_atomic() {
        let repo = repository().await;
        repo.create(create_spec("p1")).await.unwrap();
        repo.create(create_spec("p2")).await.unwrap();

        let err = repo
            .update(
                "p1",
                MediaUpdate {
                    new_pid: Some("p2".to_string()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_PID");

        // No partial rename.
        assert!(repo.get("p1").await.is_ok());
        assert!(repo.get("p2").await.is_ok());
    }

    #[tokio::test]
    async fn test_rename_revalidates_against_type() {
        let repo = repository().await;
        let mut spec = create_spec("10.1/abc");
        spec.pid_type = "doi".to_string();
        repo.create(spec).await.unwrap();

        let err = repo
            .update(
                "10.1/abc",
                MediaUpdate {
                    new_pid: Some("plain-name".to_string()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PID_FORMAT");
        assert!(repo.get("10.1/abc").await.is_ok());
    }

    #[tokio::test]
    async fn test_rename_moves_record() {
        let repo = repository().await;
        repo.create(create_spec("p1")).await.unwrap();

        let renamed = repo
            .update(
                "p1",
                MediaUpdate {
                    new_pid: Some("p9".to_string()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(renamed.pid, "p9");
        assert!(repo.get("p1").await.is_err());
        assert!(repo.get("p9").await.is_ok());
        // Released pid is creatable again.
        repo.create(create_spec("p1")).await.unwrap();
    }

    #[tokio::test]
    async fn test_metadata_patch_modes() {
        let repo = repository().await;
        let mut spec = create_spec("p1");
        spec.metadata = serde_json::json!({"a": 1, "b": 2});
        repo.create(spec).await.unwrap();

        // Named-keys mode: set a, remove b, leave the rest alone.
        let patched = repo
            .update_metadata(
                MetadataUpdate {
                    pid: "p1".to_string(),
                    keys: vec!["a".to_string(), "b".to_string()],
                    data: serde_json::json!({"a": 10}),
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(patched.metadata, serde_json::json!({"a": 10}));

        // No-keys mode: wholesale replacement.
        let replaced = repo
            .update_metadata(
                MetadataUpdate {
                    pid: "p1".to_string(),
                    keys: Vec::new(),
                    data: serde_json::json!({"fresh": true}),
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(replaced.metadata, serde_json::json!({"fresh": true}));
    }

    #[tokio::test]
    async fn test_identifier_merge_is_upsert() {
        let repo = repository().await;
        let mut spec = create_spec("p1");
        spec.identifiers
            .insert("ark".to_string(), "ark:/1/x".to_string());
        repo.create(spec).await.unwrap();

        let mut incoming = BTreeMap::new();
        incoming.insert("ark".to_string(), "ark:/1/y".to_string());
        incoming.insert("urn".to_string(), "urn:z".to_string());
        let updated = repo
            .update_identifiers(
                IdentifierUpdate {
                    pid: "p1".to_string(),
                    identifiers: incoming,
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(updated.identifiers.len(), 2);
        assert_eq!(updated.identifiers["ark"], "ark:/1/y");
    }

    #[tokio::test]
    async fn test_delete_requires_stored_or_failed() {
        let repo = repository().await;
        repo.create(create_spec("p1")).await.unwrap();

        // Pending records cannot be deleted.
        let err = repo.delete("p1").await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        repo.mark_stored("p1", Some("media/k".to_string()))
            .await
            .unwrap();
        repo.delete("p1").await.unwrap();

        // Deleted records are invisible, and the pid stays reserved.
        assert!(matches!(
            repo.get("p1").await,
            Err(MediaStoreError::NotFound(_))
        ));
        let err = repo.create(create_spec("p1")).await.unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_PID");
    }

    #[tokio::test]
    async fn test_search_filters_deleted() {
        let repo = repository().await;
        let mut spec = create_spec("p1");
        spec.tags = vec!["keep".to_string()];
        repo.create(spec).await.unwrap();

        let mut spec = create_spec("p2");
        spec.tags = vec!["keep".to_string()];
        repo.create(spec).await.unwrap();
        repo.mark_stored("p2", Some("media/k".to_string()))
            .await
            .unwrap();
        repo.delete("p2").await.unwrap();

        let found = repo.search(&["keep".to_string()]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pid, "p1");
    }

    #[tokio::test]
    async fn test_upload_lifecycle_marks() {
        let repo = repository().await;
        let created = repo.create(create_spec("p1")).await.unwrap();

        let uploading = repo
            .mark_uploading("p1", "media/k".to_string())
            .await
            .unwrap();
        assert_eq!(uploading.status(), StoreStatus::Uploading);
        assert_eq!(uploading.version(), created.version());

        let stored = repo.mark_stored("p1", None).await.unwrap();
        assert_eq!(stored.status(), StoreStatus::Stored);
        assert!(stored.version() > created.version());
        assert_eq!(stored.store_key.as_deref(), Some("media/k"));

        let failed = repo.mark_failed("p1").await.unwrap();
        assert_eq!(failed.status(), StoreStatus::Failed);
    }
}
