//! Shared test fixtures: an in-memory record store, a local storage
//! backend rooted in a temp directory, and the services wired over them.

use std::sync::Arc;

use mediastore_core::models::{IdentifierType, MediaCreate, StoreConfigCreate, StoreKind};
use mediastore_core::{MediaStoreConfig, NoOpProvenanceReporter};
use mediastore_db::{MediaRepository, MemoryRecordStore};
use mediastore_services::{BulkMutationEngine, TransferService};
use mediastore_storage::{BackendFactory, MemoryCredentialStore};
use tempfile::TempDir;

// Not every test binary touches every field.
#[allow(dead_code)]
pub struct TestHarness {
    // Held so the storage root outlives the test.
    pub temp_dir: TempDir,
    pub settings: MediaStoreConfig,
    pub repository: Arc<MediaRepository>,
    pub transfers: TransferService,
    pub engine: BulkMutationEngine,
}

pub async fn harness() -> TestHarness {
    harness_with(|_| {}).await
}

/// Build a harness, letting the test tweak settings (quota, batch caps, ...)
/// before the services are wired.
pub async fn harness_with(adjust: impl FnOnce(&mut MediaStoreConfig)) -> TestHarness {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

    let mut settings = MediaStoreConfig {
        default_backend: StoreKind::Local,
        local_storage_path: Some(temp_dir.path().to_string_lossy().to_string()),
        ..Default::default()
    };
    adjust(&mut settings);

    let store = Arc::new(MemoryRecordStore::new());
    let repository = Arc::new(MediaRepository::new(
        store,
        Arc::new(NoOpProvenanceReporter),
        settings.lock_shards,
    ));
    repository
        .registry()
        .register_type(IdentifierType::new("doi", Some(r"10\.\d+/.+".to_string())))
        .await
        .expect("Failed to register doi type");
    repository
        .registry()
        .register_type(IdentifierType::new("handle", None))
        .await
        .expect("Failed to register handle type");

    let backends = Arc::new(BackendFactory::new(
        settings.clone(),
        Arc::new(MemoryCredentialStore::new()),
    ));
    let transfers = TransferService::new(repository.clone(), backends, settings.clone());
    let engine = BulkMutationEngine::new(repository.clone(), &settings);

    TestHarness {
        temp_dir,
        settings,
        repository,
        transfers,
        engine,
    }
}

pub fn media_create(pid: &str) -> MediaCreate {
    MediaCreate {
        pid: pid.to_string(),
        pid_type: "handle".to_string(),
        store_config: StoreConfigCreate {
            kind: StoreKind::Local,
            bucket: "bucket".to_string(),
            s3_url: None,
        },
        identifiers: Default::default(),
        metadata: serde_json::json!({}),
        tags: Vec::new(),
    }
}
