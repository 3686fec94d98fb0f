//! Backend construction from a record's store config.

#[cfg(feature = "storage-local")]
use crate::LocalStore;
#[cfg(feature = "storage-s3")]
use crate::S3Store;
use crate::{CredentialStore, StorageError, StorageResult, StoreBackend, StoreKind};
use dashmap::DashMap;
use mediastore_core::models::StoreConfig;
use mediastore_core::MediaStoreConfig;
use std::sync::Arc;
use uuid::Uuid;

/// Builds and caches storage backends keyed by `StoreConfig.pk`.
///
/// Backend construction involves credential resolution and client setup, so
/// instances are cached; a config pk always maps to the same target.
pub struct BackendFactory {
    settings: MediaStoreConfig,
    credentials: Arc<dyn CredentialStore>,
    cache: DashMap<Uuid, Arc<dyn StoreBackend>>,
}

impl BackendFactory {
    pub fn new(settings: MediaStoreConfig, credentials: Arc<dyn CredentialStore>) -> Self {
        BackendFactory {
            settings,
            credentials,
            cache: DashMap::new(),
        }
    }

    /// Resolve the backend for a record's store config, building it on
    /// first use.
    pub async fn backend_for(&self, config: &StoreConfig) -> StorageResult<Arc<dyn StoreBackend>> {
        if let Some(backend) = self.cache.get(&config.pk) {
            return Ok(backend.value().clone());
        }

        let backend = self.build(config).await?;
        self.cache.insert(config.pk, backend.clone());
        Ok(backend)
    }

    async fn build(&self, config: &StoreConfig) -> StorageResult<Arc<dyn StoreBackend>> {
        match config.kind {
            #[cfg(feature = "storage-s3")]
            StoreKind::S3 => {
                let region = self
                    .settings
                    .s3_region
                    .clone()
                    .unwrap_or_else(|| "us-east-1".to_string());

                let mut credentials =
                    self.credentials.resolve(config.pk).await.ok_or_else(|| {
                        StorageError::ConfigError(format!(
                            "No credentials registered for store config {}",
                            config.pk
                        ))
                    })?;
                // An explicit endpoint on the config wins over the stored one.
                if let Some(url) = &config.s3_url {
                    credentials.url = url.clone();
                }

                let store = S3Store::new(config.bucket.clone(), region, &credentials)?;
                Ok(Arc::new(store))
            }

            #[cfg(not(feature = "storage-s3"))]
            StoreKind::S3 => Err(StorageError::ConfigError(
                "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
            )),

            #[cfg(feature = "storage-local")]
            StoreKind::Local => {
                let base_path = self
                    .settings
                    .local_storage_path
                    .clone()
                    .ok_or_else(|| {
                        StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
                    })?;
                // Buckets map to subdirectories of the storage root.
                let path = std::path::Path::new(&base_path).join(&config.bucket);

                let store = LocalStore::new(path, self.settings.local_max_object_bytes).await?;
                Ok(Arc::new(store))
            }

            #[cfg(not(feature = "storage-local"))]
            StoreKind::Local => Err(StorageError::ConfigError(
                "Local storage backend not available (storage-local feature not enabled)"
                    .to_string(),
            )),
        }
    }
}
