//! Backend credential store.
//!
//! Resolves a `StoreConfig.pk` to concrete S3 credentials. Secrets stay
//! inside the storage layer; callers outside it only ever see the
//! sans-keys view.

use async_trait::async_trait;
use dashmap::DashMap;
use mediastore_core::models::{S3Config, S3ConfigCreate, S3ConfigSansKeys};
use uuid::Uuid;

/// Credential resolution for S3-style backends.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Resolve the credentials registered for a store config.
    async fn resolve(&self, config_pk: Uuid) -> Option<S3Config>;

    /// Register credentials under a store config pk, replacing any previous
    /// entry. Returns the credential-free view.
    async fn register(&self, config_pk: Uuid, create: S3ConfigCreate) -> S3ConfigSansKeys;

    /// Credential-free view of a registered entry.
    async fn sans_keys(&self, config_pk: Uuid) -> Option<S3ConfigSansKeys>;
}

/// In-memory credential store.
#[derive(Default)]
pub struct MemoryCredentialStore {
    configs: DashMap<Uuid, S3Config>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn resolve(&self, config_pk: Uuid) -> Option<S3Config> {
        self.configs.get(&config_pk).map(|c| c.value().clone())
    }

    async fn register(&self, config_pk: Uuid, create: S3ConfigCreate) -> S3ConfigSansKeys {
        let config = S3Config {
            pk: config_pk,
            url: create.url,
            access_key: create.access_key,
            secret_key: create.secret_key,
        };
        let view = config.sans_keys();
        self.configs.insert(config_pk, config);
        view
    }

    async fn sans_keys(&self, config_pk: Uuid) -> Option<S3ConfigSansKeys> {
        self.configs.get(&config_pk).map(|c| c.value().sans_keys())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_resolve() {
        let store = MemoryCredentialStore::new();
        let pk = Uuid::new_v4();
        let view = store
            .register(
                pk,
                S3ConfigCreate {
                    url: "http://localhost:9000".to_string(),
                    access_key: "ak".to_string(),
                    secret_key: "sk".to_string(),
                },
            )
            .await;
        assert_eq!(view.pk, pk);

        let resolved = store.resolve(pk).await.unwrap();
        assert_eq!(resolved.access_key, "ak");

        let sans = store.sans_keys(pk).await.unwrap();
        assert_eq!(sans.url, "http://localhost:9000");
    }

    #[tokio::test]
    async fn test_resolve_unknown_is_none() {
        let store = MemoryCredentialStore::new();
        assert!(store.resolve(Uuid::new_v4()).await.is_none());
    }
}
