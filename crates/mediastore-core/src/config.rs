//! Configuration module
//!
//! Environment-driven configuration for the media store: default storage
//! backend, local/S3 backend settings, transfer negotiation limits, and the
//! bulk engine caps.

use std::env;

use crate::models::store_config::StoreKind;

const DEFAULT_PRESIGN_EXPIRY_SECS: u64 = 15 * 60;
const DEFAULT_MAX_INLINE_BYTES: usize = 8 * 1024 * 1024;
const DEFAULT_BULK_MAX_CONCURRENCY: usize = 8;
const DEFAULT_BULK_MAX_BATCH_SIZE: usize = 50;
const DEFAULT_LOCK_SHARDS: usize = 64;

/// Application configuration for the media store.
#[derive(Clone, Debug)]
pub struct MediaStoreConfig {
    pub environment: String,
    /// Backend used when a create request does not name one explicitly.
    pub default_backend: StoreKind,
    // Local backend configuration
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    /// Per-object byte cap for the local backend. Exceeding it yields a
    /// quota error. `None` disables the check.
    pub local_max_object_bytes: Option<u64>,
    // S3 backend configuration
    pub s3_region: Option<String>,
    // Transfer negotiation
    pub presign_expiry_secs: u64,
    pub max_inline_bytes: usize,
    // Bulk engine
    pub bulk_max_concurrency: usize,
    pub bulk_max_batch_size: usize,
    /// Shard count for the per-pid lock table.
    pub lock_shards: usize,
}

impl MediaStoreConfig {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let default_backend = match env::var("STORAGE_BACKEND") {
            Ok(v) => v.parse::<StoreKind>()?,
            Err(_) => StoreKind::S3,
        };

        Ok(MediaStoreConfig {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            default_backend,
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            local_max_object_bytes: parse_optional("LOCAL_MAX_OBJECT_BYTES")?,
            s3_region: env::var("S3_REGION").ok().or_else(|| env::var("AWS_REGION").ok()),
            presign_expiry_secs: parse_or("PRESIGN_EXPIRY_SECS", DEFAULT_PRESIGN_EXPIRY_SECS)?,
            max_inline_bytes: parse_or("MAX_INLINE_BYTES", DEFAULT_MAX_INLINE_BYTES)?,
            bulk_max_concurrency: parse_or("BULK_MAX_CONCURRENCY", DEFAULT_BULK_MAX_CONCURRENCY)?,
            bulk_max_batch_size: parse_or("BULK_MAX_BATCH_SIZE", DEFAULT_BULK_MAX_BATCH_SIZE)?,
            lock_shards: parse_or("LOCK_SHARDS", DEFAULT_LOCK_SHARDS)?,
        })
    }
}

impl Default for MediaStoreConfig {
    fn default() -> Self {
        MediaStoreConfig {
            environment: "development".to_string(),
            default_backend: StoreKind::S3,
            local_storage_path: None,
            local_storage_base_url: None,
            local_max_object_bytes: None,
            s3_region: None,
            presign_expiry_secs: DEFAULT_PRESIGN_EXPIRY_SECS,
            max_inline_bytes: DEFAULT_MAX_INLINE_BYTES,
            bulk_max_concurrency: DEFAULT_BULK_MAX_CONCURRENCY,
            bulk_max_batch_size: DEFAULT_BULK_MAX_BATCH_SIZE,
            lock_shards: DEFAULT_LOCK_SHARDS,
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, anyhow::Error>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, anyhow::Error>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", key, e)),
        Err(_) => Ok(None),
    }
}
