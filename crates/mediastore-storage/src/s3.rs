use crate::traits::{StorageError, StorageResult, StoreBackend};
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use mediastore_core::models::{S3Config, StoreKind};
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};
use std::time::Duration;

/// S3-compatible storage backend.
///
/// Works against AWS S3 and S3-compatible providers (MinIO, DigitalOcean
/// Spaces, ...) through an explicit endpoint from the resolved credentials.
#[derive(Clone)]
pub struct S3Store {
    store: AmazonS3,
    bucket: String,
}

impl S3Store {
    /// Create a new S3Store instance for one bucket.
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `credentials` - endpoint + key pair resolved from the credential store
    pub fn new(bucket: String, region: String, credentials: &S3Config) -> StorageResult<Self> {
        let allow_http = credentials.url.starts_with("http://");
        let builder = AmazonS3Builder::new()
            .with_region(region)
            .with_bucket_name(bucket.clone())
            .with_endpoint(credentials.url.clone())
            .with_allow_http(allow_http)
            .with_access_key_id(credentials.access_key.clone())
            .with_secret_access_key(credentials.secret_key.clone());

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Store { store, bucket })
    }
}

#[async_trait]
impl StoreBackend for S3Store {
    async fn presign_put(&self, store_key: &str, expires_in: Duration) -> StorageResult<String> {
        let location = Path::from(store_key.to_string());
        let url_result: ObjectResult<_> = self
            .store
            .signed_url(Method::PUT, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| StorageError::BackendError(e.to_string()))?
            .to_string();

        tracing::info!(
            bucket = %self.bucket,
            key = %store_key,
            expires_in_secs = expires_in.as_secs(),
            "S3 presigned PUT issued"
        );

        Ok(url)
    }

    async fn presign_get(&self, store_key: &str, expires_in: Duration) -> StorageResult<String> {
        let location = Path::from(store_key.to_string());
        let url_result: ObjectResult<_> = self
            .store
            .signed_url(Method::GET, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| StorageError::BackendError(e.to_string()))?
            .to_string();

        Ok(url)
    }

    async fn put_inline(&self, store_key: &str, data: Vec<u8>) -> StorageResult<()> {
        let size = data.len() as u64;
        let bytes = Bytes::from(data);
        let location = Path::from(store_key.to_string());

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(bytes)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %store_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 put failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %store_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 put successful"
        );

        Ok(())
    }

    async fn get_inline(&self, store_key: &str) -> StorageResult<Vec<u8>> {
        let start = std::time::Instant::now();
        let location = Path::from(store_key.to_string());

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(store_key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %store_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 get failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::info!(
            bucket = %self.bucket,
            key = %store_key,
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 get successful"
        );

        Ok(bytes.to_vec())
    }

    async fn delete(&self, store_key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let location = Path::from(store_key.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(store_key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %store_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                StorageError::DeleteFailed(other.to_string())
            }
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %store_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    fn supports_presign(&self) -> bool {
        true
    }

    fn backend_kind(&self) -> StoreKind {
        StoreKind::S3
    }
}
