//! Upload/download negotiation.
//!
//! Decides inline vs presigned transfer per request and drives the record
//! lifecycle through the repository. Backend calls are slow network
//! operations, so the per-record lock is only ever held for the metadata
//! transitions inside the repository, never across a presign or transfer.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use mediastore_core::models::{
    DownloadPayload, DownloadRequest, MediaRecord, StoreStatus, UploadReceipt, UploadRequest,
};
use mediastore_core::{MediaStoreConfig, MediaStoreError};
use mediastore_db::MediaRepository;
use mediastore_storage::{record_store_key, BackendFactory};
use validator::Validate;

pub struct TransferService {
    repository: Arc<MediaRepository>,
    backends: Arc<BackendFactory>,
    settings: MediaStoreConfig,
}

impl TransferService {
    pub fn new(
        repository: Arc<MediaRepository>,
        backends: Arc<BackendFactory>,
        settings: MediaStoreConfig,
    ) -> Self {
        TransferService {
            repository,
            backends,
            settings,
        }
    }

    /// Create a record and negotiate its upload. Inline content is stored
    /// immediately; without content the receipt carries a presigned PUT URL
    /// and the record waits in UPLOADING for confirmation.
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadReceipt, MediaStoreError> {
        request.validate()?;
        let record = self.repository.create(request.media).await?;
        self.negotiate(record, request.content).await
    }

    /// Re-negotiate the upload of an existing PENDING or FAILED record.
    pub async fn retry_upload(
        &self,
        pid: &str,
        content: Option<String>,
    ) -> Result<UploadReceipt, MediaStoreError> {
        let record = self.repository.get(pid).await?;
        match record.status() {
            StoreStatus::Pending | StoreStatus::Failed => self.negotiate(record, content).await,
            StoreStatus::Uploading => Err(MediaStoreError::Validation(format!(
                "upload of '{}' is already in progress",
                record.pid
            ))),
            other => Err(MediaStoreError::Validation(format!(
                "record '{}' is {} and cannot be uploaded again",
                record.pid, other
            ))),
        }
    }

    /// Confirmation that an out-of-band presigned upload finished
    /// (driven by an external trigger such as a webhook).
    pub async fn confirm_upload(&self, pid: &str) -> Result<MediaRecord, MediaStoreError> {
        let record = self.repository.get(pid).await?;
        if record.status() != StoreStatus::Uploading {
            return Err(MediaStoreError::Validation(format!(
                "record '{}' is {}, confirmation requires UPLOADING",
                record.pid,
                record.status()
            )));
        }
        self.repository.mark_stored(&record.pid, None).await
    }

    /// Download negotiation. Only STORED records are downloadable; with
    /// `direct` and a presign-capable backend the payload carries a URL
    /// instead of bytes.
    pub async fn download(
        &self,
        request: DownloadRequest,
    ) -> Result<DownloadPayload, MediaStoreError> {
        let record = self.repository.get(&request.pid).await?;
        if record.status() != StoreStatus::Stored {
            return Err(MediaStoreError::NotReady(format!(
                "record '{}' is {}, download requires STORED",
                record.pid,
                record.status()
            )));
        }
        let store_key = record.store_key.clone().ok_or_else(|| {
            MediaStoreError::NotReady(format!("record '{}' has no store key", record.pid))
        })?;

        let backend = self.backends.backend_for(&record.store_config).await?;

        if request.direct && backend.supports_presign() {
            let url = backend
                .presign_get(&store_key, self.presign_expiry())
                .await?;
            return Ok(DownloadPayload {
                media: record,
                content: None,
                presigned_get: Some(url),
            });
        }

        let bytes = backend.get_inline(&store_key).await?;
        Ok(DownloadPayload {
            media: record,
            content: Some(BASE64.encode(bytes)),
            presigned_get: None,
        })
    }

    /// Delete a record and, best-effort, the bytes behind it. The logical
    /// delete is the source of truth; a failed backend delete is logged and
    /// left to the retention sweep.
    pub async fn delete(&self, pid: &str) -> Result<MediaRecord, MediaStoreError> {
        let record = self.repository.delete(pid).await?;

        if let Some(store_key) = &record.store_key {
            match self.backends.backend_for(&record.store_config).await {
                Ok(backend) => {
                    if let Err(e) = backend.delete(store_key).await {
                        tracing::warn!(
                            error = %e,
                            pid = %record.pid,
                            key = %store_key,
                            "Failed to delete backend object for deleted record"
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        pid = %record.pid,
                        "No backend available to delete object for deleted record"
                    );
                }
            }
        }
        Ok(record)
    }

    async fn negotiate(
        &self,
        record: MediaRecord,
        content: Option<String>,
    ) -> Result<UploadReceipt, MediaStoreError> {
        let store_key = record
            .store_key
            .clone()
            .unwrap_or_else(|| record_store_key(record.pk));
        let backend = self.backends.backend_for(&record.store_config).await?;

        match content {
            Some(encoded) => {
                let bytes = BASE64.decode(encoded.as_bytes()).map_err(|e| {
                    MediaStoreError::Validation(format!("Invalid base64 content: {}", e))
                })?;
                if bytes.len() > self.settings.max_inline_bytes {
                    return Err(MediaStoreError::Validation(format!(
                        "Inline content of {} bytes exceeds the {} byte limit; request a presigned upload instead",
                        bytes.len(),
                        self.settings.max_inline_bytes
                    )));
                }

                if let Err(e) = backend.put_inline(&store_key, bytes).await {
                    // Backend error: the record moves to FAILED but stays
                    // addressable for retry; the caller gets the typed error.
                    self.fail_quietly(&record.pid).await;
                    return Err(e.into());
                }

                let stored = self
                    .repository
                    .mark_stored(&record.pid, Some(store_key))
                    .await?;
                Ok(UploadReceipt {
                    status: stored.status(),
                    pid: stored.pid,
                    presigned_put: None,
                })
            }
            None => {
                if !backend.supports_presign() {
                    return Err(MediaStoreError::Validation(format!(
                        "Presigned uploads are not available for the '{}' backend; send inline content instead",
                        backend.backend_kind()
                    )));
                }
                // Presign before taking any record lock; the URL grant is
                // the slow network call.
                let url = match backend.presign_put(&store_key, self.presign_expiry()).await {
                    Ok(url) => url,
                    Err(e) => {
                        self.fail_quietly(&record.pid).await;
                        return Err(e.into());
                    }
                };

                let uploading = self.repository.mark_uploading(&record.pid, store_key).await?;
                Ok(UploadReceipt {
                    status: uploading.status(),
                    pid: uploading.pid,
                    presigned_put: Some(url),
                })
            }
        }
    }

    async fn fail_quietly(&self, pid: &str) {
        if let Err(e) = self.repository.mark_failed(pid).await {
            tracing::error!(error = %e, pid = %pid, "Failed to mark record as FAILED");
        }
    }

    fn presign_expiry(&self) -> Duration {
        Duration::from_secs(self.settings.presign_expiry_secs)
    }
}
