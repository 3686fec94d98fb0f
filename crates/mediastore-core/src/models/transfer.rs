//! Upload/download negotiation payloads.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::media::{MediaCreate, MediaRecord, StoreStatus};

/// Upload request: the record to create plus, for small objects, inline
/// base64 content. Without content the negotiator answers with a presigned
/// PUT URL and the transfer happens out-of-band.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UploadRequest {
    #[validate(nested)]
    pub media: MediaCreate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Negotiation result. `status` is STORED after a completed inline
/// transfer, UPLOADING when the caller must PUT to `presigned_put`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub pid: String,
    pub status: StoreStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presigned_put: Option<String>,
}

/// Download request. `direct` (default true) asks for a presigned GET URL
/// instead of routing bytes through the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub pid: String,
    #[serde(default = "default_direct")]
    pub direct: bool,
}

fn default_direct() -> bool {
    true
}

/// Download result: the record plus either inline base64 content or a
/// presigned GET URL, never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadPayload {
    pub media: MediaRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presigned_get: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_request_defaults_to_direct() {
        let req: DownloadRequest = serde_json::from_value(serde_json::json!({"pid": "p1"})).unwrap();
        assert!(req.direct);
    }

    #[test]
    fn test_upload_receipt_omits_absent_url() {
        let receipt = UploadReceipt {
            pid: "p1".to_string(),
            status: StoreStatus::Stored,
            presigned_put: None,
        };
        let json = serde_json::to_value(&receipt).unwrap();
        assert!(json.get("presigned_put").is_none());
        assert_eq!(json["status"], "STORED");
    }
}
