//! Partial-mutation requests and the bulk response shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::media::MediaUpdate;

/// Replace a record's tag set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagUpdate {
    pub pid: String,
    pub tags: Vec<String>,
}

/// Re-point a record at existing backend bytes without re-uploading.
/// Bumps the version; leaves `store_status` untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreKeyUpdate {
    pub pid: String,
    pub store_key: String,
}

/// Key-wise upsert into a record's secondary identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifierUpdate {
    pub pid: String,
    pub identifiers: BTreeMap<String, String>,
}

/// Dual-mode metadata patch: with `keys`, each named key is copied from
/// `data` (and removed when `data` lacks it); without `keys`, the whole
/// document is replaced by `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataUpdate {
    pub pid: String,
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub data: JsonValue,
}

/// One item of a bulk mutation batch. Every variant addresses a single pid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MutationRequest {
    Tags(TagUpdate),
    StoreKey(StoreKeyUpdate),
    Identifiers(IdentifierUpdate),
    Metadata(MetadataUpdate),
    Record {
        pid: String,
        #[serde(flatten)]
        update: MediaUpdate,
    },
}

impl MutationRequest {
    pub fn pid(&self) -> &str {
        match self {
            MutationRequest::Tags(u) => &u.pid,
            MutationRequest::StoreKey(u) => &u.pid,
            MutationRequest::Identifiers(u) => &u.pid,
            MutationRequest::Metadata(u) => &u.pid,
            MutationRequest::Record { pid, .. } => pid,
        }
    }
}

/// One failed bulk item: pid, machine-readable code, human message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFailure {
    pub pid: String,
    pub error: String,
    pub msg: String,
}

/// Aggregate bulk result. Both lists preserve batch input order; every
/// input item lands in exactly one of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub successes: Vec<String>,
    pub failures: Vec<MediaFailure>,
}

/// Exact-match tag search, delegated to the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaSearch {
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_request_tagging() {
        let req: MutationRequest = serde_json::from_value(serde_json::json!({
            "op": "tags", "pid": "p1", "tags": ["x"]
        }))
        .unwrap();
        assert_eq!(req.pid(), "p1");
        assert!(matches!(req, MutationRequest::Tags(_)));
    }

    #[test]
    fn test_record_update_flattens() {
        let req: MutationRequest = serde_json::from_value(serde_json::json!({
            "op": "record", "pid": "p1", "new_pid": "p2"
        }))
        .unwrap();
        match req {
            MutationRequest::Record { pid, update } => {
                assert_eq!(pid, "p1");
                assert_eq!(update.new_pid.as_deref(), Some("p2"));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_metadata_update_defaults() {
        let update: MetadataUpdate =
            serde_json::from_value(serde_json::json!({"pid": "p1"})).unwrap();
        assert!(update.keys.is_empty());
        assert!(update.data.is_null());
    }
}
