//! Media record model and lifecycle state machine.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

use super::store_config::{StoreConfig, StoreConfigCreate, StoreConfigRef};
use crate::error::MediaStoreError;
use crate::version::RecordVersion;

/// Lifecycle state of the bytes behind a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StoreStatus {
    Pending,
    Uploading,
    Stored,
    Failed,
    Deleted,
}

impl StoreStatus {
    /// Legal transitions:
    /// PENDING -> UPLOADING -> STORED (inline uploads skip UPLOADING);
    /// any non-deleted state -> FAILED on backend error;
    /// FAILED -> UPLOADING/STORED on retry;
    /// STORED/FAILED -> DELETED on explicit delete.
    pub fn can_transition(self, next: StoreStatus) -> bool {
        use StoreStatus::*;
        match (self, next) {
            (Pending, Uploading) | (Pending, Stored) => true,
            (Uploading, Stored) => true,
            (Failed, Uploading) | (Failed, Stored) => true,
            (Stored, Deleted) | (Failed, Deleted) => true,
            (current, Failed) => current != Deleted,
            _ => false,
        }
    }
}

impl std::fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StoreStatus::Pending => "PENDING",
            StoreStatus::Uploading => "UPLOADING",
            StoreStatus::Stored => "STORED",
            StoreStatus::Failed => "FAILED",
            StoreStatus::Deleted => "DELETED",
        };
        write!(f, "{}", s)
    }
}

/// A record describing an externally-stored media object.
///
/// `version` and `store_status` are private: the version only moves through
/// [`MediaRecord::bump_version`] and the status only through
/// [`MediaRecord::transition_status`], which enforces the state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    pub pk: Uuid,
    pub pid: String,
    pub pid_type: String,
    version: RecordVersion,
    pub store_config: StoreConfig,
    /// Backend object key; `None` until the first upload negotiation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_key: Option<String>,
    store_status: StoreStatus,
    pub identifiers: BTreeMap<String, String>,
    pub metadata: JsonValue,
    pub tags: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaRecord {
    /// Build a fresh record in PENDING state with the initial version.
    /// Inputs are expected to be normalized already (see `validation`).
    pub fn new(
        pid: String,
        pid_type: String,
        store_config: StoreConfig,
        identifiers: BTreeMap<String, String>,
        metadata: JsonValue,
        tags: BTreeSet<String>,
    ) -> Self {
        let now = Utc::now();
        MediaRecord {
            pk: Uuid::new_v4(),
            pid,
            pid_type,
            version: RecordVersion::initial(),
            store_config,
            store_key: None,
            store_status: StoreStatus::Pending,
            identifiers,
            metadata,
            tags,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn version(&self) -> RecordVersion {
        self.version
    }

    pub fn status(&self) -> StoreStatus {
        self.store_status
    }

    /// Advance the version. Content-affecting mutations only: upload
    /// completion and store-key/store-config substitution.
    pub fn bump_version(&mut self) {
        self.version = self.version.next();
        self.touch();
    }

    /// Apply a lifecycle transition, rejecting anything outside the state
    /// machine.
    pub fn transition_status(&mut self, next: StoreStatus) -> Result<(), MediaStoreError> {
        if !self.store_status.can_transition(next) {
            return Err(MediaStoreError::Validation(format!(
                "illegal store_status transition {} -> {} for pid '{}'",
                self.store_status, next, self.pid
            )));
        }
        self.store_status = next;
        self.touch();
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Create request for a media record.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MediaCreate {
    #[validate(length(min = 1, max = 255, message = "pid must be between 1 and 255 characters"))]
    pub pid: String,
    #[validate(length(
        min = 1,
        max = 64,
        message = "pid_type must be between 1 and 64 characters"
    ))]
    pub pid_type: String,
    #[validate(nested)]
    pub store_config: StoreConfigCreate,
    #[serde(default)]
    pub identifiers: BTreeMap<String, String>,
    #[serde(default = "empty_document")]
    pub metadata: JsonValue,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn empty_document() -> JsonValue {
    JsonValue::Object(serde_json::Map::new())
}

/// Partial update of record identity and backend binding. Every field is
/// optional; at least one must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaUpdate {
    /// Rename: re-registers the pid atomically with the rest of the update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_pid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_config: Option<StoreConfigRef>,
}

impl MediaUpdate {
    pub fn is_empty(&self) -> bool {
        self.new_pid.is_none() && self.pid_type.is_none() && self.store_config.is_none()
    }
}
