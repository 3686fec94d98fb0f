//! Storage backend binding models.
//!
//! A `StoreConfig` binds a record to a backend target (kind + bucket).
//! S3-style backends additionally reference an `S3Config` carrying
//! credentials, resolved through the credential store and never echoed back
//! to callers: read responses only ever see the sans-keys view.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Storage backend kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    S3,
    Local,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StoreKind::S3),
            "local" => Ok(StoreKind::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StoreKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StoreKind::S3 => write!(f, "s3"),
            StoreKind::Local => write!(f, "local"),
        }
    }
}

/// Request body for binding a record to a backend target.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StoreConfigCreate {
    #[serde(rename = "type")]
    pub kind: StoreKind,
    #[validate(length(min = 1, max = 255, message = "Bucket must be between 1 and 255 characters"))]
    pub bucket: String,
    /// Endpoint override for S3-compatible providers; `None` falls back to
    /// the credential store entry for this config.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_url: Option<String>,
}

/// A registered backend target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub pk: Uuid,
    #[serde(rename = "type")]
    pub kind: StoreKind,
    pub bucket: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_url: Option<String>,
}

impl StoreConfig {
    pub fn from_create(create: StoreConfigCreate) -> Self {
        StoreConfig {
            pk: Uuid::new_v4(),
            kind: create.kind,
            bucket: create.bucket,
            s3_url: create.s3_url,
        }
    }
}

/// Store config in an update request: either a reference to a registered
/// config or an inline definition registered on the fly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoreConfigRef {
    Existing(Uuid),
    Inline(StoreConfigCreate),
}

/// Request body for registering S3 credentials.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct S3ConfigCreate {
    #[validate(length(min = 1, message = "URL must not be empty"))]
    pub url: String,
    #[validate(length(min = 1, message = "Access key must not be empty"))]
    pub access_key: String,
    #[validate(length(min = 1, message = "Secret key must not be empty"))]
    pub secret_key: String,
}

/// Registered S3 credentials. Never serialized into read responses; use
/// [`S3Config::sans_keys`] for anything caller-facing.
#[derive(Clone, Serialize, Deserialize)]
pub struct S3Config {
    pub pk: Uuid,
    pub url: String,
    pub access_key: String,
    pub secret_key: String,
}

impl S3Config {
    pub fn from_create(create: S3ConfigCreate) -> Self {
        S3Config {
            pk: Uuid::new_v4(),
            url: create.url,
            access_key: create.access_key,
            secret_key: create.secret_key,
        }
    }

    /// Credential-free view for read responses.
    pub fn sans_keys(&self) -> S3ConfigSansKeys {
        S3ConfigSansKeys {
            pk: self.pk,
            url: self.url.clone(),
        }
    }
}

// Manual Debug so credentials never reach logs.
impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("S3Config")
            .field("pk", &self.pk)
            .field("url", &self.url)
            .field("access_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Read view of S3 credentials: pk + endpoint only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3ConfigSansKeys {
    pub pk: Uuid,
    pub url: String,
}
