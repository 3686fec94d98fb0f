//! Domain models shared across mediastore components.

pub mod identifier;
pub mod media;
pub mod mutation;
pub mod store_config;
pub mod transfer;

pub use identifier::IdentifierType;
pub use media::{MediaCreate, MediaRecord, MediaUpdate, StoreStatus};
pub use mutation::{
    BulkOutcome, IdentifierUpdate, MediaFailure, MediaSearch, MetadataUpdate, MutationRequest,
    StoreKeyUpdate, TagUpdate,
};
pub use store_config::{
    S3Config, S3ConfigCreate, S3ConfigSansKeys, StoreConfig, StoreConfigCreate, StoreConfigRef,
    StoreKind,
};
pub use transfer::{DownloadPayload, DownloadRequest, UploadReceipt, UploadRequest};
