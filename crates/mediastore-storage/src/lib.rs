//! Mediastore Storage Library
//!
//! This crate provides the storage backend abstraction and implementations
//! for mediastore: the `StoreBackend` trait, S3-compatible and local
//! filesystem backends, the credential store that resolves `StoreConfig.pk`
//! to S3 credentials, and the factory that builds backends from a record's
//! store config.
//!
//! # Store key format
//!
//! Store keys are derived from the record's surrogate pk: `media/{pk}`.
//! Keys must not contain `..` or a leading `/`. Key derivation is
//! centralized in the `keys` module; store-key substitution may point a
//! record at any existing key that passes the same shape check.

pub mod credentials;
pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use credentials::{CredentialStore, MemoryCredentialStore};
pub use factory::BackendFactory;
pub use keys::record_store_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStore;
pub use mediastore_core::models::StoreKind;
#[cfg(feature = "storage-s3")]
pub use s3::S3Store;
pub use traits::{StorageError, StorageResult, StoreBackend};
