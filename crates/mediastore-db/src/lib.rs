//! Mediastore persistence layer
//!
//! This crate provides the `RecordStore` collaborator trait (durable
//! storage with a pid uniqueness constraint and version compare-and-swap),
//! an in-memory reference implementation, the identifier registry, the
//! per-pid lock table, and the `MediaRepository` that ties them together.

pub mod locks;
pub mod memory;
pub mod registry;
pub mod repository;
pub mod store;

pub use locks::LockTable;
pub use memory::MemoryRecordStore;
pub use registry::IdentifierRegistry;
pub use repository::MediaRepository;
pub use store::{RecordStore, RecordStoreError, RecordStoreResult};
