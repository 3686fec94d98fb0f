//! Mediastore service layer
//!
//! Upload/download negotiation over the repository and storage backends,
//! and the bulk mutation engine with per-item failure reporting.

pub mod bulk;
pub mod negotiator;
pub mod telemetry;

pub use bulk::BulkMutationEngine;
pub use negotiator::TransferService;
