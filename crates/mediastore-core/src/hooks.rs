//! Hooks and traits for collaborator integration
//!
//! This module provides trait interfaces that let the core notify external
//! systems of record mutations without depending on them. The provenance
//! subsystem implements these traits to build its lineage graph; the core
//! only emits events.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Action recorded in a provenance event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaAction {
    Created,
    Updated,
    Renamed,
    Stored,
    Deleted,
}

/// Event emitted after a committed record mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaEvent {
    pub pid: String,
    pub action: MediaAction,
    pub timestamp: DateTime<Utc>,
}

impl MediaEvent {
    pub fn new(pid: impl Into<String>, action: MediaAction) -> Self {
        MediaEvent {
            pid: pid.into(),
            action,
            timestamp: Utc::now(),
        }
    }
}

/// Trait for forwarding mutation events to the provenance collaborator.
///
/// Event delivery is best-effort: a failed delivery never rolls back the
/// mutation that produced it. Implementations must tolerate replays.
#[async_trait]
pub trait ProvenanceReporter: Send + Sync {
    async fn record_event(&self, event: MediaEvent) -> Result<(), String>;
}

/// No-op implementation for when provenance recording is disabled
pub struct NoOpProvenanceReporter;

#[async_trait]
impl ProvenanceReporter for NoOpProvenanceReporter {
    async fn record_event(&self, _event: MediaEvent) -> Result<(), String> {
        Ok(())
    }
}
