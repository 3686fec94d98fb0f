//! Bulk mutation engine.
//!
//! Applies a batch of mutation requests with per-item success/failure
//! reporting: one item's failure never blocks the rest, and every input
//! item produces exactly one outcome. Items are grouped by pid so that
//! duplicates within a batch apply in input order (the second sees the
//! first's effect) while distinct pids run concurrently; the reported
//! order always matches the input order.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use mediastore_core::models::{BulkOutcome, MediaFailure, MutationRequest};
use mediastore_core::{MediaStoreConfig, MediaStoreError};
use mediastore_db::MediaRepository;
use tokio::time::Instant;

pub struct BulkMutationEngine {
    repository: Arc<MediaRepository>,
    max_concurrency: usize,
    max_batch_size: usize,
}

impl BulkMutationEngine {
    pub fn new(repository: Arc<MediaRepository>, settings: &MediaStoreConfig) -> Self {
        BulkMutationEngine {
            repository,
            max_concurrency: settings.bulk_max_concurrency.max(1),
            max_batch_size: settings.bulk_max_batch_size,
        }
    }

    /// Apply a batch. `deadline` bounds processing: items not yet
    /// dispatched when it passes are reported as CANCELLED failures while
    /// finished items keep their outcome. A fatal store error aborts the
    /// whole batch, since no per-record outcome can be trusted.
    pub async fn apply(
        &self,
        requests: Vec<MutationRequest>,
        deadline: Option<Instant>,
    ) -> Result<BulkOutcome, MediaStoreError> {
        if requests.len() > self.max_batch_size {
            return Err(MediaStoreError::Validation(format!(
                "Batch size {} exceeds maximum of {}",
                requests.len(),
                self.max_batch_size
            )));
        }

        let total = requests.len();

        // Group items by pid, preserving input indices. Groups run
        // concurrently; items inside a group run sequentially so the per-pid
        // effects stack in input order.
        let mut groups: Vec<(String, Vec<(usize, MutationRequest)>)> = Vec::new();
        let mut by_pid: HashMap<String, usize> = HashMap::new();
        for (index, request) in requests.into_iter().enumerate() {
            let pid = request.pid().trim().to_string();
            match by_pid.get(&pid) {
                Some(&slot) => groups[slot].1.push((index, request)),
                None => {
                    by_pid.insert(pid.clone(), groups.len());
                    groups.push((pid, vec![(index, request)]));
                }
            }
        }

        let mut slots: Vec<Option<(String, Result<(), MediaStoreError>)>> = Vec::new();
        slots.resize_with(total, || None);

        let repository = &self.repository;
        let mut outcomes = stream::iter(groups)
            .map(|(pid, items)| async move {
                let mut group_outcomes = Vec::with_capacity(items.len());
                for (index, request) in items {
                    if deadline.is_some_and(|d| Instant::now() >= d) {
                        group_outcomes.push((index, pid.clone(), Err(MediaStoreError::Cancelled)));
                        continue;
                    }
                    match repository.apply(&request).await {
                        Ok(_) => group_outcomes.push((index, pid.clone(), Ok(()))),
                        Err(e) if e.is_fatal() => return Err(e),
                        Err(e) => group_outcomes.push((index, pid.clone(), Err(e))),
                    }
                }
                Ok(group_outcomes)
            })
            .buffer_unordered(self.max_concurrency);

        while let Some(group_result) = outcomes.next().await {
            for (index, pid, outcome) in group_result? {
                slots[index] = Some((pid, outcome));
            }
        }

        let mut result = BulkOutcome::default();
        for slot in slots {
            // Every input item lands in exactly one outcome; an empty slot
            // would be an engine bug.
            let (pid, outcome) = slot.ok_or_else(|| {
                MediaStoreError::StoreUnavailable("bulk engine dropped an item outcome".to_string())
            })?;
            match outcome {
                Ok(()) => result.successes.push(pid),
                Err(e) => result.failures.push(MediaFailure {
                    pid,
                    error: e.error_code().to_string(),
                    msg: e.to_string(),
                }),
            }
        }

        tracing::info!(
            total = total,
            successes = result.successes.len(),
            failures = result.failures.len(),
            "Bulk mutation batch completed"
        );

        Ok(result)
    }
}
