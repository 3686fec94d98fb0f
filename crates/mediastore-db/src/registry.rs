//! Identifier registry: pid-type patterns and format validation.
//!
//! Reservation and uniqueness live in the record store's unique insert;
//! this component owns the `IdentifierType` table and the anchored pattern
//! matching in front of it.

use std::sync::Arc;

use dashmap::DashMap;
use mediastore_core::models::IdentifierType;
use mediastore_core::{validation, MediaStoreError};
use regex::Regex;
use validator::Validate;

use crate::store::{RecordStore, RecordStoreError};

pub struct IdentifierRegistry {
    store: Arc<dyn RecordStore>,
    /// Compiled patterns, keyed by pattern source.
    patterns: DashMap<String, Regex>,
}

impl IdentifierRegistry {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        IdentifierRegistry {
            store,
            patterns: DashMap::new(),
        }
    }

    /// Register (or replace) an identifier type. The pattern must compile.
    pub async fn register_type(&self, ty: IdentifierType) -> Result<(), MediaStoreError> {
        ty.validate()?;
        if let Some(pattern) = &ty.pattern {
            self.compiled(pattern)?;
        }
        self.store
            .put_identifier_type(ty)
            .await
            .map_err(store_fault)
    }

    pub async fn get_type(&self, name: &str) -> Result<Option<IdentifierType>, MediaStoreError> {
        self.store
            .fetch_identifier_type(name)
            .await
            .map_err(store_fault)
    }

    /// Validate a pid against its declared type. With a pattern the pid
    /// must fully match it; without one any non-empty trimmed pid passes.
    /// Returns the normalized pid.
    pub async fn validate(&self, pid: &str, pid_type: &str) -> Result<String, MediaStoreError> {
        let pid = validation::normalize_pid(pid)?;

        let ty = self
            .get_type(pid_type)
            .await?
            .ok_or_else(|| {
                MediaStoreError::Validation(format!("Unknown identifier type '{}'", pid_type))
            })?;

        if let Some(pattern) = &ty.pattern {
            let regex = self.compiled(pattern)?;
            if !regex.is_match(&pid) {
                return Err(MediaStoreError::InvalidPidFormat {
                    pid,
                    pattern: pattern.clone(),
                });
            }
        }
        Ok(pid)
    }

    fn compiled(&self, pattern: &str) -> Result<Regex, MediaStoreError> {
        if let Some(regex) = self.patterns.get(pattern) {
            return Ok(regex.value().clone());
        }
        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
            MediaStoreError::Validation(format!("Invalid identifier pattern '{}': {}", pattern, e))
        })?;
        self.patterns.insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }
}

fn store_fault(err: RecordStoreError) -> MediaStoreError {
    MediaStoreError::StoreUnavailable(err.to_string())
}
