//! Input validation helpers
//!
//! Normalization rules shared by the repository and the bulk engine: pids,
//! tags, and identifier keys are trimmed of surrounding whitespace and must
//! be non-empty after trimming; comparisons stay case-sensitive.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value as JsonValue;

use crate::error::MediaStoreError;

pub const MAX_PID_LENGTH: usize = 255;
pub const MAX_TAG_LENGTH: usize = 128;
pub const MAX_IDENTIFIER_KEY_LENGTH: usize = 128;
/// Serialized size cap for a metadata document.
pub const MAX_METADATA_BYTES: usize = 64 * 1024;

/// Trim and validate a pid. Pattern matching against the identifier type
/// happens in the registry; this only enforces shape.
pub fn normalize_pid(pid: &str) -> Result<String, MediaStoreError> {
    let trimmed = pid.trim();
    if trimmed.is_empty() {
        return Err(MediaStoreError::Validation(
            "pid must not be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_PID_LENGTH {
        return Err(MediaStoreError::Validation(format!(
            "pid exceeds maximum length of {} characters",
            MAX_PID_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim and deduplicate a tag list. Empty tags are rejected, not dropped,
/// so a client typo surfaces instead of silently vanishing.
pub fn normalize_tags<I, S>(tags: I) -> Result<BTreeSet<String>, MediaStoreError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = BTreeSet::new();
    for tag in tags {
        let trimmed = tag.as_ref().trim();
        if trimmed.is_empty() {
            return Err(MediaStoreError::Validation(
                "tags must not be empty".to_string(),
            ));
        }
        if trimmed.len() > MAX_TAG_LENGTH {
            return Err(MediaStoreError::Validation(format!(
                "tag '{}' exceeds maximum length of {} characters",
                trimmed, MAX_TAG_LENGTH
            )));
        }
        out.insert(trimmed.to_string());
    }
    Ok(out)
}

/// Trim identifier keys and values; keys must stay non-empty and unique
/// after trimming.
pub fn normalize_identifiers(
    identifiers: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>, MediaStoreError> {
    let mut out = BTreeMap::new();
    for (key, value) in identifiers {
        let key = key.trim();
        if key.is_empty() {
            return Err(MediaStoreError::Validation(
                "identifier keys must not be empty".to_string(),
            ));
        }
        if key.len() > MAX_IDENTIFIER_KEY_LENGTH {
            return Err(MediaStoreError::Validation(format!(
                "identifier key '{}' exceeds maximum length of {} characters",
                key, MAX_IDENTIFIER_KEY_LENGTH
            )));
        }
        if out.insert(key.to_string(), value.trim().to_string()).is_some() {
            return Err(MediaStoreError::Validation(format!(
                "identifier key '{}' appears more than once after trimming",
                key
            )));
        }
    }
    Ok(out)
}

/// Validate a metadata document. Content is opaque; only the serialized
/// size is bounded.
pub fn validate_metadata(metadata: &JsonValue) -> Result<(), MediaStoreError> {
    let size = serde_json::to_vec(metadata)?.len();
    if size > MAX_METADATA_BYTES {
        return Err(MediaStoreError::Validation(format!(
            "metadata document is {} bytes, maximum is {}",
            size, MAX_METADATA_BYTES
        )));
    }
    Ok(())
}

/// Validate a store key: relative, no traversal components.
pub fn validate_store_key(key: &str) -> Result<String, MediaStoreError> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(MediaStoreError::Validation(
            "store key must not be empty".to_string(),
        ));
    }
    if trimmed.starts_with('/') || trimmed.split('/').any(|seg| seg == "..") {
        return Err(MediaStoreError::Validation(format!(
            "store key '{}' must be relative and must not contain '..'",
            trimmed
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pid_trims() {
        assert_eq!(normalize_pid("  10.1234/abc  ").unwrap(), "10.1234/abc");
        assert!(normalize_pid("   ").is_err());
    }

    #[test]
    fn test_normalize_tags_dedups_and_trims() {
        let tags = normalize_tags(["x ", " x", "y"]).unwrap();
        assert_eq!(tags.len(), 2);
        assert!(tags.contains("x"));
        assert!(tags.contains("y"));
    }

    #[test]
    fn test_normalize_tags_rejects_empty() {
        assert!(normalize_tags(["ok", "  "]).is_err());
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        let tags = normalize_tags(["Tag", "tag"]).unwrap();
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_normalize_identifiers_rejects_collisions() {
        let mut ids = BTreeMap::new();
        ids.insert("doi ".to_string(), "a".to_string());
        ids.insert("doi".to_string(), "b".to_string());
        assert!(normalize_identifiers(&ids).is_err());
    }

    #[test]
    fn test_metadata_size_cap() {
        let small = serde_json::json!({"k": "v"});
        assert!(validate_metadata(&small).is_ok());
        let big = JsonValue::String("x".repeat(MAX_METADATA_BYTES + 1));
        assert!(validate_metadata(&big).is_err());
    }

    #[test]
    fn test_store_key_traversal_rejected() {
        assert!(validate_store_key("media/abc").is_ok());
        assert!(validate_store_key("../etc/passwd").is_err());
        assert!(validate_store_key("/abs/path").is_err());
        assert!(validate_store_key("a/../b").is_err());
    }
}
