//! Identifier type definitions.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A persistent-identifier scheme: a name and an optional validation
/// pattern. When the pattern is non-empty, pids of this type must fully
/// match it (the registry anchors the pattern before matching).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct IdentifierType {
    #[validate(length(min = 1, max = 64, message = "Name must be between 1 and 64 characters"))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl IdentifierType {
    pub fn new(name: impl Into<String>, pattern: Option<String>) -> Self {
        IdentifierType {
            name: name.into(),
            // An empty pattern means "no constraint", same as absent.
            pattern: pattern.filter(|p| !p.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pattern_is_none() {
        let ty = IdentifierType::new("doi", Some(String::new()));
        assert!(ty.pattern.is_none());
        let ty = IdentifierType::new("doi", Some(r"^10\.\d+/.+$".to_string()));
        assert!(ty.pattern.is_some());
    }
}
