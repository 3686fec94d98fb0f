//! Shared store-key derivation for storage backends.
//!
//! Key format: `media/{record_pk}`. The pk is a UUID, so keys are safe for
//! every backend without escaping and never collide across records.

use uuid::Uuid;

/// Derive the canonical store key for a record.
pub fn record_store_key(record_pk: Uuid) -> String {
    format!("media/{}", record_pk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_pk_scoped() {
        let pk = Uuid::new_v4();
        let key = record_store_key(pk);
        assert!(key.starts_with("media/"));
        assert!(key.contains(&pk.to_string()));
    }
}
