//! ID generation utilities.

use ulid::Ulid;
use validator::ValidationError;

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs are:
    /// - Lexicographically sortable
    /// - Monotonically increasing within the same millisecond
    /// - Shorter than UUIDs when represented as strings
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Canonical (lower-case) form of a client-supplied ID.
    #[must_use]
    pub fn normalize(id: &str) -> String {
        id.to_lowercase()
    }

    /// Check that a client-supplied ID has the shape of a generated one.
    #[must_use]
    pub fn is_valid(id: &str) -> bool {
        id.len() == 26 && Ulid::from_string(&id.to_uppercase()).is_ok()
    }
}

/// `validator` hook for ID fields in request bodies.
pub fn validate_id(id: &str) -> Result<(), ValidationError> {
    if IdGenerator::is_valid(id) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_id").with_message("Invalid ID".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ulid() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.generate();
        let id2 = id_gen.generate();

        assert_eq!(id1.len(), 26);
        assert_eq!(id2.len(), 26);
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_generated_ids_are_valid() {
        let id = IdGenerator::new().generate();
        assert!(IdGenerator::is_valid(&id));
        assert!(IdGenerator::is_valid(&id.to_uppercase()));
    }

    #[test]
    fn test_malformed_ids_are_rejected() {
        assert!(!IdGenerator::is_valid(""));
        assert!(!IdGenerator::is_valid("not-an-id"));
        assert!(!IdGenerator::is_valid("507f1f77bcf86cd799439011"));
        // 'u' is outside the Crockford alphabet
        assert!(!IdGenerator::is_valid("01hzzzzzzzzzzzzzzzzzzzzzzu"));
    }

    #[test]
    fn test_normalize_matches_generated_form() {
        let id = IdGenerator::new().generate();
        assert_eq!(IdGenerator::normalize(&id.to_uppercase()), id);
    }

    #[test]
    fn test_validate_id_hook() {
        assert!(validate_id(&IdGenerator::new().generate()).is_ok());
        assert!(validate_id("42").is_err());
    }
}
