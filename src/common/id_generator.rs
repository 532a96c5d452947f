// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXX (e.g., C_K7NP3X for categories)
//!
//! Benefits:
//! - No ambiguous characters (excludes I, L, O, U)
//! - Case-insensitive
//! - ~1 billion combinations per entity type (32^6)
//! - Easy to read, type, and communicate verbally

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User (U_)
    User,
    /// Category (C_)
    Category,
    /// Item (T_) - T for Thing, I is excluded from the alphabet
    Item,
    /// Session (S_)
    Session,
}

impl EntityPrefix {
    /// Get the string prefix for this entity type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Category => "C",
            EntityPrefix::Item => "T",
            EntityPrefix::Session => "S",
        }
    }
}

/// Generate a random Crockford Base32 string of specified length
fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID using Crockford Base32 encoding
///
/// Returns a string in format "PREFIX_XXXXXX" (e.g., "C_K7NP3X")
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(6))
}

/// Generate a raw Crockford Base32 string without prefix
/// Used for anti-forgery state tokens and other non-entity identifiers
pub fn generate_raw_id(length: usize) -> String {
    generate_crockford_string(length)
}

// ============================================================================
// Convenience functions for each entity type
// ============================================================================

/// Generate a User ID (U_XXXXXX)
pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

/// Generate a Category ID (C_XXXXXX)
pub fn generate_category_id() -> String {
    generate_id(EntityPrefix::Category)
}

/// Generate an Item ID (T_XXXXXX)
pub fn generate_item_id() -> String {
    generate_id(EntityPrefix::Item)
}

/// Generate a Session ID (S_XXXXXX)
pub fn generate_session_id() -> String {
    generate_id(EntityPrefix::Session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_id_format() {
        let category_id = generate_category_id();
        assert!(category_id.starts_with("C_"));
        assert_eq!(category_id.len(), 8); // "C_" + 6 chars

        let item_id = generate_item_id();
        assert!(item_id.starts_with("T_"));
        assert_eq!(item_id.len(), 8);
    }

    #[test]
    fn test_crockford_alphabet_only() {
        let id = generate_category_id();
        let random_part = &id[2..]; // Skip "C_"

        for c in random_part.chars() {
            assert!(
                CROCKFORD_ALPHABET.contains(&(c as u8)),
                "Character '{}' not in Crockford alphabet",
                c
            );
        }

        // Verify no ambiguous characters
        assert!(!random_part.contains('I'));
        assert!(!random_part.contains('L'));
        assert!(!random_part.contains('O'));
        assert!(!random_part.contains('U'));
    }

    #[test]
    fn test_uniqueness() {
        let mut ids = HashSet::new();
        for _ in 0..1000 {
            let id = generate_session_id();
            assert!(ids.insert(id), "Duplicate ID generated");
        }
    }

    #[test]
    fn test_all_prefixes() {
        assert!(generate_user_id().starts_with("U_"));
        assert!(generate_category_id().starts_with("C_"));
        assert!(generate_item_id().starts_with("T_"));
        assert!(generate_session_id().starts_with("S_"));
    }

    #[test]
    fn test_raw_id() {
        let raw = generate_raw_id(32);
        assert_eq!(raw.len(), 32);
        assert!(!raw.contains('_')); // No prefix separator
    }
}
