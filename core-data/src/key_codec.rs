//! Storage key encoding
//!
//! `_` is reserved as the delimiter inside composite storage keys, so every
//! occurrence in a model key or id is replaced by [`ESCAPE`] before the key
//! reaches a store. Encoding is one-way; stored keys are never decoded.
//!
//! Raw keys and ids must not already contain [`ESCAPE`]; under that
//! precondition distinct inputs always encode to distinct outputs.

use bridge_traits::StorageKey;

/// Reserved delimiter character.
pub const DELIMITER: char = '_';

/// Replacement written for every [`DELIMITER`].
pub const ESCAPE: &str = "##-##";

/// Encode a model key or id for use in a composite storage key.
pub fn encode(raw: &str) -> String {
    raw.replace(DELIMITER, ESCAPE)
}

/// Encoded persistent-store address for a model key and optional id.
///
/// An empty id addresses the namespace entry, same as no id.
pub fn storage_key(model_key: &str, id: Option<&str>) -> StorageKey {
    StorageKey::new(encode(model_key), id.map(encode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_replaces_every_delimiter() {
        assert_eq!(encode("a_b_c"), "a##-##b##-##c");
        assert_eq!(encode("__"), "##-####-##");
    }

    #[test]
    fn test_encode_leaves_plain_input_alone() {
        assert_eq!(encode("LESSON"), "LESSON");
        assert_eq!(encode(""), "");
        assert_eq!(encode("2018-1?lang=eng"), "2018-1?lang=eng");
    }

    #[test]
    fn test_encode_is_injective_on_delimiter_free_escapes() {
        let inputs = ["a_b", "a-b", "ab", "a__b", "a_", "_a", "a"];
        let mut encoded: Vec<String> = inputs.iter().map(|s| encode(s)).collect();
        encoded.sort();
        encoded.dedup();
        assert_eq!(encoded.len(), inputs.len());
    }

    #[test]
    fn test_storage_key_encodes_both_parts() {
        let key = storage_key("MY_MODEL", Some("id_1"));
        assert_eq!(key.key, "MY##-##MODEL");
        assert_eq!(key.id.as_deref(), Some("id##-##1"));
    }

    #[test]
    fn test_storage_key_empty_id_is_namespace() {
        assert_eq!(storage_key("BOOK", Some("")), StorageKey::namespace("BOOK"));
        assert_eq!(storage_key("BOOK", None), StorageKey::namespace("BOOK"));
    }
}
