//! Type aliases for domain concepts.

/// A document ID (plaintext, unique within a vault, immutable once assigned).
pub type DocId = String;

/// A logical document: field name → JSON value.
///
/// This is the pre-encryption shape; everything except `_id` is only ever
/// persisted as ciphertext.
pub type Document = serde_json::Map<String, serde_json::Value>;
