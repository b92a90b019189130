//! Constants used throughout coffer.
//!
//! Centralizes magic strings and configuration values.

/// Vault file format version written into the `_meta` block.
pub const VAULT_VERSION: &str = "1.0.0";

/// Plaintext document ID field, stored outside the ciphertext.
pub const ID_FIELD: &str = "_id";

/// Field holding the base64 ciphertext inside a stored record.
pub const DATA_FIELD: &str = "data";

/// Default PBKDF2-HMAC-SHA256 iteration count (OWASP 2023 figure).
pub const DEFAULT_ITERATIONS: u32 = 600_000;

/// Extension appended to key-export side files.
pub const KEY_EXPORT_EXT: &str = "cofferkey";

/// Extension appended to audit-log side files.
pub const AUDIT_LOG_EXT: &str = "cofferlog";
