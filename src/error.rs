//! Error types.
//!
//! Grouped by failure domain: storage (file I/O and format), document
//! (caller-supplied shapes and ID collisions), and crypto (key derivation
//! and authenticated encryption). A missing document is never an error;
//! operations report expected absence through their return values.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for all vault operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Vault file unreadable, unparseable, or unwritable.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read vault file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("vault file is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("vault file is not in a supported format")]
    UnsupportedFormat,

    #[error("failed to serialize vault state: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("atomic write failed: {0}")]
    AtomicWrite(#[source] std::io::Error),

    #[error("audit log entry is not valid JSON: {0}")]
    AuditParse(#[source] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A document, update, or filter argument has the wrong shape, or an
/// insert collides with an existing ID.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("{what} must be a JSON object")]
    Invalid { what: &'static str },

    #[error("document with _id '{0}' already exists")]
    DuplicateId(String),
}

/// Key derivation or authenticated encryption/decryption failure.
///
/// Never produced for a missing document; a `CryptoError` on read means
/// the record exists but cannot be trusted (wrong key, tampered or
/// corrupted ciphertext, malformed encoding).
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("salt must be at least {min} bytes, got {got}")]
    SaltTooShort { min: usize, got: usize },

    #[error("iteration count must be non-zero")]
    ZeroIterations,

    #[error("random source unavailable")]
    Random,

    #[error("encryption failed: {reason}")]
    Encrypt { reason: String },

    #[error("decryption failed: {reason}")]
    Decrypt { reason: String },

    #[error("ciphertext encoding is malformed: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("cannot decrypt document '{doc_id}': {source}")]
    Document {
        doc_id: String,
        source: Box<CryptoError>,
    },
}

impl CryptoError {
    /// Attach the ID of the document whose record failed to decrypt.
    pub(crate) fn for_document(self, doc_id: &str) -> Self {
        CryptoError::Document {
            doc_id: doc_id.to_string(),
            source: Box::new(self),
        }
    }
}
