//! Coffer - a single-file, passphrase-protected document store.
//!
//! Every document is encrypted before being written and decrypted only on
//! read. No server, no index, no network component.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line inspector
//! │   ├── inspect       # Read metadata and IDs, never decrypts
//! │   └── output        # Terminal output helpers
//! └── core/             # Core library components
//!     ├── store         # Plain JSON storage, atomic replace-on-write
//!     ├── crypto        # PBKDF2 key derivation + AES-256-GCM
//!     ├── encrypted     # Transparent encryption over the plain store
//!     ├── vault         # Facade: open/insert/get/find/update/delete/export
//!     └── audit         # Append-only operation log
//! ```
//!
//! # Features
//!
//! - AES-256-GCM authenticated encryption per document
//! - PBKDF2-HMAC-SHA256 key derivation from a passphrase and per-vault salt
//! - Crash-safe single-file persistence via atomic replace
//! - Cryptographic isolation between vaults sharing a passphrase
//! - Optional append-only audit log
//!
//! # Example
//!
//! ```no_run
//! use coffer::{Vault, VaultOptions};
//! use serde_json::json;
//!
//! # fn main() -> coffer::Result<()> {
//! let mut vault = Vault::open("notes.coffer", "passphrase", VaultOptions::default())?;
//! let id = vault.insert(json!({"title": "first", "body": "hello"}))?;
//! let doc = vault.get(&id)?;
//! let drafts = vault.find(&json!({"title": "first"}))?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod error;

pub use crate::core::audit::{AuditEntry, AuditLog, Operation, Outcome};
pub use crate::core::encrypted::{ListPolicy, Listing};
pub use crate::core::store::{Meta, Store};
pub use crate::core::types::{DocId, Document};
pub use crate::core::vault::{KeyExport, Vault, VaultOptions};
pub use crate::error::{CryptoError, DocumentError, Error, Result, StorageError};
