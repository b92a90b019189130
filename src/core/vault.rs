//! Vault.
//!
//! The primary interface for all coffer operations. Composes key
//! derivation and the encrypted store behind an
//! open/insert/get/find/update/delete/export surface, and owns the audit
//! hook points.
//!
//! Invariants live in the layers below; this is the lifecycle and
//! ergonomics layer other code relies on.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::audit::{AuditEntry, AuditLog, Operation, Outcome};
use crate::core::constants::{AUDIT_LOG_EXT, DEFAULT_ITERATIONS, KEY_EXPORT_EXT};
use crate::core::crypto::{self, VaultKey, SALT_LEN};
use crate::core::encrypted::{EncryptedStore, ListPolicy, Listing};
use crate::core::store::{Meta, Store};
use crate::core::types::{DocId, Document};
use crate::error::{Result, StorageError};

/// Options recognized by [`Vault::open`].
#[derive(Debug, Clone)]
pub struct VaultOptions {
    /// Append an audit entry for every facade operation. The log lives
    /// in a side file next to the vault. Default off.
    pub audit: bool,
    /// PBKDF2 iteration count override.
    pub iterations: u32,
    /// Application tag stored in metadata on creation only.
    pub app_name: Option<String>,
}

impl Default for VaultOptions {
    fn default() -> Self {
        Self {
            audit: false,
            iterations: DEFAULT_ITERATIONS,
            app_name: None,
        }
    }
}

/// Derived key material handed out by [`Vault::export_key`].
///
/// The only sanctioned way to recover access without the original
/// passphrase; the passphrase itself is never included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyExport {
    /// Derived key, base64.
    pub key: String,
    /// Per-vault salt, base64.
    pub salt: String,
    /// Vault format version.
    pub vault_version: String,
}

/// An open vault: one encrypted document-store file plus its derived key
/// for the session it is open.
///
/// Single-handle model: no internal locking, every operation is
/// synchronous. Two handles on the same path are not coordinated. The
/// derived key lives only in this handle and is zeroized on drop.
pub struct Vault {
    store: EncryptedStore,
    salt: Vec<u8>,
    audit: Option<AuditLog>,
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("path", &self.store.store().path())
            .field("audit", &self.audit.is_some())
            .finish_non_exhaustive()
    }
}

impl Vault {
    /// Open a vault at `path`, creating it when absent.
    ///
    /// Loads or initializes the file, ensures a salt exists (generated
    /// and persisted on first open), derives the key, and returns a
    /// ready handle.
    ///
    /// # Errors
    ///
    /// `StorageError` if the file exists but cannot be read or parsed,
    /// `CryptoError` if the stored salt is malformed or derivation
    /// parameters are invalid.
    pub fn open(
        path: impl AsRef<Path>,
        passphrase: &str,
        options: VaultOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        let mut store = Store::load(path, options.app_name.as_deref())?;

        let salt = match &store.meta().salt {
            Some(encoded) => BASE64
                .decode(encoded)
                .map_err(crate::error::CryptoError::Encoding)?,
            None => {
                // Fresh vault, or legacy file without metadata: assign a
                // salt and make it durable before any ciphertext exists.
                let salt = crypto::generate_salt(SALT_LEN)?;
                store.set_salt(BASE64.encode(&salt));
                store.persist()?;
                debug!(path = %path.display(), "vault created, salt assigned");
                salt
            }
        };

        let key = crypto::derive_key(passphrase, &salt, options.iterations)?;

        let audit = options
            .audit
            .then(|| AuditLog::new(audit_log_path(path)));

        Ok(Self {
            store: EncryptedStore::new(store, key),
            salt,
            audit,
        })
    }

    /// Path of the backing vault file.
    pub fn path(&self) -> &Path {
        self.store.store().path()
    }

    /// Vault metadata (version, creation time, salt, app tag).
    pub fn meta(&self) -> &Meta {
        self.store.store().meta()
    }

    /// The audit log, when logging was enabled at open time.
    pub fn audit_log(&self) -> Option<&AuditLog> {
        self.audit.as_ref()
    }

    /// Insert a document, returning its ID.
    pub fn insert(&mut self, doc: Value) -> Result<DocId> {
        let id_hint = doc
            .get(crate::core::constants::ID_FIELD)
            .and_then(Value::as_str)
            .map(str::to_string);
        let result = self.store.insert(doc);
        self.record(
            Operation::Insert,
            result.as_ref().ok().map(String::as_str).or(id_hint.as_deref()),
            result.is_ok(),
        );
        result
    }

    /// Get and decrypt a document. `Ok(None)` when the ID is absent.
    pub fn get(&self, id: &str) -> Result<Option<Document>> {
        let result = self.store.get(id);
        self.record(Operation::Get, Some(id), result.is_ok());
        result
    }

    /// Shallow-merge `updates` into a document. Returns whether the ID
    /// existed; never creates one.
    pub fn update(&mut self, id: &str, updates: Value) -> Result<bool> {
        let result = self.store.update(id, updates);
        self.record(Operation::Update, Some(id), result.is_ok());
        result
    }

    /// Delete a document. Returns whether it existed.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let result = self.store.delete(id);
        self.record(Operation::Delete, Some(id), result.is_ok());
        result
    }

    /// Find documents matching every filter pair by strict equality.
    pub fn find(&self, filter: &Value) -> Result<Vec<Document>> {
        let result = self.store.find(filter);
        self.record(Operation::Find, None, result.is_ok());
        result
    }

    /// Decrypt all documents under the given failure policy.
    pub fn list(&self, policy: ListPolicy) -> Result<Listing> {
        let result = self.store.list(policy);
        self.record(Operation::List, None, result.is_ok());
        result
    }

    /// Export the derived key and salt as a structured value.
    pub fn export_key(&self) -> KeyExport {
        KeyExport {
            key: BASE64.encode(self.store.key_bytes()),
            salt: BASE64.encode(&self.salt),
            vault_version: self.meta().vault_version.clone(),
        }
    }

    /// Write the key export to a JSON side file, appending the
    /// `.cofferkey` extension when `path` lacks it. Returns the path
    /// written. Never writes the passphrase.
    pub fn export_key_to_file(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let target = if path.extension().and_then(|e| e.to_str()) == Some(KEY_EXPORT_EXT) {
            path.to_path_buf()
        } else {
            let mut s = path.as_os_str().to_os_string();
            s.push(".");
            s.push(KEY_EXPORT_EXT);
            PathBuf::from(s)
        };

        let export = self.export_key();
        let contents =
            serde_json::to_string_pretty(&export).map_err(StorageError::Serialize)?;
        std::fs::write(&target, contents).map_err(StorageError::Io)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o600))
                .map_err(StorageError::Io)?;
        }

        debug!(path = %target.display(), "key export written");
        Ok(target)
    }

    /// Best-effort audit append: a logging failure is reported as a
    /// warning and never fails or rolls back the document operation.
    fn record(&self, op: Operation, doc_id: Option<&str>, ok: bool) {
        let Some(log) = &self.audit else {
            return;
        };
        let outcome = if ok { Outcome::Ok } else { Outcome::Error };
        if let Err(e) = log.append(&AuditEntry::now(op, doc_id, outcome)) {
            warn!(error = %e, "audit log append failed");
        }
    }
}

/// Audit-log side-file path for a vault file.
pub fn audit_log_path(vault_path: &Path) -> PathBuf {
    let mut s = vault_path.as_os_str().to_os_string();
    s.push(".");
    s.push(AUDIT_LOG_EXT);
    PathBuf::from(s)
}
