//! Encrypted document storage.
//!
//! Wraps [`Store`] by exclusive ownership and provides transparent
//! confidentiality and integrity over its records: document bodies are
//! encrypted before delegation and decrypted on read. The `_id` field
//! stays plaintext to allow lookup without the key; everything else only
//! ever reaches disk as ciphertext.

use serde_json::Value;
use tracing::warn;

use crate::core::constants::{DATA_FIELD, ID_FIELD};
use crate::core::crypto::{self, VaultKey};
use crate::core::store::Store;
use crate::core::types::{DocId, Document};
use crate::error::{CryptoError, DocumentError, Result};

/// Failure policy for whole-vault traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPolicy {
    /// Abort with `CryptoError` on the first undecryptable record. Used
    /// when any corruption must block access.
    Strict,
    /// Skip undecryptable records and return the best-effort subset.
    /// Disaster-recovery listing; the only non-strict read path.
    BestEffort,
}

/// Result of a traversal: decrypted documents plus how many records were
/// skipped (always zero under [`ListPolicy::Strict`]).
#[derive(Debug)]
pub struct Listing {
    pub documents: Vec<Document>,
    pub skipped: usize,
}

/// Encrypted store over a plain [`Store`].
pub struct EncryptedStore {
    store: Store,
    key: VaultKey,
}

impl std::fmt::Debug for EncryptedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedStore")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl EncryptedStore {
    pub fn new(store: Store, key: VaultKey) -> Self {
        Self { store, key }
    }

    /// Read-only access to the underlying plain store (metadata, IDs).
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Mutable access for the facade (salt assignment, persist).
    pub(crate) fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// Raw derived-key bytes, for key export only.
    pub(crate) fn key_bytes(&self) -> &[u8] {
        self.key.as_bytes()
    }

    /// Encrypt and insert a document. Returns its ID.
    ///
    /// Assigns a UUID v4 `_id` when the document carries none. The stored
    /// plaintext excludes `_id`; it is reattached from the record on read.
    ///
    /// # Errors
    ///
    /// `DocumentError::Invalid` if `doc` is not a JSON object,
    /// `DocumentError::DuplicateId` on an ID collision (checked before
    /// any ciphertext is produced, never masked as a crypto failure).
    pub fn insert(&mut self, doc: Value) -> Result<DocId> {
        let Value::Object(mut doc) = doc else {
            return Err(DocumentError::Invalid { what: "document" }.into());
        };

        let id = match doc.get(ID_FIELD).and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => uuid::Uuid::new_v4().to_string(),
        };
        if self.store.contains(&id) {
            return Err(DocumentError::DuplicateId(id).into());
        }

        doc.remove(ID_FIELD);
        let encrypted = crypto::encrypt_document(&doc, &self.key)?;

        let mut record = Document::new();
        record.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        record.insert(DATA_FIELD.to_string(), Value::String(encrypted));
        self.store.insert(Value::Object(record))?;

        Ok(id)
    }

    /// Get and decrypt a document. `Ok(None)` for a missing ID.
    ///
    /// # Errors
    ///
    /// `CryptoError` if the record exists but cannot be decrypted (wrong
    /// key, tampered or corrupted ciphertext, malformed encoding) — never
    /// conflated with absence.
    pub fn get(&self, id: &str) -> Result<Option<Document>> {
        let Some(record) = self.store.get(id) else {
            return Ok(None);
        };
        Ok(Some(self.decrypt_record(id, record)?))
    }

    /// Shallow-merge `updates` into the document and re-encrypt. Returns
    /// whether the ID existed; never creates a new ID.
    ///
    /// Keys in `updates` overwrite, other fields are untouched, `_id` is
    /// never overwritten.
    pub fn update(&mut self, id: &str, updates: Value) -> Result<bool> {
        let Value::Object(updates) = updates else {
            return Err(DocumentError::Invalid { what: "update" }.into());
        };

        let Some(mut doc) = self.get(id)? else {
            return Ok(false);
        };

        for (field, value) in updates {
            if field == ID_FIELD {
                continue;
            }
            doc.insert(field, value);
        }
        doc.remove(ID_FIELD);

        let encrypted = crypto::encrypt_document(&doc, &self.key)?;
        let mut partial = serde_json::Map::new();
        partial.insert(DATA_FIELD.to_string(), Value::String(encrypted));
        self.store.update(id, Value::Object(partial))
    }

    /// Delete a record. No decryption needed; delegates directly.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        self.store.delete(id)
    }

    /// Return all documents whose fields match every pair in `filter` by
    /// strict JSON equality (type and value; `"10"` never matches `10`).
    ///
    /// An empty filter returns every decryptable document. Full scan,
    /// strict traversal: one undecryptable record fails the whole query.
    pub fn find(&self, filter: &Value) -> Result<Vec<Document>> {
        let Value::Object(filter) = filter else {
            return Err(DocumentError::Invalid { what: "filter" }.into());
        };

        let listing = self.list(ListPolicy::Strict)?;
        Ok(listing
            .documents
            .into_iter()
            .filter(|doc| filter.iter().all(|(k, v)| doc.get(k) == Some(v)))
            .collect())
    }

    /// Decrypt every stored record under the given failure policy.
    pub fn list(&self, policy: ListPolicy) -> Result<Listing> {
        let mut documents = Vec::with_capacity(self.store.len());
        let mut skipped = 0;

        for (id, record) in self.store.list() {
            match self.decrypt_record(id, record) {
                Ok(doc) => documents.push(doc),
                Err(e) => match policy {
                    ListPolicy::Strict => return Err(e),
                    ListPolicy::BestEffort => {
                        warn!(doc_id = id, error = %e, "skipping undecryptable record");
                        skipped += 1;
                    }
                },
            }
        }

        Ok(Listing { documents, skipped })
    }

    /// Decrypt one record and reattach its plaintext `_id`.
    fn decrypt_record(&self, id: &str, record: &Document) -> Result<Document> {
        let encoded = record
            .get(DATA_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                CryptoError::Decrypt {
                    reason: "missing encrypted data field".into(),
                }
                .for_document(id)
            })?;

        let mut doc = crypto::decrypt_document(encoded, &self.key)
            .map_err(|e| e.for_document(id))?;
        doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        Ok(doc)
    }
}
