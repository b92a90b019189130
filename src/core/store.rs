//! Plain document storage.
//!
//! Durable, crash-safe mapping from document ID to an opaque JSON record,
//! plus a metadata block. Knows nothing about encryption; the records it
//! holds are whatever the layer above hands it.
//!
//! File schema:
//!
//! ```json
//! {
//!   "_meta": { "vault_version": "1.0.0", "created_at": "...",
//!              "salt": "<base64>", "app_name": "..." },
//!   "documents": { "<id>": { "_id": "<id>", "data": "<base64>" } }
//! }
//! ```
//!
//! Legacy files consisting of a bare `{id: record}` object still load;
//! `_meta` is synthesized in memory and lands on disk with the next
//! persist.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::constants::{ID_FIELD, VAULT_VERSION};
use crate::core::types::{DocId, Document};
use crate::error::{DocumentError, Result, StorageError};

/// Vault metadata block (`_meta`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    /// Vault format version.
    pub vault_version: String,
    /// Creation timestamp, ISO-8601 UTC.
    pub created_at: String,
    /// Per-vault key-derivation salt, base64. Absent on legacy files
    /// until the facade assigns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
    /// Optional application tag, set on creation only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
}

impl Meta {
    fn fresh(app_name: Option<&str>) -> Self {
        Self {
            vault_version: VAULT_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            salt: None,
            app_name: app_name.map(str::to_string),
        }
    }
}

/// On-disk shape of the current format.
#[derive(Serialize, Deserialize)]
struct VaultFile {
    #[serde(rename = "_meta")]
    meta: Meta,
    documents: BTreeMap<DocId, Document>,
}

/// Plain store over a single JSON file.
///
/// All mutating operations persist the full state via atomic replace
/// before returning.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    meta: Meta,
    documents: BTreeMap<DocId, Document>,
}

impl Store {
    /// Load the file at `path`, or initialize fresh in-memory state when
    /// it is absent or empty.
    ///
    /// `app_name` is only applied when fresh metadata is created; an
    /// existing vault keeps its original tag.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the file exists but cannot be read or is
    /// not valid JSON of a supported shape.
    pub fn load(path: impl AsRef<Path>, app_name: Option<&str>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug!(path = %path.display(), "loading store");

        if !path.exists() {
            return Ok(Self {
                path,
                meta: Meta::fresh(app_name),
                documents: BTreeMap::new(),
            });
        }

        let contents = std::fs::read_to_string(&path).map_err(StorageError::ReadFile)?;
        if contents.trim().is_empty() {
            return Ok(Self {
                path,
                meta: Meta::fresh(app_name),
                documents: BTreeMap::new(),
            });
        }

        let raw: Value = serde_json::from_str(&contents).map_err(StorageError::Parse)?;
        let (meta, documents) = Self::interpret(raw, app_name)?;

        debug!(documents = documents.len(), "store loaded");

        Ok(Self {
            path,
            meta,
            documents,
        })
    }

    /// Classify a parsed file as current format, legacy bare mapping, or
    /// unsupported.
    fn interpret(
        raw: Value,
        app_name: Option<&str>,
    ) -> Result<(Meta, BTreeMap<DocId, Document>)> {
        let Value::Object(map) = raw else {
            return Err(StorageError::UnsupportedFormat.into());
        };

        if map.contains_key("_meta") && map.contains_key("documents") {
            let file: VaultFile = serde_json::from_value(Value::Object(map))
                .map_err(StorageError::Parse)?;
            return Ok((file.meta, file.documents));
        }

        // Legacy format: the whole object is an {id: record} mapping.
        let mut documents = BTreeMap::new();
        for (id, value) in map {
            let Value::Object(mut record) = value else {
                return Err(StorageError::UnsupportedFormat.into());
            };
            record
                .entry(ID_FIELD.to_string())
                .or_insert_with(|| Value::String(id.clone()));
            documents.insert(id, record);
        }

        debug!(
            documents = documents.len(),
            "legacy vault file loaded, metadata synthesized"
        );

        Ok((Meta::fresh(app_name), documents))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Metadata block.
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Assign the key-derivation salt (base64). Set once by the facade
    /// when the vault is first opened.
    pub fn set_salt(&mut self, salt_b64: String) {
        self.meta.salt = Some(salt_b64);
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All document IDs.
    pub fn ids(&self) -> Vec<&str> {
        self.documents.keys().map(String::as_str).collect()
    }

    /// Whether a record with `id` exists.
    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    /// Insert a record and persist.
    ///
    /// Assigns a UUID v4 `_id` when the record carries none. Returns the
    /// record's ID.
    ///
    /// # Errors
    ///
    /// `DocumentError::Invalid` if `record` is not a JSON object,
    /// `DocumentError::DuplicateId` if its ID already exists. On a
    /// persist failure the in-memory insert is rolled back.
    pub fn insert(&mut self, record: Value) -> Result<DocId> {
        let Value::Object(mut record) = record else {
            return Err(DocumentError::Invalid { what: "document" }.into());
        };

        let id = match record.get(ID_FIELD).and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => uuid::Uuid::new_v4().to_string(),
        };
        if self.documents.contains_key(&id) {
            return Err(DocumentError::DuplicateId(id).into());
        }

        record.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        self.documents.insert(id.clone(), record);

        if let Err(e) = self.persist() {
            self.documents.remove(&id);
            return Err(e);
        }

        Ok(id)
    }

    /// Get a record by ID. Missing IDs are not an error.
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    /// Shallow-merge `partial` into the record's non-ID fields and
    /// persist. Returns whether the ID existed.
    ///
    /// # Errors
    ///
    /// `DocumentError::Invalid` if `partial` is not a JSON object. On a
    /// persist failure the in-memory merge is rolled back.
    pub fn update(&mut self, id: &str, partial: Value) -> Result<bool> {
        let Value::Object(partial) = partial else {
            return Err(DocumentError::Invalid { what: "update" }.into());
        };

        let Some(record) = self.documents.get_mut(id) else {
            return Ok(false);
        };
        let previous = record.clone();

        for (field, value) in partial {
            if field == ID_FIELD {
                continue;
            }
            record.insert(field, value);
        }

        if let Err(e) = self.persist() {
            self.documents.insert(id.to_string(), previous);
            return Err(e);
        }
        Ok(true)
    }

    /// Remove a record if present and persist. Returns whether it existed.
    /// On a persist failure the in-memory removal is rolled back.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let Some(removed) = self.documents.remove(id) else {
            return Ok(false);
        };
        if let Err(e) = self.persist() {
            self.documents.insert(id.to_string(), removed);
            return Err(e);
        }
        Ok(true)
    }

    /// All records. Iteration order is not contractual.
    pub fn list(&self) -> impl Iterator<Item = (&str, &Document)> {
        self.documents.iter().map(|(id, doc)| (id.as_str(), doc))
    }

    /// Serialize the full state to a temporary file in the vault's
    /// directory, then atomically replace the target path.
    ///
    /// This is the sole durability mechanism. On any failure the original
    /// file remains byte-for-byte unchanged; a write that did not fully
    /// land is never reported as success.
    pub fn persist(&self) -> Result<()> {
        debug!(path = %self.path.display(), documents = self.documents.len(), "persisting store");

        let file = VaultFile {
            meta: self.meta.clone(),
            documents: self.documents.clone(),
        };
        let contents =
            serde_json::to_string_pretty(&file).map_err(StorageError::Serialize)?;

        let dir = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        let mut tmp = tempfile::NamedTempFile::new_in(dir.unwrap_or(Path::new(".")))
            .map_err(StorageError::AtomicWrite)?;

        use std::io::Write;
        tmp.write_all(contents.as_bytes())
            .map_err(StorageError::AtomicWrite)?;
        tmp.as_file()
            .sync_all()
            .map_err(StorageError::AtomicWrite)?;
        tmp.persist(&self.path)
            .map_err(|e| StorageError::AtomicWrite(e.error))?;

        Ok(())
    }
}
