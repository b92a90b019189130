//! Append-only audit log.
//!
//! One JSON entry per line in a side file next to the vault. Entries
//! record what happened, never document field values. The facade treats
//! appends as best-effort observability: a failed append is logged and
//! swallowed there, it never rolls back the document operation.

use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, StorageError};

/// Kind of vault operation being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Insert,
    Get,
    Update,
    Delete,
    Find,
    List,
}

/// Result of the recorded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Ok,
    Error,
}

/// One recorded operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// ISO-8601 UTC timestamp.
    pub at: String,
    /// Operation kind.
    pub op: Operation,
    /// Document ID, when the operation targets one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    /// Whether the operation succeeded.
    pub outcome: Outcome,
}

impl AuditEntry {
    pub fn now(op: Operation, doc_id: Option<&str>, outcome: Outcome) -> Self {
        Self {
            at: chrono::Utc::now().to_rfc3339(),
            op,
            doc_id: doc_id.map(str::to_string),
            outcome,
        }
    }
}

/// Append-only JSON-lines audit log.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry. Creates the file on first use with `0o600`
    /// permissions on Unix.
    pub fn append(&self, entry: &AuditEntry) -> Result<()> {
        let existed = self.path.exists();

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(StorageError::Io)?;

        #[cfg(unix)]
        if !existed {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .map_err(StorageError::Io)?;
        }
        #[cfg(not(unix))]
        let _ = existed;

        let line = serde_json::to_string(entry).map_err(StorageError::Serialize)?;
        writeln!(file, "{line}").map_err(StorageError::Io)?;

        Ok(())
    }

    /// All recorded entries, oldest first. A missing file is an empty log.
    ///
    /// # Errors
    ///
    /// `StorageError` if the file is unreadable or a line is not a valid
    /// entry.
    pub fn entries(&self) -> Result<Vec<AuditEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = std::fs::File::open(&self.path).map_err(StorageError::ReadFile)?;
        let reader = std::io::BufReader::new(file);

        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(StorageError::Io)?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: AuditEntry =
                serde_json::from_str(&line).map_err(StorageError::AuditParse)?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// The last `n` entries (all of them when fewer exist).
    pub fn tail(&self, n: usize) -> Result<Vec<AuditEntry>> {
        let mut entries = self.entries()?;
        let skip = entries.len().saturating_sub(n);
        Ok(entries.split_off(skip))
    }
}
