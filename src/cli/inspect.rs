//! Inspect a vault file without decrypting it.
//!
//! A pure read-only viewer over the plain store layer: it reads `_meta`
//! and document IDs and never derives a key or touches the encrypted
//! store.

use serde::Serialize;
use std::path::Path;

use crate::cli::output;
use crate::core::store::Store;
use crate::error::{Result, StorageError};

/// What the inspector reports for one vault file.
#[derive(Debug, Serialize)]
pub struct InspectionReport {
    pub file: String,
    pub vault_version: String,
    pub created_at: String,
    pub app_name: Option<String>,
    pub salt: Option<String>,
    pub document_count: usize,
    pub document_ids: Vec<String>,
}

impl InspectionReport {
    /// Build a report from the plain store, listing at most `max_ids` IDs.
    pub fn from_store(store: &Store, max_ids: usize) -> Self {
        let mut ids: Vec<String> = store.ids().into_iter().map(str::to_string).collect();
        ids.truncate(max_ids);

        Self {
            file: store
                .path()
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            vault_version: store.meta().vault_version.clone(),
            created_at: store.meta().created_at.clone(),
            app_name: store.meta().app_name.clone(),
            salt: store.meta().salt.clone(),
            document_count: store.len(),
            document_ids: ids,
        }
    }
}

/// Run the inspect command.
pub fn execute(path: &Path, max_ids: usize, json: bool, quiet: bool) -> Result<()> {
    if !path.exists() {
        return Err(StorageError::ReadFile(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no such file: {}", path.display()),
        ))
        .into());
    }

    let store = Store::load(path, None)?;
    let report = InspectionReport::from_store(&store, max_ids);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).map_err(StorageError::Serialize)?
        );
        return Ok(());
    }

    print_human(&report, quiet);
    Ok(())
}

fn print_human(report: &InspectionReport, quiet: bool) {
    if !quiet {
        output::header("Coffer Inspector");
    }

    output::kv("file:", &report.file);
    output::kv("created at:", &report.created_at);
    output::kv("vault version:", &report.vault_version);
    output::kv("app name:", report.app_name.as_deref().unwrap_or("—"));
    output::kv("salt:", truncate_salt(report.salt.as_deref()));
    output::kv("documents:", report.document_count);

    if !report.document_ids.is_empty() {
        output::kv("ids:", format!("(first {})", report.document_ids.len()));
        for id in &report.document_ids {
            output::item(id);
        }
        let remaining = report.document_count - report.document_ids.len();
        if remaining > 0 {
            output::dimmed(&format!("  ... and {remaining} more"));
        }
    }
}

/// Show only a prefix of the salt; enough to compare vaults, not enough
/// to clutter the output.
fn truncate_salt(salt: Option<&str>) -> String {
    match salt {
        Some(s) if s.chars().count() > 12 => {
            let prefix: String = s.chars().take(12).collect();
            format!("{prefix}... (truncated)")
        }
        Some(s) => s.to_string(),
        None => "missing".to_string(),
    }
}
