//! Tests for `coffer inspect`.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

use coffer::{Vault, VaultOptions};

fn make_vault(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("test.coffer");
    let mut vault = Vault::open(
        &path,
        "inspector-cannot-know-this",
        VaultOptions {
            iterations: 1_000,
            app_name: Some("journal".to_string()),
            ..VaultOptions::default()
        },
    )
    .unwrap();
    vault
        .insert(json!({"_id": "doc-a", "secret": "hunter2"}))
        .unwrap();
    vault
        .insert(json!({"_id": "doc-b", "secret": "swordfish"}))
        .unwrap();
    path
}

fn coffer() -> Command {
    Command::cargo_bin("coffer").unwrap()
}

#[test]
fn test_inspect_shows_metadata_and_ids() {
    let dir = TempDir::new().unwrap();
    let path = make_vault(&dir);

    coffer()
        .args(["inspect", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("doc-a"))
        .stdout(predicate::str::contains("doc-b"))
        .stdout(predicate::str::contains("journal"))
        .stdout(predicate::str::contains("1.0.0"));
}

#[test]
fn test_inspect_never_reveals_plaintext() {
    let dir = TempDir::new().unwrap();
    let path = make_vault(&dir);

    coffer()
        .args(["inspect", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter2").not())
        .stdout(predicate::str::contains("swordfish").not())
        .stdout(predicate::str::contains("secret").not());
}

#[test]
fn test_inspect_json_output() {
    let dir = TempDir::new().unwrap();
    let path = make_vault(&dir);

    let output = coffer()
        .args(["inspect", path.to_str().unwrap(), "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("--json emits valid JSON");
    assert_eq!(report["document_count"], json!(2));
    assert_eq!(report["app_name"], json!("journal"));
    assert_eq!(
        report["document_ids"],
        json!(["doc-a", "doc-b"])
    );
}

#[test]
fn test_inspect_respects_max_ids() {
    let dir = TempDir::new().unwrap();
    let path = make_vault(&dir);

    let output = coffer()
        .args(["inspect", path.to_str().unwrap(), "--json", "-n", "1"])
        .output()
        .unwrap();
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["document_count"], json!(2));
    assert_eq!(report["document_ids"].as_array().unwrap().len(), 1);
}

#[test]
fn test_inspect_missing_file_fails() {
    coffer()
        .args(["inspect", "/nonexistent/path.coffer"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no such file"));
}

#[test]
fn test_inspect_garbage_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.coffer");
    std::fs::write(&path, "not json {").unwrap();

    coffer()
        .args(["inspect", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid JSON"));
}
