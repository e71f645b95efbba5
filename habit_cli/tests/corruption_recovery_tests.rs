//! Corruption recovery tests for habitflow.
//!
//! These tests verify the CLI keeps working when:
//! - Blob files contain invalid JSON
//! - The habits blob holds records the engine rejects
//! - A single habit record does not decode
//! - The data directory does not exist yet

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("habitflow"));
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_corrupted_habits_blob() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("habits.json"), "{ invalid json }}}}").unwrap();

    cli(data_dir)
        .args(["habit", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No habits yet"));

    // The next write replaces the corrupted blob with a valid one
    cli(data_dir)
        .args(["habit", "add", "Read", "--id", "read"])
        .assert()
        .success();

    let blob = fs::read_to_string(data_dir.join("habits.json")).unwrap();
    let records: Vec<Value> = serde_json::from_str(&blob).expect("valid JSON after rewrite");
    assert_eq!(records.len(), 1);
}

#[test]
fn test_corrupted_todos_blob() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("todos.json"), "[{\"id\": 42").unwrap();

    cli(data_dir)
        .args(["todo", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No todos yet"));
}

#[test]
fn test_rejected_records_are_skipped() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let records = serde_json::json!([
        {"id": "read", "title": "Read", "completions": ["2024-05-01", "2024-05-02"]},
        {"id": "read", "title": "Duplicate"},
        {"id": "", "title": "No id"},
        {"id": "walk", "title": "Walk"}
    ]);
    fs::write(data_dir.join("habits.json"), records.to_string()).unwrap();

    let output = cli(data_dir)
        .args(["--today", "2024-05-02", "habit", "list", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let habits: Vec<Value> = serde_json::from_slice(&output).unwrap();

    let ids: Vec<_> = habits.iter().map(|h| h["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["read", "walk"]);
    assert_eq!(habits[0]["title"], "Read");
    assert_eq!(habits[0]["streak"], 2);
}

#[test]
fn test_undecodable_record_does_not_wipe_others() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let records = serde_json::json!([
        {"id": "read", "title": "Read", "completions": ["2024-03-01", "2024-03-02"]},
        {"id": "walk", "title": "Walk", "completions": ["2024-02-30"]}
    ]);
    fs::write(data_dir.join("habits.json"), records.to_string()).unwrap();

    cli(data_dir)
        .args(["habit", "add", "New", "--id", "new"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipping unreadable habit record"));

    let blob = fs::read_to_string(data_dir.join("habits.json")).unwrap();
    let saved: Vec<Value> = serde_json::from_str(&blob).unwrap();
    let ids: Vec<_> = saved.iter().map(|h| h["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["read", "new"]);
    assert_eq!(
        saved[0]["completions"],
        serde_json::json!(["2024-03-01", "2024-03-02"])
    );
}

#[test]
fn test_unparseable_blob_is_backed_up_before_overwrite() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("habits.json"), "[{\"id\": \"read\"").unwrap();

    cli(data_dir)
        .args(["habit", "add", "Read", "--id", "read"])
        .assert()
        .success();

    let backup = fs::read_to_string(data_dir.join("habits.json.corrupt")).unwrap();
    assert_eq!(backup, "[{\"id\": \"read\"");
}

#[test]
fn test_unsorted_duplicate_completions_normalized() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let records = serde_json::json!([
        {"id": "run", "title": "Run", "completions": ["2024-05-03", "2024-05-01", "2024-05-03", "2024-05-02"]}
    ]);
    fs::write(data_dir.join("habits.json"), records.to_string()).unwrap();

    // Any write rewrites the blob from the canonical set
    cli(data_dir)
        .args(["habit", "edit", "run", "--frequency", "Daily"])
        .assert()
        .success();

    let blob = fs::read_to_string(data_dir.join("habits.json")).unwrap();
    let records: Vec<Value> = serde_json::from_str(&blob).unwrap();
    assert_eq!(
        records[0]["completions"],
        serde_json::json!(["2024-05-01", "2024-05-02", "2024-05-03"])
    );
}

#[test]
fn test_missing_data_dir_is_created_on_write() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("nested").join("data");

    cli(&data_dir)
        .args(["todo", "add", "Plan week"])
        .assert()
        .success();

    assert!(data_dir.join("todos.json").exists());
}
