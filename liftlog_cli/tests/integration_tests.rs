//! Integration tests for the liftlog binary.
//!
//! These tests verify end-to-end behavior including:
//! - Logging sets and ending sessions
//! - Next-set prediction across sessions
//! - e1RM reporting and rest overrides
//! - Recovery from corrupt history lines

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// CLI command isolated to a temp data dir and config file
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("liftlog"));
    cmd.arg("--data-dir")
        .arg(dir.join("data"))
        .arg("--config")
        .arg(dir.join("config.toml"));
    cmd
}

fn log_set(dir: &Path, exercise: &str, kg: &str, reps: &str) {
    cli(dir)
        .args(["log", exercise, kg, reps])
        .assert()
        .success();
}

fn end_session(dir: &Path) {
    cli(dir).arg("end").assert().success();
}

fn json_output(dir: &Path, args: &[&str]) -> Value {
    let output = cli(dir).arg("--json").args(args).output().expect("run liftlog");
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("liftlog"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout log with next-set prediction"));
}

#[test]
fn test_next_on_empty_history() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("next")
        .assert()
        .success()
        .stdout(predicate::str::contains("No prediction yet"));

    assert_eq!(json_output(temp_dir.path(), &["next"]), Value::Null);
}

#[test]
fn test_log_writes_history_file() {
    let temp_dir = setup_test_dir();
    log_set(temp_dir.path(), "bench", "100", "5");

    let contents = fs::read_to_string(temp_dir.path().join("data/history.jsonl")).unwrap();
    let entry: Value = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
    assert_eq!(entry["exId"], "bench");
    assert_eq!(entry["reps"], 5);
}

#[test]
fn test_info_logs_go_to_stderr() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .env_remove("RUST_LOG")
        .args(["log", "bench", "100", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Logged bench"))
        .stderr(predicate::str::contains("Logging bench"));
}

#[test]
fn test_drop_set_trend_prediction() {
    let temp_dir = setup_test_dir();
    log_set(temp_dir.path(), "bench", "100", "5");
    log_set(temp_dir.path(), "bench", "80", "8");

    let prediction = json_output(temp_dir.path(), &["next"]);
    assert_eq!(prediction["exId"], "bench");
    assert_eq!(prediction["kg"], 60.0);
    assert_eq!(prediction["reps"], 11);
    assert_eq!(prediction["rest"], 90);
    assert_eq!(prediction["reason"]["type"], "trend");
}

#[test]
fn test_cross_session_drop_set() {
    let temp_dir = setup_test_dir();
    log_set(temp_dir.path(), "bench", "100", "10");
    log_set(temp_dir.path(), "bench", "110", "8");
    log_set(temp_dir.path(), "bench", "120", "6");
    end_session(temp_dir.path());

    // Empty session starts where the last one started
    let start = json_output(temp_dir.path(), &["next"]);
    assert_eq!(start["reason"]["type"], "session-start");
    assert_eq!(start["kg"], 100.0);

    log_set(temp_dir.path(), "bench", "100", "10");
    let prediction = json_output(temp_dir.path(), &["next"]);
    assert_eq!(prediction["kg"], 110.0);
    assert_eq!(prediction["reps"], 8);
    assert_eq!(prediction["reason"]["type"], "history-dropset");
}

#[test]
fn test_end_on_empty_session_is_noop() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("end")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing logged"));

    assert!(!temp_dir.path().join("data/history.jsonl").exists());
}

#[test]
fn test_suggest_unknown_exercise() {
    let temp_dir = setup_test_dir();
    log_set(temp_dir.path(), "bench", "100", "5");

    cli(temp_dir.path())
        .args(["suggest", "curl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("never been logged"));
}

#[test]
fn test_e1rm_from_completed_sessions() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["log", "squat", "100", "1", "--difficulty", "hard"])
        .assert()
        .success();
    end_session(temp_dir.path());

    let metrics = json_output(temp_dir.path(), &["e1rm", "squat"]);
    assert_eq!(metrics["current"], 100.0);
    assert_eq!(metrics["peak"], 100.0);
    assert_eq!(metrics["trend"], Value::Null);
    assert_eq!(metrics["suggestedWeights"].as_array().unwrap().len(), 4);

    let weight = json_output(temp_dir.path(), &["weight", "squat", "1", "hard"]);
    assert_eq!(weight["kg"], 93.0);
}

#[test]
fn test_rest_override_applies_to_predictions() {
    let temp_dir = setup_test_dir();
    log_set(temp_dir.path(), "bench", "100", "5");

    cli(temp_dir.path())
        .args(["rest", "bench", "150"])
        .assert()
        .success();

    let config = fs::read_to_string(temp_dir.path().join("config.toml")).unwrap();
    assert!(config.contains("bench = 150"));

    let prediction = json_output(temp_dir.path(), &["next"]);
    assert_eq!(prediction["rest"], 150);
}

#[test]
fn test_invalid_difficulty_rejected() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["log", "bench", "100", "5", "--difficulty", "brutal"])
        .assert()
        .failure();
}

#[test]
fn test_corrupt_history_lines_ignored() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(
        data_dir.join("history.jsonl"),
        "{ invalid json }\n{\"exId\":\"row\",\"ts\":1,\"kg\":60,\"reps\":10}\n",
    )
    .unwrap();

    let prediction = json_output(temp_dir.path(), &["next"]);
    assert_eq!(prediction["exId"], "row");
    assert_eq!(prediction["reason"]["type"], "continue");
}

#[test]
fn test_export_csv() {
    let temp_dir = setup_test_dir();
    log_set(temp_dir.path(), "bench", "100", "5");
    end_session(temp_dir.path());
    log_set(temp_dir.path(), "row", "60", "10");

    let out = temp_dir.path().join("sets.csv");
    cli(temp_dir.path())
        .arg("export")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 sets"));

    let csv = fs::read_to_string(&out).unwrap();
    assert!(csv.contains("2,row,"));
}
