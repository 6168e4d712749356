//! Integration tests for the ntm CLI.
//!
//! Run with: `cargo test --package netomata-cli --test cli_integration`

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Helper to run ntm in a scratch directory with a clean environment.
fn run_ntm_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ntm"))
        .current_dir(dir)
        .env_remove("NTM_SEED")
        .env_remove("NTM_OUTPUT_FORMAT")
        .env_remove("NTM_TIMESTEPS")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute ntm command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    let output = run_ntm_in_dir(dir.path(), &["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["run", "elementary", "totalistic", "reversible", "hopfield", "turing"] {
        assert!(text.contains(command), "help is missing {command}");
    }
}

#[test]
fn test_elementary_text_rows() {
    let dir = TempDir::new().unwrap();
    let output = run_ntm_in_dir(dir.path(), &["elementary", "30", "-w", "7", "-s", "2"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("    0 0001000"));
    assert!(text.contains("    1 0011100"));
    assert!(text.contains("    2 0110010"));
}

#[test]
fn test_run_experiment_file_as_json() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("experiment.json"),
        r#"{
            "name": "k3",
            "evolve": {"timesteps": 3},
            "model": {"kind": "totalistic", "k": 3, "rule": 777, "width": 9}
        }"#,
    )
    .unwrap();

    let output = run_ntm_in_dir(dir.path(), &["--format", "json", "run", "experiment.json"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["kind"], "cells");
    assert_eq!(json["name"], "k3");
    assert_eq!(json["rows"].as_array().unwrap().len(), 4);
    assert_eq!(
        json["rows"][1]["cells"],
        serde_json::json!([0, 0, 0, 1, 1, 1, 0, 0, 0])
    );
}

#[test]
fn test_environment_selects_output_format() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_ntm"))
        .current_dir(dir.path())
        .env("NTM_OUTPUT_FORMAT", "json")
        .args(["reversible", "214", "-w", "9", "-s", "2"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["rows"][0]["cells"], serde_json::json!([0, 0, 0, 0, 1, 0, 0, 0, 0]));
}

#[test]
fn test_bad_experiment_reports_context() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.json"), r#"{"model": {"kind": "lava"}}"#).unwrap();
    let output = run_ntm_in_dir(dir.path(), &["run", "broken.json"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse experiment"));
}

#[test]
fn test_missing_transition_fails_the_run() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("table.json"),
        r#"[{"state": 1, "symbol": 0, "next_state": 1, "write": 1, "direction": "right"}]"#,
    )
    .unwrap();
    let output = run_ntm_in_dir(
        dir.path(),
        &["turing", "table.json", "--tape", "001", "-s", "3"],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no transition for state 1 reading 1"));
}

#[test]
fn test_open_boundary_runs_for_totalistic_only() {
    let dir = TempDir::new().unwrap();
    let output = run_ntm_in_dir(dir.path(), &["elementary", "30", "--open", "-w", "7"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--open"), "stderr: {stderr}");

    let output = run_ntm_in_dir(
        dir.path(),
        &["--format", "json", "totalistic", "2", "10", "--open", "-w", "7", "-s", "3"],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["rows"].as_array().unwrap().len(), 4);
}
