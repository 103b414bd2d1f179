//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify outputs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use tempfile::TempDir;

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_studybear"));
    cmd.env("STUDYBEAR_DATA_DIR", data_dir)
        .env("STUDYBEAR_STUDY_CHANNEL_ID", "study-room")
        .env("RUST_LOG", "warn")
        .env_remove("STUDY_CHANNEL_ID")
        .env_remove("STUDYBEAR_SNAPSHOT_PATH");
    cmd
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = cli(data_dir)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run `studybear run` feeding `input` on stdin.
fn run_session(data_dir: &Path, args: &[&str], input: &str) -> (String, String, i32) {
    let mut child = cli(data_dir)
        .arg("run")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

#[test]
fn test_config_list() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "list"]);
    assert_eq!(code, 0, "config list failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["command_prefix"], "!");
    assert_eq!(parsed["pricing"]["reward_cost_units"], 10);
}

#[test]
fn test_config_set_then_get() {
    let dir = TempDir::new().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["config", "set", "pricing.reward_cost_units", "5"]);
    assert_eq!(code, 0, "config set failed");

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "pricing.reward_cost_units"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "5");
}

#[test]
fn test_config_set_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "no_such_key", "1"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_get_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    let (stdout, stderr, code) = run_cli(dir.path(), &["config", "get", "pricing.nope"]);
    assert_eq!(code, 1);
    assert!(stdout.is_empty());
    assert!(stderr.contains("error: Unknown configuration key: pricing.nope"));
}

#[test]
fn test_config_path_is_inside_data_dir() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "path"]);
    assert_eq!(code, 0);
    assert!(stdout.trim().ends_with("config.toml"));
    assert!(stdout.contains(dir.path().to_str().unwrap()));
}

#[test]
fn test_balance_of_unknown_member_is_zero() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["balance", "nobody"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Your current balance is 0 Grizzly Gems"));
}

#[test]
fn test_empty_leaderboard() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["leaderboard"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("The leaderboard is currently empty"));
}

#[test]
fn test_run_session_replies_and_persists() {
    let dir = TempDir::new().unwrap();
    let input = "msg alice !lb\njoin bob\nbot helper !lb\nmsg bob !b\n";
    let (stdout, stderr, code) = run_session(dir.path(), &["--present", "alice"], input);
    assert_eq!(code, 0, "run failed: {stderr}");

    assert!(stdout.contains("Leaderboard"));
    assert!(stdout.contains("alice"));
    assert!(stdout.contains("alice and bob are now studybearing! Come and join"));
    assert!(stdout.contains("Your current balance is 0 Grizzly Gems"));
    // Bot messages never get a reply, so there is exactly one leaderboard.
    assert_eq!(stdout.matches("Leaderboard").count(), 1);

    let (stdout, _, code) = run_cli(dir.path(), &["leaderboard", "--json"]);
    assert_eq!(code, 0);
    let entries: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let ids: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"alice"));
    assert!(ids.contains(&"bob"));
}

#[test]
fn test_run_without_study_channel_fails() {
    let dir = TempDir::new().unwrap();
    let output = cli(dir.path())
        .env_remove("STUDYBEAR_STUDY_CHANNEL_ID")
        .arg("run")
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert_ne!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}
