//! Smoke tests for the deck CLI.

mod common;

use assert_cmd::Command;
use common::TestEnv;
use predicates::prelude::*;

fn deck() -> Command {
    Command::new(env!("CARGO_BIN_EXE_deck"))
}

#[test]
fn test_version_flag() {
    deck()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("deck"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    deck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("progress"))
        .stdout(predicate::str::contains("session"));
}

#[test]
fn test_no_args_outputs_summary_json() {
    let env = TestEnv::new();
    let summary = env.json(&[]);
    assert_eq!(summary["xp"], 0);
    assert_eq!(summary["rank"], "Civilian");
    assert_eq!(summary["unlocked_operations"], 1);
    assert_eq!(summary["cards_total"], 24);
}

#[test]
fn test_no_args_human() {
    let env = TestEnv::new();
    env.deck()
        .arg("-H")
        .assert()
        .success()
        .stdout(predicate::str::contains("Civilian | 0 xp"))
        .stdout(predicate::str::contains("Cards: 0/24"));
}

#[test]
fn test_unknown_command_fails() {
    deck().arg("frobnicate").assert().failure();
}

#[test]
fn test_system_info() {
    let env = TestEnv::new();
    let info = env.json(&["system", "info"]);
    assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(info["storage_backend"], "file");
    assert_eq!(info["storage_available"], true);
    assert_eq!(info["progress_key"], "agentic-rpg-state");
}

#[test]
fn test_watch_times_out_quietly() {
    let env = TestEnv::new();
    let result = env.json(&["watch", "--seconds", "1", "-k", "agentic-rpg-state"]);
    assert_eq!(result["conflicts"], 0);
    assert_eq!(result["keys"], serde_json::json!(["agentic-rpg-state"]));
}

#[test]
fn test_json_log_format() {
    let env = TestEnv::new();
    let output = env
        .deck()
        .env("DECK_LOG", "agentdeck=debug")
        .env("DECK_LOG_FORMAT", "json")
        .args(["progress", "collect", "meal_planner"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let events: Vec<serde_json::Value> = stderr
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert!(
        events
            .iter()
            .any(|e| e["fields"]["message"] == "card collected" && e["fields"]["card"] == "meal_planner")
    );
}
