//! Integration tests for progression commands.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_xp_accumulates_across_invocations() {
    let env = TestEnv::new();
    env.json(&["progress", "xp", "40"]);
    let result = env.json(&["progress", "xp", "10"]);
    assert_eq!(result["added"], 10);
    assert_eq!(result["xp"], 50);
}

#[test]
fn test_collect_awards_xp_once() {
    let env = TestEnv::new();
    let first = env.json(&["progress", "collect", "meal_planner"]);
    assert_eq!(first["collected"], true);
    assert_eq!(first["in_catalog"], true);
    assert_eq!(first["xp"], 25);

    let again = env.json(&["progress", "collect", "meal_planner"]);
    assert_eq!(again["collected"], false);
    assert_eq!(again["xp"], 25);
}

#[test]
fn test_complete_unlocks_successor_and_ranks_up() {
    let env = TestEnv::new();
    let result = env.json(&["progress", "complete", "op_1"]);
    assert_eq!(result["completed"], true);
    assert_eq!(result["unlocked"], "op_2");
    assert_eq!(result["xp"], 100);
    assert_eq!(result["rank"], "Recruit");

    let show = env.json(&["progress", "show"]);
    assert_eq!(show["completed_operations"], serde_json::json!(["op_1"]));
    assert_eq!(show["unlocked_operations"], serde_json::json!(["op_1", "op_2"]));
}

#[test]
fn test_complete_twice_is_idempotent() {
    let env = TestEnv::new();
    env.json(&["progress", "complete", "op_1"]);
    let again = env.json(&["progress", "complete", "op_1"]);
    assert_eq!(again["completed"], false);
    assert_eq!(again["xp"], 100);
}

#[test]
fn test_operation_limit_from_env() {
    let env = TestEnv::new();
    let output = env
        .deck()
        .env("DECK_OPERATION_LIMIT", "1")
        .args(["progress", "complete", "op_1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(result.get("unlocked").is_none());
}

#[test]
fn test_mission_collects_cards() {
    let env = TestEnv::new();
    let result = env.json(&[
        "progress",
        "mission",
        "op_1",
        "--card",
        "email_triage",
        "-c",
        "meal_planner",
    ]);
    assert_eq!(result["newly_completed"], true);
    assert_eq!(result["xp_gained"], 150);
    assert_eq!(result["xp"], 150);
}

#[test]
fn test_rank_human() {
    let env = TestEnv::new();
    env.deck()
        .args(["progress", "rank", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rank: Civilian"))
        .stdout(predicate::str::contains("Next: Recruit in 1 more"));
}

#[test]
fn test_reset_with_yes() {
    let env = TestEnv::new();
    env.json(&["progress", "complete", "op_1"]);
    let result = env.json(&["progress", "reset", "--yes"]);
    assert_eq!(result["reset"], true);

    let summary = env.json(&[]);
    assert_eq!(summary["xp"], 0);
    assert_eq!(summary["completed_operations"], 0);
}

#[test]
fn test_reset_declined_at_prompt() {
    let env = TestEnv::new();
    env.json(&["progress", "xp", "5"]);
    env.deck()
        .args(["progress", "reset"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""reset":false"#));
    assert_eq!(env.json(&[])["xp"], 5);
}

#[test]
fn test_corrupt_state_reads_as_new_player() {
    let env = TestEnv::new();
    env.json(&["progress", "xp", "5"]);
    let state_file = env.data_path().join("kv").join("agentic-rpg-state");
    assert!(state_file.exists());
    std::fs::write(&state_file, "{not json").unwrap();

    let summary = env.json(&[]);
    assert_eq!(summary["xp"], 0);
    assert_eq!(summary["unlocked_operations"], 1);
}

#[test]
fn test_watch_reload_follows_other_process() {
    let env = TestEnv::new();
    let watcher = env
        .deck_process()
        .args(["watch", "--reload", "--seconds", "3"])
        .stdout(std::process::Stdio::piped())
        .spawn()
        .unwrap();
    std::thread::sleep(std::time::Duration::from_millis(1000));

    env.json(&["progress", "complete", "op_1"]);

    let output = watcher.wait_with_output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().filter(|l| !l.trim().is_empty()).collect();

    let conflict: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(conflict["key"], "agentic-rpg-state");

    let result: serde_json::Value = serde_json::from_str(lines[lines.len() - 1]).unwrap();
    assert!(result["reloads"].as_u64().unwrap() >= 1);
    assert_eq!(result["xp"], 100);
}
