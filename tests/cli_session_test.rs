//! Integration tests for active-session locks.

mod common;

use common::TestEnv;
use predicates::prelude::*;
use std::thread;
use std::time::Duration;

/// Write a heartbeat for `id` as if another process held it `age_ms` ago.
fn write_heartbeat(env: &TestEnv, id: &str, age_ms: i64) {
    let kv = env.data_path().join("kv");
    std::fs::create_dir_all(&kv).unwrap();
    let at = chrono::Utc::now().timestamp_millis() - age_ms;
    std::fs::write(kv.join(format!("{}_activeTab", id)), at.to_string()).unwrap();
}

#[test]
fn test_status_of_unclaimed_session() {
    let env = TestEnv::new();
    let status = env.json(&["session", "status", "focusfury"]);
    assert_eq!(status["held"], false);
    assert_eq!(status["key"], "focusfury_activeTab");
}

#[test]
fn test_play_then_release() {
    let env = TestEnv::new();
    let result = env.json(&["session", "play", "focusfury", "--seconds", "1"]);
    assert_eq!(result["outcome"], "released");
    assert!(!env.data_path().join("kv").join("focusfury_activeTab").exists());
}

#[test]
fn test_play_refused_while_held() {
    let env = TestEnv::new();
    write_heartbeat(&env, "focusfury", 100);
    env.deck()
        .args(["session", "play", "focusfury", "--name", "Focus Fury", "--seconds", "1"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(r#""outcome":"locked""#))
        .stdout(predicate::str::contains("Focus Fury is currently running"));
}

#[test]
fn test_play_refused_human_notice() {
    let env = TestEnv::new();
    write_heartbeat(&env, "triage", 100);
    env.deck()
        .args(["session", "play", "triage", "-H", "--seconds", "1"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Game Active in Another Tab"))
        .stdout(predicate::str::contains("[Go Back] [Retry]"));
}

#[test]
fn test_stale_heartbeat_is_claimed() {
    let env = TestEnv::new();
    write_heartbeat(&env, "focusfury", 10_000);
    let result = env.json(&["session", "play", "focusfury", "--seconds", "1"]);
    assert_eq!(result["outcome"], "released");
}

#[test]
fn test_threshold_flag_changes_staleness() {
    let env = TestEnv::new();
    write_heartbeat(&env, "focusfury", 2_000);
    let result = env.json(&[
        "session",
        "play",
        "focusfury",
        "--seconds",
        "1",
        "--interval-ms",
        "200",
        "--threshold-ms",
        "1000",
    ]);
    assert_eq!(result["outcome"], "released");
}

#[test]
fn test_second_process_sees_live_session() {
    let env = TestEnv::new();
    let mut holder = env
        .deck_process()
        .args(["session", "play", "focusfury", "--seconds", "3"])
        .stdout(std::process::Stdio::null())
        .spawn()
        .unwrap();
    thread::sleep(Duration::from_millis(1200));

    let status = env.json(&["session", "status", "focusfury"]);
    assert_eq!(status["held"], true);

    env.deck()
        .args(["session", "play", "focusfury", "--seconds", "1"])
        .assert()
        .code(1);

    assert!(holder.wait().unwrap().success());
}
