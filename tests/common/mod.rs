//! Common test utilities for deck integration tests.
//!
//! `TestEnv` keeps every invocation away from the user's real data and
//! config directories.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;
pub use tempfile::TempDir;

/// Environment variables that would leak the host's settings into a test.
const DECK_ENV: &[&str] = &[
    "DECK_HEARTBEAT_INTERVAL_MS",
    "DECK_STALE_THRESHOLD_MS",
    "DECK_OPERATION_LIMIT",
    "DECK_ACTION_LOG",
    "DECK_LOG",
    "DECK_LOG_FORMAT",
];

/// A test environment with isolated data and config directories.
///
/// `deck()` sets `DECK_DATA_DIR` and `DECK_CONFIG_DIR` per command, so
/// tests stay parallel-safe.
pub struct TestEnv {
    pub data_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// A Command for the deck binary bound to this environment.
    pub fn deck(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_deck"));
        cmd.env("DECK_DATA_DIR", self.data_dir.path());
        cmd.env("DECK_CONFIG_DIR", self.config_dir.path());
        for name in DECK_ENV {
            cmd.env_remove(name);
        }
        cmd
    }

    /// The same binary as a plain std process, for long-running commands.
    pub fn deck_process(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(env!("CARGO_BIN_EXE_deck"));
        cmd.env("DECK_DATA_DIR", self.data_dir.path());
        cmd.env("DECK_CONFIG_DIR", self.config_dir.path());
        for name in DECK_ENV {
            cmd.env_remove(name);
        }
        cmd
    }

    pub fn data_path(&self) -> &Path {
        self.data_dir.path()
    }

    pub fn config_path(&self) -> &Path {
        self.config_dir.path()
    }

    /// Write config.kdl into the config directory.
    pub fn write_config(&self, content: &str) {
        std::fs::write(self.config_dir.path().join("config.kdl"), content).unwrap();
    }

    /// Run `args` and parse stdout as JSON.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.deck().args(args).output().unwrap();
        assert!(
            output.status.success(),
            "deck {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
