//! Audit trail of `deck` invocations.
//!
//! Each command appends one JSON line to `<data_dir>/action.log`. Logging
//! never fails a command: problems are reported as warnings and skipped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const ACTION_LOG_FILE: &str = "action.log";

const MAX_STRING_LEN: usize = 100;
const MAX_ARRAY_LEN: usize = 10;

/// A single action log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub timestamp: DateTime<Utc>,

    /// Command name (e.g., "progress collect", "session play")
    pub command: String,

    pub args: Value,

    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub duration_ms: u64,

    /// User who ran the command
    pub user: String,
}

pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(ACTION_LOG_FILE)
}

/// Append an entry for a finished command.
pub fn log_action(
    data_dir: &Path,
    command: &str,
    args: Value,
    success: bool,
    error: Option<String>,
    duration_ms: u64,
) {
    let entry = ActionLog {
        timestamp: Utc::now(),
        command: command.to_string(),
        args: sanitize_args(&args),
        success,
        error,
        duration_ms,
        user: current_user(),
    };

    let path = log_path(data_dir);
    if let Err(e) = append_entry(&path, &entry) {
        tracing::warn!(path = %path.display(), error = %e, "failed to write action log");
    }
}

/// Read every parseable entry, oldest first. Malformed lines are skipped.
pub fn read_entries(data_dir: &Path) -> crate::Result<Vec<ActionLog>> {
    let path = log_path(data_dir);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(&path)?;
    Ok(content
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect())
}

fn append_entry(path: &Path, entry: &ActionLog) -> crate::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string(entry)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", json)?;
    Ok(())
}

/// Redact secrets, shorten long strings and summarize large arrays.
fn sanitize_args(args: &Value) -> Value {
    match args {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let lower = key.to_lowercase();
                    let value = if ["password", "token", "secret"]
                        .iter()
                        .any(|word| lower.contains(word))
                    {
                        Value::String("[REDACTED]".to_string())
                    } else {
                        sanitize_args(value)
                    };
                    (key.clone(), value)
                })
                .collect(),
        ),
        Value::Array(items) if items.len() > MAX_ARRAY_LEN => {
            Value::String(format!("[Array with {} items]", items.len()))
        }
        Value::Array(items) => Value::Array(items.iter().map(sanitize_args).collect()),
        Value::String(s) if s.chars().count() > MAX_STRING_LEN => {
            let head: String = s.chars().take(MAX_STRING_LEN - 3).collect();
            Value::String(format!("{}... ({} chars)", head, s.chars().count()))
        }
        _ => args.clone(),
    }
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_log_action_appends_lines() {
        let dir = TempDir::new().unwrap();
        log_action(dir.path(), "progress collect", json!({"card": "meal_planner"}), true, None, 3);
        log_action(
            dir.path(),
            "agents show",
            json!({"id": "nope"}),
            false,
            Some("Entity not found: nope".to_string()),
            1,
        );

        let entries = read_entries(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].command, "progress collect");
        assert_eq!(entries[0].args["card"], "meal_planner");
        assert!(entries[0].success);
        assert!(!entries[1].success);
        assert_eq!(entries[1].error.as_deref(), Some("Entity not found: nope"));
    }

    #[test]
    fn test_read_entries_missing_log() {
        let dir = TempDir::new().unwrap();
        assert!(read_entries(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_error_field_omitted_on_success() {
        let dir = TempDir::new().unwrap();
        log_action(dir.path(), "progress show", json!({}), true, None, 0);
        let raw = fs::read_to_string(log_path(dir.path())).unwrap();
        assert!(!raw.contains("\"error\""));
    }

    #[test]
    fn test_sanitize_long_string() {
        let sanitized = sanitize_args(&json!("a".repeat(150)));
        assert!(sanitized.as_str().unwrap().ends_with("... (150 chars)"));
    }

    #[test]
    fn test_sanitize_sensitive_keys() {
        let sanitized = sanitize_args(&json!({
            "game": "focusfury",
            "api_token": "abc123",
            "keys": ["triageBest"]
        }));
        assert_eq!(sanitized["game"], "focusfury");
        assert_eq!(sanitized["api_token"], "[REDACTED]");
        assert_eq!(sanitized["keys"], json!(["triageBest"]));
    }

    #[test]
    fn test_sanitize_large_array() {
        let cards: Vec<String> = (0..15).map(|i| format!("card_{}", i)).collect();
        let sanitized = sanitize_args(&json!({ "cards": cards }));
        assert_eq!(sanitized["cards"], "[Array with 15 items]");
    }
}
