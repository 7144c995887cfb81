//! `deck config show` and `deck system info`.

use super::{Context, Output, json};
use crate::config::{Resolved, ValueSource};
use crate::progress::STORAGE_KEY;
use crate::storage::StorageBackend;
use crate::Result;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
pub struct ConfigEntry {
    pub key: &'static str,
    pub value: Value,
    pub source: String,
}

impl ConfigEntry {
    fn new<T: Serialize>(key: &'static str, resolved: &Resolved<T>) -> Self {
        Self {
            key,
            value: serde_json::to_value(&resolved.value).unwrap_or(Value::Null),
            source: resolved.source.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct ConfigView {
    pub path: String,
    pub exists: bool,
    pub entries: Vec<ConfigEntry>,
}

impl Output for ConfigView {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Config file: {}{}",
            self.path,
            if self.exists { "" } else { " (not found)" }
        )];
        for entry in &self.entries {
            lines.push(format!("  {} = {} ({})", entry.key, entry.value, entry.source));
        }
        lines.join("\n")
    }
}

pub fn config_show(ctx: &Context) -> Result<ConfigView> {
    let config = ctx.config();
    let limit = match &config.operation_limit {
        Some(resolved) => ConfigEntry::new("operation-limit", resolved),
        None => ConfigEntry {
            key: "operation-limit",
            value: Value::Null,
            source: ValueSource::Default.to_string(),
        },
    };
    Ok(ConfigView {
        path: config.path.display().to_string(),
        exists: config.path.exists(),
        entries: vec![
            ConfigEntry::new("output-format", &config.output_format),
            ConfigEntry::new("heartbeat-interval-ms", &config.heartbeat_interval_ms),
            ConfigEntry::new("stale-threshold-ms", &config.stale_threshold_ms),
            limit,
            ConfigEntry::new("action-log", &config.action_log),
        ],
    })
}

#[derive(Serialize)]
pub struct SystemInfo {
    pub version: &'static str,
    pub build_timestamp: &'static str,
    pub git_commit: &'static str,
    pub data_dir: String,
    pub storage_backend: String,
    pub storage_location: String,
    pub storage_available: bool,
    pub progress_key: &'static str,
    pub config_path: String,
}

impl Output for SystemInfo {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        [
            format!("deck {} ({}, built {})", self.version, self.git_commit, self.build_timestamp),
            format!("Data dir: {}", self.data_dir),
            format!(
                "Storage: {} at {}{}",
                self.storage_backend,
                self.storage_location,
                if self.storage_available { "" } else { " (unavailable)" }
            ),
            format!("Progress key: {}", self.progress_key),
            format!("Config: {}", self.config_path),
        ]
        .join("\n")
    }
}

pub fn system_info(ctx: &Context) -> Result<SystemInfo> {
    let storage = ctx.storage();
    Ok(SystemInfo {
        version: env!("CARGO_PKG_VERSION"),
        build_timestamp: env!("DECK_BUILD_TIMESTAMP"),
        git_commit: env!("DECK_GIT_COMMIT"),
        data_dir: ctx.data_dir().display().to_string(),
        storage_backend: storage.backend().backend_type().to_string(),
        storage_location: storage.backend().location(),
        storage_available: storage.is_available(),
        progress_key: STORAGE_KEY,
        config_path: ctx.config().path.display().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;

    #[test]
    fn test_config_show_defaults() {
        let (_dir, ctx) = context();
        let view = config_show(&ctx).unwrap();
        assert!(!view.exists);
        assert_eq!(view.entries.len(), 5);
        assert_eq!(view.entries[0].value, Value::String("json".to_string()));
        assert!(view.entries.iter().all(|e| e.source == "default"));
    }

    #[test]
    fn test_system_info() {
        let (dir, ctx) = context();
        let info = system_info(&ctx).unwrap();
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(info.storage_backend, "file");
        assert!(info.storage_available);
        assert_eq!(info.data_dir, dir.path().display().to_string());
    }
}
