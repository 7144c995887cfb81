//! Precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Environment variables (`DECK_*`)
//! 3. config.kdl
//! 4. Built-in defaults

use super::schema::{DeckConfig, OutputFormat, validate_timing};
use crate::session::{DEFAULT_HEARTBEAT_INTERVAL, DEFAULT_STALE_THRESHOLD, LockConfig};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "DECK_CONFIG_DIR";
pub const HEARTBEAT_INTERVAL_ENV: &str = "DECK_HEARTBEAT_INTERVAL_MS";
pub const STALE_THRESHOLD_ENV: &str = "DECK_STALE_THRESHOLD_MS";
pub const OPERATION_LIMIT_ENV: &str = "DECK_OPERATION_LIMIT";
pub const ACTION_LOG_ENV: &str = "DECK_ACTION_LOG";

pub const CONFIG_FILE_NAME: &str = "config.kdl";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from config.kdl
    File,
    /// Value from CLI flag
    CliFlag,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::File => write!(f, "file"),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The config file consulted, whether or not it exists
    pub path: PathBuf,
    pub output_format: Resolved<OutputFormat>,
    pub heartbeat_interval_ms: Resolved<u64>,
    pub stale_threshold_ms: Resolved<u64>,
    /// `None` means operations keep unlocking without bound
    pub operation_limit: Option<Resolved<u32>>,
    pub action_log: Resolved<bool>,
}

impl ResolvedConfig {
    /// Built-in defaults for a config file at `path`.
    pub fn defaults(path: PathBuf) -> Self {
        Self {
            path,
            output_format: Resolved::new(OutputFormat::Json, ValueSource::Default),
            heartbeat_interval_ms: Resolved::new(
                DEFAULT_HEARTBEAT_INTERVAL.as_millis() as u64,
                ValueSource::Default,
            ),
            stale_threshold_ms: Resolved::new(
                DEFAULT_STALE_THRESHOLD.as_millis() as u64,
                ValueSource::Default,
            ),
            operation_limit: None,
            action_log: Resolved::new(true, ValueSource::Default),
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format.value
    }

    pub fn operation_limit(&self) -> Option<u32> {
        self.operation_limit.as_ref().map(|r| r.value)
    }

    pub fn action_log_enabled(&self) -> bool {
        self.action_log.value
    }

    /// Session lock timing from the resolved values.
    pub fn lock_config(&self) -> LockConfig {
        LockConfig {
            heartbeat_interval: Duration::from_millis(self.heartbeat_interval_ms.value),
            stale_threshold: Duration::from_millis(self.stale_threshold_ms.value),
        }
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub output_format: Option<OutputFormat>,
    pub heartbeat_interval_ms: Option<u64>,
    pub stale_threshold_ms: Option<u64>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn with_heartbeat_interval_ms(mut self, interval: u64) -> Self {
        self.heartbeat_interval_ms = Some(interval);
        self
    }

    pub fn with_stale_threshold_ms(mut self, threshold: u64) -> Self {
        self.stale_threshold_ms = Some(threshold);
        self
    }
}

/// Resolve the config directory: `DECK_CONFIG_DIR`, else the platform
/// config directory joined with `agentdeck`.
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = env_value(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let base = dirs::config_dir()
        .ok_or_else(|| Error::Other("Could not determine config directory".to_string()))?;
    Ok(base.join("agentdeck"))
}

/// Path to config.kdl.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load and validate config.kdl. A missing file is an empty config.
pub fn load_config(path: &Path) -> Result<DeckConfig> {
    if !path.exists() {
        return Ok(DeckConfig::new());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    let doc: kdl::KdlDocument = content
        .parse()
        .map_err(|e| Error::Config(format!("Failed to parse KDL in {}: {}", path.display(), e)))?;

    let config = DeckConfig::from_kdl(&doc);
    config
        .validate()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(config)
}

/// Resolve configuration with the full precedence chain.
pub fn resolve_config(path: &Path, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let file = load_config(path)?;
    let mut result = ResolvedConfig::defaults(path.to_path_buf());

    // Resolve output_format
    if let Some(format) = overrides.output_format {
        result.output_format = Resolved::new(format, ValueSource::CliFlag);
    } else if let Some(format) = file.output_format {
        result.output_format = Resolved::new(format, ValueSource::File);
    }

    resolve_number(
        &mut result.heartbeat_interval_ms,
        overrides.heartbeat_interval_ms,
        HEARTBEAT_INTERVAL_ENV,
        file.heartbeat_interval_ms,
    )?;
    resolve_number(
        &mut result.stale_threshold_ms,
        overrides.stale_threshold_ms,
        STALE_THRESHOLD_ENV,
        file.stale_threshold_ms,
    )?;
    validate_timing(
        result.heartbeat_interval_ms.value,
        result.stale_threshold_ms.value,
    )
    .map_err(Error::Config)?;

    // Resolve operation_limit
    if let Some(raw) = env_value(OPERATION_LIMIT_ENV) {
        let limit = parse_env::<u32>(OPERATION_LIMIT_ENV, &raw)?;
        if limit == 0 {
            return Err(Error::Config(format!("{} must be at least 1", OPERATION_LIMIT_ENV)));
        }
        result.operation_limit = Some(Resolved::new(
            limit,
            ValueSource::EnvVar(OPERATION_LIMIT_ENV.to_string()),
        ));
    } else if let Some(limit) = file.operation_limit {
        result.operation_limit = Some(Resolved::new(limit, ValueSource::File));
    }

    // Resolve action_log
    if let Some(raw) = env_value(ACTION_LOG_ENV) {
        let enabled = match raw.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                return Err(Error::Config(format!(
                    "{} must be true or false, got '{}'",
                    ACTION_LOG_ENV, raw
                )));
            }
        };
        result.action_log = Resolved::new(enabled, ValueSource::EnvVar(ACTION_LOG_ENV.to_string()));
    } else if let Some(enabled) = file.action_log {
        result.action_log = Resolved::new(enabled, ValueSource::File);
    }

    Ok(result)
}

fn resolve_number(
    target: &mut Resolved<u64>,
    cli: Option<u64>,
    env_name: &str,
    file: Option<u64>,
) -> Result<()> {
    if let Some(value) = cli {
        *target = Resolved::new(value, ValueSource::CliFlag);
    } else if let Some(raw) = env_value(env_name) {
        let value = parse_env(env_name, &raw)?;
        *target = Resolved::new(value, ValueSource::EnvVar(env_name.to_string()));
    } else if let Some(value) = file {
        *target = Resolved::new(value, ValueSource::File);
    }
    Ok(())
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| Error::Config(format!("{} must be a non-negative integer, got '{}'", name, raw)))
}
