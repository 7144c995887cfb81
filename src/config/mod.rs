//! Configuration for agentdeck.
//!
//! ## config.kdl
//!
//! Located at `$DECK_CONFIG_DIR/config.kdl`, or `~/.config/agentdeck/config.kdl`.
//!
//! Contains:
//! - `output-format` - "json" or "human"
//! - `heartbeat-interval-ms` - Session heartbeat period (default 1000)
//! - `stale-threshold-ms` - Heartbeat age that frees a session (default 3000)
//! - `operation-limit` - Last operation that can be unlocked (default unbounded)
//! - `action-log` - Whether to record CLI invocations (default #true)
//!
//! ## Precedence
//!
//! CLI flag > environment variable > config.kdl > defaults
//!
//! Use the [`resolver`] module for precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    ACTION_LOG_ENV, CONFIG_DIR_ENV, CONFIG_FILE_NAME, ConfigOverrides, HEARTBEAT_INTERVAL_ENV,
    OPERATION_LIMIT_ENV, Resolved, ResolvedConfig, STALE_THRESHOLD_ENV, ValueSource, config_dir,
    config_path, load_config, resolve_config,
};
pub use schema::{DeckConfig, OutputFormat, validate_timing};
