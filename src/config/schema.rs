//! KDL schema for config.kdl.
//!
//! ```kdl
//! output-format "human"      // or "json"
//! heartbeat-interval-ms 1000
//! stale-threshold-ms 3000
//! operation-limit 16         // omit to keep unlocking forever
//! action-log #false
//! ```

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Preferences stored in config.kdl. Every field is optional; unset fields
/// fall through to the environment and then the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckConfig {
    pub output_format: Option<OutputFormat>,

    /// How often an owned session rewrites its heartbeat
    pub heartbeat_interval_ms: Option<u64>,

    /// Age after which a heartbeat no longer holds a session
    pub stale_threshold_ms: Option<u64>,

    /// Highest operation number completing an operation may unlock
    pub operation_limit: Option<u32>,

    /// Whether CLI invocations are appended to the action log
    pub action_log: Option<bool>,
}

impl DeckConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate each value on its own. The interval/threshold relation
    /// depends on the environment and CLI flags too, so it is checked on
    /// the resolved values by `resolve_config`.
    pub fn validate(&self) -> Result<(), String> {
        if self.heartbeat_interval_ms == Some(0) {
            return Err("heartbeat-interval-ms must be greater than 0".to_string());
        }
        if self.stale_threshold_ms == Some(0) {
            return Err("stale-threshold-ms must be greater than 0".to_string());
        }
        if let Some(limit) = self.operation_limit {
            if limit == 0 {
                return Err("operation-limit must be at least 1".to_string());
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document. Values of the wrong type are ignored.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        if let Some(s) = string_arg(doc, "output-format") {
            config.output_format = OutputFormat::parse(&s);
        }
        if let Some(i) = integer_arg(doc, "heartbeat-interval-ms") {
            config.heartbeat_interval_ms = u64::try_from(i).ok();
        }
        if let Some(i) = integer_arg(doc, "stale-threshold-ms") {
            config.stale_threshold_ms = u64::try_from(i).ok();
        }
        if let Some(i) = integer_arg(doc, "operation-limit") {
            config.operation_limit = u32::try_from(i).ok();
        }
        if let Some(node) = doc.get("action-log") {
            config.action_log = node.entries().first().and_then(|e| e.value().as_bool());
        }

        config
    }

    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(format) = self.output_format {
            push_node(&mut doc, "output-format", KdlValue::String(format.as_str().to_string()));
        }
        if let Some(interval) = self.heartbeat_interval_ms {
            push_node(&mut doc, "heartbeat-interval-ms", KdlValue::Integer(interval as i128));
        }
        if let Some(threshold) = self.stale_threshold_ms {
            push_node(&mut doc, "stale-threshold-ms", KdlValue::Integer(threshold as i128));
        }
        if let Some(limit) = self.operation_limit {
            push_node(&mut doc, "operation-limit", KdlValue::Integer(limit as i128));
        }
        if let Some(enabled) = self.action_log {
            push_node(&mut doc, "action-log", KdlValue::Bool(enabled));
        }

        doc
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &DeckConfig) {
        if other.output_format.is_some() {
            self.output_format = other.output_format;
        }
        if other.heartbeat_interval_ms.is_some() {
            self.heartbeat_interval_ms = other.heartbeat_interval_ms;
        }
        if other.stale_threshold_ms.is_some() {
            self.stale_threshold_ms = other.stale_threshold_ms;
        }
        if other.operation_limit.is_some() {
            self.operation_limit = other.operation_limit;
        }
        if other.action_log.is_some() {
            self.action_log = other.action_log;
        }
    }
}

/// The heartbeat interval must be positive and shorter than the threshold,
/// otherwise an owner's own heartbeat would go stale between beats.
pub fn validate_timing(interval_ms: u64, threshold_ms: u64) -> Result<(), String> {
    if interval_ms == 0 {
        return Err("heartbeat-interval-ms must be greater than 0".to_string());
    }
    if threshold_ms <= interval_ms {
        return Err(format!(
            "stale-threshold-ms ({}) must be greater than heartbeat-interval-ms ({})",
            threshold_ms, interval_ms
        ));
    }
    Ok(())
}

fn string_arg(doc: &KdlDocument, name: &str) -> Option<String> {
    doc.get(name)?
        .entries()
        .first()
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn integer_arg(doc: &KdlDocument, name: &str) -> Option<i128> {
    doc.get(name)?.entries().first().and_then(|e| e.value().as_integer())
}

fn push_node(doc: &mut KdlDocument, name: &str, value: KdlValue) {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(value));
    doc.nodes_mut().push(node);
}
