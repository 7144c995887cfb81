//! Command implementations for the `deck` CLI.
//!
//! Commands are organized by concern:
//! - `progress` - Progression store mutations and views
//! - `agents` - Catalog browsing
//! - `session` - Active-session locks
//! - `score` - Game high scores
//! - `watch` - Cross-process change detection
//! - `system` - Configuration and build information

mod agents;
mod progress;
mod score;
mod session;
mod system;
mod watch;

pub use agents::{AgentDetail, AgentList, AgentSummary, agents_list, agents_show};
pub use progress::{
    AchieveResult, CollectResult, CompleteResult, MissionResult, ProgressView, RankView,
    ResetResult, Summary, UnlockResult, XpResult, progress_achieve, progress_collect,
    progress_complete, progress_mission, progress_rank, progress_reset, progress_show,
    progress_unlock, progress_xp, summary,
};
pub use score::{ScoreSubmitted, ScoreView, score_show, score_submit};
pub use session::{PlayOutcome, PlayResult, SessionStatusView, session_play, session_status};
pub use system::{ConfigEntry, ConfigView, SystemInfo, config_show, system_info};
pub use watch::{WatchResult, watch};

use crate::config::ResolvedConfig;
use crate::progress::ProgressStore;
use crate::storage::SafeStorage;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Serialize a result for JSON output.
pub(crate) fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

/// Everything a command needs: where data lives and the resolved config.
#[derive(Debug, Clone)]
pub struct Context {
    data_dir: PathBuf,
    config: ResolvedConfig,
}

impl Context {
    pub fn new(data_dir: PathBuf, config: ResolvedConfig) -> Self {
        Self { data_dir, config }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Storage on the data directory. Falls back to memory if it is unusable.
    pub fn storage(&self) -> SafeStorage {
        SafeStorage::open_or_memory(&self.data_dir)
    }

    /// The progression store, with the configured operation limit applied.
    pub fn progress(&self) -> ProgressStore {
        ProgressStore::initialize(self.storage()).with_operation_limit(self.config.operation_limit())
    }
}
