//! Active-session locking.
//!
//! A session (one game, one quiz) may only be played in one tab at a time.
//! The tab that owns it keeps a heartbeat timestamp fresh under
//! `<session_id>_activeTab`; any other tab that finds a fresh heartbeat, or
//! sees a newer one written, considers the session locked.
//!
//! The mechanism is best effort and fails open: if storage is unavailable
//! nothing is ever locked.

mod gate;
mod lock;
mod worker;

pub use gate::{DEFAULT_GAME_NAME, GateAction, LOCK_HINT, LOCK_TITLE, LockNotice};
pub use lock::SessionLock;
pub use worker::HeartbeatWorker;

use crate::storage::SafeStorage;
use serde::Serialize;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Suffix appended to a session id to form its heartbeat key.
pub const HEARTBEAT_SUFFIX: &str = "_activeTab";

/// How often an owning tab rewrites its heartbeat.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(1000);

/// Heartbeats older than this no longer hold the session.
pub const DEFAULT_STALE_THRESHOLD: Duration = Duration::from_millis(3000);

/// Storage key holding the heartbeat for `session_id`.
pub fn heartbeat_key(session_id: &str) -> String {
    format!("{}{}", session_id, HEARTBEAT_SUFFIX)
}

/// Source of "now" in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(start_millis),
        }
    }

    pub fn advance(&self, by: Duration) {
        let millis = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Lock timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockConfig {
    pub heartbeat_interval: Duration,
    pub stale_threshold: Duration,
}

impl LockConfig {
    pub fn stale_threshold_millis(&self) -> i64 {
        i64::try_from(self.stale_threshold.as_millis()).unwrap_or(i64::MAX)
    }

    /// Whether a heartbeat written at `heartbeat_at` still holds the session at `now`.
    pub fn is_fresh(&self, heartbeat_at: i64, now: i64) -> bool {
        now.saturating_sub(heartbeat_at) < self.stale_threshold_millis()
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            stale_threshold: DEFAULT_STALE_THRESHOLD,
        }
    }
}

/// Where a [`SessionLock`] stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    /// Not mounted, or mounted without having claimed anything yet
    Unclaimed,
    /// This handle holds the session and keeps its heartbeat fresh
    Owned,
    /// Another tab holds the session
    Locked,
}

impl LockState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockState::Unclaimed => "unclaimed",
            LockState::Owned => "owned",
            LockState::Locked => "locked",
        }
    }
}

impl std::fmt::Display for LockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of a session's heartbeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub key: String,
    /// Whether a fresh heartbeat currently holds the session
    pub held: bool,
    pub heartbeat_at: Option<i64>,
    pub age_ms: Option<i64>,
    pub stale_threshold_ms: i64,
}

/// Parse a stored heartbeat. Anything but an integer counts as absent.
pub(crate) fn parse_heartbeat(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Look at a session's heartbeat without claiming or changing anything.
pub fn inspect(
    storage: &SafeStorage,
    session_id: &str,
    clock: &dyn Clock,
    config: LockConfig,
) -> SessionStatus {
    let key = heartbeat_key(session_id);
    let now = clock.now_millis();
    let heartbeat_at = storage.get_string(&key).as_deref().and_then(parse_heartbeat);

    SessionStatus {
        session_id: session_id.to_string(),
        held: heartbeat_at.is_some_and(|at| config.is_fresh(at, now)),
        age_ms: heartbeat_at.map(|at| now.saturating_sub(at)),
        heartbeat_at,
        key,
        stale_threshold_ms: config.stale_threshold_millis(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::test_utils::memory_storage;

    #[test]
    fn test_heartbeat_key() {
        assert_eq!(heartbeat_key("demo"), "demo_activeTab");
    }

    #[test]
    fn test_default_timing() {
        let config = LockConfig::default();
        assert_eq!(config.heartbeat_interval, Duration::from_millis(1000));
        assert_eq!(config.stale_threshold_millis(), 3000);
    }

    #[test]
    fn test_is_fresh_boundary() {
        let config = LockConfig::default();
        assert!(config.is_fresh(10_000, 12_999));
        assert!(!config.is_fresh(10_000, 13_000));
        // A heartbeat from the future is fresh
        assert!(config.is_fresh(20_000, 10_000));
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(1_000);
        clock.advance(Duration::from_millis(500));
        assert_eq!(clock.now_millis(), 1_500);
        clock.set(42);
        assert_eq!(clock.now_millis(), 42);
    }

    #[test]
    fn test_parse_heartbeat() {
        assert_eq!(parse_heartbeat("1700000000000"), Some(1_700_000_000_000));
        assert_eq!(parse_heartbeat(" 12 "), Some(12));
        assert_eq!(parse_heartbeat("soon"), None);
        assert_eq!(parse_heartbeat(""), None);
    }

    #[test]
    fn test_inspect() {
        let store = MemoryStore::new();
        let storage = memory_storage(&store);
        let clock = ManualClock::new(50_000);
        let config = LockConfig::default();

        let status = inspect(&storage, "demo", &clock, config);
        assert!(!status.held);
        assert_eq!(status.heartbeat_at, None);
        assert_eq!(status.age_ms, None);

        storage.set_string("demo_activeTab", "49000");
        let status = inspect(&storage, "demo", &clock, config);
        assert!(status.held);
        assert_eq!(status.age_ms, Some(1_000));

        clock.advance(Duration::from_millis(2_500));
        assert!(!inspect(&storage, "demo", &clock, config).held);
    }

    #[test]
    fn test_lock_state_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&LockState::Locked).unwrap(), "\"locked\"");
        assert_eq!(LockState::Owned.to_string(), "owned");
    }
}
