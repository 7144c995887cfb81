//! Cross-tab change detection for watched keys.
//!
//! A [`CrossTabSync`] listens to the storage change feed and flags itself
//! stale when another tab modifies one of the keys it watches, so a consumer
//! can re-read instead of overwriting the other tab's data.

use super::{SafeStorage, StorageEvent, Subscription};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Score keys written by the games; the default watch list.
pub const GAME_SCORE_KEYS: &[&str] = &[
    "focusfury_best",
    "deepwork_best",
    "calendarBest",
    "triageBest",
    "captainClickHighScore",
];

/// A watched key changed underneath us.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub key: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub timestamp: DateTime<Utc>,
}

type ConflictHandler = Box<dyn FnMut(&Conflict) + Send>;

/// Watches a set of keys for modifications by other tabs.
pub struct CrossTabSync {
    keys: Vec<String>,
    subscription: Option<Subscription>,
    stale: bool,
    last_sync: DateTime<Utc>,
    on_conflict: Option<ConflictHandler>,
}

impl CrossTabSync {
    /// Start watching `keys` on `storage`.
    ///
    /// A key matches an event when the event key equals it or contains it,
    /// so `"best"` watches every `*_best` key.
    pub fn new<I, S>(storage: &SafeStorage, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            subscription: storage.subscribe(),
            stale: false,
            last_sync: Utc::now(),
            on_conflict: None,
        }
    }

    /// Watch the default game score keys.
    pub fn for_game_scores(storage: &SafeStorage) -> Self {
        Self::new(storage, GAME_SCORE_KEYS.iter().copied())
    }

    /// Register a callback invoked once per detected conflict.
    pub fn with_conflict_handler(mut self, handler: impl FnMut(&Conflict) + Send + 'static) -> Self {
        self.on_conflict = Some(Box::new(handler));
        self
    }

    /// Keys being watched.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Whether a watched key changed since the last [`sync_state`](Self::sync_state).
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// When the last conflict or sync happened.
    pub fn last_sync(&self) -> DateTime<Utc> {
        self.last_sync
    }

    /// Whether the change feed is still attached.
    pub fn is_connected(&self) -> bool {
        self.subscription.is_some()
    }

    /// Process pending change events and return the conflicts among them.
    pub fn poll(&mut self) -> Vec<Conflict> {
        let events = match &self.subscription {
            Some(sub) => sub.drain(),
            None => return Vec::new(),
        };
        events
            .into_iter()
            .filter_map(|event| self.handle(event))
            .collect()
    }

    /// Wait up to `timeout` for the next conflict.
    pub fn wait(&mut self, timeout: std::time::Duration) -> Option<Conflict> {
        let event = self.subscription.as_ref()?.next_timeout(timeout)?;
        self.handle(event)
    }

    /// Acknowledge the change: the consumer has re-read its state.
    pub fn sync_state(&mut self) {
        self.stale = false;
        self.last_sync = Utc::now();
    }

    /// Stop listening. Later polls report nothing.
    pub fn disconnect(&mut self) {
        self.subscription = None;
    }

    fn handle(&mut self, event: StorageEvent) -> Option<Conflict> {
        if event.key.is_empty() || !self.watches(&event.key) {
            return None;
        }

        tracing::warn!(key = %event.key, "key modified by another tab");
        let now = Utc::now();
        self.stale = true;
        self.last_sync = now;

        let conflict = Conflict {
            key: event.key,
            old_value: event.old_value,
            new_value: event.new_value,
            timestamp: now,
        };
        if let Some(handler) = self.on_conflict.as_mut() {
            handler(&conflict);
        }
        Some(conflict)
    }

    fn watches(&self, key: &str) -> bool {
        self.keys
            .iter()
            .any(|watched| key == watched || key.contains(watched.as_str()))
    }
}

impl std::fmt::Debug for CrossTabSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossTabSync")
            .field("keys", &self.keys)
            .field("stale", &self.stale)
            .field("connected", &self.subscription.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::test_utils::memory_storage;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_watched_key_change_marks_stale() {
        let tab_a = MemoryStore::new();
        let tab_b = tab_a.connect();
        let mut sync = CrossTabSync::for_game_scores(&memory_storage(&tab_a));

        memory_storage(&tab_b).set_string("triageBest", "{\"score\":9}");

        let conflicts = sync.poll();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].key, "triageBest");
        assert_eq!(conflicts[0].new_value.as_deref(), Some("{\"score\":9}"));
        assert!(sync.is_stale());

        sync.sync_state();
        assert!(!sync.is_stale());
    }

    #[test]
    fn test_unwatched_key_is_ignored() {
        let tab_a = MemoryStore::new();
        let tab_b = tab_a.connect();
        let mut sync = CrossTabSync::for_game_scores(&memory_storage(&tab_a));

        memory_storage(&tab_b).set_string("cookie_consent", "accepted");

        assert!(sync.poll().is_empty());
        assert!(!sync.is_stale());
    }

    #[test]
    fn test_substring_match() {
        let tab_a = MemoryStore::new();
        let tab_b = tab_a.connect();
        let mut sync = CrossTabSync::new(&memory_storage(&tab_a), ["_best"]);

        memory_storage(&tab_b).set_string("focusfury_best", "12");
        assert_eq!(sync.poll().len(), 1);
    }

    #[test]
    fn test_own_writes_do_not_conflict() {
        let tab_a = MemoryStore::new();
        let storage = memory_storage(&tab_a);
        let mut sync = CrossTabSync::for_game_scores(&storage);

        storage.set_string("deepwork_best", "3");
        assert!(sync.poll().is_empty());
    }

    #[test]
    fn test_conflict_handler_called() {
        let tab_a = MemoryStore::new();
        let tab_b = tab_a.connect();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut sync = CrossTabSync::for_game_scores(&memory_storage(&tab_a))
            .with_conflict_handler(move |c| sink.lock().unwrap().push(c.key.clone()));

        let other = memory_storage(&tab_b);
        other.set_string("calendarBest", "1");
        other.remove("calendarBest");
        sync.poll();

        assert_eq!(*seen.lock().unwrap(), vec!["calendarBest", "calendarBest"]);
    }

    #[test]
    fn test_disconnect_stops_reporting() {
        let tab_a = MemoryStore::new();
        let tab_b = tab_a.connect();
        let mut sync = CrossTabSync::for_game_scores(&memory_storage(&tab_a));

        sync.disconnect();
        memory_storage(&tab_b).set_string("triageBest", "1");

        assert!(!sync.is_connected());
        assert!(sync.poll().is_empty());
    }
}
