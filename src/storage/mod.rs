//! Storage layer for agentdeck data.
//!
//! This module handles persistence of progression state, session heartbeats
//! and scores.
//!
//! ## Storage Backends
//!
//! - **File backend** (default): one file per key at `~/.local/share/agentdeck/kv/`
//! - **Memory backend**: a shared in-process medium, each handle acting as a tab
//!
//! Higher layers never talk to a backend directly. They go through
//! [`SafeStorage`], which absorbs backend failures: reads fall back to an
//! in-memory copy, writes report `false` instead of erroring, and each key
//! logs its first failure only.

pub mod backend;
pub mod file;
pub mod memory;
pub mod sync;

pub use backend::{BackendType, StorageBackend, StorageEvent, Subscription};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use sync::{Conflict, CrossTabSync, GAME_SCORE_KEYS};

use crate::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "DECK_DATA_DIR";

/// Key written and removed by [`SafeStorage::is_available`].
const AVAILABILITY_KEY: &str = "__storage_test__";

/// Resolve the data directory.
///
/// Priority: explicit path (the `--data-dir` flag) > `DECK_DATA_DIR` > the
/// platform data directory joined with `agentdeck`.
pub fn get_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let data_dir = dirs::data_dir()
        .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))?;
    Ok(data_dir.join("agentdeck"))
}

/// Failure-absorbing access to a storage backend.
///
/// Cloning shares the backend, the fallback copy and the logged-key set.
#[derive(Clone)]
pub struct SafeStorage {
    backend: Arc<dyn StorageBackend>,
    fallback: Arc<Mutex<HashMap<String, String>>>,
    logged: Arc<Mutex<HashSet<String>>>,
}

impl SafeStorage {
    /// Wrap a backend.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            fallback: Arc::new(Mutex::new(HashMap::new())),
            logged: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Open the file backend under `data_dir`.
    pub fn open_file(data_dir: &std::path::Path) -> Result<Self> {
        Ok(Self::new(Arc::new(FileStore::open(data_dir)?)))
    }

    /// Open the file backend, or fall back to a private in-memory store when
    /// the data directory cannot be used. Nothing persists in that case.
    pub fn open_or_memory(data_dir: &std::path::Path) -> Self {
        match Self::open_file(data_dir) {
            Ok(storage) => storage,
            Err(e) => {
                tracing::warn!(path = %data_dir.display(), error = %e, "data directory unavailable, progress will not be saved");
                Self::new(Arc::new(MemoryStore::new()))
            }
        }
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Whether the backend accepts a write and a removal right now.
    pub fn is_available(&self) -> bool {
        self.backend.set(AVAILABILITY_KEY, AVAILABILITY_KEY).is_ok() && self.backend.remove(AVAILABILITY_KEY).is_ok()
    }

    /// Read a raw string value.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                self.log_once(key, "Failed to read", &e);
                self.fallback_get(key)
            }
        }
    }

    /// Write a raw string value. Returns `false` if the backend rejected it;
    /// the value is then kept in memory for the rest of the process.
    pub fn set_string(&self, key: &str, value: &str) -> bool {
        match self.backend.set(key, value) {
            Ok(()) => true,
            Err(e) => {
                self.log_once(key, "Failed to write", &e);
                if let Ok(mut fallback) = self.fallback.lock() {
                    fallback.insert(key.to_string(), value.to_string());
                }
                false
            }
        }
    }

    /// Remove a key from the backend and the fallback copy.
    pub fn remove(&self, key: &str) -> bool {
        if let Ok(mut fallback) = self.fallback.lock() {
            fallback.remove(key);
        }
        match self.backend.remove(key) {
            Ok(()) => true,
            Err(e) => {
                self.log_once(key, "Failed to remove", &e);
                false
            }
        }
    }

    /// Check whether a key holds any value.
    pub fn has_key(&self, key: &str) -> bool {
        self.get_string(key).is_some()
    }

    /// Read a boolean stored as `"true"`/`"false"`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_string(key).map(|value| value == "true")
    }

    /// Write a boolean as `"true"`/`"false"`.
    pub fn set_bool(&self, key: &str, value: bool) -> bool {
        self.set_string(key, if value { "true" } else { "false" })
    }

    /// Read an integer. A non-numeric value is dropped and reported absent.
    pub fn get_number(&self, key: &str) -> Option<i64> {
        let raw = self.get_string(key)?;
        match raw.trim().parse::<i64>() {
            Ok(n) => Some(n),
            Err(e) => {
                self.log_once(key, "Invalid number value, resetting to default", &e);
                self.remove(key);
                None
            }
        }
    }

    /// Write an integer.
    pub fn set_number(&self, key: &str, value: i64) -> bool {
        self.set_string(key, &value.to_string())
    }

    /// Read and decode a JSON value. Corrupt data is dropped and reported
    /// absent.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_string(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                self.log_once(key, "Failed to parse JSON, resetting to default", &e);
                self.remove(key);
                None
            }
        }
    }

    /// Encode and write a JSON value.
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(json) => self.set_string(key, &json),
            Err(e) => {
                self.log_once(key, "Failed to stringify JSON", &e);
                false
            }
        }
    }

    /// Open a change feed, or `None` when the backend cannot provide one.
    pub fn subscribe(&self) -> Option<Subscription> {
        match self.backend.subscribe() {
            Ok(sub) => Some(sub),
            Err(e) => {
                tracing::warn!(error = %e, location = %self.backend.location(), "storage change feed unavailable");
                None
            }
        }
    }

    fn fallback_get(&self, key: &str) -> Option<String> {
        self.fallback
            .lock()
            .ok()
            .and_then(|fallback| fallback.get(key).cloned())
    }

    fn log_once(&self, key: &str, message: &str, error: &dyn std::fmt::Display) {
        let first = self
            .logged
            .lock()
            .map(|mut logged| logged.insert(key.to_string()))
            .unwrap_or(true);
        if first {
            tracing::warn!(key, error = %error, "{}", message);
        }
    }
}

impl std::fmt::Debug for SafeStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafeStorage")
            .field("backend", &self.backend.backend_type())
            .field("location", &self.backend.location())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestEnv, memory_storage};
    use serde::Deserialize;
    use serial_test::serial;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Best {
        score: i64,
        survived: bool,
    }

    #[test]
    fn test_string_roundtrip_on_file_backend() {
        let env = TestEnv::new();
        let storage = env.file_storage();

        assert_eq!(storage.get_string("cookie_consent"), None);
        assert!(storage.set_string("cookie_consent", "accepted"));
        assert_eq!(storage.get_string("cookie_consent").as_deref(), Some("accepted"));
        assert!(storage.has_key("cookie_consent"));
        assert!(storage.remove("cookie_consent"));
        assert!(!storage.has_key("cookie_consent"));
    }

    #[test]
    fn test_bool_values() {
        let storage = memory_storage(&MemoryStore::new());
        assert_eq!(storage.get_bool("sound_enabled"), None);
        storage.set_bool("sound_enabled", false);
        assert_eq!(storage.get_bool("sound_enabled"), Some(false));
        storage.set_bool("sound_enabled", true);
        assert_eq!(storage.get_bool("sound_enabled"), Some(true));
    }

    #[test]
    fn test_invalid_number_is_removed() {
        let store = MemoryStore::new();
        let storage = memory_storage(&store);
        storage.set_string("highscore_focus", "not-a-number");

        assert_eq!(storage.get_number("highscore_focus"), None);
        assert_eq!(store.get("highscore_focus").unwrap(), None);
    }

    #[test]
    fn test_number_roundtrip() {
        let storage = memory_storage(&MemoryStore::new());
        storage.set_number("captainClickHighScore", 1250);
        assert_eq!(storage.get_number("captainClickHighScore"), Some(1250));
    }

    #[test]
    fn test_corrupt_json_is_removed() {
        let store = MemoryStore::new();
        let storage = memory_storage(&store);
        storage.set_string("calendarBest", "{not json");

        assert_eq!(storage.get_json::<Best>("calendarBest"), None);
        assert_eq!(store.get("calendarBest").unwrap(), None);
        assert!(!storage.has_key("calendarBest"));
    }

    #[test]
    fn test_json_roundtrip() {
        let storage = memory_storage(&MemoryStore::new());
        let best = Best {
            score: 40,
            survived: true,
        };
        assert!(storage.set_json("calendarBest", &best));
        assert_eq!(storage.get_json::<Best>("calendarBest"), Some(best));
    }

    #[test]
    fn test_write_failure_keeps_value_in_memory() {
        let store = MemoryStore::new();
        let storage = memory_storage(&store);
        store.set_available(false);

        assert!(!storage.set_string("k", "v"));
        assert_eq!(storage.get_string("k").as_deref(), Some("v"));
        assert!(!storage.is_available());
        assert!(storage.subscribe().is_none());
    }

    #[test]
    fn test_log_once_tracks_keys() {
        let store = MemoryStore::new();
        let storage = memory_storage(&store);
        store.set_available(false);

        storage.get_string("a");
        storage.get_string("a");
        storage.get_string("b");
        assert_eq!(storage.logged.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_is_available_leaves_no_check_key() {
        let store = MemoryStore::new();
        let storage = memory_storage(&store);
        assert!(storage.is_available());
        assert_eq!(store.get(AVAILABILITY_KEY).unwrap(), None);
    }

    #[test]
    fn test_open_or_memory_falls_back() {
        let env = TestEnv::new();
        // A regular file where the data directory should be
        let blocked = env.data_path().join("not-a-dir");
        std::fs::write(&blocked, "x").unwrap();

        let storage = SafeStorage::open_or_memory(&blocked);
        assert_eq!(storage.backend().backend_type(), BackendType::Memory);
        assert!(storage.set_string("k", "v"));
        assert_eq!(storage.get_string("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_get_data_dir_explicit_wins() {
        let dir = get_data_dir(Some(PathBuf::from("/tmp/deck-explicit"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/deck-explicit"));
    }

    #[test]
    #[serial]
    fn test_get_data_dir_from_env() {
        // SAFETY: serialized with the other env-var tests in this crate
        unsafe { std::env::set_var(DATA_DIR_ENV, "/tmp/deck-env") };
        let dir = get_data_dir(None).unwrap();
        unsafe { std::env::remove_var(DATA_DIR_ENV) };
        assert_eq!(dir, PathBuf::from("/tmp/deck-env"));
    }
}
