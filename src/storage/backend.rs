//! Storage backend trait and implementations.
//!
//! This module provides the key-value backends agentdeck data lives in:
//! - `FileStore` - One file per key under the data directory (default)
//! - `MemoryStore` - Shared in-process medium, used for simulations and tests
//!
//! Every backend also offers a change feed. A subscriber hears about writes
//! made through *other* handles only, never about its own.

use crate::Result;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

/// A key-level change made by another store handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// Key that changed
    pub key: String,
    /// Value before the change, when the backend knows it
    pub old_value: Option<String>,
    /// Value after the change; `None` when the key was removed
    pub new_value: Option<String>,
}

/// Receiving end of a backend change feed.
///
/// Dropping the subscription stops delivery and releases whatever keeps the
/// feed alive (such as a file watcher).
pub struct Subscription {
    rx: Receiver<StorageEvent>,
    _guard: Option<Box<dyn Send>>,
}

impl Subscription {
    /// Create a subscription over a channel with an optional keep-alive guard.
    pub fn new(rx: Receiver<StorageEvent>, guard: Option<Box<dyn Send>>) -> Self {
        Self { rx, _guard: guard }
    }

    /// Return the next pending event without blocking.
    pub fn try_next(&self) -> Option<StorageEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Wait up to `timeout` for the next event.
    pub fn next_timeout(&self, timeout: Duration) -> Option<StorageEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Collect every event currently pending.
    pub fn drain(&self) -> Vec<StorageEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Trait for storage backends that handle raw key-value persistence.
///
/// Values are opaque strings. Implementations must be safe to share between
/// threads; a heartbeat worker and the foreground both touch the same handle.
pub trait StorageBackend: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Open a change feed for writes made by other handles.
    fn subscribe(&self) -> Result<Subscription>;

    /// Get the storage location description (for display purposes).
    fn location(&self) -> String;

    /// Get the backend type name.
    fn backend_type(&self) -> BackendType;
}

/// Available storage backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// One file per key under `<data-dir>/kv/` (default)
    File,
    /// Shared in-process memory
    Memory,
}

impl BackendType {
    /// Parse a backend type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "file" | "default" => Some(Self::File),
            "memory" | "mem" => Some(Self::Memory),
            _ => None,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Memory => "memory",
        }
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_backend_type_parse() {
        assert_eq!(BackendType::parse("file"), Some(BackendType::File));
        assert_eq!(BackendType::parse("MEMORY"), Some(BackendType::Memory));
        assert_eq!(BackendType::parse("sqlite"), None);
    }

    #[test]
    fn test_backend_type_display() {
        assert_eq!(BackendType::File.to_string(), "file");
        assert_eq!(BackendType::Memory.to_string(), "memory");
    }

    #[test]
    fn test_subscription_drain_and_disconnect() {
        let (tx, rx) = mpsc::channel();
        let sub = Subscription::new(rx, None);

        for i in 0..3 {
            tx.send(StorageEvent {
                key: format!("k{}", i),
                old_value: None,
                new_value: Some("v".to_string()),
            })
            .unwrap();
        }
        assert_eq!(sub.drain().len(), 3);

        drop(tx);
        assert_eq!(sub.try_next(), None);
        assert_eq!(sub.next_timeout(Duration::from_millis(5)), None);
    }
}
