//! agentdeck - progression tracking and session locking for the agent card deck.
//!
//! This library provides the core functionality for the `deck` CLI tool:
//! the progression store (cards, operations, xp, rank), the heartbeat-based
//! active-session lock, and the key-value storage layer both sit on.

pub mod action_log;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod progress;
pub mod scores;
pub mod session;
pub mod storage;

/// Test utilities for isolated test environments.
#[cfg(test)]
pub(crate) mod test_utils {
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    use crate::storage::{FileStore, MemoryStore, SafeStorage};

    /// Test environment with an isolated data directory.
    ///
    /// Storage handles are built through dependency injection, never through
    /// `DECK_DATA_DIR`, so tests can run in parallel.
    pub struct TestEnv {
        /// Isolated data storage directory
        pub data_dir: TempDir,
    }

    impl TestEnv {
        /// Create a new test environment with an isolated directory.
        pub fn new() -> Self {
            Self {
                data_dir: TempDir::new().unwrap(),
            }
        }

        /// Get the path to the isolated data directory.
        pub fn data_path(&self) -> &Path {
            self.data_dir.path()
        }

        /// Open a file-backed store handle ("tab") on this environment.
        pub fn file_storage(&self) -> SafeStorage {
            let store = FileStore::open(self.data_path()).unwrap();
            SafeStorage::new(Arc::new(store))
        }
    }

    impl Default for TestEnv {
        fn default() -> Self {
            Self::new()
        }
    }

    /// Wrap a memory store handle for the higher layers.
    pub fn memory_storage(store: &MemoryStore) -> SafeStorage {
        SafeStorage::new(Arc::new(store.clone()))
    }
}

/// Library-level error type for agentdeck operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for agentdeck operations.
pub type Result<T> = std::result::Result<T, Error>;
