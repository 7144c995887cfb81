//! Shared in-process storage medium.
//!
//! A `MemoryStore` handle plays the part of one "tab". Handles created with
//! [`MemoryStore::connect`] share the same values, and each write is
//! broadcast to every other handle's subscriptions.

use super::backend::{BackendType, StorageBackend, StorageEvent, Subscription};
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug)]
struct Medium {
    values: HashMap<String, String>,
    subscribers: Vec<(Uuid, Sender<StorageEvent>)>,
    available: bool,
}

impl Medium {
    /// Deliver an event to every subscriber except the writer, dropping
    /// subscribers whose receiving end is gone.
    fn broadcast(&mut self, origin: Uuid, event: StorageEvent) {
        self.subscribers.retain(|(id, tx)| {
            if *id == origin {
                return true;
            }
            tx.send(event.clone()).is_ok()
        });
    }
}

/// One handle onto a shared in-memory medium.
///
/// Cloning yields the *same* handle (same writer identity); use
/// [`connect`](Self::connect) to open a distinct one.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    medium: Arc<Mutex<Medium>>,
    origin: Uuid,
}

impl MemoryStore {
    /// Create a fresh medium and return the first handle onto it.
    pub fn new() -> Self {
        Self {
            medium: Arc::new(Mutex::new(Medium {
                values: HashMap::new(),
                subscribers: Vec::new(),
                available: true,
            })),
            origin: Uuid::new_v4(),
        }
    }

    /// Open another handle on the same medium.
    pub fn connect(&self) -> Self {
        Self {
            medium: Arc::clone(&self.medium),
            origin: Uuid::new_v4(),
        }
    }

    /// Identity of this handle as a writer.
    pub fn origin(&self) -> Uuid {
        self.origin
    }

    /// Toggle availability for the whole medium.
    ///
    /// While unavailable every operation fails with
    /// [`Error::StorageUnavailable`].
    pub fn set_available(&self, available: bool) {
        if let Ok(mut medium) = self.medium.lock() {
            medium.available = available;
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Medium>> {
        let medium = self
            .medium
            .lock()
            .map_err(|_| Error::Other("memory store lock poisoned".to_string()))?;
        if !medium.available {
            return Err(Error::StorageUnavailable(
                "memory store is disabled".to_string(),
            ));
        }
        Ok(medium)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut medium = self.lock()?;
        let old_value = medium.values.insert(key.to_string(), value.to_string());

        // Rewriting an identical value is not a change
        if old_value.as_deref() != Some(value) {
            let event = StorageEvent {
                key: key.to_string(),
                old_value,
                new_value: Some(value.to_string()),
            };
            medium.broadcast(self.origin, event);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut medium = self.lock()?;
        if let Some(old_value) = medium.values.remove(key) {
            let event = StorageEvent {
                key: key.to_string(),
                old_value: Some(old_value),
                new_value: None,
            };
            medium.broadcast(self.origin, event);
        }
        Ok(())
    }

    fn subscribe(&self) -> Result<Subscription> {
        let mut medium = self.lock()?;
        let (tx, rx) = mpsc::channel();
        medium.subscribers.push((self.origin, tx));
        Ok(Subscription::new(rx, None))
    }

    fn location(&self) -> String {
        format!("memory:{}", self.origin)
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Memory
    }
}
