//! The per-tab session lock: claim on mount, heartbeat while owned,
//! lock when another tab writes a newer heartbeat.

use super::{Clock, LockConfig, LockState, heartbeat_key, parse_heartbeat};
use crate::storage::{SafeStorage, StorageEvent, Subscription};
use std::sync::Arc;

/// One tab's claim on a session.
///
/// Lifecycle: [`mount`](Self::mount) claims or detects a foreign owner,
/// [`heartbeat`](Self::heartbeat) keeps an owned claim fresh,
/// [`poll`](Self::poll) applies heartbeats written by other tabs, and
/// [`unmount`](Self::unmount) (or drop) releases. A locked handle stays
/// locked until [`retry`](Self::retry).
pub struct SessionLock {
    storage: SafeStorage,
    session_id: String,
    key: String,
    clock: Arc<dyn Clock>,
    config: LockConfig,
    state: LockState,
    subscription: Option<Subscription>,
    last_written: Option<i64>,
    mounted: bool,
}

impl SessionLock {
    pub fn new(
        storage: SafeStorage,
        session_id: impl Into<String>,
        clock: Arc<dyn Clock>,
        config: LockConfig,
    ) -> Self {
        let session_id = session_id.into();
        Self {
            key: heartbeat_key(&session_id),
            storage,
            session_id,
            clock,
            config,
            state: LockState::Unclaimed,
            subscription: None,
            last_written: None,
            mounted: false,
        }
    }

    /// Claim the session unless a fresh heartbeat says another tab has it.
    ///
    /// Mounting an already mounted lock changes nothing.
    pub fn mount(&mut self) -> LockState {
        if self.mounted {
            return self.state;
        }
        self.mounted = true;
        self.subscription = self.storage.subscribe();

        let now = self.clock.now_millis();
        let existing = self
            .storage
            .get_string(&self.key)
            .as_deref()
            .and_then(parse_heartbeat);

        match existing {
            Some(at) if self.config.is_fresh(at, now) => {
                tracing::info!(session = %self.session_id, heartbeat_at = at, "session active in another tab");
                self.state = LockState::Locked;
            }
            _ => {
                self.write_beat(now);
                tracing::info!(session = %self.session_id, "session claimed");
                self.state = LockState::Owned;
            }
        }
        self.state
    }

    /// Refresh the heartbeat. Pending foreign heartbeats are applied first,
    /// so a handle that just lost the session writes nothing.
    ///
    /// Returns whether a beat was written.
    pub fn heartbeat(&mut self) -> bool {
        self.poll();
        if !self.mounted || self.state != LockState::Owned {
            return false;
        }
        let now = self.clock.now_millis();
        self.write_beat(now);
        true
    }

    /// Apply change events received since the last poll.
    pub fn poll(&mut self) -> LockState {
        let events = match &self.subscription {
            Some(sub) => sub.drain(),
            None => return self.state,
        };
        for event in &events {
            self.observe(event);
        }
        self.state
    }

    /// Apply one change event.
    ///
    /// Only a heartbeat for this session newer than our own last beat
    /// counts. Removals and unparseable values are ignored.
    pub fn observe(&mut self, event: &StorageEvent) -> LockState {
        if !self.mounted || self.state == LockState::Locked || event.key != self.key {
            return self.state;
        }
        let Some(at) = event.new_value.as_deref().and_then(parse_heartbeat) else {
            return self.state;
        };
        if self.last_written.is_none_or(|own| at > own) {
            tracing::info!(
                session = %self.session_id,
                heartbeat_at = at,
                own = ?self.last_written,
                "newer heartbeat from another tab, session locked"
            );
            self.state = LockState::Locked;
        }
        self.state
    }

    /// Release and claim again.
    pub fn retry(&mut self) -> LockState {
        self.unmount();
        self.mount()
    }

    /// Stop listening and release the session if this handle owns it.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.subscription = None;
        // The key belongs to the owning tab; a locked tab must not delete it
        if self.state == LockState::Owned {
            self.storage.remove(&self.key);
            tracing::info!(session = %self.session_id, "session released");
        }
        self.state = LockState::Unclaimed;
        self.last_written = None;
        self.mounted = false;
    }

    pub fn is_locked(&self) -> bool {
        self.state == LockState::Locked
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn config(&self) -> LockConfig {
        self.config
    }

    /// Timestamp of this handle's most recent heartbeat.
    pub fn last_written(&self) -> Option<i64> {
        self.last_written
    }

    fn write_beat(&mut self, now: i64) {
        // A failed write still counts: the lock fails open
        self.storage.set_string(&self.key, &now.to_string());
        self.last_written = Some(now);
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for SessionLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLock")
            .field("session_id", &self.session_id)
            .field("state", &self.state)
            .field("last_written", &self.last_written)
            .field("mounted", &self.mounted)
            .finish()
    }
}
