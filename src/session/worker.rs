//! Background thread that keeps an owned session's heartbeat fresh.

use super::SessionLock;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Background thread that keeps an owned session's heartbeat fresh.
///
/// Ticks every heartbeat interval until stopped, dropped, or the lock is
/// lost to another tab.
#[derive(Debug)]
pub struct HeartbeatWorker {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl HeartbeatWorker {
    pub fn spawn(lock: Arc<Mutex<SessionLock>>) -> Self {
        let interval = match lock.lock() {
            Ok(guard) => guard.config().heartbeat_interval,
            Err(poisoned) => poisoned.into_inner().config().heartbeat_interval,
        };
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    // Stop requested or the worker handle is gone
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }

                let Ok(mut guard) = lock.lock() else { break };
                guard.heartbeat();
                if guard.is_locked() || !guard.is_mounted() {
                    tracing::debug!(session = guard.session_id(), state = %guard.state(), "heartbeat worker exiting");
                    break;
                }
            }
        });

        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Whether the worker thread is still ticking.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop ticking and wait for the thread to exit.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for HeartbeatWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
