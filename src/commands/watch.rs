//! Watching storage keys for changes made by other processes.

use super::{Context, Output, json};
use crate::progress::{ProgressStore, STORAGE_KEY};
use crate::storage::{Conflict, CrossTabSync, GAME_SCORE_KEYS};
use crate::{Error, Result};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// How long one wait for change events may block before re-checking `stop`.
const WATCH_TICK: Duration = Duration::from_millis(200);

#[derive(Serialize)]
pub struct WatchResult {
    pub keys: Vec<String>,
    pub conflicts: usize,
    pub stale: bool,
    /// Times the progression store was re-read after another process wrote it
    pub reloads: usize,
    /// Xp after the last reload, when reloading was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp: Option<u64>,
}

impl Output for WatchResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut text = format!(
            "Watched {} key(s), {} change(s) from other processes",
            self.keys.len(),
            self.conflicts
        );
        if let Some(xp) = self.xp {
            text.push_str(&format!("\nProgress reloaded {} time(s), now {} xp", self.reloads, xp));
        }
        text
    }
}

/// Report changes other processes make to `keys` (default: the game score
/// keys) until `duration` elapses or `stop` is set.
///
/// With `reload`, the progression key is watched as well and the store is
/// re-read every time another process writes it.
pub fn watch(
    ctx: &Context,
    keys: &[String],
    reload: bool,
    duration: Option<Duration>,
    stop: &AtomicBool,
    mut on_conflict: impl FnMut(&Conflict),
) -> Result<WatchResult> {
    let mut keys: Vec<String> = if keys.is_empty() {
        GAME_SCORE_KEYS.iter().map(|k| k.to_string()).collect()
    } else {
        keys.to_vec()
    };
    if reload && !keys.iter().any(|k| k == STORAGE_KEY) {
        keys.push(STORAGE_KEY.to_string());
    }

    // One handle for both, so the store's own writes are not reported
    let storage = ctx.storage();
    let mut progress = reload.then(|| {
        ProgressStore::initialize(storage.clone()).with_operation_limit(ctx.config().operation_limit())
    });
    let mut sync = CrossTabSync::new(&storage, keys);
    if !sync.is_connected() {
        return Err(Error::StorageUnavailable(
            "change feed could not be opened".to_string(),
        ));
    }
    tracing::debug!(keys = ?sync.keys(), reload, "watching");

    let started = Instant::now();
    let mut conflicts = 0;
    let mut reloads = 0;
    while !stop.load(Ordering::SeqCst) {
        let wait = match duration {
            Some(d) => match d.checked_sub(started.elapsed()) {
                Some(left) if !left.is_zero() => left.min(WATCH_TICK),
                _ => break,
            },
            None => WATCH_TICK,
        };
        if let Some(conflict) = sync.wait(wait) {
            conflicts += 1;
            on_conflict(&conflict);
            if conflict.key == STORAGE_KEY {
                if let Some(store) = progress.as_mut() {
                    if store.refresh_if_stale(&mut sync) {
                        reloads += 1;
                    }
                }
            }
        }
    }

    let stale = sync.is_stale();
    sync.disconnect();
    Ok(WatchResult {
        keys: sync.keys().to_vec(),
        conflicts,
        stale,
        reloads,
        xp: progress.as_ref().map(ProgressStore::xp),
    })
}
