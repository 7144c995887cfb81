//! Session lock commands: status and play.

use super::{Context, Output, json};
use crate::session::{
    Clock, HeartbeatWorker, LockConfig, LockNotice, LockState, SessionLock, SessionStatus,
    inspect,
};
use crate::{Error, Result};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// How often the foreground checks for stop requests while playing.
const PLAY_TICK: Duration = Duration::from_millis(100);

#[derive(Serialize)]
pub struct SessionStatusView {
    #[serde(flatten)]
    pub status: SessionStatus,
}

impl Output for SessionStatusView {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let s = &self.status;
        match (s.held, s.age_ms) {
            (true, Some(age)) => format!("{}: active in another tab (heartbeat {} ms ago)", s.session_id, age),
            (false, Some(age)) => format!("{}: free (last heartbeat {} ms ago, stale)", s.session_id, age),
            _ => format!("{}: free", s.session_id),
        }
    }
}

pub fn session_status(
    ctx: &Context,
    id: &str,
    clock: &dyn Clock,
    config: LockConfig,
) -> Result<SessionStatusView> {
    check_session_id(id)?;
    Ok(SessionStatusView {
        status: inspect(&ctx.storage(), id, clock, config),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayOutcome {
    /// Another tab held the session; nothing was claimed
    Locked,
    /// Played until time ran out or a stop was requested, then released
    Released,
    /// Another tab took over mid-session
    Lost,
}

#[derive(Serialize)]
pub struct PlayResult {
    pub session_id: String,
    pub outcome: PlayOutcome,
    pub held_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<LockNotice>,
}

impl PlayResult {
    /// Whether the caller should treat this as a refusal.
    pub fn is_locked(&self) -> bool {
        self.outcome == PlayOutcome::Locked
    }
}

impl Output for PlayResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if let Some(notice) = &self.notice {
            return notice.to_string();
        }
        match self.outcome {
            PlayOutcome::Lost => format!(
                "{}: taken over by another tab after {} ms",
                self.session_id, self.held_ms
            ),
            _ => format!("{}: played {} ms, released", self.session_id, self.held_ms),
        }
    }
}

/// Claim a session and hold it until `duration` elapses, `stop` is set, or
/// another tab takes it over.
pub fn session_play(
    ctx: &Context,
    id: &str,
    game_name: Option<&str>,
    duration: Option<Duration>,
    clock: Arc<dyn Clock>,
    config: LockConfig,
    stop: &AtomicBool,
) -> Result<PlayResult> {
    check_session_id(id)?;
    let mut lock = SessionLock::new(ctx.storage(), id, clock, config);
    lock.mount();

    if lock.is_locked() {
        return Ok(PlayResult {
            session_id: id.to_string(),
            outcome: PlayOutcome::Locked,
            held_ms: 0,
            notice: LockNotice::for_state(true, game_name),
        });
    }

    let started = Instant::now();
    let lock = Arc::new(Mutex::new(lock));
    let mut worker = HeartbeatWorker::spawn(Arc::clone(&lock));

    let lost = loop {
        if stop.load(Ordering::SeqCst) || duration.is_some_and(|d| started.elapsed() >= d) {
            break false;
        }
        let state = lock
            .lock()
            .map_err(|_| Error::Other("session lock poisoned".to_string()))?
            .poll();
        if state == LockState::Locked {
            break true;
        }
        thread::sleep(PLAY_TICK);
    };

    worker.stop();
    let held_ms = started.elapsed().as_millis() as u64;
    if let Ok(mut guard) = lock.lock() {
        guard.unmount();
    }

    Ok(PlayResult {
        session_id: id.to_string(),
        outcome: if lost { PlayOutcome::Lost } else { PlayOutcome::Released },
        held_ms,
        notice: None,
    })
}

fn check_session_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::InvalidId("session id must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;
    use crate::session::{ManualClock, SystemClock, heartbeat_key};

    #[test]
    fn test_status_free_then_held() {
        let (_dir, ctx) = context();
        let clock = ManualClock::new(100_000);
        let config = LockConfig::default();

        assert!(!session_status(&ctx, "demo", &clock, config).unwrap().status.held);

        ctx.storage().set_string(&heartbeat_key("demo"), "99000");
        let view = session_status(&ctx, "demo", &clock, config).unwrap();
        assert!(view.status.held);
        assert!(view.to_human().contains("active in another tab"));
    }

    #[test]
    fn test_play_refused_when_held() {
        let (_dir, ctx) = context();
        let now = chrono::Utc::now().timestamp_millis();
        ctx.storage().set_string(&heartbeat_key("focusfury"), &now.to_string());

        let stop = AtomicBool::new(false);
        let result = session_play(
            &ctx,
            "focusfury",
            Some("Focus Fury"),
            Some(Duration::from_millis(50)),
            Arc::new(SystemClock),
            LockConfig::default(),
            &stop,
        )
        .unwrap();

        assert!(result.is_locked());
        assert!(result.to_human().contains("Focus Fury is currently running"));
        // The other tab's heartbeat is untouched
        assert_eq!(
            ctx.storage().get_string(&heartbeat_key("focusfury")),
            Some(now.to_string())
        );
    }

    #[test]
    fn test_play_releases_on_timeout() {
        let (_dir, ctx) = context();
        let stop = AtomicBool::new(false);
        let result = session_play(
            &ctx,
            "triage",
            None,
            Some(Duration::from_millis(150)),
            Arc::new(SystemClock),
            LockConfig::default(),
            &stop,
        )
        .unwrap();

        assert_eq!(result.outcome, PlayOutcome::Released);
        assert!(result.held_ms >= 150);
        assert!(!ctx.storage().has_key(&heartbeat_key("triage")));
    }

    #[test]
    fn test_play_stops_when_requested() {
        let (_dir, ctx) = context();
        let stop = AtomicBool::new(true);
        let result = session_play(
            &ctx,
            "triage",
            None,
            None,
            Arc::new(SystemClock),
            LockConfig::default(),
            &stop,
        )
        .unwrap();
        assert_eq!(result.outcome, PlayOutcome::Released);
    }
}
