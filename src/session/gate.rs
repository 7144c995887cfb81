//! The notice shown in place of a session held by another tab.

use serde::Serialize;

pub const LOCK_TITLE: &str = "Game Active in Another Tab";
pub const LOCK_HINT: &str = "This prevents score conflicts and keeps your progress safe";
pub const DEFAULT_GAME_NAME: &str = "This game";

/// What the player chose on the lock notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateAction {
    Back,
    Retry,
}

impl GateAction {
    pub fn label(&self) -> &'static str {
        match self {
            GateAction::Back => "Go Back",
            GateAction::Retry => "Retry",
        }
    }
}

/// The notice shown in place of a session that another tab holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockNotice {
    pub title: String,
    pub message: String,
    pub hint: String,
    pub actions: Vec<GateAction>,
}

impl LockNotice {
    /// The notice to show, or `None` when the session is free to play.
    pub fn for_state(is_locked: bool, game_name: Option<&str>) -> Option<Self> {
        if !is_locked {
            return None;
        }
        let name = game_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_GAME_NAME);
        Some(Self {
            title: LOCK_TITLE.to_string(),
            message: format!(
                "{} is currently running in another browser tab. Close the other tab to play here.",
                name
            ),
            hint: LOCK_HINT.to_string(),
            actions: vec![GateAction::Back, GateAction::Retry],
        })
    }

    /// Dispatch the player's choice. Retrying re-attempts the claim; going
    /// back hands control to the caller's navigation.
    pub fn resolve<T>(
        &self,
        action: GateAction,
        on_back: impl FnOnce() -> T,
        on_retry: impl FnOnce() -> T,
    ) -> T {
        match action {
            GateAction::Back => on_back(),
            GateAction::Retry => on_retry(),
        }
    }
}

impl std::fmt::Display for LockNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f)?;
        writeln!(f, "{}", self.message)?;
        writeln!(f, "{}", self.hint)?;
        let labels: Vec<_> = self.actions.iter().map(|a| format!("[{}]", a.label())).collect();
        write!(f, "{}", labels.join(" "))
    }
}
