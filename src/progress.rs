//! The progression store.
//!
//! [`ProgressStore`] is the single source of truth for a player's xp,
//! collected cards and operation progress. It is built once at startup and
//! handed to whoever needs it; there is no global instance.
//!
//! Every mutation writes the whole [`ProgressState`] back to storage under
//! [`STORAGE_KEY`] before returning. Storage failures never surface: a failed
//! read starts from the initial state, a failed write leaves the in-memory
//! state correct for the rest of the process.
//!
//! Two processes mutating the same data directory do not merge; whichever
//! writes last wins. Pair the store with a [`CrossTabSync`] on
//! [`STORAGE_KEY`] and call [`ProgressStore::refresh_if_stale`] after polling
//! it, so the store re-reads before its next write.

use crate::models::{AGENTS, Agent, OperationId, ProgressState, Rank, next_rank_for};
use crate::storage::{CrossTabSync, SafeStorage};
use serde::Serialize;
use std::io::{self, BufRead, Write};

/// Storage key holding the serialized progression state.
pub const STORAGE_KEY: &str = "agentic-rpg-state";

/// Xp granted for each newly collected card.
pub const CARD_XP: u64 = 25;

/// Xp granted for each newly completed operation.
pub const OPERATION_XP: u64 = 100;

/// Question asked before wiping progress.
pub const RESET_PROMPT: &str =
    "Are you sure you want to reset your mission progress? This cannot be undone.";

/// Something that can answer a yes/no question before a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Always agrees. Used for `--yes` style flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Asks on the terminal: prompt on stderr, answer read from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{} [y/N]: ", prompt);
        let _ = io::stderr().flush();

        let mut input = String::new();
        if io::stdin().lock().read_line(&mut input).is_err() {
            return false;
        }
        matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// What claiming a mission reward changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissionOutcome {
    pub operation: String,
    /// False when the operation had already been completed
    pub newly_completed: bool,
    /// Reward cards that were not already in the collection
    pub new_cards: Vec<String>,
    pub xp_gained: u64,
}

/// Owns and persists a player's [`ProgressState`].
#[derive(Debug)]
pub struct ProgressStore {
    storage: SafeStorage,
    state: ProgressState,
    operation_limit: Option<u32>,
}

impl ProgressStore {
    /// Load the persisted state, or start fresh.
    ///
    /// A missing or unreadable document yields [`ProgressState::initial`],
    /// which is written back immediately.
    pub fn initialize(storage: SafeStorage) -> Self {
        let (state, fresh) = match load(&storage) {
            Some(state) => (state, false),
            None => (ProgressState::initial(), true),
        };
        let store = Self {
            storage,
            state,
            operation_limit: None,
        };
        if fresh {
            tracing::debug!(key = STORAGE_KEY, "no stored progress, starting from initial state");
            store.persist();
        }
        store
    }

    /// Stop minting successor operations past `limit`.
    ///
    /// `None` (the default) keeps minting `op_(N+1)` indefinitely.
    pub fn with_operation_limit(mut self, limit: Option<u32>) -> Self {
        self.operation_limit = limit;
        self
    }

    pub fn operation_limit(&self) -> Option<u32> {
        self.operation_limit
    }

    /// Current state snapshot.
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn xp(&self) -> u64 {
        self.state.xp
    }

    pub fn is_collected(&self, card_id: &str) -> bool {
        self.state.collected_cards.contains(card_id)
    }

    pub fn is_unlocked(&self, op_id: &str) -> bool {
        self.state.unlocked_operations.contains(op_id)
    }

    pub fn is_completed(&self, op_id: &str) -> bool {
        self.state.completed_operations.contains(op_id)
    }

    /// Grant xp. Saturates instead of overflowing.
    pub fn add_xp(&mut self, amount: u64) {
        self.state.xp = self.state.xp.saturating_add(amount);
        self.persist();
    }

    /// Collect a card. Returns true only the first time, when the card also
    /// grants [`CARD_XP`]. Ids are not checked against the catalog.
    pub fn collect_card(&mut self, card_id: &str) -> bool {
        if self.state.collected_cards.contains(card_id) {
            return false;
        }
        self.state.collected_cards.insert(card_id.to_string());
        self.state.xp = self.state.xp.saturating_add(CARD_XP);
        tracing::debug!(card = card_id, xp = self.state.xp, "card collected");
        self.persist();
        true
    }

    /// Complete an operation. Returns true only the first time.
    ///
    /// The operation itself and its successor become unlocked and
    /// [`OPERATION_XP`] is granted. An id that is not `op_<N>` is still
    /// recorded and rewarded but has no successor to unlock.
    pub fn complete_operation(&mut self, op_id: &str) -> bool {
        if self.state.completed_operations.contains(op_id) {
            return false;
        }
        self.state.completed_operations.insert(op_id.to_string());
        self.state.unlocked_operations.insert(op_id.to_string());

        match OperationId::parse(op_id).and_then(|op| op.successor()) {
            Some(next) if self.within_limit(next) => {
                self.state.unlocked_operations.insert(next.to_string());
            }
            Some(next) => {
                tracing::debug!(operation = op_id, next = %next, "successor beyond operation limit");
            }
            None => {
                tracing::warn!(operation = op_id, "operation id has no successor, nothing unlocked");
            }
        }

        self.state.xp = self.state.xp.saturating_add(OPERATION_XP);
        tracing::debug!(operation = op_id, xp = self.state.xp, "operation completed");
        self.persist();
        true
    }

    /// Unlock an operation without completing anything. Returns true if it
    /// was not unlocked before.
    pub fn unlock_operation(&mut self, op_id: &str) -> bool {
        if !self.state.unlocked_operations.insert(op_id.to_string()) {
            return false;
        }
        self.persist();
        true
    }

    /// Record an achievement. Returns true if it is new. Grants no xp.
    pub fn award_achievement(&mut self, achievement_id: &str) -> bool {
        if !self.state.achievements.insert(achievement_id.to_string()) {
            return false;
        }
        self.persist();
        true
    }

    /// Complete an operation and collect its reward cards in one go.
    pub fn claim_mission<S: AsRef<str>>(&mut self, op_id: &str, reward_cards: &[S]) -> MissionOutcome {
        let xp_before = self.state.xp;
        let newly_completed = self.complete_operation(op_id);
        let mut new_cards = Vec::new();
        for card in reward_cards {
            let card = card.as_ref();
            if self.collect_card(card) {
                new_cards.push(card.to_string());
            }
        }

        MissionOutcome {
            operation: op_id.to_string(),
            newly_completed,
            new_cards,
            xp_gained: self.state.xp - xp_before,
        }
    }

    /// The rank earned so far.
    pub fn rank(&self) -> &'static Rank {
        self.state.rank()
    }

    /// The next rank and how many more operations it needs.
    pub fn next_rank(&self) -> Option<(&'static Rank, usize)> {
        next_rank_for(self.state.completed_count())
    }

    /// Collected cards that exist in the catalog, and the catalog size.
    pub fn collection_progress(&self) -> (usize, usize) {
        let collected = AGENTS
            .iter()
            .filter(|agent| self.state.collected_cards.contains(agent.id))
            .count();
        (collected, AGENTS.len())
    }

    /// The static catalog.
    pub fn all_agents(&self) -> &'static [Agent] {
        AGENTS
    }

    /// Wipe progress back to the initial state, if `confirm` agrees.
    ///
    /// Returns whether the reset happened.
    pub fn reset_progress(&mut self, confirm: &dyn Confirm) -> bool {
        if !confirm.confirm(RESET_PROMPT) {
            return false;
        }
        self.state = ProgressState::initial();
        tracing::info!("progress reset");
        self.persist();
        true
    }

    /// Re-read the stored state, e.g. after another process changed it.
    ///
    /// Keeps the in-memory state if storage holds nothing usable.
    pub fn reload(&mut self) -> bool {
        match load(&self.storage) {
            Some(state) => {
                self.state = state;
                true
            }
            None => false,
        }
    }

    /// Re-read the state if `sync` has seen another process change it,
    /// then acknowledge the change. Poll or wait on `sync` first.
    ///
    /// Returns whether the state was reloaded.
    pub fn refresh_if_stale(&mut self, sync: &mut CrossTabSync) -> bool {
        if !sync.is_stale() {
            return false;
        }
        let reloaded = self.reload();
        sync.sync_state();
        if reloaded {
            tracing::debug!(key = STORAGE_KEY, xp = self.state.xp, "progress reloaded after external change");
        }
        reloaded
    }

    fn within_limit(&self, op: OperationId) -> bool {
        self.operation_limit
            .is_none_or(|limit| op.number() <= limit)
    }

    fn persist(&self) {
        if !self.storage.set_json(STORAGE_KEY, &self.state) {
            tracing::debug!(key = STORAGE_KEY, "progress kept in memory only");
        }
    }
}

fn load(storage: &SafeStorage) -> Option<ProgressState> {
    let mut state: ProgressState = storage.get_json(STORAGE_KEY)?;
    state.normalize();
    Some(state)
}
