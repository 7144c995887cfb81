//! Data models for agentdeck entities.
//!
//! This module defines the core data structures:
//! - `ProgressState` - The persisted progression record (xp, cards, operations)
//! - `OperationId` - Sequential operation identifiers (`op_1`, `op_2`, ...)
//! - `Rank` - Titles derived from the completed-operation count
//! - `catalog` - The static agent card catalog

pub mod catalog;

pub use catalog::{AGENTS, Agent, AgentStats, Deck, Rarity, agent_by_id, agents_by_deck};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Prefix of every operation id.
pub const OPERATION_PREFIX: &str = "op_";

/// A sequential operation identifier, `op_<N>` with `N >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationId(u32);

impl OperationId {
    /// The operation every new player starts with.
    pub const FIRST: OperationId = OperationId(1);

    /// Create from a positive number.
    pub fn new(number: u32) -> Option<Self> {
        (number > 0).then_some(Self(number))
    }

    /// Parse `op_<N>`. Returns `None` for anything else, including `op_0`.
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix(OPERATION_PREFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().and_then(Self::new)
    }

    /// The operation's sequence number.
    pub fn number(&self) -> u32 {
        self.0
    }

    /// The operation unlocked by completing this one.
    pub fn successor(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", OPERATION_PREFIX, self.0)
    }
}

/// A player's progression, persisted as one JSON document.
///
/// Fields missing from a stored document take their initial values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressState {
    /// Experience points; only ever increases outside of a reset
    pub xp: u64,

    /// Catalog ids of collected cards
    pub collected_cards: BTreeSet<String>,

    /// Operation ids completed
    pub completed_operations: BTreeSet<String>,

    /// Operation ids available to play; always contains the completed ones
    pub unlocked_operations: BTreeSet<String>,

    /// Achievement ids earned
    pub achievements: BTreeSet<String>,
}

impl ProgressState {
    /// The state of a brand new player: no xp, nothing collected, `op_1` unlocked.
    pub fn initial() -> Self {
        Self {
            xp: 0,
            collected_cards: BTreeSet::new(),
            completed_operations: BTreeSet::new(),
            unlocked_operations: BTreeSet::from([OperationId::FIRST.to_string()]),
            achievements: BTreeSet::new(),
        }
    }

    /// Fold completed operations into the unlocked set.
    ///
    /// Returns true if anything had to be added.
    pub fn normalize(&mut self) -> bool {
        let missing: Vec<String> = self
            .completed_operations
            .difference(&self.unlocked_operations)
            .cloned()
            .collect();
        let changed = !missing.is_empty();
        self.unlocked_operations.extend(missing);
        changed
    }

    /// Number of completed operations.
    pub fn completed_count(&self) -> usize {
        self.completed_operations.len()
    }

    /// The rank this state has earned.
    pub fn rank(&self) -> &'static Rank {
        rank_for(self.completed_count())
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::initial()
    }
}

/// A title earned by completing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rank {
    pub id: u8,
    pub name: &'static str,
    /// Completed operations needed to hold this rank
    pub min_ops: usize,
}

/// Rank thresholds, ascending by `min_ops`.
pub const RANKS: &[Rank] = &[
    Rank { id: 1, name: "Civilian", min_ops: 0 },
    Rank { id: 2, name: "Recruit", min_ops: 1 },
    Rank { id: 3, name: "Operator", min_ops: 4 },
    Rank { id: 4, name: "Specialist", min_ops: 8 },
    Rank { id: 5, name: "Commander", min_ops: 12 },
    Rank { id: 6, name: "Life OS Master", min_ops: 16 },
];

/// The highest rank whose threshold `completed` meets.
pub fn rank_for(completed: usize) -> &'static Rank {
    RANKS
        .iter()
        .rev()
        .find(|rank| completed >= rank.min_ops)
        .unwrap_or(&RANKS[0])
}

/// The next rank above the one `completed` earns, with the number of
/// operations still needed. `None` at the top rank.
pub fn next_rank_for(completed: usize) -> Option<(&'static Rank, usize)> {
    RANKS
        .iter()
        .find(|rank| rank.min_ops > completed)
        .map(|rank| (rank, rank.min_ops - completed))
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
