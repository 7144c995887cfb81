//! Per-game score keys.
//!
//! Two conventions coexist: `highscore_<game>` holds a high score that only
//! ever goes up, and `<game>_best` holds a game's own best record (the keys
//! watched by [`GAME_SCORE_KEYS`](crate::storage::GAME_SCORE_KEYS)).

use crate::storage::SafeStorage;

const HIGH_SCORE_PREFIX: &str = "highscore_";
const BEST_SUFFIX: &str = "_best";

pub fn high_score_key(game: &str) -> String {
    format!("{}{}", HIGH_SCORE_PREFIX, game)
}

pub fn best_key(game: &str) -> String {
    format!("{}{}", game, BEST_SUFFIX)
}

/// Typed access to game scores.
#[derive(Debug, Clone)]
pub struct Scoreboard {
    storage: SafeStorage,
}

impl Scoreboard {
    pub fn new(storage: SafeStorage) -> Self {
        Self { storage }
    }

    /// The recorded high score, 0 if none.
    pub fn high_score(&self, game: &str) -> i64 {
        self.storage.get_number(&high_score_key(game)).unwrap_or(0)
    }

    /// Record `score` if it beats the current high score.
    ///
    /// Returns whether it was a new high score.
    pub fn submit_high_score(&self, game: &str, score: i64) -> bool {
        if score <= self.high_score(game) {
            return false;
        }
        tracing::debug!(game, score, "new high score");
        self.storage.set_number(&high_score_key(game), score);
        true
    }

    pub fn game_best(&self, game: &str) -> Option<i64> {
        self.storage.get_number(&best_key(game))
    }

    pub fn set_game_best(&self, game: &str, score: i64) -> bool {
        self.storage.set_number(&best_key(game), score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageBackend};
    use crate::test_utils::memory_storage;

    #[test]
    fn test_high_score_only_increases() {
        let store = MemoryStore::new();
        let board = Scoreboard::new(memory_storage(&store));

        assert_eq!(board.high_score("focusfury"), 0);
        assert!(board.submit_high_score("focusfury", 120));
        assert!(!board.submit_high_score("focusfury", 80));
        assert!(!board.submit_high_score("focusfury", 120));
        assert_eq!(board.high_score("focusfury"), 120);
        assert_eq!(store.get("highscore_focusfury").unwrap().as_deref(), Some("120"));
    }

    #[test]
    fn test_non_positive_score_is_not_a_high_score() {
        let board = Scoreboard::new(memory_storage(&MemoryStore::new()));
        assert!(!board.submit_high_score("triage", 0));
        assert!(!board.submit_high_score("triage", -5));
    }

    #[test]
    fn test_game_best() {
        let store = MemoryStore::new();
        let board = Scoreboard::new(memory_storage(&store));

        assert_eq!(board.game_best("deepwork"), None);
        assert!(board.set_game_best("deepwork", 7));
        assert_eq!(board.game_best("deepwork"), Some(7));
        assert!(store.get("deepwork_best").unwrap().is_some());
    }

    #[test]
    fn test_corrupt_high_score_reads_as_zero() {
        let store = MemoryStore::new();
        store.set("highscore_calendar", "lots").unwrap();
        let board = Scoreboard::new(memory_storage(&store));

        assert_eq!(board.high_score("calendar"), 0);
        assert!(board.submit_high_score("calendar", 1));
    }
}
