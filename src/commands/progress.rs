//! Progress command implementations.

use super::{Context, Output, json};
use crate::models::{OperationId, agent_by_id};
use crate::progress::{Confirm, ProgressStore};
use crate::Result;
use serde::Serialize;

/// Rank and what the next one needs.
#[derive(Serialize)]
pub struct RankView {
    pub id: u8,
    pub name: String,
    pub completed_operations: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_rank: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operations_needed: Option<usize>,
}

impl RankView {
    fn from_store(store: &ProgressStore) -> Self {
        let rank = store.rank();
        let next = store.next_rank();
        Self {
            id: rank.id,
            name: rank.name.to_string(),
            completed_operations: store.state().completed_count(),
            next_rank: next.map(|(r, _)| r.name.to_string()),
            operations_needed: next.map(|(_, n)| n),
        }
    }
}

impl Output for RankView {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut line = format!(
            "Rank: {} ({} operation{} completed)",
            self.name,
            self.completed_operations,
            if self.completed_operations == 1 { "" } else { "s" }
        );
        match (&self.next_rank, self.operations_needed) {
            (Some(next), Some(needed)) => {
                line.push_str(&format!("\nNext: {} in {} more", next, needed));
            }
            _ => line.push_str("\nTop rank reached"),
        }
        line
    }
}

/// Short overview printed by a bare `deck`.
#[derive(Serialize)]
pub struct Summary {
    pub xp: u64,
    pub rank: String,
    pub completed_operations: usize,
    pub unlocked_operations: usize,
    pub cards_collected: usize,
    pub cards_total: usize,
    pub achievements: usize,
}

impl Output for Summary {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!(
            "{} | {} xp\nOperations: {} completed, {} unlocked\nCards: {}/{}\nAchievements: {}",
            self.rank,
            self.xp,
            self.completed_operations,
            self.unlocked_operations,
            self.cards_collected,
            self.cards_total,
            self.achievements
        )
    }
}

pub fn summary(ctx: &Context) -> Result<Summary> {
    let store = ctx.progress();
    let state = store.state();
    let (cards_collected, cards_total) = store.collection_progress();
    Ok(Summary {
        xp: state.xp,
        rank: store.rank().name.to_string(),
        completed_operations: state.completed_count(),
        unlocked_operations: state.unlocked_operations.len(),
        cards_collected,
        cards_total,
        achievements: state.achievements.len(),
    })
}

/// Full progression state.
#[derive(Serialize)]
pub struct ProgressView {
    pub xp: u64,
    pub rank: RankView,
    pub collected_cards: Vec<String>,
    pub completed_operations: Vec<String>,
    pub unlocked_operations: Vec<String>,
    pub achievements: Vec<String>,
    pub catalog_collected: usize,
    pub catalog_total: usize,
}

impl Output for ProgressView {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        fn list(items: &[String]) -> String {
            if items.is_empty() {
                "(none)".to_string()
            } else {
                items.join(", ")
            }
        }
        let mut lines = vec![
            format!("XP: {}", self.xp),
            self.rank.to_human(),
            format!(
                "Cards ({}/{} of catalog): {}",
                self.catalog_collected,
                self.catalog_total,
                list(&self.collected_cards)
            ),
        ];
        lines.push(format!("Completed: {}", list(&self.completed_operations)));
        lines.push(format!("Unlocked: {}", list(&self.unlocked_operations)));
        lines.push(format!("Achievements: {}", list(&self.achievements)));
        lines.join("\n")
    }
}

/// Operations in numeric order, anything else after them.
fn sorted_operations(ops: &[String]) -> Vec<String> {
    let mut sorted = ops.to_vec();
    sorted.sort_by_key(|op| match OperationId::parse(op) {
        Some(id) => (0, id.number(), String::new()),
        None => (1, 0, op.clone()),
    });
    sorted
}

pub fn progress_show(ctx: &Context) -> Result<ProgressView> {
    let store = ctx.progress();
    let state = store.state();
    let (catalog_collected, catalog_total) = store.collection_progress();
    Ok(ProgressView {
        xp: state.xp,
        rank: RankView::from_store(&store),
        collected_cards: state.collected_cards.iter().cloned().collect(),
        completed_operations: sorted_operations(
            &state.completed_operations.iter().cloned().collect::<Vec<_>>(),
        ),
        unlocked_operations: sorted_operations(
            &state.unlocked_operations.iter().cloned().collect::<Vec<_>>(),
        ),
        achievements: state.achievements.iter().cloned().collect(),
        catalog_collected,
        catalog_total,
    })
}

pub fn progress_rank(ctx: &Context) -> Result<RankView> {
    Ok(RankView::from_store(&ctx.progress()))
}

#[derive(Serialize)]
pub struct XpResult {
    pub added: u64,
    pub xp: u64,
}

impl Output for XpResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("+{} xp (total {})", self.added, self.xp)
    }
}

pub fn progress_xp(ctx: &Context, amount: u64) -> Result<XpResult> {
    let mut store = ctx.progress();
    store.add_xp(amount);
    Ok(XpResult {
        added: amount,
        xp: store.xp(),
    })
}

#[derive(Serialize)]
pub struct CollectResult {
    pub card: String,
    /// False when the card was already collected
    pub collected: bool,
    /// Whether the id names a catalog card
    pub in_catalog: bool,
    pub xp: u64,
}

impl Output for CollectResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let name = agent_by_id(&self.card).map_or(self.card.as_str(), |a| a.name);
        let mut text = if self.collected {
            format!("Collected {} (+25 xp, total {})", name, self.xp)
        } else {
            format!("{} is already in your collection", name)
        };
        if !self.in_catalog {
            text.push_str("\nNote: not a catalog card");
        }
        text
    }
}

pub fn progress_collect(ctx: &Context, card: &str) -> Result<CollectResult> {
    let mut store = ctx.progress();
    let collected = store.collect_card(card);
    Ok(CollectResult {
        card: card.to_string(),
        collected,
        in_catalog: agent_by_id(card).is_some(),
        xp: store.xp(),
    })
}

#[derive(Serialize)]
pub struct CompleteResult {
    pub operation: String,
    /// False when the operation was already completed
    pub completed: bool,
    /// The operation this completion unlocked, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked: Option<String>,
    pub xp: u64,
    pub rank: String,
}

impl Output for CompleteResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if !self.completed {
            return format!("{} was already completed", self.operation);
        }
        let mut text = format!(
            "Completed {} (+100 xp, total {})\nRank: {}",
            self.operation, self.xp, self.rank
        );
        if let Some(next) = &self.unlocked {
            text.push_str(&format!("\nUnlocked {}", next));
        }
        text
    }
}

pub fn progress_complete(ctx: &Context, operation: &str) -> Result<CompleteResult> {
    let mut store = ctx.progress();
    let completed = store.complete_operation(operation);
    Ok(CompleteResult {
        operation: operation.to_string(),
        completed,
        unlocked: if completed { unlocked_successor(&store, operation) } else { None },
        xp: store.xp(),
        rank: store.rank().name.to_string(),
    })
}

fn unlocked_successor(store: &ProgressStore, operation: &str) -> Option<String> {
    OperationId::parse(operation)
        .and_then(|op| op.successor())
        .map(|next| next.to_string())
        .filter(|next| store.is_unlocked(next))
}

#[derive(Serialize)]
pub struct UnlockResult {
    pub operation: String,
    /// False when it was already unlocked
    pub unlocked: bool,
}

impl Output for UnlockResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.unlocked {
            format!("Unlocked {}", self.operation)
        } else {
            format!("{} was already unlocked", self.operation)
        }
    }
}

pub fn progress_unlock(ctx: &Context, operation: &str) -> Result<UnlockResult> {
    let mut store = ctx.progress();
    Ok(UnlockResult {
        operation: operation.to_string(),
        unlocked: store.unlock_operation(operation),
    })
}

#[derive(Serialize)]
pub struct AchieveResult {
    pub achievement: String,
    pub awarded: bool,
}

impl Output for AchieveResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.awarded {
            format!("Achievement unlocked: {}", self.achievement)
        } else {
            format!("Already earned: {}", self.achievement)
        }
    }
}

pub fn progress_achieve(ctx: &Context, achievement: &str) -> Result<AchieveResult> {
    let mut store = ctx.progress();
    Ok(AchieveResult {
        achievement: achievement.to_string(),
        awarded: store.award_achievement(achievement),
    })
}

#[derive(Serialize)]
pub struct MissionResult {
    pub operation: String,
    pub newly_completed: bool,
    pub new_cards: Vec<String>,
    pub xp_gained: u64,
    pub xp: u64,
    pub rank: String,
}

impl Output for MissionResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![if self.newly_completed {
            format!("Mission complete: {}", self.operation)
        } else {
            format!("Mission {} was already complete", self.operation)
        }];
        for card in &self.new_cards {
            let name = agent_by_id(card).map_or(card.as_str(), |a| a.name);
            lines.push(format!("  New card: {}", name));
        }
        lines.push(format!(
            "+{} xp (total {}), rank {}",
            self.xp_gained, self.xp, self.rank
        ));
        lines.join("\n")
    }
}

pub fn progress_mission(ctx: &Context, operation: &str, cards: &[String]) -> Result<MissionResult> {
    let mut store = ctx.progress();
    let outcome = store.claim_mission(operation, cards);
    Ok(MissionResult {
        operation: outcome.operation,
        newly_completed: outcome.newly_completed,
        new_cards: outcome.new_cards,
        xp_gained: outcome.xp_gained,
        xp: store.xp(),
        rank: store.rank().name.to_string(),
    })
}

#[derive(Serialize)]
pub struct ResetResult {
    pub reset: bool,
}

impl Output for ResetResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.reset {
            "Progress reset".to_string()
        } else {
            "Reset cancelled".to_string()
        }
    }
}

pub fn progress_reset(ctx: &Context, confirm: &dyn Confirm) -> Result<ResetResult> {
    let mut store = ctx.progress();
    Ok(ResetResult {
        reset: store.reset_progress(confirm),
    })
}
