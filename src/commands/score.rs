//! Score command implementations.

use super::{Context, Output, json};
use crate::scores::Scoreboard;
use crate::{Error, Result};
use serde::Serialize;

#[derive(Serialize)]
pub struct ScoreView {
    pub game: String,
    pub high_score: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best: Option<i64>,
}

impl Output for ScoreView {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut text = format!("{}: high score {}", self.game, self.high_score);
        if let Some(best) = self.best {
            text.push_str(&format!(", best {}", best));
        }
        text
    }
}

#[derive(Serialize)]
pub struct ScoreSubmitted {
    pub game: String,
    pub score: i64,
    pub new_high_score: bool,
    pub high_score: i64,
}

impl Output for ScoreSubmitted {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.new_high_score {
            format!("New high score for {}: {}", self.game, self.score)
        } else {
            format!(
                "{} scored {} (high score {})",
                self.game, self.score, self.high_score
            )
        }
    }
}

fn check_game(game: &str) -> Result<()> {
    if game.trim().is_empty() {
        return Err(Error::InvalidId("game id must not be empty".to_string()));
    }
    Ok(())
}

pub fn score_show(ctx: &Context, game: &str) -> Result<ScoreView> {
    check_game(game)?;
    let board = Scoreboard::new(ctx.storage());
    Ok(ScoreView {
        game: game.to_string(),
        high_score: board.high_score(game),
        best: board.game_best(game),
    })
}

/// Submit a score. A new high score also becomes the game's best record.
pub fn score_submit(ctx: &Context, game: &str, score: i64) -> Result<ScoreSubmitted> {
    check_game(game)?;
    let board = Scoreboard::new(ctx.storage());
    let new_high_score = board.submit_high_score(game, score);
    if new_high_score {
        board.set_game_best(game, score);
    }
    Ok(ScoreSubmitted {
        game: game.to_string(),
        score,
        new_high_score,
        high_score: board.high_score(game),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;

    #[test]
    fn test_submit_and_show() {
        let (_dir, ctx) = context();
        assert!(score_submit(&ctx, "focusfury", 40).unwrap().new_high_score);
        let lower = score_submit(&ctx, "focusfury", 10).unwrap();
        assert!(!lower.new_high_score);
        assert_eq!(lower.high_score, 40);

        let view = score_show(&ctx, "focusfury").unwrap();
        assert_eq!(view.high_score, 40);
        assert_eq!(view.best, Some(40));
    }

    #[test]
    fn test_empty_game_rejected() {
        let (_dir, ctx) = context();
        assert!(matches!(score_show(&ctx, " "), Err(Error::InvalidId(_))));
    }
}
