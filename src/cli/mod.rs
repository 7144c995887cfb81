//! CLI argument definitions for agentdeck.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Agent Deck - collect agent cards, clear operations, climb the ranks.
///
/// Run `deck` with no arguments for a progress summary.
#[derive(Parser, Debug)]
#[command(name = "deck")]
#[command(author, version, about = "Progression tracking and session locking for the agent card deck", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Store data in <path> instead of the platform data directory.
    /// Can also be set via DECK_DATA_DIR environment variable.
    #[arg(long = "data-dir", global = true, env = "DECK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Progression: xp, cards, operations, rank
    Progress {
        #[command(subcommand)]
        command: ProgressCommands,
    },

    /// Browse the agent card catalog
    Agents {
        #[command(subcommand)]
        command: AgentsCommands,
    },

    /// Active-session locks (one tab per game)
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Game high scores
    Score {
        #[command(subcommand)]
        command: ScoreCommands,
    },

    /// Watch keys for changes made by other processes
    ///
    /// Prints one JSON line per detected conflict.
    Watch {
        /// Key to watch; matches keys equal to or containing it (repeatable).
        /// Defaults to the game score keys.
        #[arg(short, long = "key")]
        keys: Vec<String>,

        /// Also watch progress and re-read it whenever another process changes it
        #[arg(long)]
        reload: bool,

        /// Stop after this many seconds (default: until Ctrl-C)
        #[arg(long)]
        seconds: Option<u64>,
    },

    /// Configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Build and environment information
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

/// Progression subcommands
#[derive(Subcommand, Debug)]
pub enum ProgressCommands {
    /// Show the full progression state
    Show,

    /// Show the current rank and what the next one needs
    Rank,

    /// Grant experience points
    Xp {
        /// Amount to add
        amount: u64,
    },

    /// Collect a card (+25 xp the first time)
    Collect {
        /// Card id (e.g., meal_planner)
        card: String,
    },

    /// Complete an operation (+100 xp the first time, unlocks the next one)
    Complete {
        /// Operation id (e.g., op_1)
        operation: String,
    },

    /// Unlock an operation without completing it
    Unlock {
        /// Operation id (e.g., op_3)
        operation: String,
    },

    /// Record an achievement
    Achieve {
        /// Achievement id
        id: String,
    },

    /// Complete an operation and collect its reward cards
    Mission {
        /// Operation id (e.g., op_1)
        operation: String,

        /// Reward card id (repeatable)
        #[arg(short, long = "card")]
        cards: Vec<String>,
    },

    /// Reset all progress back to a new player
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Catalog subcommands
#[derive(Subcommand, Debug)]
pub enum AgentsCommands {
    /// List agents, optionally filtered
    List {
        /// Only agents from this deck (daily-ops, digital-ops, life-systems, legendary)
        #[arg(long)]
        deck: Option<String>,

        /// Only agents of this rarity (common, rare, epic, legendary)
        #[arg(long)]
        rarity: Option<String>,
    },

    /// Show one agent, including its prompt
    Show {
        /// Agent id (e.g., the_conductor)
        id: String,
    },
}

/// Session lock subcommands
#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Show whether a session is held by a live heartbeat
    Status {
        /// Session id (e.g., focusfury)
        id: String,
    },

    /// Claim a session and keep it alive until time runs out or Ctrl-C
    Play {
        /// Session id (e.g., focusfury)
        id: String,

        /// Game name shown when the session is held elsewhere
        #[arg(long)]
        name: Option<String>,

        /// Release after this many seconds (default: until Ctrl-C)
        #[arg(long)]
        seconds: Option<u64>,

        /// Heartbeat interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Heartbeat age in milliseconds after which a session is free
        #[arg(long)]
        threshold_ms: Option<u64>,
    },
}

/// Score subcommands
#[derive(Subcommand, Debug)]
pub enum ScoreCommands {
    /// Show a game's high score and best record
    Show {
        /// Game id (e.g., focusfury)
        game: String,
    },

    /// Submit a score; kept only if it beats the high score
    Submit {
        /// Game id (e.g., focusfury)
        game: String,

        /// Score achieved
        #[arg(allow_negative_numbers = true)]
        score: i64,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved configuration and where each value came from
    Show,
}

/// System subcommands
#[derive(Subcommand, Debug)]
pub enum SystemCommands {
    /// Show version, build and path information
    Info,
}
