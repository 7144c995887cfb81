//! Agent Deck CLI - progression tracking and session locking for the agent card deck.

use agentdeck::action_log;
use agentdeck::cli::{
    AgentsCommands, Cli, Commands, ConfigCommands, ProgressCommands, ScoreCommands,
    SessionCommands, SystemCommands,
};
use agentdeck::commands::{self, Context, Output};
use agentdeck::config::{self, ConfigOverrides, OutputFormat};
use agentdeck::progress::{AssumeYes, TerminalConfirm};
use agentdeck::session::SystemClock;
use agentdeck::storage::get_data_dir;
use clap::Parser;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "DECK_LOG";

/// Set to `json` for one JSON object per log event.
const LOG_FORMAT_ENV: &str = "DECK_LOG_FORMAT";

fn main() {
    init_tracing();

    let cli = Cli::parse();

    let data_dir = match get_data_dir(cli.data_dir.clone()) {
        Ok(dir) => dir,
        Err(e) => fail(&e, cli.human_readable),
    };

    let overrides = overrides_for(&cli);
    let resolved = match config::config_path().and_then(|p| config::resolve_config(&p, &overrides)) {
        Ok(resolved) => resolved,
        Err(e) => fail(&e, cli.human_readable),
    };
    let human = cli.human_readable || resolved.output_format() == OutputFormat::Human;
    let log_actions = resolved.action_log_enabled();
    let ctx = Context::new(data_dir, resolved);

    let (cmd_name, args_json) = serialize_command(&cli.command);
    let start = Instant::now();

    let result = run_command(cli.command, &ctx, human);

    let duration = start.elapsed().as_millis() as u64;
    let (success, error) = match &result {
        Ok(_) => (true, None),
        Err(e) => (false, Some(e.to_string())),
    };
    if log_actions {
        action_log::log_action(ctx.data_dir(), &cmd_name, args_json, success, error, duration);
    }

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => fail(&e, human),
    }
}

/// Log to stderr so stdout stays clean for command output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn overrides_for(cli: &Cli) -> ConfigOverrides {
    let mut overrides = ConfigOverrides::new();
    if cli.human_readable {
        overrides = overrides.with_output_format(OutputFormat::Human);
    }
    if let Some(Commands::Session {
        command:
            SessionCommands::Play {
                interval_ms,
                threshold_ms,
                ..
            },
    }) = &cli.command
    {
        if let Some(interval) = interval_ms {
            overrides = overrides.with_heartbeat_interval_ms(*interval);
        }
        if let Some(threshold) = threshold_ms {
            overrides = overrides.with_stale_threshold_ms(*threshold);
        }
    }
    overrides
}

/// Run one command. `Ok(false)` means it ran but the process should exit
/// non-zero (a session held elsewhere).
fn run_command(command: Option<Commands>, ctx: &Context, human: bool) -> agentdeck::Result<bool> {
    match command {
        None => output(&commands::summary(ctx)?, human),

        Some(Commands::Progress { command }) => match command {
            ProgressCommands::Show => output(&commands::progress_show(ctx)?, human),
            ProgressCommands::Rank => output(&commands::progress_rank(ctx)?, human),
            ProgressCommands::Xp { amount } => output(&commands::progress_xp(ctx, amount)?, human),
            ProgressCommands::Collect { card } => {
                output(&commands::progress_collect(ctx, &card)?, human)
            }
            ProgressCommands::Complete { operation } => {
                output(&commands::progress_complete(ctx, &operation)?, human)
            }
            ProgressCommands::Unlock { operation } => {
                output(&commands::progress_unlock(ctx, &operation)?, human)
            }
            ProgressCommands::Achieve { id } => {
                output(&commands::progress_achieve(ctx, &id)?, human)
            }
            ProgressCommands::Mission { operation, cards } => {
                output(&commands::progress_mission(ctx, &operation, &cards)?, human)
            }
            ProgressCommands::Reset { yes } => {
                let result = if yes {
                    commands::progress_reset(ctx, &AssumeYes)?
                } else {
                    commands::progress_reset(ctx, &TerminalConfirm)?
                };
                output(&result, human)
            }
        },

        Some(Commands::Agents { command }) => match command {
            AgentsCommands::List { deck, rarity } => output(
                &commands::agents_list(ctx, deck.as_deref(), rarity.as_deref())?,
                human,
            ),
            AgentsCommands::Show { id } => output(&commands::agents_show(ctx, &id)?, human),
        },

        Some(Commands::Session { command }) => {
            let lock_config = ctx.config().lock_config();
            match command {
                SessionCommands::Status { id } => output(
                    &commands::session_status(ctx, &id, &SystemClock, lock_config)?,
                    human,
                ),
                SessionCommands::Play {
                    id, name, seconds, ..
                } => {
                    let stop = stop_on_interrupt();
                    let result = commands::session_play(
                        ctx,
                        &id,
                        name.as_deref(),
                        seconds.map(Duration::from_secs),
                        Arc::new(SystemClock),
                        lock_config,
                        &stop,
                    )?;
                    output(&result, human);
                    return Ok(!result.is_locked());
                }
            }
        }

        Some(Commands::Score { command }) => match command {
            ScoreCommands::Show { game } => output(&commands::score_show(ctx, &game)?, human),
            ScoreCommands::Submit { game, score } => {
                output(&commands::score_submit(ctx, &game, score)?, human)
            }
        },

        Some(Commands::Watch {
            keys,
            reload,
            seconds,
        }) => {
            let stop = stop_on_interrupt();
            let result = commands::watch(
                ctx,
                &keys,
                reload,
                seconds.map(Duration::from_secs),
                &stop,
                |conflict| {
                    if human {
                        println!(
                            "{} changed: {} -> {}",
                            conflict.key,
                            conflict.old_value.as_deref().unwrap_or("(none)"),
                            conflict.new_value.as_deref().unwrap_or("(none)")
                        );
                    } else if let Ok(line) = serde_json::to_string(conflict) {
                        println!("{}", line);
                    }
                },
            )?;
            output(&result, human)
        }

        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => output(&commands::config_show(ctx)?, human),
        },

        Some(Commands::System { command }) => match command {
            SystemCommands::Info => output(&commands::system_info(ctx)?, human),
        },
    }
    Ok(true)
}

/// A flag set on Ctrl-C. If the handler cannot be installed, Ctrl-C just
/// kills the process and the session heartbeat ages out.
fn stop_on_interrupt() -> Arc<AtomicBool> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
    }
    stop
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}

fn fail(error: &agentdeck::Error, human: bool) -> ! {
    if human {
        eprintln!("Error: {}", error);
    } else {
        eprintln!("{}", serde_json::json!({ "error": error.to_string() }));
    }
    process::exit(1);
}

fn serialize_command(command: &Option<Commands>) -> (String, serde_json::Value) {
    use serde_json::json;

    match command {
        None => ("summary".to_string(), json!({})),

        Some(Commands::Progress { command }) => match command {
            ProgressCommands::Show => ("progress show".to_string(), json!({})),
            ProgressCommands::Rank => ("progress rank".to_string(), json!({})),
            ProgressCommands::Xp { amount } => {
                ("progress xp".to_string(), json!({ "amount": amount }))
            }
            ProgressCommands::Collect { card } => {
                ("progress collect".to_string(), json!({ "card": card }))
            }
            ProgressCommands::Complete { operation } => (
                "progress complete".to_string(),
                json!({ "operation": operation }),
            ),
            ProgressCommands::Unlock { operation } => (
                "progress unlock".to_string(),
                json!({ "operation": operation }),
            ),
            ProgressCommands::Achieve { id } => {
                ("progress achieve".to_string(), json!({ "id": id }))
            }
            ProgressCommands::Mission { operation, cards } => (
                "progress mission".to_string(),
                json!({ "operation": operation, "cards": cards }),
            ),
            ProgressCommands::Reset { yes } => {
                ("progress reset".to_string(), json!({ "yes": yes }))
            }
        },

        Some(Commands::Agents { command }) => match command {
            AgentsCommands::List { deck, rarity } => (
                "agents list".to_string(),
                json!({ "deck": deck, "rarity": rarity }),
            ),
            AgentsCommands::Show { id } => ("agents show".to_string(), json!({ "id": id })),
        },

        Some(Commands::Session { command }) => match command {
            SessionCommands::Status { id } => {
                ("session status".to_string(), json!({ "id": id }))
            }
            SessionCommands::Play {
                id,
                name,
                seconds,
                interval_ms,
                threshold_ms,
            } => (
                "session play".to_string(),
                json!({
                    "id": id,
                    "name": name,
                    "seconds": seconds,
                    "interval_ms": interval_ms,
                    "threshold_ms": threshold_ms,
                }),
            ),
        },

        Some(Commands::Score { command }) => match command {
            ScoreCommands::Show { game } => ("score show".to_string(), json!({ "game": game })),
            ScoreCommands::Submit { game, score } => (
                "score submit".to_string(),
                json!({ "game": game, "score": score }),
            ),
        },

        Some(Commands::Watch {
            keys,
            reload,
            seconds,
        }) => (
            "watch".to_string(),
            json!({ "keys": keys, "reload": reload, "seconds": seconds }),
        ),

        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => ("config show".to_string(), json!({})),
        },

        Some(Commands::System { command }) => match command {
            SystemCommands::Info => ("system info".to_string(), json!({})),
        },
    }
}
