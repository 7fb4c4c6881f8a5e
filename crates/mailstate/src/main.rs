//! `mailstate` - replay and inspect mail client state.
//!
//! Seeds a store from recorded server responses, replays a notification log
//! through the sync dispatcher and reports the result.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mailstate_core::SyncConfig;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "mailstate",
    about = "Replay server notifications against a mail client store",
    version
)]
struct Cli {
    /// Settings file (JSON). Defaults to `<config dir>/mailstate/settings.json`.
    #[arg(long, global = true, env = "MAILSTATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Seed a store, replay a notification log and report the result.
    Replay(ReplayArgs),
    /// Print the normalized form of a wire conversation or message.
    Normalize(NormalizeArgs),
}

#[derive(Debug, Args)]
struct ReplayArgs {
    /// Notification log: a JSON array of notifications.
    #[arg(long)]
    notifications: PathBuf,

    /// Search response used to seed conversations and messages.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Folder tree used to seed folders.
    #[arg(long)]
    folders: Option<PathBuf>,

    /// Tag directory: a JSON array of `{id, name, color}`.
    #[arg(long)]
    tags: Option<PathBuf>,

    /// Folder the conversation list shows.
    #[arg(long)]
    folder: Option<String>,

    /// Write the final store and report here as JSON instead of a summary.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct NormalizeArgs {
    /// Wire conversation (JSON).
    #[arg(long, required_unless_present = "message", conflicts_with = "message")]
    conversation: Option<PathBuf>,

    /// Wire message (JSON).
    #[arg(long, required_unless_present = "conversation")]
    message: Option<PathBuf>,

    /// Treat the message as a complete fetch.
    #[arg(long, requires = "message")]
    complete: bool,

    /// Tag directory used to resolve tag names.
    #[arg(long)]
    tags: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailstate=info,mailstate_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;
    debug!(?config, "Settings loaded");

    match cli.command {
        Command::Replay(args) => {
            info!("Replaying {}", args.notifications.display());
            commands::replay(&args, &config)
        }
        Command::Normalize(args) => commands::normalize(&args, &config),
    }
}

fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailstate")
        .join("settings.json")
}

fn load_config(path: Option<PathBuf>) -> Result<SyncConfig> {
    let path = path.unwrap_or_else(settings_path);
    SyncConfig::load(&path).with_context(|| format!("Failed to load settings from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn normalize_requires_exactly_one_input() {
        assert!(Cli::try_parse_from(["mailstate", "normalize"]).is_err());
        assert!(
            Cli::try_parse_from([
                "mailstate",
                "normalize",
                "--conversation",
                "c.json",
                "--message",
                "m.json"
            ])
            .is_err()
        );
        assert!(
            Cli::try_parse_from(["mailstate", "normalize", "--message", "m.json", "--complete"])
                .is_ok()
        );
    }
}
