//! Blanks - A Matrix bot running a fill-in-the-blanks party card game.
//!
//! The bot joins Matrix rooms on invitation and runs at most one game per
//! room. Every round one player judges, everyone else plays answer cards
//! into the blanks of a prompt card, and the judge picks the winning
//! entry. The whole game is driven by `!`-prefixed chat commands.
//!
//! # Commands
//!
//! `!start [points]`, `!stop`, `!pause`, `!resume`, `!join`, `!quit`,
//! `!cards`, `!play <n...>`, `!winner <n>`, `!pick <n...>`, `!list`,
//! `!points`, `!status`, `!help`, `!nocolor` — `!help` in any room prints
//! the details.
//!
//! # Configuration
//!
//! Create a `config.yaml`:
//!
//! ```yaml
//! matrix:
//!   user_id: "@blanks:matrix.org"
//!   password: "your-password"
//!
//! game:
//!   hand_size: 10
//!   min_players: 3
//!   max_idle_rounds: 2
//! ```
//!
//! Any value can be overridden with a `BLANKS_`-prefixed environment
//! variable, e.g. `BLANKS_MATRIX__PASSWORD`.
//!
//! # Usage
//!
//! ```bash
//! blanks --config config.yaml --data ./blanks-data
//! ```
//!
//! The data directory holds the Matrix session (authentication tokens and
//! the SDK's SQLite store); game state is in memory only and does not
//! survive restarts.
//!
//! # Architecture
//!
//! - [`registry`] - session registry and command dispatcher, the heart of
//!   the bot: one game per room, precondition checks, routing to sessions
//! - [`game`] - the card game: deck, hands, rounds, judging
//! - [`commands`] - parsing chat text into commands
//! - [`players`] - player identity and per-game player state
//! - [`matrix`] - Matrix client, session persistence and sync loop
//! - [`chat`] - the transport seam the core talks through
//! - [`config`] - YAML configuration with environment overrides
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - logging level (default: `info`)

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use crate::{bot::Bot, config::Config};

mod bot;
mod chat;
mod commands;
mod config;
mod game;
mod matrix;
mod players;
mod registry;
mod responses;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file.
    #[arg(short, long)]
    config: String,

    /// Path to the directory for storing persistent data (Matrix session).
    #[arg(short, long)]
    data: String,
}

#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("Starting blanks {}...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config file: {}", e);
            return;
        }
    };

    let bot = match Bot::new(config, &args).await {
        Ok(bot) => bot,
        Err(e) => {
            error!("Failed to initialize bot: {}", e);
            return;
        }
    };

    if let Err(e) = bot.start().await {
        error!("matrix sync ended with error: {:?}", e);
    }
}
