//! Kwazam - terminal front end for Kwazam Chess
//!
//! Hot-seat play on one terminal, plus a viewer for saved games.

#![warn(missing_docs)]

mod cli;
mod config;
mod save_file;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use config::GameConfig;
use kwazam_rules::{GameMaster, KwazamRules};
use save_file::SaveFormat;
use std::path::{Path, PathBuf};
use terminal::{Outcome, Session};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Play { config, json } => run_play(config, save_format(json)),
        Command::Show { file, json } => run_show(&file, save_format(json)),
    }
}

fn save_format(json: bool) -> SaveFormat {
    if json { SaveFormat::Json } else { SaveFormat::Text }
}

/// Play a game on stdin/stdout
#[instrument(skip(config_path), fields(config = %config_path.display()))]
fn run_play(config_path: PathBuf, format: SaveFormat) -> Result<()> {
    let config = GameConfig::load_or_default(&config_path)?;
    info!(players = ?config.players(), "Starting Kwazam game");

    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();
    let mut session = Session::new(config, format, stdin, stdout)?;

    let outcome = session.run()?;
    let turns = session.game().turn_count();
    match outcome {
        Outcome::Won(winner) => info!(%winner, turns, "Game finished"),
        Outcome::Abandoned => info!(turns, "Game abandoned"),
    }
    Ok(())
}

/// Print a saved game
#[instrument(skip(file), fields(file = %file.display()))]
fn run_show(file: &Path, format: SaveFormat) -> Result<()> {
    let snapshot = save_file::load(file, format)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let game = GameMaster::from_snapshot(snapshot, KwazamRules::default())?;

    println!("{}", game.board().render());
    println!(
        "Turn {} - player {} to move",
        game.turn_count(),
        game.current_player()
    );
    if let Some(winner) = game.winner() {
        println!("Player {} has won", winner);
    }
    Ok(())
}
