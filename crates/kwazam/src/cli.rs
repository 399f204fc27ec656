//! Command-line interface for kwazam.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Kwazam Chess - two players, one 8x5 board
#[derive(Parser, Debug)]
#[command(name = "kwazam")]
#[command(about = "Play Kwazam Chess in the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a hot-seat game on this terminal
    Play {
        /// Path to the game config file
        #[arg(short, long, default_value = "kwazam.toml")]
        config: PathBuf,

        /// Save and load games as JSON instead of the text format
        #[arg(long)]
        json: bool,
    },

    /// Print a saved game
    Show {
        /// Save file to read
        file: PathBuf,

        /// The file is JSON rather than the text format
        #[arg(long)]
        json: bool,
    },
}
