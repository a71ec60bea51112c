//! HEXLINK CLI - Command-line interface
//!
//! Commands:
//! - play: interactive game against the engine
//! - selfplay: generate self-play training data

mod play;
mod selfplay;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hexlink")]
#[command(about = "Hex connection game with a Monte Carlo tree search opponent")]
struct Cli {
    /// Random seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the engine in the terminal
    Play(play::PlayArgs),
    /// Generate self-play training data
    Selfplay(selfplay::SelfplayArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play::run(args, cli.seed),
        Commands::Selfplay(args) => selfplay::run(args, cli.seed),
    }
}
