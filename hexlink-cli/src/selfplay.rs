//! Selfplay command - engine-vs-engine training data generation
//!
//! Plays the engine against itself with the synchronous best-move query
//! and records one sample per position: the board before the move, whose
//! turn it was, and how the game ended for them.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use hexlink_core::{GameState, Player};
use hexlink_mcts::{best_move, MctsConfig};

#[derive(Args)]
pub struct SelfplayArgs {
    /// Number of games to generate
    #[arg(long, default_value = "100")]
    pub games: usize,

    /// Board side length
    #[arg(long, default_value = "11")]
    pub size: usize,

    /// Search iterations per move
    #[arg(long, default_value = "500")]
    pub iterations: u32,

    /// Output JSON file
    #[arg(long, value_name = "FILE")]
    pub output: PathBuf,
}

/// One recorded position
#[derive(Serialize)]
struct Sample {
    grid: Vec<Vec<Option<Player>>>,
    to_move: Player,
    /// +1 when the mover went on to win, -1 when they lost, 0 undecided
    outcome: i8,
}

pub fn run(args: SelfplayArgs, seed: Option<u64>) -> Result<()> {
    let config = MctsConfig {
        seed,
        ..MctsConfig::fixed_iterations(args.iterations)
    };
    let mut rng = create_rng(seed);

    tracing::info!(
        games = args.games,
        size = args.size,
        iterations = args.iterations,
        "starting self-play"
    );
    let started = Instant::now();

    let bar = ProgressBar::new(args.games as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} games ({eta})")
            .expect("static progress template"),
    );

    let mut samples = Vec::new();
    for _ in 0..args.games {
        samples.extend(play_one_game(args.size, &config, &mut rng));
        bar.inc(1);
    }
    bar.finish();

    let json = serde_json::to_string(&samples)?;
    std::fs::write(&args.output, json)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    tracing::info!(
        samples = samples.len(),
        elapsed_s = started.elapsed().as_secs(),
        "self-play finished"
    );
    println!(
        "wrote {} samples from {} games to {}",
        samples.len(),
        args.games,
        args.output.display()
    );

    Ok(())
}

/// Create RNG from seed or entropy
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Play a single game to the end and score every recorded position
fn play_one_game(size: usize, config: &MctsConfig, rng: &mut ChaCha8Rng) -> Vec<Sample> {
    let mut state = GameState::new(size);
    let mut positions: Vec<(Vec<Vec<Option<Player>>>, Player)> = Vec::new();

    while !state.is_over() {
        let Some(mv) = best_move(&state, config, rng) else {
            break;
        };

        positions.push((state.to_saved().grid, state.current_player()));
        if state.apply_move(mv).is_err() {
            // The engine only proposes legal moves; bail out of a game
            // that contradicts that rather than spin forever
            tracing::warn!(%mv, "self-play move rejected, abandoning game");
            break;
        }
    }

    let winner = state.winner();
    positions
        .into_iter()
        .map(|(grid, to_move)| Sample {
            grid,
            to_move,
            outcome: match winner {
                Some(w) if w == to_move => 1,
                Some(_) => -1,
                None => 0,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_one_game_scores_every_position() {
        let config = MctsConfig::fixed_iterations(5);
        let mut rng = create_rng(Some(42));

        let samples = play_one_game(3, &config, &mut rng);

        // A 3x3 game always ends with a winner, so every sample is scored
        assert!(!samples.is_empty());
        assert!(samples.iter().all(|s| s.outcome == 1 || s.outcome == -1));

        // Moves alternate starting with Red
        assert_eq!(samples[0].to_move, Player::Red);
        if samples.len() > 1 {
            assert_eq!(samples[1].to_move, Player::Blue);
        }
    }

    #[test]
    fn test_winner_samples_score_plus_one() {
        let config = MctsConfig::fixed_iterations(5);
        let mut rng = create_rng(Some(7));

        let samples = play_one_game(2, &config, &mut rng);
        let last = samples.last().unwrap();

        // The final mover is the winner
        assert_eq!(last.outcome, 1);
    }
}
