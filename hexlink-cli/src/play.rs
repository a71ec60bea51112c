//! Play command - interactive game against the engine
//!
//! The human plays Red (top edge to bottom edge) and moves first; the
//! engine plays Blue. While the engine thinks on its worker thread the
//! loop keeps polling, so the terminal stays responsive.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;

use hexlink_core::{load_game, save_game, GameState, Move, Player};
use hexlink_mcts::{Difficulty, MoveSelector};

/// Poll cadence while the engine is thinking
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Args)]
pub struct PlayArgs {
    /// Board side length (minimum 2)
    #[arg(long, default_value = "11")]
    pub size: usize,

    /// Engine strength
    #[arg(long, default_value = "medium", value_parser = parse_difficulty)]
    pub difficulty: Difficulty,

    /// Resume from a save file
    #[arg(long, value_name = "FILE")]
    pub load: Option<PathBuf>,
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    s.parse().map_err(|e| format!("{e}"))
}

/// What the human asked for this turn
enum Command {
    Place(Move),
    Save(PathBuf),
    Quit,
}

pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    if args.size < 2 {
        bail!("board size must be at least 2");
    }

    let mut state = match &args.load {
        Some(path) => {
            load_game(path).with_context(|| format!("failed to resume {}", path.display()))?
        }
        None => GameState::new(args.size),
    };

    let mut config = args.difficulty.config();
    config.seed = seed;
    let mut selector = MoveSelector::new(config);

    tracing::info!(
        size = state.size(),
        difficulty = args.difficulty.name(),
        "starting game"
    );

    println!("You are Red (top to bottom). The engine is Blue (left to right).");
    println!("Enter moves as `row col`; `save <file>` stores the game, `quit` leaves.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        println!();
        render(&state);

        if let Some(winner) = state.winner() {
            match winner {
                Player::Red => println!("You win!"),
                Player::Blue => println!("The engine wins."),
            }
            return Ok(());
        }
        if state.valid_moves().is_empty() {
            // Unreachable in practice: a full Hex board always has a winner
            println!("No moves remain.");
            return Ok(());
        }

        match state.current_player() {
            Player::Red => match human_turn(&mut state, &mut lines)? {
                TurnOutcome::Played => {}
                TurnOutcome::Quit => return Ok(()),
            },
            Player::Blue => engine_turn(&mut state, &mut selector)?,
        }
    }
}

enum TurnOutcome {
    Played,
    Quit,
}

// ============================================================================
// HUMAN TURN
// ============================================================================

fn human_turn(
    state: &mut GameState,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<TurnOutcome> {
    loop {
        print!("your move> ");
        io::stdout().flush().ok();

        let line = match lines.next() {
            Some(line) => line.context("failed to read input")?,
            None => return Ok(TurnOutcome::Quit),
        };

        match parse_command(&line) {
            Some(Command::Quit) => return Ok(TurnOutcome::Quit),
            Some(Command::Save(path)) => {
                match save_game(state, &path) {
                    Ok(()) => println!("saved to {}", path.display()),
                    Err(e) => println!("save failed: {e:#}"),
                }
                // Saving does not consume the turn
            }
            Some(Command::Place(mv)) => match state.apply_move(mv) {
                Ok(()) => return Ok(TurnOutcome::Played),
                Err(e) => println!("{e}"),
            },
            None => println!("could not read that; try `row col`, `save <file>`, or `quit`"),
        }
    }
}

fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let first = words.next()?;

    match first {
        "quit" | "q" | "exit" => Some(Command::Quit),
        "save" => {
            let path = words.next()?;
            Some(Command::Save(Path::new(path).to_path_buf()))
        }
        _ => {
            let row: usize = first.parse().ok()?;
            let col: usize = words.next()?.parse().ok()?;
            Some(Command::Place(Move::new(row, col)))
        }
    }
}

// ============================================================================
// ENGINE TURN
// ============================================================================

fn engine_turn(state: &mut GameState, selector: &mut MoveSelector) -> Result<()> {
    print!("engine is thinking");
    io::stdout().flush().ok();

    // The engine gets its own copy; the live state stays ours until the
    // answer arrives
    selector.request_move(state);

    let report = loop {
        if let Some(report) = selector.poll_result() {
            break report;
        }
        print!(".");
        io::stdout().flush().ok();
        thread::sleep(POLL_INTERVAL);
    };
    println!();

    match report.chosen {
        Some(mv) => {
            state
                .apply_move(mv)
                .with_context(|| format!("engine chose an illegal move {mv}"))?;
            tracing::info!(%mv, iterations = report.iterations, "engine moved");
            println!("engine plays {mv}");
        }
        None => println!("the engine has no move"),
    }

    Ok(())
}

// ============================================================================
// RENDERING
// ============================================================================

/// Print the board as a slanted rhombus; every row shifts right so the
/// six-neighbor adjacency is visible on screen
fn render(state: &GameState) {
    let size = state.size();

    print!("    ");
    for col in 0..size {
        print!("{col:>2} ");
    }
    println!("  (Blue: left-right)");

    for row in 0..size {
        print!("{}{row:>3} ", " ".repeat(row));
        for col in 0..size {
            let glyph = match state.board().cell(row, col) {
                Some(Player::Red) => 'R',
                Some(Player::Blue) => 'B',
                None => '.',
            };
            print!(" {glyph} ");
        }
        println!();
    }
    println!("  (Red: top-bottom)");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_place() {
        match parse_command("3 5") {
            Some(Command::Place(mv)) => assert_eq!(mv, Move::new(3, 5)),
            _ => panic!("expected a placement"),
        }
    }

    #[test]
    fn test_parse_quit_and_save() {
        assert!(matches!(parse_command("quit"), Some(Command::Quit)));
        assert!(matches!(parse_command("q"), Some(Command::Quit)));
        match parse_command("save game.json") {
            Some(Command::Save(path)) => assert_eq!(path, PathBuf::from("game.json")),
            _ => panic!("expected a save"),
        }
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_command("").is_none());
        assert!(parse_command("one two").is_none());
        assert!(parse_command("3").is_none());
        assert!(parse_command("save").is_none());
    }
}
