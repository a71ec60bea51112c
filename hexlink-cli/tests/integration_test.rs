//! Integration tests for the hexlink game
//!
//! Tests the full stack: rules engine, connectivity, persistence, search,
//! and the asynchronous move selector.

use std::thread;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use hexlink_core::{load_game, save_game, GameState, Move, MoveError, Player};
use hexlink_mcts::{best_move, run_search, Difficulty, MctsConfig, MoveSelector};

// ============================================================================
// TEST FIXTURES
// ============================================================================

/// Deterministic search RNG
fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

/// Config that finishes fast but is never cut off by the clock
fn quick_config(iterations: u32) -> MctsConfig {
    MctsConfig {
        iterations,
        time_limit: Duration::from_secs(30),
        seed: Some(42),
        ..Default::default()
    }
}

/// Poll a selector to completion, failing loudly instead of hanging
fn wait_for_report(selector: &mut MoveSelector) -> hexlink_mcts::SearchReport {
    let deadline = Instant::now() + Duration::from_secs(20);
    while Instant::now() < deadline {
        if let Some(report) = selector.poll_result() {
            return report;
        }
        thread::sleep(Duration::from_millis(10));
    }
    panic!("selector never produced a result");
}

// ============================================================================
// END-TO-END GAME SCENARIO
// ============================================================================

#[test]
fn test_opening_move_on_standard_board() {
    let mut state = GameState::new(11);

    state.apply_move(Move::new(0, 5)).unwrap();

    assert_eq!(state.current_player(), Player::Blue);
    assert_eq!(state.winner(), None);
    assert_eq!(state.history().len(), 1);
}

#[test]
fn test_full_chain_freezes_the_game() {
    let mut state = GameState::new(11);

    // Red marches down column 0; Blue answers far away in column 7
    for row in 0..11 {
        state.apply_move(Move::new(row, 0)).unwrap();
        if row < 10 {
            state.apply_move(Move::new(row, 7)).unwrap();
        }
    }

    assert_eq!(state.winner(), Some(Player::Red));
    assert_eq!(state.current_player(), Player::Red);
    assert!(state.is_over());

    // Terminal state rejects everything from now on
    let err = state.apply_move(Move::new(5, 5)).unwrap_err();
    assert_eq!(err, MoveError::GameOver);
    assert_eq!(state.winner(), Some(Player::Red));
}

#[test]
fn test_engine_vs_engine_game_ends() {
    let config = quick_config(20);
    let mut rng = rng();
    let mut state = GameState::new(5);

    // 25 cells bound the game; every move must be accepted
    for _ in 0..25 {
        if state.is_over() {
            break;
        }
        let mv = best_move(&state, &config, &mut rng).expect("moves remain");
        state.apply_move(mv).expect("engine move must be legal");
    }

    // Hex cannot end without a winner once the board fills
    assert!(state.is_over());
    assert!(state.history().len() <= 25);
}

// ============================================================================
// SELECTOR
// ============================================================================

#[test]
fn test_selector_minimal_budget_terminates() {
    let state = GameState::new(11);
    let mut selector = MoveSelector::new(quick_config(1));

    assert!(selector.request_move(&state));
    let report = wait_for_report(&mut selector);

    let chosen = report.chosen.expect("an empty board has moves");
    assert!(state.valid_moves().contains(&chosen));
}

#[test]
fn test_selector_round_trip_through_live_game() {
    // Human plays Red by script; the engine answers as Blue
    let mut state = GameState::new(5);
    let mut selector = MoveSelector::new(quick_config(30));

    state.apply_move(Move::new(0, 2)).unwrap();
    assert_eq!(state.current_player(), Player::Blue);

    // While the engine thinks, the caller's state is untouched
    assert!(selector.request_move(&state));
    assert!(!selector.request_move(&state), "slot must be exclusive");

    let report = wait_for_report(&mut selector);
    let mv = report.chosen.expect("engine must answer");
    state.apply_move(mv).expect("engine move must be legal");

    assert_eq!(state.current_player(), Player::Red);
    assert_eq!(state.history().len(), 2);
}

#[test]
fn test_difficulty_presets_drive_the_selector() {
    let state = GameState::new(5);

    let mut config = Difficulty::Beginner.config();
    config.seed = Some(42);
    let mut selector = MoveSelector::new(config);

    selector.request_move(&state);
    let report = wait_for_report(&mut selector);

    assert!(report.chosen.is_some());
    // Beginner runs at most ten iterations
    assert!(report.iterations <= 10);
}

// ============================================================================
// SEARCH QUALITY
// ============================================================================

#[test]
fn test_search_blocks_or_wins_when_one_move_decides() {
    // Red completes column 0 with (2,0); anything else lets Blue win
    // there instead
    let mut state = GameState::new(3);
    state.apply_move(Move::new(0, 0)).unwrap(); // Red
    state.apply_move(Move::new(1, 1)).unwrap(); // Blue
    state.apply_move(Move::new(1, 0)).unwrap(); // Red
    state.apply_move(Move::new(1, 2)).unwrap(); // Blue

    let report = run_search(&state, &quick_config(300), &mut rng());
    assert_eq!(report.chosen, Some(Move::new(2, 0)));
}

// ============================================================================
// PERSISTENCE
// ============================================================================

#[test]
fn test_save_and_load_round_trip_on_disk() {
    let mut state = GameState::new(7);
    state.apply_move(Move::new(0, 3)).unwrap();
    state.apply_move(Move::new(3, 0)).unwrap();
    state.apply_move(Move::new(1, 3)).unwrap();

    let path = std::env::temp_dir().join(format!("hexlink-it-{}.json", std::process::id()));
    save_game(&state, &path).unwrap();
    let loaded = load_game(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded, state);
    assert_eq!(loaded.current_player(), Player::Blue);
    assert_eq!(loaded.history().len(), 3);
}

#[test]
fn test_loaded_game_continues_cleanly() {
    let mut state = GameState::new(5);
    state.apply_move(Move::new(0, 0)).unwrap();

    let path = std::env::temp_dir().join(format!("hexlink-it2-{}.json", std::process::id()));
    save_game(&state, &path).unwrap();
    let mut loaded = load_game(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    // The reconstructed game accepts the same continuation the original does
    loaded.apply_move(Move::new(1, 1)).unwrap();
    state.apply_move(Move::new(1, 1)).unwrap();
    assert_eq!(loaded, state);
}
