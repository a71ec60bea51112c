//! HEXLINK Core - rules engine for the game of Hex
//!
//! This crate provides the game logic for hexlink:
//! - Board grid with six-direction hex adjacency
//! - Opposite-edge connectivity detection (iterative DFS)
//! - Game state, move validation, and win tracking
//! - Save-file record with exact round-trip reconstruction

pub mod board;
pub mod game;
pub mod saved;

// Re-exports for convenient access
pub use board::{Board, Player, DEFAULT_BOARD_SIZE, DIRECTIONS};
pub use game::{GameState, Move, MoveError, PlacedStone};
pub use saved::{load_game, save_game, SavedGame};
