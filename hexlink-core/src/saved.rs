//! Save-file record for a game in progress
//!
//! `SavedGame` is the on-disk shape: plain rows of cells plus the turn,
//! winner, and move history. Reconstruction validates the record before
//! trusting it.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::board::{Board, Player};
use crate::game::{GameState, PlacedStone};

/// On-disk representation of a game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    pub board_size: usize,
    pub grid: Vec<Vec<Option<Player>>>,
    pub current_player: Player,
    pub winner: Option<Player>,
    pub history: Vec<PlacedStone>,
}

impl GameState {
    /// Snapshot this state as a serializable record
    pub fn to_saved(&self) -> SavedGame {
        let size = self.size();
        let grid = (0..size)
            .map(|row| (0..size).map(|col| self.board().cell(row, col)).collect())
            .collect();

        SavedGame {
            board_size: size,
            grid,
            current_player: self.current_player(),
            winner: self.winner(),
            history: self.history().to_vec(),
        }
    }

    /// Rebuild a state from a record, field for field
    pub fn from_saved(saved: SavedGame) -> Result<GameState> {
        let size = saved.board_size;
        if size == 0 {
            bail!("saved game has board size 0");
        }
        if saved.grid.len() != size {
            bail!(
                "saved game claims size {} but has {} rows",
                size,
                saved.grid.len()
            );
        }

        let mut cells = Vec::with_capacity(size * size);
        for (row, cols) in saved.grid.iter().enumerate() {
            if cols.len() != size {
                bail!("row {} has {} cells, expected {}", row, cols.len(), size);
            }
            cells.extend(cols.iter().copied());
        }

        for stone in &saved.history {
            if stone.row >= size || stone.col >= size {
                bail!(
                    "history entry ({}, {}) is outside a size-{} board",
                    stone.row,
                    stone.col,
                    size
                );
            }
        }

        Ok(GameState::from_parts(
            Board::from_cells(size, cells),
            saved.current_player,
            saved.winner,
            saved.history,
        ))
    }
}

/// Write a game to `path` as JSON
pub fn save_game(state: &GameState, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&state.to_saved())?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write save file {}", path.display()))?;
    Ok(())
}

/// Read a game back from `path`
pub fn load_game(path: &Path) -> Result<GameState> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read save file {}", path.display()))?;
    let saved: SavedGame = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid save file", path.display()))?;
    GameState::from_saved(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Move;

    fn played_state() -> GameState {
        let mut state = GameState::new(5);
        state.apply_move(Move::new(0, 2)).unwrap();
        state.apply_move(Move::new(2, 2)).unwrap();
        state.apply_move(Move::new(1, 2)).unwrap();
        state
    }

    #[test]
    fn test_roundtrip_reproduces_every_field() {
        let state = played_state();
        let rebuilt = GameState::from_saved(state.to_saved()).unwrap();

        assert_eq!(rebuilt, state);
        assert_eq!(rebuilt.current_player(), state.current_player());
        assert_eq!(rebuilt.winner(), state.winner());
        assert_eq!(rebuilt.history(), state.history());
    }

    #[test]
    fn test_roundtrip_with_winner() {
        let mut state = GameState::new(2);
        state.apply_move(Move::new(0, 0)).unwrap();
        state.apply_move(Move::new(0, 1)).unwrap();
        state.apply_move(Move::new(1, 0)).unwrap();
        assert!(state.is_over());

        let rebuilt = GameState::from_saved(state.to_saved()).unwrap();
        assert_eq!(rebuilt, state);
        assert_eq!(rebuilt.winner(), Some(Player::Red));
    }

    #[test]
    fn test_json_roundtrip() {
        let state = played_state();
        let json = serde_json::to_string(&state.to_saved()).unwrap();
        let saved: SavedGame = serde_json::from_str(&json).unwrap();
        let rebuilt = GameState::from_saved(saved).unwrap();

        assert_eq!(rebuilt, state);
    }

    #[test]
    fn test_mismatched_grid_rejected() {
        let mut saved = played_state().to_saved();
        saved.grid.pop();

        assert!(GameState::from_saved(saved).is_err());
    }

    #[test]
    fn test_ragged_row_rejected() {
        let mut saved = played_state().to_saved();
        saved.grid[0].pop();

        assert!(GameState::from_saved(saved).is_err());
    }

    #[test]
    fn test_history_out_of_bounds_rejected() {
        let mut saved = played_state().to_saved();
        saved.history.push(PlacedStone {
            row: 9,
            col: 9,
            player: Player::Red,
        });

        assert!(GameState::from_saved(saved).is_err());
    }
}
