//! Game state and rules
//!
//! Stones are only ever added, never moved or removed; win detection runs
//! a full connectivity check for the mover after each placement.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, Player, DEFAULT_BOARD_SIZE};

/// A stone placement
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub row: usize,
    pub col: usize,
}

impl Move {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Why a move was rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("cell ({row}, {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },

    #[error("cell ({row}, {col}) is already occupied")]
    Occupied { row: usize, col: usize },

    #[error("the game is already decided")]
    GameOver,
}

/// One entry in the move history
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedStone {
    pub row: usize,
    pub col: usize,
    pub player: Player,
}

/// Full game state: board, turn, winner, and an append-only history.
///
/// `Clone` produces a fully independent copy sharing no storage with the
/// original, which is what the search tree relies on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    current_player: Player,
    winner: Option<Player>,
    history: Vec<PlacedStone>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_SIZE)
    }
}

impl GameState {
    /// New empty game, Red to move
    pub fn new(size: usize) -> Self {
        Self {
            board: Board::new(size),
            current_player: Player::Red,
            winner: None,
            history: Vec::new(),
        }
    }

    pub(crate) fn from_parts(
        board: Board,
        current_player: Player,
        winner: Option<Player>,
        history: Vec<PlacedStone>,
    ) -> Self {
        Self {
            board,
            current_player,
            winner,
            history,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn size(&self) -> usize {
        self.board.size()
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn history(&self) -> &[PlacedStone] {
        &self.history
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// All empty cells, in row-major order
    pub fn valid_moves(&self) -> Vec<Move> {
        self.board
            .cells()
            .filter(|(_, _, cell)| cell.is_none())
            .map(|(row, col, _)| Move::new(row, col))
            .collect()
    }

    /// Place the current player's stone.
    ///
    /// A winning placement freezes the winner and leaves the turn with
    /// them; otherwise the turn passes to the opponent. On rejection the
    /// state is left untouched.
    pub fn apply_move(&mut self, mv: Move) -> Result<(), MoveError> {
        if self.winner.is_some() {
            return Err(MoveError::GameOver);
        }
        if !self.board.in_bounds(mv.row, mv.col) {
            return Err(MoveError::OutOfBounds {
                row: mv.row,
                col: mv.col,
            });
        }
        if self.board.cell(mv.row, mv.col).is_some() {
            return Err(MoveError::Occupied {
                row: mv.row,
                col: mv.col,
            });
        }

        let mover = self.current_player;
        self.board.set(mv.row, mv.col, mover);
        self.history.push(PlacedStone {
            row: mv.row,
            col: mv.col,
            player: mover,
        });

        if self.board.has_connection(mover) {
            self.winner = Some(mover);
        } else {
            self.current_player = mover.opponent();
        }

        Ok(())
    }
}
