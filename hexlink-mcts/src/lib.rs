//! HEXLINK MCTS - Monte Carlo tree search opponent
//!
//! This crate provides the computer player:
//! - Tree policy (UCT) over an arena-allocated search tree
//! - Random playouts with a ply cap
//! - A budgeted search loop (iteration count + wall-clock deadline)
//! - Background move selection with a single-slot result handoff

pub mod search;
pub mod selector;
pub mod tree;

use std::str::FromStr;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use search::{best_move, playout, run_search, MoveStats, SearchReport};
pub use selector::MoveSelector;
pub use tree::{MctsNode, MctsTree, NodeId};

/// Search configuration
///
/// The search stops at whichever budget runs out first. Both budgets must
/// be positive; neither has an upper bound.
#[derive(Clone, Debug)]
pub struct MctsConfig {
    /// Maximum grow iterations per search
    pub iterations: u32,
    /// Wall-clock budget, checked between iterations
    pub time_limit: Duration,
    /// UCT exploration constant
    pub exploration: f32,
    /// Ply cap for a single playout
    pub max_playout_depth: u32,
    /// Random seed for reproducibility (None = entropy)
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            time_limit: Duration::from_secs_f64(1.5),
            exploration: 1.414, // sqrt(2)
            max_playout_depth: 30,
            seed: None,
        }
    }
}

impl MctsConfig {
    /// Config bounded by iteration count alone (used by self-play, where
    /// wall-clock pressure does not apply)
    pub fn fixed_iterations(iterations: u32) -> Self {
        Self {
            iterations,
            time_limit: Duration::MAX,
            ..Default::default()
        }
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Create RNG from seed or entropy
pub fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Named engine strength presets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Difficulty {
    Beginner,
    Easy,
    Medium,
    Hard,
    Expert,
    Unbeatable,
}

/// Unrecognized difficulty name
#[derive(Clone, Debug, thiserror::Error)]
#[error("unknown difficulty '{0}' (expected one of beginner, easy, medium, hard, expert, unbeatable)")]
pub struct ParseDifficultyError(String);

impl Difficulty {
    pub const ALL: [Difficulty; 6] = [
        Difficulty::Beginner,
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
        Difficulty::Unbeatable,
    ];

    /// (iteration budget, time budget) for this level
    pub fn budget(self) -> (u32, Duration) {
        match self {
            Difficulty::Beginner => (10, Duration::from_secs_f64(0.5)),
            Difficulty::Easy => (50, Duration::from_secs_f64(1.0)),
            Difficulty::Medium => (100, Duration::from_secs_f64(1.5)),
            Difficulty::Hard => (200, Duration::from_secs_f64(2.0)),
            Difficulty::Expert => (400, Duration::from_secs_f64(3.0)),
            Difficulty::Unbeatable => (800, Duration::from_secs_f64(4.0)),
        }
    }

    /// Full search config for this level
    pub fn config(self) -> MctsConfig {
        let (iterations, time_limit) = self.budget();
        MctsConfig {
            iterations,
            time_limit,
            ..Default::default()
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
            Difficulty::Unbeatable => "unbeatable",
        }
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .iter()
            .copied()
            .find(|d| d.name() == s.to_ascii_lowercase())
            .ok_or_else(|| ParseDifficultyError(s.to_string()))
    }
}
