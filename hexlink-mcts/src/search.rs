//! Budgeted search loop
//!
//! One grow iteration runs the four phases in order: selection, expansion,
//! playout, backpropagation. The wall-clock deadline is only checked
//! between iterations, so an iteration in flight always commits its
//! statistics before the search stops.

use std::time::Instant;

use hexlink_core::{GameState, Move, Player};
use rand::Rng;

use crate::tree::MctsTree;
use crate::MctsConfig;

// ============================================================================
// REPORT
// ============================================================================

/// Statistics for one expanded root child
#[derive(Clone, Debug)]
pub struct MoveStats {
    pub mv: Move,
    pub visits: u32,
    pub win_rate: f32,
}

/// Outcome of a finished search
#[derive(Clone, Debug)]
pub struct SearchReport {
    /// Chosen move; None when the position offers no legal move
    pub chosen: Option<Move>,
    /// Grow iterations completed within the budget
    pub iterations: u32,
    /// Per-move statistics at the root
    pub move_stats: Vec<MoveStats>,
}

// ============================================================================
// SEARCH LOOP
// ============================================================================

/// Run a full budgeted search from `state`.
///
/// The decision is the most-visited root child. A root without children
/// (budget exhausted instantly, or a terminal position) falls back to a
/// uniformly random legal move; with no legal move at all the report
/// carries None.
pub fn run_search<R: Rng>(state: &GameState, config: &MctsConfig, rng: &mut R) -> SearchReport {
    let mut tree = MctsTree::new(state.clone());
    // Duration::MAX overflows Instant math; treat it as "no deadline"
    let deadline = Instant::now().checked_add(config.time_limit);

    let mut iterations = 0;
    while iterations < config.iterations {
        if deadline.map_or(false, |d| Instant::now() >= d) {
            break;
        }
        grow_once(&mut tree, config, rng);
        iterations += 1;
    }

    let chosen = tree.best_move().or_else(|| random_move(state, rng));

    SearchReport {
        chosen,
        iterations,
        move_stats: collect_move_stats(&tree),
    }
}

/// Synchronous best-move query (self-play and tests)
pub fn best_move<R: Rng>(state: &GameState, config: &MctsConfig, rng: &mut R) -> Option<Move> {
    run_search(state, config, rng).chosen
}

/// One select / expand / play out / backpropagate cycle
fn grow_once<R: Rng>(tree: &mut MctsTree, config: &MctsConfig, rng: &mut R) {
    // Phase 1: selection
    let leaf = tree.select_leaf(config.exploration);

    // Phase 2: expansion (terminal leaves have nothing to add)
    let node = tree.expand(leaf, rng).unwrap_or(leaf);

    // Phase 3: playout
    let winner = playout(&tree.get(node).state, config.max_playout_depth, rng);

    // Phase 4: backpropagation
    tree.backpropagate(node, winner);
}

// ============================================================================
// PLAYOUT
// ============================================================================

/// Random playout: alternate uniformly random legal moves until someone
/// wins, moves run out, or the ply cap ends the simulation undecided.
pub fn playout<R: Rng>(state: &GameState, max_depth: u32, rng: &mut R) -> Option<Player> {
    let mut current = state.clone();
    let mut plies = 0;

    while !current.is_over() && plies < max_depth {
        let Some(mv) = random_move(&current, rng) else {
            break;
        };
        current
            .apply_move(mv)
            .expect("random legal move was rejected");
        plies += 1;
    }

    current.winner()
}

/// Uniformly random legal move, if any
fn random_move<R: Rng>(state: &GameState, rng: &mut R) -> Option<Move> {
    let moves = state.valid_moves();
    if moves.is_empty() {
        None
    } else {
        Some(moves[rng.gen_range(0..moves.len())])
    }
}

fn collect_move_stats(tree: &MctsTree) -> Vec<MoveStats> {
    tree.get(tree.root())
        .children
        .iter()
        .filter_map(|&id| {
            let node = tree.get(id);
            node.incoming_move.map(|mv| MoveStats {
                mv,
                visits: node.visits,
                win_rate: node.win_rate(),
            })
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
