//! Background move selection
//!
//! The driving loop pushes a state snapshot, a worker thread searches
//! against its own private copy, and the answer comes back through a
//! single-slot channel. The selector holds at most one outstanding
//! computation; a slot stays occupied until its report has been polled,
//! which is what guarantees at-most-once delivery.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use hexlink_core::GameState;
use rand::Rng;

use crate::search::{run_search, SearchReport};
use crate::{create_rng, MctsConfig};

struct PendingSearch {
    rx: Receiver<SearchReport>,
    /// Kept so a worker that dies without publishing can still be
    /// answered with a random legal move
    snapshot: GameState,
}

/// Asynchronous move selector
///
/// Owns the search configuration and at most one background worker. The
/// worker shares nothing mutable with the caller; it receives a deep copy
/// of the state and publishes exactly one report.
pub struct MoveSelector {
    config: MctsConfig,
    pending: Option<PendingSearch>,
}

impl MoveSelector {
    pub fn new(config: MctsConfig) -> Self {
        Self {
            config,
            pending: None,
        }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// True while a request occupies the slot (still running, or finished
    /// but not yet polled)
    pub fn is_searching(&self) -> bool {
        self.pending.is_some()
    }

    /// Start a search against a private copy of `state`.
    ///
    /// Returns false without doing anything while the slot is occupied;
    /// concurrent requests are rejected, never queued.
    pub fn request_move(&mut self, state: &GameState) -> bool {
        if self.pending.is_some() {
            return false;
        }

        let (tx, rx) = mpsc::sync_channel(1);
        let config = self.config.clone();
        let snapshot = state.clone();
        let worker_state = snapshot.clone();

        thread::spawn(move || {
            let report = compute(&worker_state, &config);
            // The selector may already be gone; then there is no one to tell
            let _ = tx.send(report);
        });

        self.pending = Some(PendingSearch { rx, snapshot });
        true
    }

    /// Non-blocking check for a finished search.
    ///
    /// Returns None while no result is ready. A ready report is handed
    /// out exactly once and frees the slot for the next request.
    pub fn poll_result(&mut self) -> Option<SearchReport> {
        let pending = self.pending.as_ref()?;

        match pending.rx.try_recv() {
            Ok(report) => {
                self.pending = None;
                Some(report)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                // The worker died without publishing. Degrade to a random
                // legal move from the snapshot instead of wedging the slot.
                tracing::warn!("search worker vanished; answering with a random move");
                let pending = self.pending.take()?;
                Some(fallback_report(&pending.snapshot, &self.config))
            }
        }
    }
}

/// Worker body: run the search, degrade to a random move on any fault
fn compute(state: &GameState, config: &MctsConfig) -> SearchReport {
    let result = {
        let mut rng = create_rng(config.seed);
        catch_unwind(AssertUnwindSafe(|| run_search(state, config, &mut rng)))
    };

    match result {
        Ok(report) => {
            tracing::debug!(
                iterations = report.iterations,
                chosen = ?report.chosen,
                "search finished"
            );
            report
        }
        Err(_) => {
            tracing::warn!("search panicked; falling back to a random move");
            fallback_report(state, config)
        }
    }
}

/// Uniformly random legal move from `state`, or an empty report when
/// no legal move exists
fn fallback_report(state: &GameState, config: &MctsConfig) -> SearchReport {
    let mut rng = create_rng(config.seed);
    let moves = state.valid_moves();
    let chosen = if moves.is_empty() {
        None
    } else {
        Some(moves[rng.gen_range(0..moves.len())])
    };

    SearchReport {
        chosen,
        iterations: 0,
        move_stats: Vec::new(),
    }
}
