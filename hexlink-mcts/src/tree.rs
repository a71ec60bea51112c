//! Search tree structure and node management
//!
//! Nodes live in an arena; parent links are indices into it, so
//! backpropagation walks upward in O(1) per step without reference cycles.
//! The whole tree is discarded once a decision has been extracted.

use hexlink_core::{GameState, Move, Player};
use rand::Rng;

// ============================================================================
// TYPES
// ============================================================================

/// Node identifier (index into the arena)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// A node in the search tree
#[derive(Clone, Debug)]
pub struct MctsNode {
    /// State after the move that created this node (root keeps the
    /// original state)
    pub state: GameState,
    /// Parent node (None for root)
    pub parent: Option<NodeId>,
    /// Move that led to this node (None for root)
    pub incoming_move: Option<Move>,
    /// Expanded children
    pub children: Vec<NodeId>,
    /// Legal moves not yet expanded
    pub untried_moves: Vec<Move>,
    /// Times this node sat on a backpropagation path
    pub visits: u32,
    /// Playout wins, always counted for the root's player-to-move
    pub wins: u32,
}

impl MctsNode {
    fn new(state: GameState, parent: Option<NodeId>, incoming_move: Option<Move>) -> Self {
        // Terminal states have nothing to expand
        let untried_moves = if state.is_over() {
            Vec::new()
        } else {
            state.valid_moves()
        };

        Self {
            state,
            parent,
            incoming_move,
            children: Vec::new(),
            untried_moves,
            visits: 0,
            wins: 0,
        }
    }

    pub fn is_fully_expanded(&self) -> bool {
        self.untried_moves.is_empty()
    }

    /// Win rate; callers guarantee at least one visit
    pub fn win_rate(&self) -> f32 {
        self.wins as f32 / self.visits as f32
    }
}

// ============================================================================
// TREE
// ============================================================================

/// Search tree with arena allocation
#[derive(Debug)]
pub struct MctsTree {
    nodes: Vec<MctsNode>,
    /// Player to move at the root; every win counter uses this perspective
    root_player: Player,
}

impl MctsTree {
    pub fn new(root_state: GameState) -> Self {
        let root_player = root_state.current_player();
        Self {
            nodes: vec![MctsNode::new(root_state, None, None)],
            root_player,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn root_player(&self) -> Player {
        self.root_player
    }

    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Descend from the root while the current node is fully expanded and
    /// has children, following the UCT-maximal child each step.
    pub fn select_leaf(&self, exploration: f32) -> NodeId {
        let mut current = self.root();

        while self.get(current).is_fully_expanded() && !self.get(current).children.is_empty() {
            current = self.select_best_child(current, exploration);
        }

        current
    }

    /// First maximal child by UCT value
    fn select_best_child(&self, id: NodeId, exploration: f32) -> NodeId {
        let node = self.get(id);
        let parent_visits = node.visits;

        let mut best = node.children[0];
        let mut best_value = self.uct(best, parent_visits, exploration);

        for &child in &node.children[1..] {
            let value = self.uct(child, parent_visits, exploration);
            if value > best_value {
                best = child;
                best_value = value;
            }
        }

        best
    }

    /// UCT = wins/visits + C * sqrt(ln(parent_visits) / visits)
    ///
    /// Selection only ever reaches fully-expanded nodes, and every child
    /// is backpropagated once on creation, so visits is never zero here.
    fn uct(&self, id: NodeId, parent_visits: u32, exploration: f32) -> f32 {
        let node = self.get(id);
        debug_assert!(node.visits > 0, "selection evaluated an unvisited child");

        node.win_rate() + exploration * ((parent_visits as f32).ln() / node.visits as f32).sqrt()
    }

    // ========================================================================
    // Expansion
    // ========================================================================

    /// Add one child for a uniformly random untried move.
    ///
    /// Returns None when the node has nothing left to expand (including
    /// terminal nodes).
    pub fn expand<R: Rng>(&mut self, id: NodeId, rng: &mut R) -> Option<NodeId> {
        let untried = &mut self.get_mut(id).untried_moves;
        if untried.is_empty() {
            return None;
        }
        let mv = untried.swap_remove(rng.gen_range(0..untried.len()));

        let mut child_state = self.get(id).state.clone();
        child_state
            .apply_move(mv)
            .expect("untried move was not legal");

        let child_id = NodeId(self.nodes.len());
        self.nodes.push(MctsNode::new(child_state, Some(id), Some(mv)));
        self.get_mut(id).children.push(child_id);

        Some(child_id)
    }

    // ========================================================================
    // Backpropagation
    // ========================================================================

    /// Credit a finished playout to every node from `from` up to the root
    /// inclusive. The win test always compares against the root's
    /// player-to-move, not each node's own mover.
    pub fn backpropagate(&mut self, from: NodeId, playout_winner: Option<Player>) {
        let won = playout_winner == Some(self.root_player);
        let mut current = Some(from);

        while let Some(id) = current {
            let node = self.get_mut(id);
            node.visits += 1;
            if won {
                node.wins += 1;
            }
            current = node.parent;
        }
    }

    // ========================================================================
    // Decision
    // ========================================================================

    /// Most-visited root child
    pub fn best_move(&self) -> Option<Move> {
        self.get(self.root())
            .children
            .iter()
            .max_by_key(|&&id| self.get(id).visits)
            .and_then(|&id| self.get(id).incoming_move)
    }
}

// ============================================================================
// TESTS
// ============================================================================
