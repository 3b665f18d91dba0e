//! Iterative-deepening A* over sliding puzzle boards.
//!
//! Each iteration runs a best-first expansion bounded by a cost threshold. The
//! frontier pops the deepest node first, so in practice an iteration walks the
//! tree depth-first with the cheapest sibling tried first. When an iteration
//! runs dry without reaching the goal the threshold rises by two: every
//! solution shares the parity of the blank's distance to its home cell, so odd
//! steps can never succeed.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::frontier::{Frontier, FrontierKey};
use crate::heuristic::{evaluate, evaluate_after_move, Estimate};
use crate::moves::successors;
use crate::puzzle::{Board, Move};

/// Nodes between two clock reads when a time limit is set.
const CLOCK_STRIDE: u64 = 4096;

/// Optional ceilings wrapped around the search loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_nodes: Option<u64>,
    pub time_limit: Option<Duration>,
}

impl SearchLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_nodes(mut self, max_nodes: u64) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

/// Node count of one bounded expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iteration {
    pub threshold: u32,
    pub nodes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub moves: Vec<Move>,
    /// Number of slides, equal to `moves.len()`.
    pub cost: u32,
    /// Nodes taken off the frontier over all iterations.
    pub nodes: u64,
    pub iterations: Vec<Iteration>,
}

impl Solution {
    /// The moves as a compact `UDLR` string.
    pub fn notation(&self) -> String {
        self.moves.iter().map(Move::symbol).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    NodeLimit,
    TimeLimit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Found(Solution),
    Aborted {
        reason: AbortReason,
        nodes: u64,
        /// Threshold of the iteration that was cut short.
        threshold: u32,
    },
}

impl Outcome {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Outcome::Found(solution) => Some(solution),
            Outcome::Aborted { .. } => None,
        }
    }

    pub fn into_solution(self) -> Option<Solution> {
        match self {
            Outcome::Found(solution) => Some(solution),
            Outcome::Aborted { .. } => None,
        }
    }
}

/// Frontier entry. Owns a full copy of its board.
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    board: Board,
    depth: u32,
    estimate: Estimate,
    cost: u32,
    last_move: Option<Move>,
}

impl SearchNode {
    fn root(board: Board, estimate: Estimate) -> Self {
        Self {
            board,
            depth: 0,
            estimate,
            cost: estimate.combined,
            last_move: None,
        }
    }

    fn key(&self) -> FrontierKey {
        FrontierKey {
            depth: self.depth,
            cost: self.cost,
        }
    }

    fn push_children(&self, frontier: &mut Frontier<SearchNode>) {
        let side = self.board.side();
        let old_blank = self.board.blank_index();

        for slide in successors(old_blank, side, self.last_move) {
            let mut board = self.board;
            let moved = board.slide_from(slide.from);
            let estimate = evaluate_after_move(&board, moved, slide.from, old_blank, self.estimate);
            let depth = self.depth + 1;

            frontier.insert(SearchNode {
                board,
                depth,
                estimate,
                cost: depth + estimate.combined,
                last_move: Some(slide.mv),
            });
        }
    }
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for SearchNode {}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Moves leading to the node being expanded, one per depth.
///
/// The frontier always pops its deepest entry, so every entry at depth `d`
/// is a child of the last node expanded at depth `d - 1`. Entering a node
/// only has to cut the trail back to its parent and add its own move.
#[derive(Debug, Default)]
struct Trail {
    moves: Vec<Move>,
}

impl Trail {
    /// Records that the node reached by `mv` at `depth` is being expanded.
    fn enter(&mut self, depth: u32, mv: Move) {
        self.moves.truncate(depth.saturating_sub(1) as usize);
        self.moves.push(mv);
    }

    fn path(&self) -> Vec<Move> {
        self.moves.clone()
    }

    fn clear(&mut self) {
        self.moves.clear();
    }
}

/// Node and clock accounting for one search, or one worker of a parallel search.
#[derive(Debug)]
struct Budget {
    max_nodes: Option<u64>,
    deadline: Option<Instant>,
    nodes: u64,
}

impl Budget {
    fn new(max_nodes: Option<u64>, deadline: Option<Instant>) -> Self {
        Self {
            max_nodes,
            deadline,
            nodes: 0,
        }
    }

    fn charge(&mut self) -> Result<(), AbortReason> {
        if self.max_nodes.is_some_and(|max| self.nodes >= max) {
            return Err(AbortReason::NodeLimit);
        }
        self.nodes += 1;
        if self.nodes % CLOCK_STRIDE == 0 && self.deadline.is_some_and(|at| Instant::now() >= at) {
            return Err(AbortReason::TimeLimit);
        }
        Ok(())
    }
}

enum Bounded {
    Found(Vec<Move>),
    Exhausted,
    Aborted(AbortReason),
}

/// Workspace reused across iterations.
#[derive(Default)]
struct Expansion {
    frontier: Frontier<SearchNode>,
    trail: Trail,
}

impl Expansion {
    /// Expands everything reachable from `start` whose cost stays within `threshold`.
    fn run(&mut self, start: SearchNode, threshold: u32, budget: &mut Budget) -> Bounded {
        self.frontier.clear();
        self.trail.clear();
        self.frontier.insert(start);

        while let Ok(node) = self.frontier.extract_best() {
            if let Err(reason) = budget.charge() {
                return Bounded::Aborted(reason);
            }
            if node.cost > threshold {
                continue;
            }

            if let Some(mv) = node.last_move {
                self.trail.enter(node.depth, mv);
            }
            if node.estimate.is_goal() {
                return Bounded::Found(self.trail.path());
            }
            node.push_children(&mut self.frontier);
        }
        Bounded::Exhausted
    }
}

/// First threshold worth trying: no lower than the root estimate and in the
/// parity class every solution belongs to.
fn initial_threshold(board: &Board, estimate: Estimate) -> u32 {
    let parity = (board.blank_distance() % 2) as u32;
    if estimate.combined % 2 == parity {
        estimate.combined
    } else {
        estimate.combined + 1
    }
}

/// Finds a shortest solution for a board.
///
/// The board must be solvable, which `Board::from_tiles` guarantees unless
/// verification was skipped; an unsolvable board never returns.
pub fn solve(board: &Board) -> Solution {
    match solve_with_limits(board, &SearchLimits::unbounded()) {
        Outcome::Found(solution) => solution,
        Outcome::Aborted { .. } => unreachable!("unbounded search cannot abort"),
    }
}

/// Like [`solve`], but gives up with [`Outcome::Aborted`] once a limit is hit.
pub fn solve_with_limits(board: &Board, limits: &SearchLimits) -> Outcome {
    let root_estimate = evaluate(board);
    let root = SearchNode::root(*board, root_estimate);
    let deadline = limits.time_limit.map(|limit| Instant::now() + limit);
    let mut budget = Budget::new(limits.max_nodes, deadline);
    let mut expansion = Expansion::default();
    let mut iterations = Vec::new();
    let mut threshold = initial_threshold(board, root_estimate);

    info!(
        event = "solve_start",
        side = board.side(),
        estimate = root_estimate.combined,
        threshold
    );

    loop {
        let before = budget.nodes;
        let result = expansion.run(root, threshold, &mut budget);
        iterations.push(Iteration {
            threshold,
            nodes: budget.nodes - before,
        });

        match result {
            Bounded::Found(moves) => {
                info!(event = "solve_end", moves = moves.len(), nodes = budget.nodes);
                return Outcome::Found(Solution {
                    cost: moves.len() as u32,
                    moves,
                    nodes: budget.nodes,
                    iterations,
                });
            }
            Bounded::Exhausted => {
                debug!(threshold, nodes = budget.nodes - before, "iteration exhausted");
                threshold += 2;
            }
            Bounded::Aborted(reason) => {
                info!(event = "solve_aborted", ?reason, nodes = budget.nodes, threshold);
                return Outcome::Aborted {
                    reason,
                    nodes: budget.nodes,
                    threshold,
                };
            }
        }
    }
}

/// Splits each iteration across the root's children on the rayon pool.
///
/// Workers share nothing: each owns its frontier, trail, node counter and board
/// copies. Per iteration every worker may spend whatever is left of the node
/// budget, and the limit is enforced on the summed count between iterations.
pub fn solve_parallel(board: &Board, limits: &SearchLimits) -> Outcome {
    let root_estimate = evaluate(board);
    let root = SearchNode::root(*board, root_estimate);
    let deadline = limits.time_limit.map(|limit| Instant::now() + limit);
    let mut threshold = initial_threshold(board, root_estimate);
    let mut iterations = Vec::new();
    let mut nodes = 0u64;

    if root_estimate.is_goal() {
        return Outcome::Found(Solution {
            moves: Vec::new(),
            cost: 0,
            nodes: 1,
            iterations: vec![Iteration { threshold, nodes: 1 }],
        });
    }

    let mut children = Frontier::with_capacity(4);
    root.push_children(&mut children);
    let children: Vec<SearchNode> =
        std::iter::from_fn(|| children.extract_best().ok()).collect();

    info!(
        event = "solve_start",
        side = board.side(),
        estimate = root_estimate.combined,
        threshold,
        workers = children.len()
    );

    loop {
        let remaining = limits.max_nodes.map(|max| max.saturating_sub(nodes));
        let results: Vec<(Bounded, u64)> = children
            .par_iter()
            .map(|&child| {
                let mut budget = Budget::new(remaining, deadline);
                let mut expansion = Expansion::default();
                let result = expansion.run(child, threshold, &mut budget);
                (result, budget.nodes)
            })
            .collect();

        // The root itself counts as one expanded node per iteration.
        let spent = 1 + results.iter().map(|(_, spent)| spent).sum::<u64>();
        nodes += spent;
        iterations.push(Iteration {
            threshold,
            nodes: spent,
        });

        let mut best: Option<Vec<Move>> = None;
        let mut aborted = None;
        for (result, _) in results {
            match result {
                Bounded::Found(moves) => {
                    if best.as_ref().map_or(true, |current| moves.len() < current.len()) {
                        best = Some(moves);
                    }
                }
                Bounded::Aborted(reason) => {
                    aborted.get_or_insert(reason);
                }
                Bounded::Exhausted => {}
            }
        }

        if let Some(moves) = best {
            info!(event = "solve_end", moves = moves.len(), nodes);
            return Outcome::Found(Solution {
                cost: moves.len() as u32,
                moves,
                nodes,
                iterations,
            });
        }
        let over_budget = limits.max_nodes.is_some_and(|max| nodes >= max);
        if let Some(reason) = aborted.or(over_budget.then_some(AbortReason::NodeLimit)) {
            info!(event = "solve_aborted", ?reason, nodes, threshold);
            return Outcome::Aborted {
                reason,
                nodes,
                threshold,
            };
        }

        debug!(threshold, nodes = spent, "iteration exhausted");
        threshold += 2;
    }
}
