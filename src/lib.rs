//! # Sliding Puzzle Solver
//!
//! Finds shortest solutions to n×n sliding tile puzzles with iterative-deepening
//! A*. The search is guided by Manhattan distance with linear conflicts and by
//! Takahashi's inversion distance, both kept up to date incrementally as tiles
//! slide.
//!
//! ```
//! use slider_puzzle_ida::{solve, Board};
//!
//! let board = Board::from_tiles(&[1, 2, 3, 4, 0, 5, 7, 8, 6]).unwrap();
//! let solution = solve(&board);
//! assert_eq!(solution.notation(), "LU");
//! ```
//!
//! ## Modules
//! - `puzzle`: the `Board` value type, `Move`, validation and solvability.
//! - `moves`: legal slide enumeration.
//! - `heuristic`: full and incremental lower bounds.
//! - `frontier`: the depth-first priority heap.
//! - `search`: the IDA* driver, limits and the parallel variant.
//! - `config`: TOML solver settings.

pub mod config;
pub mod error;
pub mod frontier;
pub mod heuristic;
pub mod moves;
pub mod puzzle;
pub mod search;

pub use config::{ConfigError, SolverConfig};
pub use error::PuzzleError;
pub use heuristic::{evaluate, evaluate_after_move, Estimate};
pub use puzzle::{Board, Move, Verification};
pub use search::{
    solve, solve_parallel, solve_with_limits, AbortReason, Iteration, Outcome, SearchLimits,
    Solution,
};
