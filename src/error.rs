use thiserror::Error;

use crate::puzzle::{Move, MAX_SIDE, MIN_SIDE};

/// Errors raised while building or manipulating a board, or by the search frontier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    /// The tile count is not a perfect square.
    #[error("{len} tiles cannot form a square board")]
    InvalidSize { len: usize },

    #[error("board side {side} is outside the supported range {}..={}", MIN_SIDE, MAX_SIDE)]
    SideOutOfRange { side: usize },

    /// Values are not exactly `0..n²`, each appearing once.
    #[error("tiles must be a permutation of 0..{cells}")]
    NotAPermutation { cells: usize },

    #[error("board is not solvable")]
    Unsolvable,

    #[error("illegal move {mv} with blank at index {blank}")]
    IllegalMove { mv: Move, blank: usize },

    /// Extraction from an empty frontier. Only a driver defect can cause this.
    #[error("extract from an empty frontier")]
    EmptyFrontier,
}
