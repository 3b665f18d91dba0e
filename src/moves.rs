//! Legal slide enumeration for a blank position.

use smallvec::SmallVec;

use crate::puzzle::Move;

pub type MoveList = SmallVec<[Move; 4]>;

/// Candidate order used everywhere moves are enumerated.
pub const ALL_MOVES: [Move; 4] = [Move::Right, Move::Left, Move::Up, Move::Down];

/// A legal slide together with the index of the tile that moves into the blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slide {
    pub mv: Move,
    pub from: usize,
}

/// Index of the tile that `movement` slides into the blank, if it exists.
pub fn neighbor(blank: usize, side: usize, movement: Move) -> Option<usize> {
    let (d_row, d_col) = movement.as_offset();
    let row = (blank / side) as isize + d_row;
    let col = (blank % side) as isize + d_col;

    if row >= 0 && row < side as isize && col >= 0 && col < side as isize {
        Some(row as usize * side + col as usize)
    } else {
        None
    }
}

pub fn is_legal(blank: usize, side: usize, movement: Move) -> bool {
    neighbor(blank, side, movement).is_some()
}

pub fn legal_moves(blank: usize, side: usize) -> MoveList {
    ALL_MOVES
        .into_iter()
        .filter(|&movement| is_legal(blank, side, movement))
        .collect()
}

/// Legal slides from `blank`, minus the one that would undo `last`.
pub fn successors(blank: usize, side: usize, last: Option<Move>) -> SmallVec<[Slide; 4]> {
    let reverse = last.map(|movement| movement.opposite());
    ALL_MOVES
        .into_iter()
        .filter(|&movement| Some(movement) != reverse)
        .filter_map(|movement| {
            neighbor(blank, side, movement).map(|from| Slide { mv: movement, from })
        })
        .collect()
}
