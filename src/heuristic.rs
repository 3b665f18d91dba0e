//! Admissible lower bounds on the number of slides left to reach the goal.
//!
//! Two families of bounds are maintained side by side:
//!
//! - Manhattan distance plus linear conflicts. Tiles that already sit in their
//!   goal row (or column) but in the wrong relative order must step out of the
//!   line and back, which costs two extra slides per tile that has to leave.
//! - Takahashi's inversion distance. A vertical slide changes the row-major
//!   inversion count by at most `n - 1`, so `inv / (n-1) + inv % (n-1)`
//!   vertical slides are needed; horizontal slides are bounded the same way on
//!   the column-major reading. The two counts cover disjoint slide kinds and
//!   add up.
//!
//! The combined estimate is the larger of the two.

use crate::puzzle::{count_inversions, Board, MAX_SIDE};

/// Heuristic value with the sub-scores it was derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Estimate {
    pub combined: u32,
    pub manhattan_linear: u32,
    pub vertical: u32,
    pub horizontal: u32,
}

impl Estimate {
    fn from_parts(manhattan_linear: u32, vertical: u32, horizontal: u32) -> Self {
        Self {
            combined: manhattan_linear.max(vertical + horizontal),
            manhattan_linear,
            vertical,
            horizontal,
        }
    }

    /// Only the goal board scores zero.
    pub fn is_goal(&self) -> bool {
        self.combined == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Row,
    Column,
}

/// Evaluates a board from scratch.
pub fn evaluate(board: &Board) -> Estimate {
    let side = board.side();
    let tiles = board.tiles();

    let mut manhattan = 0;
    for (index, &tile) in tiles.iter().enumerate() {
        if tile == 0 {
            continue;
        }
        let (goal_row, goal_col) = goal_cell(tile, side);
        manhattan += (goal_row.abs_diff(index / side) + goal_col.abs_diff(index % side)) as u32;
    }

    let mut conflicts = 0;
    for line in 0..side {
        conflicts += line_conflicts(tiles, side, Axis::Row, line, None);
        conflicts += line_conflicts(tiles, side, Axis::Column, line, None);
    }

    Estimate::from_parts(
        manhattan + 2 * conflicts,
        vertical_distance(tiles, side),
        horizontal_distance(tiles, side),
    )
}

/// Updates `prior` after a single slide without rescanning the whole board.
///
/// `board_after` is the board once the slide is played: `moved_tile` now sits at
/// `old_blank` and the blank at `new_blank`. Only the line the tile entered or
/// left is rescanned for conflicts, and only the inversion reading whose order
/// the slide changed is recounted.
pub fn evaluate_after_move(
    board_after: &Board,
    moved_tile: u8,
    new_blank: usize,
    old_blank: usize,
    prior: Estimate,
) -> Estimate {
    let side = board_after.side();
    let tiles = board_after.tiles();
    let (goal_row, goal_col) = goal_cell(moved_tile, side);

    let vertical_slide = new_blank.abs_diff(old_blank) != 1;
    // A vertical slide moves the tile across rows, a horizontal one across columns.
    let (axis, goal_line, from, to) = if vertical_slide {
        (Axis::Row, goal_row, new_blank / side, old_blank / side)
    } else {
        (Axis::Column, goal_col, new_blank % side, old_blank % side)
    };

    let mut gained = goal_line.abs_diff(to) as u32;
    let mut lost = goal_line.abs_diff(from) as u32;
    if goal_line == to {
        gained += 2 * line_conflicts(tiles, side, axis, to, None);
        lost += 2 * line_conflicts(tiles, side, axis, to, Some((old_blank, 0)));
    } else if goal_line == from {
        gained += 2 * line_conflicts(tiles, side, axis, from, None);
        lost += 2 * line_conflicts(tiles, side, axis, from, Some((new_blank, moved_tile)));
    }
    let manhattan_linear = prior.manhattan_linear + gained - lost;

    // Swapping with a neighbour in the same row keeps the row-major order of the
    // tiles, and likewise for columns, so only one reading can change.
    let (vertical, horizontal) = if vertical_slide {
        (vertical_distance(tiles, side), prior.horizontal)
    } else {
        (prior.vertical, horizontal_distance(tiles, side))
    };

    Estimate::from_parts(manhattan_linear, vertical, horizontal)
}

fn goal_cell(tile: u8, side: usize) -> (usize, usize) {
    let goal = tile as usize - 1;
    (goal / side, goal % side)
}

/// Number of tiles that must leave `line` to clear its linear conflicts.
///
/// `patch` overrides one cell, which lets callers score the line as it was
/// before the last slide.
fn line_conflicts(
    tiles: &[u8],
    side: usize,
    axis: Axis,
    line: usize,
    patch: Option<(usize, u8)>,
) -> u32 {
    let mut keys = [0u8; MAX_SIDE];
    let mut len = 0;

    for step in 0..side {
        let index = match axis {
            Axis::Row => line * side + step,
            Axis::Column => step * side + line,
        };
        let tile = match patch {
            Some((at, tile)) if at == index => tile,
            _ => tiles[index],
        };
        if tile == 0 {
            continue;
        }

        let (goal_row, goal_col) = goal_cell(tile, side);
        let (goal_line, goal_step) = match axis {
            Axis::Row => (goal_row, goal_col),
            Axis::Column => (goal_col, goal_row),
        };
        if goal_line == line {
            keys[len] = goal_step as u8;
            len += 1;
        }
    }

    (len - longest_ordered_run(&keys[..len])) as u32
}

/// Length of the longest strictly increasing subsequence.
fn longest_ordered_run(keys: &[u8]) -> usize {
    let mut best = [0usize; MAX_SIDE];
    let mut longest = 0;
    for i in 0..keys.len() {
        best[i] = 1 + (0..i)
            .filter(|&j| keys[j] < keys[i])
            .map(|j| best[j])
            .max()
            .unwrap_or(0);
        longest = longest.max(best[i]);
    }
    longest
}

fn inversion_bound(inversions: u32, side: usize) -> u32 {
    let span = (side - 1) as u32;
    inversions / span + inversions % span
}

/// Lower bound on vertical slides, from the row-major reading.
pub fn vertical_distance(tiles: &[u8], side: usize) -> u32 {
    inversion_bound(count_inversions(tiles.iter().copied()), side)
}

/// Lower bound on horizontal slides, from the column-major reading with every
/// tile relabelled by its column-major goal rank.
pub fn horizontal_distance(tiles: &[u8], side: usize) -> u32 {
    let order = (0..tiles.len()).map(|i| {
        let tile = tiles[(i % side) * side + i / side];
        if tile == 0 {
            0
        } else {
            let (goal_row, goal_col) = goal_cell(tile, side);
            (goal_col * side + goal_row + 1) as u8
        }
    });
    inversion_bound(count_inversions(order), side)
}
