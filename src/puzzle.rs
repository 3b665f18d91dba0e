use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

use crate::error::PuzzleError;
use crate::moves::{self, MoveList};

pub const MIN_SIDE: usize = 2;
pub const MAX_SIDE: usize = 8;
pub const MAX_CELLS: usize = MAX_SIDE * MAX_SIDE;

/// Residual allowed between a float square root and its nearest integer.
const SQRT_EPSILON: f64 = 1e-4;

/// A slide, named after the direction the tile next to the blank travels.
///
/// `Right` moves the tile on the left of the blank into it, so the blank itself
/// ends up one column to the left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Left,
    Down,
    Right,
}

impl Move {
    /// Row and column displacement of the blank when this move is played.
    pub fn as_offset(&self) -> (isize, isize) {
        match self {
            Move::Up => (1, 0),
            Move::Left => (0, 1),
            Move::Down => (-1, 0),
            Move::Right => (0, -1),
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Move::Up => Move::Down,
            Move::Down => Move::Up,
            Move::Left => Move::Right,
            Move::Right => Move::Left,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Move::Up => 'U',
            Move::Left => 'L',
            Move::Down => 'D',
            Move::Right => 'R',
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            Move::Up => "Up",
            Move::Left => "Left",
            Move::Down => "Down",
            Move::Right => "Right",
        };
        write!(f, "{}", s)
    }
}

/// Whether `Board::from_tiles_with` runs the parity check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verification {
    #[default]
    Check,
    Skip,
}

/// An n×n sliding puzzle stored row-major in a fixed buffer.
///
/// Boards are plain `Copy` values: every search branch works on its own copy.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    tiles: [u8; MAX_CELLS],
    side: u8,
    blank: u8,
}

impl Board {
    /// The goal board of the given side: `1..n²-1` followed by the blank.
    pub fn new(side: usize) -> Result<Self, PuzzleError> {
        check_side(side)?;
        let cells = side * side;
        let mut tiles = [0; MAX_CELLS];
        for (index, tile) in tiles.iter_mut().take(cells - 1).enumerate() {
            *tile = (index + 1) as u8;
        }

        Ok(Self {
            tiles,
            side: side as u8,
            blank: (cells - 1) as u8,
        })
    }

    /// Builds a board from row-major tiles and rejects unsolvable layouts.
    pub fn from_tiles(values: &[u8]) -> Result<Self, PuzzleError> {
        Self::from_tiles_with(values, Verification::Check)
    }

    pub fn from_tiles_with(values: &[u8], verification: Verification) -> Result<Self, PuzzleError> {
        let side = side_for_len(values.len())?;
        check_side(side)?;

        let not_a_permutation = PuzzleError::NotAPermutation { cells: values.len() };
        let mut seen = 0u64;
        let mut tiles = [0; MAX_CELLS];
        let mut blank = None;
        for (index, &value) in values.iter().enumerate() {
            if value as usize >= values.len() || seen & (1 << value) != 0 {
                return Err(not_a_permutation);
            }
            seen |= 1 << value;
            tiles[index] = value;
            if value == 0 {
                blank = Some(index);
            }
        }
        let blank = blank.ok_or(not_a_permutation)?;

        let board = Self {
            tiles,
            side: side as u8,
            blank: blank as u8,
        };
        if verification == Verification::Check && !board.is_solvable() {
            return Err(PuzzleError::Unsolvable);
        }
        Ok(board)
    }

    pub fn side(&self) -> usize {
        self.side as usize
    }

    pub fn cells(&self) -> usize {
        self.side() * self.side()
    }

    pub fn tiles(&self) -> &[u8] {
        &self.tiles[..self.cells()]
    }

    pub fn blank_index(&self) -> usize {
        self.blank as usize
    }

    pub fn tile_at(&self, index: usize) -> Option<u8> {
        self.tiles().get(index).copied()
    }

    /// Manhattan distance from the blank to its goal cell, the bottom-right corner.
    ///
    /// Every solution has the same parity as this distance.
    pub fn blank_distance(&self) -> usize {
        let side = self.side();
        let (row, col) = (self.blank_index() / side, self.blank_index() % side);
        (side - 1 - row) + (side - 1 - col)
    }

    pub fn legal_moves(&self) -> MoveList {
        moves::legal_moves(self.blank_index(), self.side())
    }

    /// Plays `movement` in place and returns the new blank index.
    pub fn apply_move(&mut self, movement: Move) -> Result<usize, PuzzleError> {
        let from = moves::neighbor(self.blank_index(), self.side(), movement).ok_or(
            PuzzleError::IllegalMove {
                mv: movement,
                blank: self.blank_index(),
            },
        )?;
        self.slide_from(from);
        Ok(from)
    }

    pub fn apply_moves(&mut self, movements: &[Move]) -> Result<(), PuzzleError> {
        for &movement in movements {
            self.apply_move(movement)?;
        }
        Ok(())
    }

    /// A copy of this board with `movement` played.
    pub fn slid(&self, movement: Move) -> Result<Self, PuzzleError> {
        let mut next = *self;
        next.apply_move(movement)?;
        Ok(next)
    }

    /// Slides the tile at `from`, which must neighbour the blank, into the blank.
    /// Returns the tile that moved.
    pub(crate) fn slide_from(&mut self, from: usize) -> u8 {
        let blank = self.blank_index();
        self.tiles.swap(blank, from);
        self.blank = from as u8;
        self.tiles[blank]
    }

    pub fn inversions(&self) -> u32 {
        count_inversions(self.tiles().iter().copied())
    }

    pub fn is_solvable(&self) -> bool {
        let side = self.side();
        let inversions_odd = self.inversions() % 2 == 1;

        if side % 2 == 1 {
            !inversions_odd
        } else {
            // Counted from the bottom, starting at 1.
            let blank_row = side - self.blank_index() / side;
            (blank_row % 2 == 1) ^ inversions_odd
        }
    }

    pub fn is_solved(&self) -> bool {
        let last = self.cells() - 1;
        self.tiles()
            .iter()
            .enumerate()
            .all(|(index, &tile)| if index == last { tile == 0 } else { tile as usize == index + 1 })
    }

    /// Replaces the layout with a uniformly random solvable permutation.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let cells = self.cells();
        loop {
            self.tiles[..cells].shuffle(rng);
            if let Some(blank) = self.tiles[..cells].iter().position(|&tile| tile == 0) {
                self.blank = blank as u8;
            }
            if self.is_solvable() {
                break;
            }
        }
    }

    /// Plays `count` random legal slides and returns them in order.
    pub fn scramble<R: Rng + ?Sized>(&mut self, rng: &mut R, count: usize) -> Vec<Move> {
        let mut played = Vec::with_capacity(count);
        for _ in 0..count {
            let legal = self.legal_moves();
            if let Some(&movement) = legal.choose(rng) {
                if self.apply_move(movement).is_ok() {
                    played.push(movement);
                }
            }
        }
        played
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = (self.cells() - 1).to_string().len();
        for row in self.tiles().chunks(self.side()) {
            for &val in row {
                write!(f, "{:>width$} ", val, width = width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("side", &self.side)
            .field("blank", &self.blank)
            .field("tiles", &self.tiles())
            .finish()
    }
}

fn side_for_len(len: usize) -> Result<usize, PuzzleError> {
    let root = (len as f64).sqrt();
    let side = root.round();
    if (root - side).abs() >= SQRT_EPSILON || (side as usize) * (side as usize) != len {
        return Err(PuzzleError::InvalidSize { len });
    }
    Ok(side as usize)
}

fn check_side(side: usize) -> Result<(), PuzzleError> {
    if (MIN_SIDE..=MAX_SIDE).contains(&side) {
        Ok(())
    } else {
        Err(PuzzleError::SideOutOfRange { side })
    }
}

/// Counts pairs where a larger value precedes a smaller one. Zeros are skipped
/// and every value must be below 64.
pub(crate) fn count_inversions(order: impl IntoIterator<Item = u8>) -> u32 {
    let mut seen = 0u64;
    let mut inversions = 0;
    for value in order {
        if value == 0 {
            continue;
        }
        inversions += seen.checked_shr(value as u32 + 1).unwrap_or(0).count_ones();
        seen |= 1 << value;
    }
    inversions
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_goal_board() {
        let board = Board::new(4).unwrap();
        assert_eq!(board.tiles(), &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 0]);
        assert_eq!(board.blank_index(), 15);
        assert!(board.is_solved());
        assert!(board.is_solvable());
        assert_eq!(board.blank_distance(), 0);
    }

    #[test]
    fn test_new_rejects_out_of_range_sides() {
        assert_eq!(Board::new(1), Err(PuzzleError::SideOutOfRange { side: 1 }));
        assert_eq!(Board::new(9), Err(PuzzleError::SideOutOfRange { side: 9 }));
    }

    #[test]
    fn test_from_tiles_locates_blank() {
        let board = Board::from_tiles(&[2, 4, 0, 3, 6, 7, 5, 8, 1]).unwrap();
        assert_eq!(board.side(), 3);
        assert_eq!(board.blank_index(), 2);
        assert_eq!(board.tile_at(0), Some(2));
        assert_eq!(board.tile_at(9), None);
    }

    #[test]
    fn test_from_tiles_rejects_non_square_lengths() {
        assert_eq!(
            Board::from_tiles(&[1, 2, 0]),
            Err(PuzzleError::InvalidSize { len: 3 })
        );
        assert_eq!(
            Board::from_tiles(&[1, 2, 3, 4, 5, 6, 7, 0]),
            Err(PuzzleError::InvalidSize { len: 8 })
        );
    }

    #[test]
    fn test_from_tiles_rejects_duplicates_and_out_of_range_values() {
        assert_eq!(
            Board::from_tiles(&[1, 1, 2, 0]),
            Err(PuzzleError::NotAPermutation { cells: 4 })
        );
        assert_eq!(
            Board::from_tiles(&[1, 2, 4, 0]),
            Err(PuzzleError::NotAPermutation { cells: 4 })
        );
    }

    #[test]
    fn test_solvability_known_boards() {
        assert!(Board::from_tiles(&[6, 13, 7, 10, 8, 9, 11, 0, 15, 2, 12, 5, 14, 3, 1, 4]).is_ok());
        assert_eq!(
            Board::from_tiles(&[3, 9, 1, 15, 14, 11, 4, 6, 13, 0, 10, 12, 2, 7, 8, 5]),
            Err(PuzzleError::Unsolvable)
        );
        // Classic 14-15 swap.
        assert_eq!(
            Board::from_tiles(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 15, 14, 0]),
            Err(PuzzleError::Unsolvable)
        );
        assert_eq!(
            Board::from_tiles(&[2, 1, 3, 4, 5, 6, 7, 8, 0]),
            Err(PuzzleError::Unsolvable)
        );
    }

    #[test]
    fn test_skip_verification_accepts_unsolvable() {
        let board =
            Board::from_tiles_with(&[2, 1, 3, 4, 5, 6, 7, 8, 0], Verification::Skip).unwrap();
        assert!(!board.is_solvable());
    }

    #[test]
    fn test_legal_moves_corners() {
        let goal = Board::new(3).unwrap();
        assert_eq!(goal.legal_moves().as_slice(), &[Move::Right, Move::Down]);

        let top_left = Board::from_tiles(&[0, 1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(top_left.legal_moves().as_slice(), &[Move::Left, Move::Up]);
    }

    #[test]
    fn test_apply_move_slides_neighbor_into_blank() {
        let mut board = Board::new(3).unwrap();
        assert_eq!(board.apply_move(Move::Right), Ok(7));
        assert_eq!(board.tiles(), &[1, 2, 3, 4, 5, 6, 7, 0, 8]);
        assert_eq!(board.apply_move(Move::Down), Ok(4));
        assert_eq!(board.tiles(), &[1, 2, 3, 4, 0, 6, 7, 5, 8]);
        assert_eq!(board.tile_at(board.blank_index()), Some(0));
    }

    #[test]
    fn test_apply_move_illegal() {
        let mut board = Board::new(3).unwrap();
        assert_eq!(
            board.apply_move(Move::Left),
            Err(PuzzleError::IllegalMove { mv: Move::Left, blank: 8 })
        );
        assert_eq!(
            board.apply_move(Move::Up),
            Err(PuzzleError::IllegalMove { mv: Move::Up, blank: 8 })
        );
        assert!(board.is_solved());
    }

    #[test]
    fn test_move_then_opposite_restores_board() {
        let start = Board::from_tiles(&[1, 2, 3, 4, 0, 5, 7, 8, 6]).unwrap();
        for movement in start.legal_moves() {
            let mut board = start;
            board.apply_move(movement).unwrap();
            board.apply_move(movement.opposite()).unwrap();
            assert_eq!(board, start);
        }
    }

    #[test]
    fn test_slid_leaves_original_untouched() {
        let board = Board::new(4).unwrap();
        let next = board.slid(Move::Down).unwrap();
        assert!(board.is_solved());
        assert_eq!(next.blank_index(), 11);
    }

    #[test]
    fn test_scramble_stays_solvable_and_replays() {
        let mut rng = SmallRng::seed_from_u64(514514);
        for side in MIN_SIDE..=5 {
            let mut board = Board::new(side).unwrap();
            let walk = board.scramble(&mut rng, 200);
            assert_eq!(walk.len(), 200);
            assert!(board.is_solvable());

            let mut replay = Board::new(side).unwrap();
            replay.apply_moves(&walk).unwrap();
            assert_eq!(replay, board);
        }
    }

    #[test]
    fn test_shuffle_produces_solvable_permutation() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..50 {
            let mut board = Board::new(4).unwrap();
            board.shuffle(&mut rng);
            assert!(board.is_solvable());
            assert_eq!(board.tile_at(board.blank_index()), Some(0));
            assert!(Board::from_tiles(board.tiles()).is_ok());
        }
    }

    #[test]
    fn test_count_inversions() {
        assert_eq!(count_inversions([1, 2, 3, 0]), 0);
        assert_eq!(count_inversions([3, 2, 1]), 3);
        assert_eq!(count_inversions([2, 0, 1]), 1);
        assert_eq!(count_inversions([63, 1]), 1);
    }

    #[test]
    fn test_display_board_formatting() {
        let board = Board::from_tiles(&[1, 2, 3, 0]).unwrap();
        assert_eq!(board.to_string(), "1 2 \n3 0 \n");
        let board = Board::new(4).unwrap();
        assert!(board.to_string().starts_with(" 1  2  3  4 \n"));
    }

    #[test]
    fn test_move_symbols() {
        let symbols: String = [Move::Up, Move::Down, Move::Left, Move::Right]
            .iter()
            .map(Move::symbol)
            .collect();
        assert_eq!(symbols, "UDLR");
        assert_eq!(Move::Left.to_string(), "Left");
    }
}
