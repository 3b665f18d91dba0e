use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::error::PuzzleError;

/// Priority of a frontier entry: deeper nodes first, cheaper nodes break ties.
///
/// Preferring depth finishes a branch before another one is opened, which keeps
/// the frontier about as small as a depth-first stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontierKey {
    pub depth: u32,
    pub cost: u32,
}

impl Ord for FrontierKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.depth
            .cmp(&other.depth)
            .then_with(|| Reverse(self.cost).cmp(&Reverse(other.cost)))
    }
}

impl PartialOrd for FrontierKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Binary heap handing out its greatest entry first.
///
/// No closed set is kept: the same board reached along two paths is two entries.
#[derive(Debug, Clone)]
pub struct Frontier<T> {
    heap: BinaryHeap<T>,
}

impl<T: Ord> Frontier<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, entry: T) {
        self.heap.push(entry);
    }

    pub fn extract_best(&mut self) -> Result<T, PuzzleError> {
        self.heap.pop().ok_or(PuzzleError::EmptyFrontier)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drops every entry but keeps the allocation for the next iteration.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

impl<T: Ord> Default for Frontier<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(depth: u32, cost: u32) -> FrontierKey {
        FrontierKey { depth, cost }
    }

    #[test]
    fn test_deeper_beats_cheaper() {
        assert!(key(5, 40) > key(4, 10));
    }

    #[test]
    fn test_cost_breaks_depth_ties() {
        assert!(key(3, 10) > key(3, 12));
        assert_eq!(key(3, 10).cmp(&key(3, 10)), Ordering::Equal);
    }

    #[test]
    fn test_extract_order() {
        let mut frontier = Frontier::new();
        for entry in [key(1, 9), key(3, 12), key(3, 10), key(0, 4), key(2, 2)] {
            frontier.insert(entry);
        }
        assert_eq!(frontier.len(), 5);

        let order: Vec<FrontierKey> = std::iter::from_fn(|| frontier.extract_best().ok()).collect();
        assert_eq!(
            order,
            vec![key(3, 10), key(3, 12), key(2, 2), key(1, 9), key(0, 4)]
        );
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_extract_from_empty() {
        let mut frontier: Frontier<FrontierKey> = Frontier::default();
        assert_eq!(frontier.extract_best(), Err(PuzzleError::EmptyFrontier));

        frontier.insert(key(1, 1));
        frontier.clear();
        assert_eq!(frontier.extract_best(), Err(PuzzleError::EmptyFrontier));
    }

    #[test]
    fn test_interleaved_insert_extract() {
        let mut frontier = Frontier::with_capacity(8);
        frontier.insert(key(0, 5));
        assert_eq!(frontier.extract_best(), Ok(key(0, 5)));
        frontier.insert(key(1, 7));
        frontier.insert(key(1, 5));
        frontier.insert(key(2, 9));
        assert_eq!(frontier.extract_best(), Ok(key(2, 9)));
        frontier.insert(key(2, 6));
        assert_eq!(frontier.extract_best(), Ok(key(2, 6)));
        assert_eq!(frontier.extract_best(), Ok(key(1, 5)));
        assert_eq!(frontier.len(), 1);
    }
}
