use crate::{
    prelude::*,
    search::move_ordering::{MainSearchPolicy, MoveScoringPolicy, OrderingHints, QSearchPolicy},
};

/// MovePicker: picks moves one at a time without re-scoring.
///
/// Scores all moves once upfront, then uses O(n) selection to find the best
/// remaining move on each call to `next_best()`. This is faster than full sorting
/// when beta cutoffs happen early.
pub struct MovePicker<'a> {
    moves: &'a mut [Move],
    scores: [i32; MAX_MOVES],
    current: usize,
}

impl<'a> MovePicker<'a> {
    /// Scores every move with [`MainSearchPolicy`]
    pub fn new(moves: &'a mut [Move], hints: &OrderingHints) -> Self {
        Self::with_policy::<MainSearchPolicy>(moves, hints)
    }

    /// Constructor for quiescence search
    pub fn new_qsearch(moves: &'a mut [Move]) -> Self {
        Self::with_policy::<QSearchPolicy>(moves, &OrderingHints::none())
    }

    fn with_policy<P: MoveScoringPolicy>(moves: &'a mut [Move], hints: &OrderingHints) -> Self {
        debug_assert!(moves.len() <= MAX_MOVES, "Too many moves");

        let mut scores = [0i32; MAX_MOVES];
        for (i, &mv) in moves.iter().enumerate() {
            scores[i] = P::score(mv, hints);
        }

        Self {
            moves,
            scores,
            current: 0,
        }
    }

    /// Returns the next best move, or None if all moves have been picked.
    #[inline]
    pub fn next_best(&mut self) -> Option<Move> {
        if self.current >= self.moves.len() {
            return None;
        }

        let mut best_idx = self.current;
        let mut best_score = self.scores[self.current];

        for i in (self.current + 1)..self.moves.len() {
            if self.scores[i] > best_score {
                best_score = self.scores[i];
                best_idx = i;
            }
        }

        self.moves.swap(self.current, best_idx);
        self.scores.swap(self.current, best_idx);

        let result = self.moves[self.current];
        self.current += 1;
        Some(result)
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.moves.len().saturating_sub(self.current)
    }
}

impl Iterator for MovePicker<'_> {
    type Item = Move;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_best()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for MovePicker<'_> {}
