//! Transposition table keyed by the Zobrist signature.
//!
//! Entries live in a [`HashMap`] and their keys in insertion order in a
//! [`VecDeque`]. When the table grows past its capacity the oldest
//! `purge_fraction` of entries is dropped in one sweep.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::moves::move_info::Move;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    /// Score is the exact evaluation [alpha < score < beta]
    Exact,
    /// Score is at least this value, i.e, beta cutoff [score >= beta]
    LowerBound,
    /// Score is at most this value, i.e, alpha not improved [score <= alpha]
    UpperBound,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TranspositionEntry {
    pub hash: u64,
    pub depth: u16,
    pub score: i32,
    pub bound: Bound,
    pub best_move: Option<Move>,
}

impl TranspositionEntry {
    pub fn new(hash: u64, best_move: Option<Move>, score: i32, depth: u16, bound: Bound) -> Self {
        Self {
            hash,
            depth,
            score,
            bound,
            best_move,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtConfig {
    /// Entries kept before a purge
    pub capacity: usize,
    /// Share of the oldest entries dropped per purge
    pub purge_fraction: f64,
}

impl Default for TtConfig {
    fn default() -> Self {
        Self {
            capacity: 1 << 18,
            purge_fraction: 0.25,
        }
    }
}

#[derive(Debug)]
pub struct TranspositionTable {
    entries: HashMap<u64, TranspositionEntry>,
    order: VecDeque<u64>,
    capacity: usize,
    purge_count: usize,
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(TtConfig::default())
    }
}

impl TranspositionTable {
    pub fn new(config: TtConfig) -> Self {
        let capacity = config.capacity.max(1);
        let fraction = config.purge_fraction.clamp(0.0, 1.0);
        let purge_count = ((capacity as f64 * fraction).ceil() as usize).max(1);
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
            purge_count,
        }
    }

    pub fn probe(&self, hash: u64) -> Option<&TranspositionEntry> {
        self.entries.get(&hash)
    }

    /// Inserts or overwrites the entry for `entry.hash`. Overwriting keeps
    /// the key's original age.
    pub fn store(&mut self, entry: TranspositionEntry) {
        if self.entries.insert(entry.hash, entry).is_none() {
            self.order.push_back(entry.hash);
            if self.entries.len() > self.capacity {
                self.purge_oldest();
            }
        }
    }

    fn purge_oldest(&mut self) {
        for _ in 0..self.purge_count {
            let Some(hash) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&hash);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Occupancy in per-mille
    pub fn hash_full(&self) -> u16 {
        ((self.entries.len() * 1000) / self.capacity).min(1000) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hash: u64, depth: u16) -> TranspositionEntry {
        TranspositionEntry::new(hash, None, hash as i32, depth, Bound::Exact)
    }

    #[test]
    fn test_store_and_probe() {
        let mut tt = TranspositionTable::default();
        tt.store(entry(42, 3));
        assert_eq!(tt.probe(42).map(|e| e.depth), Some(3));
        assert!(tt.probe(7).is_none());

        tt.store(entry(42, 5));
        assert_eq!(tt.len(), 1);
        assert_eq!(tt.probe(42).map(|e| e.depth), Some(5));
    }

    #[test]
    fn test_purges_oldest_fraction() {
        let mut tt = TranspositionTable::new(TtConfig {
            capacity: 8,
            purge_fraction: 0.25,
        });
        for hash in 0..8 {
            tt.store(entry(hash, 1));
        }
        assert_eq!(tt.len(), 8);

        // Ninth entry overflows and evicts the two oldest
        tt.store(entry(8, 1));
        assert_eq!(tt.len(), 7);
        assert!(tt.probe(0).is_none());
        assert!(tt.probe(1).is_none());
        assert!(tt.probe(2).is_some());
        assert!(tt.probe(8).is_some());
    }

    #[test]
    fn test_overwrite_keeps_age() {
        let mut tt = TranspositionTable::new(TtConfig {
            capacity: 2,
            purge_fraction: 0.5,
        });
        tt.store(entry(1, 1));
        tt.store(entry(2, 1));
        tt.store(entry(1, 4));
        tt.store(entry(3, 1));
        assert!(tt.probe(1).is_none());
        assert!(tt.probe(2).is_some());
        assert!(tt.probe(3).is_some());
    }

    #[test]
    fn test_clear_and_hash_full() {
        let mut tt = TranspositionTable::new(TtConfig {
            capacity: 10,
            purge_fraction: 0.25,
        });
        for hash in 0..5 {
            tt.store(entry(hash, 1));
        }
        assert_eq!(tt.hash_full(), 500);
        tt.clear();
        assert!(tt.is_empty());
        assert_eq!(tt.hash_full(), 0);
    }
}
