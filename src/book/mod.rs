//! Opening book: move-sequence prefixes from the standard start position
//! mapped to weighted continuations.

pub mod builder;
pub mod san;

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::prelude::*;
use san::parse_san;

pub use builder::BookBuilder;

/// Embedded table compiled into the binary
pub const DEFAULT_BOOK: &str = include_str!("book.txt");

/// How a continuation is picked when a prefix has several
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookSelection {
    /// Random, proportional to weight
    #[default]
    Weighted,
    Uniform,
    /// Always the heaviest continuation
    MostPopular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    pub enabled: bool,
    pub selection: BookSelection,
    /// Fixed seed for reproducible book choices
    pub seed: Option<u64>,
    /// Plies after which the book is no longer consulted
    pub max_ply: usize,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            selection: BookSelection::Weighted,
            seed: None,
            max_ply: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMove {
    pub mv: Move,
    pub san: String,
    pub weight: u32,
}

#[derive(Debug, Default, Clone)]
pub struct OpeningBook {
    lines: HashMap<Vec<Move>, Vec<BookMove>>,
}

impl OpeningBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table embedded at compile time
    pub fn default_book() -> Self {
        Self::from_table_str(DEFAULT_BOOK)
    }

    /// Parses `<san prefix...> => <san>:<weight> ...` lines. Lines that do not
    /// replay from the start position are skipped.
    pub fn from_table_str(table: &str) -> Self {
        let mut book = Self::new();

        for (number, raw) in table.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((prefix, replies)) = line.split_once("=>") else {
                warn!("Book line {}: missing '=>' in '{line}'", number + 1);
                continue;
            };

            let prefix: Vec<&str> = prefix.split_whitespace().collect();
            let mut continuations = Vec::new();
            for token in replies.split_whitespace() {
                let parsed = token
                    .split_once(':')
                    .and_then(|(san, weight)| weight.parse::<u32>().ok().map(|w| (san, w)));
                match parsed {
                    Some(entry) => continuations.push(entry),
                    None => warn!("Book line {}: bad continuation '{token}'", number + 1),
                }
            }

            if let Err(e) = book.insert_line(&prefix, &continuations) {
                warn!("Book line {}: skipped, {e}", number + 1);
            }
        }

        debug!("Loaded opening book with {} prefixes", book.len());
        book
    }

    /// Replays `prefix` from the start position and records each continuation
    /// that resolves there. Weights of repeated continuations add up.
    pub fn insert_line<S: AsRef<str>>(
        &mut self,
        prefix: &[S],
        continuations: &[(S, u32)],
    ) -> Result<(), EngineError> {
        let mut position = Position::new();
        let mut key = Vec::with_capacity(prefix.len());
        for san in prefix {
            let mv = parse_san(&position, san.as_ref())?;
            position.make_move(mv);
            key.push(mv);
        }

        let mut resolved = Vec::with_capacity(continuations.len());
        for (san, weight) in continuations {
            match parse_san(&position, san.as_ref()) {
                Ok(mv) => resolved.push((mv, san.as_ref(), *weight)),
                Err(e) => warn!("Book continuation '{}' skipped: {e}", san.as_ref()),
            }
        }
        if resolved.is_empty() {
            return Ok(());
        }

        let entries = self.lines.entry(key).or_default();
        for (mv, san, weight) in resolved {
            match entries.iter_mut().find(|e| e.mv == mv) {
                Some(existing) => existing.weight += weight,
                None => entries.push(BookMove {
                    mv,
                    san: san.trim_end_matches(['+', '#']).to_string(),
                    weight,
                }),
            }
        }
        entries.sort_by(|a, b| b.weight.cmp(&a.weight));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Continuations stored for `history`, heaviest first
    pub fn continuations(&self, history: &[Move]) -> &[BookMove] {
        self.lines.get(history).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Picks a stored continuation for `history` that is still legal in
    /// `position`. Returns `None` on a miss so the caller can search instead.
    pub fn lookup<R: Rng + ?Sized>(
        &self,
        history: &[Move],
        side: Side,
        position: &Position,
        selection: BookSelection,
        rng: &mut R,
    ) -> Option<Move> {
        let expected_side = if history.len() % 2 == 0 {
            Side::White
        } else {
            Side::Black
        };
        if side != expected_side || position.stm != side {
            trace!("Book lookup skipped: {side:?} to move after {} plies", history.len());
            return None;
        }

        let stored = self.continuations(history);
        if stored.is_empty() {
            return None;
        }

        let mut legal = MoveBuffer::new();
        generate_legal_moves(position, &mut legal);
        let candidates: Vec<&BookMove> = stored
            .iter()
            .filter(|entry| {
                let ok = legal.contains(&entry.mv);
                if !ok {
                    debug!("Discarding stale book move {}", entry.san);
                }
                ok
            })
            .collect();

        let chosen = select(&candidates, selection, rng)?;
        debug!("Book move {} (weight {})", chosen.san, chosen.weight);
        Some(chosen.mv)
    }
}

fn select<'a, R: Rng + ?Sized>(
    candidates: &[&'a BookMove],
    selection: BookSelection,
    rng: &mut R,
) -> Option<&'a BookMove> {
    if candidates.is_empty() {
        return None;
    }

    match selection {
        BookSelection::MostPopular => candidates.iter().max_by_key(|e| e.weight).copied(),
        BookSelection::Uniform => Some(candidates[rng.random_range(0..candidates.len())]),
        BookSelection::Weighted => {
            let total: u64 = candidates.iter().map(|e| u64::from(e.weight)).sum();
            if total == 0 {
                return Some(candidates[rng.random_range(0..candidates.len())]);
            }
            let mut roll = rng.random_range(0..total);
            for &entry in candidates {
                let weight = u64::from(entry.weight);
                if roll < weight {
                    return Some(entry);
                }
                roll -= weight;
            }
            candidates.last().copied()
        }
    }
}
