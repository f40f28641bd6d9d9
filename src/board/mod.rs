//! Position representation: piece placement plus the scalar game state and
//! the undo history that make/unmake walks.

pub mod components;
pub mod fen;
pub mod make_move;
pub mod zobrist;

use std::fmt::Display;

use crate::moves::move_gen::is_square_attacked;
use crate::prelude::*;

/// Snapshot pushed by every make and popped by the matching unmake.
/// `mv` is `None` for a null move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoRecord {
    pub mv: Option<Move>,
    pub castling_rights: CastlingRights,
    pub enpassant_square: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
    pub hash: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub state: BoardState,
    pub stm: Side,
    pub castling_rights: CastlingRights,
    pub enpassant_square: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
    /// Zobrist signature of the current position
    pub hash: u64,
    /// Signature of the position this game was set up from
    root_hash: u64,
    history: Vec<UndoRecord>,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// Standard starting position
    pub fn new() -> Self {
        Self::from_fen(START_FEN).expect("START_FEN is well formed")
    }

    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        fen::parse_fen(fen)
    }

    pub fn to_fen(&self) -> String {
        fen::to_fen(self)
    }

    /// Builds a position from already-validated parts and computes its signature
    pub(crate) fn from_parts(
        state: BoardState,
        stm: Side,
        castling_rights: CastlingRights,
        enpassant_square: Option<Square>,
        halfmove_clock: u16,
        fullmove_number: u16,
    ) -> Self {
        let mut position = Self {
            state,
            stm,
            castling_rights,
            enpassant_square,
            halfmove_clock,
            fullmove_number,
            hash: 0,
            root_hash: 0,
            history: Vec::with_capacity(MAX_PLY * 2),
        };
        position.hash = zobrist::calculate_hash(&position);
        position.root_hash = position.hash;
        position
    }

    #[inline(always)]
    pub fn piece_at(&self, square: Square) -> Option<PieceInfo> {
        self.state.piece_at(square.index())
    }

    #[inline(always)]
    pub fn king_square(&self, side: Side) -> Option<usize> {
        self.state.king_square(side)
    }

    #[inline]
    pub fn is_in_check(&self, side: Side) -> bool {
        match self.king_square(side) {
            Some(king) => is_square_attacked(&self.state, king, side.flip()),
            None => false,
        }
    }

    /// Undo records, oldest first
    pub fn history(&self) -> &[UndoRecord] {
        &self.history
    }

    pub(crate) fn push_history(&mut self, record: UndoRecord) {
        self.history.push(record);
    }

    pub(crate) fn pop_history(&mut self) -> Option<UndoRecord> {
        self.history.pop()
    }

    /// Moves played since the position was set up. Null moves are skipped.
    pub fn played_moves(&self) -> Vec<Move> {
        self.history.iter().filter_map(|r| r.mv).collect()
    }

    /// Whether this game started from the standard initial position and
    /// contains no null moves, i.e. its move list is a real game prefix.
    pub fn is_rooted_at_start(&self) -> bool {
        static START_HASH: std::sync::LazyLock<u64> =
            std::sync::LazyLock::new(|| Position::new().hash);
        self.root_hash == *START_HASH && self.history.iter().all(|r| r.mv.is_some())
    }

    /// Number of earlier occurrences of the current position.
    ///
    /// Only positions since the last irreversible move can repeat, and a null
    /// move breaks the chain, so the scan stops at either.
    pub fn repetition_count(&self) -> usize {
        let mut count = 0;
        let window = (self.halfmove_clock as usize).min(self.history.len());
        for record in self.history.iter().rev().take(window) {
            if record.mv.is_none() {
                break;
            }
            if record.hash == self.hash {
                count += 1;
            }
        }
        count
    }

    /// Third occurrence of the same position
    pub fn is_threefold_repetition(&self) -> bool {
        self.repetition_count() >= 2
    }

    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Neither side can deliver mate: bare kings, or a lone minor piece
    pub fn has_insufficient_material(&self) -> bool {
        let state = &self.state;
        let heavy_or_pawns = Side::SIDES.into_iter().any(|side| {
            (state.piece_bb(side, Piece::Pawn)
                | state.piece_bb(side, Piece::Rook)
                | state.piece_bb(side, Piece::Queen))
            .any()
        });
        if heavy_or_pawns {
            return false;
        }
        let minors: u32 = Side::SIDES
            .into_iter()
            .map(|side| {
                (state.piece_bb(side, Piece::Knight) | state.piece_bb(side, Piece::Bishop))
                    .pop_count()
            })
            .sum();
        minors <= 1
    }

    /// Side to move has a piece other than pawns and king
    pub fn has_non_pawn_material(&self, side: Side) -> bool {
        let pawns_and_king =
            self.state.piece_bb(side, Piece::Pawn) | self.state.piece_bb(side, Piece::King);
        (self.state.side_bb(side) & !pawns_and_king).any()
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let c = match self.state.piece_at(rank * 8 + file) {
                    Some(info) => info.piece.to_char(info.side),
                    None => '.',
                };
                write!(f, "{c} ")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")?;
        write!(f, "{}", self.to_fen())
    }
}
