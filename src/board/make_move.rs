use crate::{error::EngineError, prelude::*};

use super::{UndoRecord, zobrist::ZOBRIST};

impl Position {
    /// Applies a move produced by the legal move generator.
    ///
    /// Pushes an [`UndoRecord`] so that [`Position::unmake_move`] restores the
    /// exact prior state. The move is trusted; use [`Position::try_move`] for
    /// moves coming from outside the engine.
    pub fn make_move(&mut self, mv: Move) {
        let us = self.stm;
        let them = us.flip();
        let from = mv.from.index();
        let to = mv.to.index();

        self.push_history(UndoRecord {
            mv: Some(mv),
            castling_rights: self.castling_rights,
            enpassant_square: self.enpassant_square,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            hash: self.hash,
        });

        let mut hash = self.hash;
        hash ^= ZOBRIST.en_passant(&self.state, self.enpassant_square, us);
        hash ^= ZOBRIST.castling[self.castling_rights.0 as usize];

        if let Some(captured) = mv.captured {
            let cap_sq = mv.capture_square();
            self.state.remove(them, captured, cap_sq);
            hash ^= ZOBRIST.piece(them, captured, cap_sq);
        }

        match mv.promotion {
            Some(promo) => {
                self.state.remove(us, Piece::Pawn, from);
                self.state.put(us, promo, to);
                hash ^= ZOBRIST.piece(us, Piece::Pawn, from);
                hash ^= ZOBRIST.piece(us, promo, to);
            }
            None => {
                self.state.relocate(us, mv.piece, from, to);
                hash ^= ZOBRIST.piece(us, mv.piece, from);
                hash ^= ZOBRIST.piece(us, mv.piece, to);
            }
        }

        if let Some((rook_from, rook_to)) = castle_rook_squares(mv) {
            self.state.relocate(us, Piece::Rook, rook_from, rook_to);
            hash ^= ZOBRIST.piece(us, Piece::Rook, rook_from);
            hash ^= ZOBRIST.piece(us, Piece::Rook, rook_to);
        }

        self.castling_rights.update_for_move(from, to);

        self.enpassant_square = match mv.kind {
            MoveKind::DoublePush => Square::new((from + to) / 2),
            _ => None,
        };

        if mv.piece == Piece::Pawn || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }

        if us == Side::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        self.stm = them;
        hash ^= ZOBRIST.black_to_move;
        hash ^= ZOBRIST.castling[self.castling_rights.0 as usize];
        hash ^= ZOBRIST.en_passant(&self.state, self.enpassant_square, them);
        self.hash = hash;

        debug_assert!(self.state.is_consistent(), "inconsistent after {mv}");
    }

    /// Reverts the most recent [`Position::make_move`] and returns the move,
    /// or `None` if there is nothing to undo.
    pub fn unmake_move(&mut self) -> Option<Move> {
        let record = self.pop_history()?;
        let Some(mv) = record.mv else {
            debug_assert!(false, "unmake_move called on a null move record");
            self.restore(record);
            return None;
        };

        let them = self.stm;
        let us = them.flip();
        let from = mv.from.index();
        let to = mv.to.index();

        if let Some((rook_from, rook_to)) = castle_rook_squares(mv) {
            self.state.relocate(us, Piece::Rook, rook_to, rook_from);
        }

        match mv.promotion {
            Some(promo) => {
                self.state.remove(us, promo, to);
                self.state.put(us, Piece::Pawn, from);
            }
            None => self.state.relocate(us, mv.piece, to, from),
        }

        if let Some(captured) = mv.captured {
            self.state.put(them, captured, mv.capture_square());
        }

        self.stm = us;
        self.restore(record);

        Some(mv)
    }

    /// Passes the turn. Used by null-move pruning.
    pub fn make_null_move(&mut self) {
        self.push_history(UndoRecord {
            mv: None,
            castling_rights: self.castling_rights,
            enpassant_square: self.enpassant_square,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            hash: self.hash,
        });

        self.hash ^= ZOBRIST.en_passant(&self.state, self.enpassant_square, self.stm);
        self.enpassant_square = None;
        self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        self.stm = self.stm.flip();
        self.hash ^= ZOBRIST.black_to_move;
    }

    pub fn unmake_null_move(&mut self) {
        if let Some(record) = self.pop_history() {
            debug_assert!(record.mv.is_none(), "unmake_null_move popped a real move");
            self.stm = self.stm.flip();
            self.restore(record);
        }
    }

    fn restore(&mut self, record: UndoRecord) {
        self.castling_rights = record.castling_rights;
        self.enpassant_square = record.enpassant_square;
        self.halfmove_clock = record.halfmove_clock;
        self.fullmove_number = record.fullmove_number;
        self.hash = record.hash;
    }

    /// Plays `mv` only if it is one of the current legal moves.
    pub fn try_move(&mut self, mv: Move) -> Result<(), EngineError> {
        let mut legal = MoveBuffer::new();
        generate_legal_moves(self, &mut legal);
        if !legal.contains(&mv) {
            return Err(EngineError::IllegalMove {
                mv: mv.uci(),
                fen: self.to_fen(),
            });
        }
        self.make_move(mv);
        Ok(())
    }

    /// Resolves long algebraic text (`e2e4`, `e7e8q`) against the legal moves.
    pub fn find_uci_move(&self, text: &str) -> Result<Move, EngineError> {
        let text = text.trim().to_ascii_lowercase();
        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(EngineError::InvalidMoveNotation(text));
        }
        let from: Square = text[0..2].parse()?;
        let to: Square = text[2..4].parse()?;
        let promotion = match text.chars().nth(4) {
            Some(c) => match Piece::from_char(c) {
                Some((piece, _)) if Piece::PROMOTIONS.contains(&piece) => Some(piece),
                _ => return Err(EngineError::InvalidMoveNotation(text)),
            },
            None => None,
        };

        let mut legal = MoveBuffer::new();
        generate_legal_moves(self, &mut legal);
        legal
            .iter()
            .find(|m| m.from == from && m.to == to && m.promotion == promotion)
            .copied()
            .ok_or_else(|| EngineError::IllegalMove {
                mv: text.clone(),
                fen: self.to_fen(),
            })
    }

    /// Validated [`Position::find_uci_move`] followed by [`Position::make_move`]
    pub fn try_uci_move(&mut self, text: &str) -> Result<Move, EngineError> {
        let mv = self.find_uci_move(text)?;
        self.make_move(mv);
        Ok(mv)
    }
}

/// Rook (from, to) for castling moves
#[inline(always)]
fn castle_rook_squares(mv: Move) -> Option<(usize, usize)> {
    let king_from = mv.from.index();
    match mv.kind {
        MoveKind::CastleKingside => Some((king_from + 3, king_from + 1)),
        MoveKind::CastleQueenside => Some((king_from - 4, king_from - 1)),
        _ => None,
    }
}
