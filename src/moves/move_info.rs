use std::fmt::Display;

use crate::prelude::*;

/// Special-move tag carried by every [`Move`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    #[default]
    Normal,
    DoublePush,
    EnPassant,
    CastleKingside,
    CastleQueenside,
    Promotion,
    CapturePromotion,
}

/// A fully described move. Built by the generator and never mutated afterwards.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub promotion: Option<Piece>,
    pub kind: MoveKind,
}

impl Move {
    pub const fn new(from: usize, to: usize, piece: Piece) -> Self {
        Self {
            from: Square(from),
            to: Square(to),
            piece,
            captured: None,
            promotion: None,
            kind: MoveKind::Normal,
        }
    }

    pub const fn capture(from: usize, to: usize, piece: Piece, captured: Piece) -> Self {
        Self {
            captured: Some(captured),
            ..Self::new(from, to, piece)
        }
    }

    pub const fn double_push(from: usize, to: usize) -> Self {
        Self {
            kind: MoveKind::DoublePush,
            ..Self::new(from, to, Piece::Pawn)
        }
    }

    pub const fn en_passant(from: usize, to: usize) -> Self {
        Self {
            captured: Some(Piece::Pawn),
            kind: MoveKind::EnPassant,
            ..Self::new(from, to, Piece::Pawn)
        }
    }

    pub const fn castle(from: usize, to: usize, kingside: bool) -> Self {
        Self {
            kind: if kingside {
                MoveKind::CastleKingside
            } else {
                MoveKind::CastleQueenside
            },
            ..Self::new(from, to, Piece::King)
        }
    }

    pub const fn promotion(from: usize, to: usize, promotion: Piece, captured: Option<Piece>) -> Self {
        Self {
            captured,
            promotion: Some(promotion),
            kind: if captured.is_some() {
                MoveKind::CapturePromotion
            } else {
                MoveKind::Promotion
            },
            ..Self::new(from, to, Piece::Pawn)
        }
    }

    #[inline(always)]
    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    #[inline(always)]
    pub const fn is_promotion(&self) -> bool {
        self.promotion.is_some()
    }

    #[inline(always)]
    pub const fn is_castle(&self) -> bool {
        matches!(
            self.kind,
            MoveKind::CastleKingside | MoveKind::CastleQueenside
        )
    }

    #[inline(always)]
    pub const fn is_enpassant(&self) -> bool {
        matches!(self.kind, MoveKind::EnPassant)
    }

    /// Neither a capture nor a promotion
    #[inline(always)]
    pub const fn is_quiet(&self) -> bool {
        !self.is_capture() && !self.is_promotion()
    }

    /// Square of the captured piece, which differs from `to` for en passant
    #[inline(always)]
    pub const fn capture_square(&self) -> usize {
        match self.kind {
            MoveKind::EnPassant => {
                if self.to.0 > self.from.0 {
                    self.to.0 - 8
                } else {
                    self.to.0 + 8
                }
            }
            _ => self.to.0,
        }
    }

    /// Long algebraic notation, e.g. `e2e4` or `e7e8q`
    pub fn uci(&self) -> String {
        let mut out = format!("{}{}", self.from, self.to);
        if let Some(promo) = self.promotion {
            out.push(promo.to_char(Side::Black));
        }
        out
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uci())
    }
}
