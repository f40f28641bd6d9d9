//! Move generation.
//!
//! Moves are first generated pseudo-legally per piece kind: table lookups
//! for knights, kings and pawns, blocker-cut rays for sliders. Each candidate
//! is then played on a scratch copy of the [`BoardState`] and dropped if it
//! leaves the mover's king attacked.

use crate::{
    moves::{move_buffer::MoveBuffer, move_info::Move, precomputed::MOVE_TABLES},
    prelude::*,
};

/// Selects which moves a generator call produces
pub trait GenMode {
    const CAPTURES_ONLY: bool;
}

/// Every move
pub struct AllMoves;
/// Captures, capture-promotions and en passant only
pub struct CapturesOnly;

impl GenMode for AllMoves {
    const CAPTURES_ONLY: bool = false;
}

impl GenMode for CapturesOnly {
    const CAPTURES_ONLY: bool = true;
}

const WHITE_KINGSIDE_EMPTY: BitBoard = BitBoard(0x60); // f1 g1
const WHITE_QUEENSIDE_EMPTY: BitBoard = BitBoard(0x0E); // b1 c1 d1
const BLACK_KINGSIDE_EMPTY: BitBoard = BitBoard(0x60 << 56);
const BLACK_QUEENSIDE_EMPTY: BitBoard = BitBoard(0x0E << 56);

/// All legal moves for the side to move
pub fn generate_legal_moves(position: &Position, buffer: &mut MoveBuffer) {
    generate_moves::<AllMoves>(position, buffer)
}

/// Legal moves for the side to move, filtered by `M`
pub fn generate_moves<M: GenMode>(position: &Position, buffer: &mut MoveBuffer) {
    buffer.clear();
    let side = position.stm;
    generate_pseudo_legal::<M>(
        &position.state,
        side,
        position.castling_rights,
        position.enpassant_square,
        buffer,
    );
    buffer.retain(|&mv| leaves_king_safe(&position.state, mv, side));
}

/// Number of legal moves for the side to move
pub fn count_legal_moves(position: &Position) -> usize {
    let mut buffer = MoveBuffer::new();
    generate_legal_moves(position, &mut buffer);
    buffer.len()
}

/// Pseudo-legal moves for `side`, whether or not it is that side's turn.
/// En passant is only offered for the side to move.
pub fn generate_pseudo_legal_for(position: &Position, side: Side, buffer: &mut MoveBuffer) {
    buffer.clear();
    let ep = if side == position.stm {
        position.enpassant_square
    } else {
        None
    };
    generate_pseudo_legal::<AllMoves>(
        &position.state,
        side,
        position.castling_rights,
        ep,
        buffer,
    );
}

pub fn generate_pseudo_legal<M: GenMode>(
    state: &BoardState,
    side: Side,
    castling_rights: CastlingRights,
    enpassant_square: Option<Square>,
    buffer: &mut MoveBuffer,
) {
    gen_pawn_moves::<M>(state, side, enpassant_square, buffer);
    gen_knight_moves::<M>(state, side, buffer);
    gen_sliding_moves::<M>(state, side, Piece::Bishop, buffer);
    gen_sliding_moves::<M>(state, side, Piece::Rook, buffer);
    gen_sliding_moves::<M>(state, side, Piece::Queen, buffer);
    gen_king_moves::<M>(state, side, castling_rights, buffer);
}

/// Whether any piece of `by` attacks `square`
pub fn is_square_attacked(state: &BoardState, square: usize, by: Side) -> bool {
    let occupied = state.occupied();

    (MOVE_TABLES.pawn_attacks(square, by.flip()) & state.piece_bb(by, Piece::Pawn)).any()
        || (MOVE_TABLES.knight_moves[square] & state.piece_bb(by, Piece::Knight)).any()
        || (MOVE_TABLES.king_moves[square] & state.piece_bb(by, Piece::King)).any()
        || (MOVE_TABLES.rook_attacks(square, occupied) & state.ortho_sliders(by)).any()
        || (MOVE_TABLES.bishop_attacks(square, occupied) & state.diag_sliders(by)).any()
}

/// Plays `mv` on a scratch copy and checks the mover's king afterwards
pub fn leaves_king_safe(state: &BoardState, mv: Move, side: Side) -> bool {
    let mut scratch = *state;
    let from = mv.from.index();
    let to = mv.to.index();

    if let Some(captured) = mv.captured {
        scratch.remove(side.flip(), captured, mv.capture_square());
    }
    match mv.promotion {
        Some(promo) => {
            scratch.remove(side, Piece::Pawn, from);
            scratch.put(side, promo, to);
        }
        None => scratch.relocate(side, mv.piece, from, to),
    }
    match mv.kind {
        MoveKind::CastleKingside => scratch.relocate(side, Piece::Rook, from + 3, from + 1),
        MoveKind::CastleQueenside => scratch.relocate(side, Piece::Rook, from - 4, from - 1),
        _ => {}
    }

    match scratch.king_square(side) {
        Some(king) => !is_square_attacked(&scratch, king, side.flip()),
        None => false,
    }
}

#[inline(always)]
fn target_mask<M: GenMode>(state: &BoardState, side: Side) -> BitBoard {
    if M::CAPTURES_ONLY {
        state.side_bb(side.flip())
    } else {
        !state.side_bb(side)
    }
}

#[inline(always)]
fn push_targets(
    state: &BoardState,
    piece: Piece,
    from: usize,
    targets: BitBoard,
    buffer: &mut MoveBuffer,
) {
    for to in targets.iter_bits() {
        match state.piece_at(to) {
            Some(victim) => buffer.push(Move::capture(from, to, piece, victim.piece)),
            None => buffer.push(Move::new(from, to, piece)),
        }
    }
}

fn gen_knight_moves<M: GenMode>(state: &BoardState, side: Side, buffer: &mut MoveBuffer) {
    let targets_allowed = target_mask::<M>(state, side);
    for from in state.piece_bb(side, Piece::Knight).iter_bits() {
        let targets = MOVE_TABLES.knight_moves[from] & targets_allowed;
        push_targets(state, Piece::Knight, from, targets, buffer);
    }
}

fn gen_sliding_moves<M: GenMode>(
    state: &BoardState,
    side: Side,
    piece: Piece,
    buffer: &mut MoveBuffer,
) {
    let occupied = state.occupied();
    let targets_allowed = target_mask::<M>(state, side);
    for from in state.piece_bb(side, piece).iter_bits() {
        let attacks = match piece {
            Piece::Bishop => MOVE_TABLES.bishop_attacks(from, occupied),
            Piece::Rook => MOVE_TABLES.rook_attacks(from, occupied),
            Piece::Queen => MOVE_TABLES.queen_attacks(from, occupied),
            _ => unreachable!("{piece} is not a sliding piece"),
        };
        push_targets(state, piece, from, attacks & targets_allowed, buffer);
    }
}

fn gen_king_moves<M: GenMode>(
    state: &BoardState,
    side: Side,
    castling_rights: CastlingRights,
    buffer: &mut MoveBuffer,
) {
    let Some(from) = state.king_square(side) else {
        return;
    };
    let targets = MOVE_TABLES.king_moves[from] & target_mask::<M>(state, side);
    push_targets(state, Piece::King, from, targets, buffer);

    if M::CAPTURES_ONLY {
        return;
    }

    let (home, kingside_empty, queenside_empty) = match side {
        Side::White => (4, WHITE_KINGSIDE_EMPTY, WHITE_QUEENSIDE_EMPTY),
        Side::Black => (60, BLACK_KINGSIDE_EMPTY, BLACK_QUEENSIDE_EMPTY),
    };
    if from != home {
        return;
    }

    let enemy = side.flip();
    let occupied = state.occupied();
    let rook_at = |sq: usize| state.piece_at(sq) == Some(PieceInfo::new(Piece::Rook, side));

    if castling_rights.can_castle(side, true)
        && (occupied & kingside_empty).is_empty()
        && rook_at(home + 3)
        && !is_square_attacked(state, home, enemy)
        && !is_square_attacked(state, home + 1, enemy)
        && !is_square_attacked(state, home + 2, enemy)
    {
        buffer.push(Move::castle(home, home + 2, true));
    }

    if castling_rights.can_castle(side, false)
        && (occupied & queenside_empty).is_empty()
        && rook_at(home - 4)
        && !is_square_attacked(state, home, enemy)
        && !is_square_attacked(state, home - 1, enemy)
        && !is_square_attacked(state, home - 2, enemy)
    {
        buffer.push(Move::castle(home, home - 2, false));
    }
}

fn gen_pawn_moves<M: GenMode>(
    state: &BoardState,
    side: Side,
    enpassant_square: Option<Square>,
    buffer: &mut MoveBuffer,
) {
    let (forward, start_row, promo_row): (isize, usize, usize) = match side {
        Side::White => (8, 1, 7),
        Side::Black => (-8, 6, 0),
    };
    let enemies = state.side_bb(side.flip());
    let occupied = state.occupied();

    for from in state.piece_bb(side, Piece::Pawn).iter_bits() {
        let one = (from as isize + forward) as usize;

        if !M::CAPTURES_ONLY && !occupied.contains_square(one) {
            if one / 8 == promo_row {
                for promo in Piece::PROMOTIONS {
                    buffer.push(Move::promotion(from, one, promo, None));
                }
            } else {
                buffer.push(Move::new(from, one, Piece::Pawn));
                let two = (one as isize + forward) as usize;
                if from / 8 == start_row && !occupied.contains_square(two) {
                    buffer.push(Move::double_push(from, two));
                }
            }
        }

        let attacks = MOVE_TABLES.pawn_attacks(from, side);
        for to in (attacks & enemies).iter_bits() {
            let Some(victim) = state.piece_at(to) else {
                continue;
            };
            if to / 8 == promo_row {
                for promo in Piece::PROMOTIONS {
                    buffer.push(Move::promotion(from, to, promo, Some(victim.piece)));
                }
            } else {
                buffer.push(Move::capture(from, to, Piece::Pawn, victim.piece));
            }
        }

        if let Some(ep) = enpassant_square
            && attacks.contains_square(ep.index())
            && !occupied.contains_square(ep.index())
        {
            let victim_sq = (ep.index() as isize - forward) as usize;
            if state.piece_at(victim_sq) == Some(PieceInfo::new(Piece::Pawn, side.flip())) {
                buffer.push(Move::en_passant(from, ep.index()));
            }
        }
    }
}
