use std::sync::LazyLock;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::prelude::*;

pub static ZOBRIST: LazyLock<ZobristKeys> = LazyLock::new(ZobristKeys::new);

#[derive(Debug)]
pub struct ZobristKeys {
    /// For each piece type, on each square, for each side
    pub pieces: [[[u64; NUM_SQUARES]; NUM_PIECES]; NUM_SIDES],
    /// For each of the 16 possible castling rights states
    pub castling: [u64; NUM_CASTLING_RIGHTS],
    /// For each of the 8 possible en passant files
    pub en_passant_file: [u64; NUM_FILES],
    /// Single key to flip when stm changes
    pub black_to_move: u64,
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self {
            pieces: [[[0; NUM_SQUARES]; NUM_PIECES]; NUM_SIDES],
            castling: [0; NUM_CASTLING_RIGHTS],
            en_passant_file: [0; NUM_FILES],
            black_to_move: 0,
        }
    }
}

impl ZobristKeys {
    pub fn new() -> Self {
        // Fixed seed keeps signatures stable across runs
        let mut rng = StdRng::seed_from_u64(0x5EED_CA57_E11A_2024);
        let mut keys = Self {
            black_to_move: rng.random(),
            ..Default::default()
        };

        for (piece, side) in Piece::all() {
            for square in 0..NUM_SQUARES {
                keys.pieces[side.index()][piece.index()][square] = rng.random();
            }
        }

        for key in keys.castling.iter_mut() {
            *key = rng.random();
        }

        for key in keys.en_passant_file.iter_mut() {
            *key = rng.random();
        }

        keys
    }

    #[inline(always)]
    pub fn piece(&self, side: Side, piece: Piece, square: usize) -> u64 {
        self.pieces[side.index()][piece.index()][square]
    }

    /// En passant contribution. Only hashed when a pawn of `stm` can actually
    /// make the capture, so positions that differ only in a dead ep square
    /// share a signature.
    #[inline(always)]
    pub fn en_passant(&self, state: &BoardState, ep: Option<Square>, stm: Side) -> u64 {
        match ep {
            Some(ep_sq) => {
                let capturers = state.piece_bb(stm, Piece::Pawn)
                    & MOVE_TABLES.pawn_attacks(ep_sq.index(), stm.flip());
                if capturers.any() {
                    self.en_passant_file[ep_sq.col()]
                } else {
                    0
                }
            }
            None => 0,
        }
    }
}

/// Full recomputation of a position's signature
pub fn calculate_hash(position: &Position) -> u64 {
    let mut hash = 0;

    for (piece, side) in Piece::all() {
        for sq in position.state.piece_bb(side, piece).iter_bits() {
            hash ^= ZOBRIST.piece(side, piece, sq);
        }
    }

    hash ^= ZOBRIST.castling[position.castling_rights.0 as usize];
    hash ^= ZOBRIST.en_passant(&position.state, position.enpassant_square, position.stm);

    if position.stm == Side::Black {
        hash ^= ZOBRIST.black_to_move;
    }

    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::log::init;

    fn assert_hash_symmetry(fen: &str) {
        let mut position = Position::from_fen(fen).unwrap();
        let original_hash = position.hash;
        assert_eq!(original_hash, calculate_hash(&position), "fresh hash for {fen}");

        let mut legal_moves = MoveBuffer::new();
        generate_legal_moves(&position, &mut legal_moves);

        for mv in legal_moves {
            position.make_move(mv);
            assert_eq!(
                position.hash,
                calculate_hash(&position),
                "Incremental hash update mismatch after {mv} on '{fen}'"
            );
            position.unmake_move();
            assert_eq!(
                position.hash, original_hash,
                "Hash not restored after unmaking {mv} on '{fen}'"
            );
        }
    }

    #[test]
    fn test_incremental_hash_matches_recomputation() {
        init();
        assert_hash_symmetry(START_FEN);
        assert_hash_symmetry(KIWIPETE);
        assert_hash_symmetry("rnbqkbnr/pp1p1ppp/8/2pPp3/8/8/PPP1PPPP/RNBQKBNR w KQkq e6 0 3");
        assert_hash_symmetry("r3k2r/8/8/8/8/8/8/R3K2R b Kq - 1 1");
        assert_hash_symmetry("r3k2r/pPpp1ppp/1b3nbN/nP6/BBP1P3/q4N2/P2P2PP/R2Q1RK1 b kq - 0 1");
    }

    #[test]
    fn test_hash_differs_on_side_and_rights() {
        let white = Position::from_fen(START_FEN).unwrap();
        let black =
            Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1").unwrap();
        let no_castle =
            Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1").unwrap();
        assert_ne!(white.hash, black.hash);
        assert_ne!(white.hash, no_castle.hash);
    }

    #[test]
    fn test_hash_ignores_uncapturable_en_passant() {
        let dead_ep =
            Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1")
                .unwrap();
        let no_ep =
            Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1")
                .unwrap();
        assert_eq!(dead_ep.hash, no_ep.hash);

        let live_ep = Position::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1").unwrap();
        let live_no_ep = Position::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - - 0 1").unwrap();
        assert_ne!(live_ep.hash, live_no_ep.hash);
    }
}
