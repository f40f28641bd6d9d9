use crate::prelude::*;

/// Piece-square tables, written from White's side with rank 8 on the first
/// row. White looks up `square ^ 56`; Black, being mirrored, uses `square`.
#[derive(Debug)]
pub struct PositionEvaluator {
    name: String,
    piece_square_tables: [[i32; 64]; 6],
    king_endgame_table: [i32; 64],
}

impl Default for PositionEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// At or below this many pieces on the board the king is scored with the
/// endgame table.
pub const ENDGAME_PIECE_COUNT: u32 = 12;

impl PositionEvaluator {
    pub fn new() -> Self {
        // Just advance
        #[rustfmt::skip]
        let pawn_table = [
             0,  0,  0,  0,  0,  0,  0,  0,
            50, 50, 50, 50, 50, 50, 50, 50,
            10, 10, 20, 30, 30, 20, 10, 10,
             5,  5, 10, 25, 25, 10,  5,  5,
             0,  0,  0, 20, 20,  0,  0,  0,
             5, -5,-10,  0,  0,-10, -5,  5,
             5, 10, 10,-20,-20, 10, 10,  5,
             0,  0,  0,  0,  0,  0,  0,  0,
        ];

        // Go towards the center
        #[rustfmt::skip]
        let knight_table = [
            -50,-40,-30,-30,-30,-30,-40,-50,
            -40,-20,  0,  0,  0,  0,-20,-40,
            -30,  0, 10, 15, 15, 10,  0,-30,
            -30,  5, 15, 20, 20, 15,  5,-30,
            -30,  0, 15, 20, 20, 15,  0,-30,
            -30,  5, 10, 15, 15, 10,  5,-30,
            -40,-20,  0,  5,  5,  0,-20,-40,
            -50,-40,-30,-30,-30,-30,-40,-50,
        ];

        // Avoid corners and borders
        #[rustfmt::skip]
        let bishop_table = [
            -20,-10,-10,-10,-10,-10,-10,-20,
            -10,  0,  0,  0,  0,  0,  0,-10,
            -10,  0,  5, 10, 10,  5,  0,-10,
            -10,  5,  5, 10, 10,  5,  5,-10,
            -10,  0, 10, 10, 10, 10,  0,-10,
            -10, 10, 10, 10, 10, 10, 10,-10,
            -10,  5,  0,  0,  0,  0,  5,-10,
            -20,-10,-10,-10,-10,-10,-10,-20,
        ];

        #[rustfmt::skip]
        let rook_table = [
             0,  0,  0,  0,  0,  0,  0,  0,
             5, 10, 10, 10, 10, 10, 10,  5,
            -5,  0,  0,  0,  0,  0,  0, -5,
            -5,  0,  0,  0,  0,  0,  0, -5,
            -5,  0,  0,  0,  0,  0,  0, -5,
            -5,  0,  0,  0,  0,  0,  0, -5,
            -5,  0,  0,  0,  0,  0,  0, -5,
             0,  0,  0,  5,  5,  0,  0,  0,
        ];

        // Mostly central squares good
        #[rustfmt::skip]
        let queen_table = [
            -20,-10,-10, -5, -5,-10,-10,-20,
            -10,  0,  0,  0,  0,  0,  0,-10,
            -10,  0,  5,  5,  5,  5,  0,-10,
             -5,  0,  5,  5,  5,  5,  0, -5,
              0,  0,  5,  5,  5,  5,  0, -5,
            -10,  5,  5,  5,  5,  5,  0,-10,
            -10,  0,  5,  0,  0,  0,  0,-10,
            -20,-10,-10, -5, -5,-10,-10,-20,
        ];

        // Stay behind the pawn shield
        #[rustfmt::skip]
        let king_midgame_table = [
            -30,-40,-40,-50,-50,-40,-40,-30,
            -30,-40,-40,-50,-50,-40,-40,-30,
            -30,-40,-40,-50,-50,-40,-40,-30,
            -30,-40,-40,-50,-50,-40,-40,-30,
            -20,-30,-30,-40,-40,-30,-30,-20,
            -10,-20,-20,-20,-20,-20,-20,-10,
             20, 20,  0,  0,  0,  0, 20, 20,
             20, 30, 10,  0,  0, 10, 30, 20,
        ];

        // Centralise once the heavy pieces are gone
        #[rustfmt::skip]
        let king_endgame_table = [
            -50,-40,-30,-20,-20,-30,-40,-50,
            -30,-20,-10,  0,  0,-10,-20,-30,
            -30,-10, 20, 30, 30, 20,-10,-30,
            -30,-10, 30, 40, 40, 30,-10,-30,
            -30,-10, 30, 40, 40, 30,-10,-30,
            -30,-10, 20, 30, 30, 20,-10,-30,
            -30,-30,  0,  0,  0,  0,-30,-30,
            -50,-30,-30,-30,-30,-30,-30,-50,
        ];

        Self {
            name: "Position".to_string(),
            piece_square_tables: [
                pawn_table,
                knight_table,
                bishop_table,
                rook_table,
                queen_table,
                king_midgame_table,
            ],
            king_endgame_table,
        }
    }

    pub fn is_endgame(state: &BoardState) -> bool {
        state.occupied().pop_count() <= ENDGAME_PIECE_COUNT
    }

    #[inline(always)]
    const fn table_index(square: usize, side: Side) -> usize {
        match side {
            Side::White => square ^ 56,
            Side::Black => square,
        }
    }

    /// Table bonus for one side, in that side's favour
    fn side_score(&self, state: &BoardState, side: Side, endgame: bool) -> i32 {
        let mut score = 0;
        for piece in Piece::PIECES {
            let table = if piece == Piece::King && endgame {
                &self.king_endgame_table
            } else {
                &self.piece_square_tables[piece.index()]
            };
            for square in state.piece_bb(side, piece).iter_bits() {
                score += table[Self::table_index(square, side)];
            }
        }
        score
    }
}

impl Evaluator for PositionEvaluator {
    fn evaluate(&self, position: &Position) -> i32 {
        // Source: https://www.chessprogramming.org/Simplified_Evaluation_Function
        let state = &position.state;
        let endgame = Self::is_endgame(state);
        let score = self.side_score(state, Side::White, endgame)
            - self.side_score(state, Side::Black, endgame);

        score * position.stm.sign()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pawn_row() {
        // Second-rank pawns: 5+10+10-20-20+10+10+5
        let position = Position::from_fen("4k3/8/8/8/8/8/PPPPPPPP/4K3 w - - 0 1").unwrap();
        let eval = PositionEvaluator::new();
        let kings_only = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(eval.evaluate(&position) - eval.evaluate(&kings_only), 10);
    }

    #[test]
    fn test_default_board() {
        let position = Position::new();
        let eval = PositionEvaluator::new();
        assert_eq!(eval.evaluate(&position), 0);
    }

    #[test]
    fn test_central_knight_beats_rim_knight() {
        let eval = PositionEvaluator::new();
        let centre = Position::from_fen("4k3/8/8/8/3N4/8/8/4K3 w - - 0 1").unwrap();
        let rim = Position::from_fen("4k3/8/8/8/N7/8/8/4K3 w - - 0 1").unwrap();
        assert!(eval.evaluate(&centre) > eval.evaluate(&rim));
    }

    #[test]
    fn test_king_table_switches_in_endgame() {
        let eval = PositionEvaluator::new();
        // Lone kings: the endgame table prefers the centre
        let central = Position::from_fen("4k3/8/8/8/3K4/8/8/8 w - - 0 1").unwrap();
        let corner = Position::from_fen("4k3/8/8/8/8/8/8/K7 w - - 0 1").unwrap();
        assert!(PositionEvaluator::is_endgame(&central.state));
        assert!(eval.evaluate(&central) > eval.evaluate(&corner));

        assert!(!PositionEvaluator::is_endgame(&Position::new().state));
    }
}
