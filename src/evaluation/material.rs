use crate::prelude::*;

#[derive(Debug)]
pub struct MaterialEvaluator {
    name: String,
}

impl Default for MaterialEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialEvaluator {
    pub fn new() -> Self {
        Self {
            name: "Material".to_string(),
        }
    }

    /// Summed piece values for one side
    pub fn material(state: &BoardState, side: Side) -> i32 {
        Piece::PIECES
            .iter()
            .map(|piece| state.piece_bb(side, *piece).pop_count() as i32 * piece.value())
            .sum()
    }
}

impl Evaluator for MaterialEvaluator {
    fn evaluate(&self, position: &Position) -> i32 {
        // Source: https://www.chessprogramming.org/Simplified_Evaluation_Function
        // B > N > 3P, B + N = R + 1.5P, Q + P = 2R
        let white = Self::material(&position.state, Side::White);
        let black = Self::material(&position.state, Side::Black);

        (white - black) * position.stm.sign()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_counts() {
        let position = Position::new();
        assert_eq!(
            MaterialEvaluator::material(&position.state, Side::White),
            8 * 100 + 2 * 320 + 2 * 330 + 2 * 500 + 900
        );
        assert_eq!(MaterialEvaluator::new().evaluate(&position), 0);
    }

    #[test]
    fn test_material_is_from_movers_view() {
        // White is up a rook
        let white = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        let black = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 b Q - 0 1").unwrap();
        let eval = MaterialEvaluator::new();
        assert_eq!(eval.evaluate(&white), 500);
        assert_eq!(eval.evaluate(&black), -500);
    }
}
