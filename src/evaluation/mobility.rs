use crate::moves::move_gen::{count_legal_moves, generate_pseudo_legal_for};
use crate::prelude::*;

/// Centipawns per move of mobility advantage
pub const MOBILITY_WEIGHT: i32 = 3;

/// Legal moves for the mover against pseudo-legal moves for the opponent.
/// The opponent is not on move, so its legality is not filtered.
#[derive(Debug)]
pub struct MobilityEvaluator {
    name: String,
}

impl Default for MobilityEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl MobilityEvaluator {
    pub fn new() -> Self {
        Self {
            name: "Mobility".to_string(),
        }
    }
}

impl Evaluator for MobilityEvaluator {
    fn evaluate(&self, position: &Position) -> i32 {
        let current_moves = count_legal_moves(position) as i32;

        let mut buffer = MoveBuffer::new();
        generate_pseudo_legal_for(position, position.stm.flip(), &mut buffer);
        let opponent_moves = buffer.len() as i32;

        (current_moves - opponent_moves) * MOBILITY_WEIGHT
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_position_is_even() {
        assert_eq!(MobilityEvaluator::new().evaluate(&Position::new()), 0);
    }

    #[test]
    fn test_open_queen_adds_mobility() {
        // White queen on d4 against a black king with few moves
        let position = Position::from_fen("7k/8/8/8/3Q4/8/8/4K3 w - - 0 1").unwrap();
        assert!(MobilityEvaluator::new().evaluate(&position) > 0);
    }
}
