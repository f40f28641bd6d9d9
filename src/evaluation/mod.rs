//! Static evaluation, always from the side to move's point of view.

pub mod material;
pub mod mobility;
pub mod position;

use crate::moves::move_gen::count_legal_moves;
use crate::prelude::*;

pub use material::MaterialEvaluator;
pub use mobility::MobilityEvaluator;
pub use position::PositionEvaluator;

pub trait Evaluator: Send + Sync {
    /// Score in centipawns, positive when the side to move is better
    fn evaluate(&self, position: &Position) -> i32;
    fn name(&self) -> &str;
}

/// Weighted sum of several evaluators, with terminal positions and dead
/// draws handled before any term is consulted.
pub struct CompositeEvaluator {
    name: String,
    evaluators: Vec<Box<dyn Evaluator>>,
    weights: Vec<f32>,
}

impl std::fmt::Debug for CompositeEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeEvaluator")
            .field("name", &self.name)
            .field(
                "terms",
                &self.evaluators.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .field("weights", &self.weights)
            .finish()
    }
}

impl Default for CompositeEvaluator {
    fn default() -> Self {
        Self::balanced()
    }
}

impl CompositeEvaluator {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            evaluators: Vec::new(),
            weights: Vec::new(),
        }
    }

    /// Material, piece-square tables and mobility
    pub fn balanced() -> Self {
        let mut evaluator = Self::new("Balanced");
        evaluator
            .add_evaluator(Box::new(MaterialEvaluator::new()), 1.0)
            .add_evaluator(Box::new(PositionEvaluator::new()), 1.0)
            .add_evaluator(Box::new(MobilityEvaluator::new()), 1.0);
        evaluator
    }

    pub fn add_evaluator(&mut self, evaluator: Box<dyn Evaluator>, weight: f32) -> &mut Self {
        self.evaluators.push(evaluator);
        self.weights.push(weight);
        self
    }

    /// Like [`Evaluator::evaluate`], but a mated side scores
    /// `-MATE_SCORE + ply` so that nearer mates rank higher.
    pub fn evaluate_at_ply(&self, position: &Position, ply: usize) -> i32 {
        if let Some(score) = terminal_score(position, ply) {
            return score;
        }
        self.weighted_sum(position)
    }

    /// Per-term contributions after weighting, for display
    pub fn breakdown(&self, position: &Position) -> Vec<(String, i32)> {
        self.evaluators
            .iter()
            .zip(self.weights.iter())
            .map(|(evaluator, &weight)| {
                let score = (evaluator.evaluate(position) as f32 * weight) as i32;
                (evaluator.name().to_string(), score)
            })
            .collect()
    }

    fn weighted_sum(&self, position: &Position) -> i32 {
        self.evaluators
            .iter()
            .zip(self.weights.iter())
            .map(|(evaluator, &weight)| evaluator.evaluate(position) as f32 * weight)
            .sum::<f32>() as i32
    }
}

impl Evaluator for CompositeEvaluator {
    fn evaluate(&self, position: &Position) -> i32 {
        self.evaluate_at_ply(position, 0)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Score for positions that need no static terms: dead draws, checkmate
/// and stalemate.
pub fn terminal_score(position: &Position, ply: usize) -> Option<i32> {
    if position.has_insufficient_material() {
        return Some(0);
    }
    if count_legal_moves(position) > 0 {
        return None;
    }
    if position.is_in_check(position.stm) {
        Some(-MATE_SCORE + ply as i32)
    } else {
        Some(0)
    }
}
