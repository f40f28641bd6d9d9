use crate::prelude::*;

const PV_MOVE_SCORE: i32 = 4_000_000;
const TT_MOVE_SCORE: i32 = 3_000_000;
const MVV_LVA_OFFSET: i32 = 2_000_000;
const PROMOTION_OFFSET: i32 = 1_500_000;
const KILLER_MOVE_SCORE: i32 = 1_000_000;
const HISTORY_MAX: i32 = KILLER_MOVE_SCORE - 1;

/// Everything a policy may consult besides the move itself
#[derive(Clone, Copy)]
pub struct OrderingHints<'a> {
    pub pv_move: Option<Move>,
    pub tt_move: Option<Move>,
    pub killers: &'a [Option<Move>; 2],
    pub history: &'a [[i32; NUM_SQUARES]; NUM_SQUARES],
}

impl OrderingHints<'static> {
    /// No hints at all, for quiescence and tests
    pub fn none() -> Self {
        static NO_KILLERS: [Option<Move>; 2] = [None; 2];
        static NO_HISTORY: [[i32; NUM_SQUARES]; NUM_SQUARES] = [[0; NUM_SQUARES]; NUM_SQUARES];
        Self {
            pv_move: None,
            tt_move: None,
            killers: &NO_KILLERS,
            history: &NO_HISTORY,
        }
    }
}

pub trait MoveScoringPolicy {
    fn score(mv: Move, hints: &OrderingHints) -> i32;
}

/// PV move, TT move, MVV-LVA captures, promotions, killers, then history
pub struct MainSearchPolicy;

/// Captures by MVV-LVA, with promotions folded in
pub struct QSearchPolicy;

/// Most Valuable Victim - Least Valuable Attacker
#[inline(always)]
pub fn mvv_lva(mv: Move) -> i32 {
    match mv.captured {
        Some(victim) => victim.victim_score() * 10 - mv.piece.victim_score() / 10,
        None => 0,
    }
}

impl MoveScoringPolicy for MainSearchPolicy {
    #[inline]
    fn score(mv: Move, hints: &OrderingHints) -> i32 {
        if hints.pv_move == Some(mv) {
            return PV_MOVE_SCORE;
        }
        if hints.tt_move == Some(mv) {
            return TT_MOVE_SCORE;
        }
        let promo_bonus = mv.promotion.map_or(0, |p| p.value());
        if mv.is_capture() {
            return MVV_LVA_OFFSET + mvv_lva(mv) + promo_bonus;
        }
        if mv.is_promotion() {
            return PROMOTION_OFFSET + promo_bonus;
        }
        if hints.killers[0] == Some(mv) {
            return KILLER_MOVE_SCORE + 1;
        }
        if hints.killers[1] == Some(mv) {
            return KILLER_MOVE_SCORE;
        }
        hints.history[mv.from.index()][mv.to.index()].min(HISTORY_MAX)
    }
}

impl MoveScoringPolicy for QSearchPolicy {
    #[inline]
    fn score(mv: Move, _hints: &OrderingHints) -> i32 {
        mvv_lva(mv) + mv.promotion.map_or(0, |p| p.value())
    }
}

pub fn sort_moves<P: MoveScoringPolicy>(moves: &mut [Move], hints: &OrderingHints) {
    moves.sort_by_cached_key(|&m| -P::score(m, hints));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_priorities() {
        let pv = Move::new(12, 28, Piece::Pawn);
        let tt = Move::new(6, 21, Piece::Knight);
        let capture = Move::capture(28, 35, Piece::Pawn, Piece::Pawn);
        let promo = Move::promotion(52, 60, Piece::Queen, None);
        let killer = Move::new(1, 18, Piece::Knight);
        let quiet = Move::new(11, 19, Piece::Pawn);

        let killers = [Some(killer), None];
        let mut history = [[0; NUM_SQUARES]; NUM_SQUARES];
        history[11][19] = 50;
        let hints = OrderingHints {
            pv_move: Some(pv),
            tt_move: Some(tt),
            killers: &killers,
            history: &history,
        };

        let mut moves = vec![quiet, killer, promo, capture, tt, pv];
        sort_moves::<MainSearchPolicy>(&mut moves, &hints);
        assert_eq!(moves, vec![pv, tt, capture, promo, killer, quiet]);
    }

    #[test]
    fn test_mvv_lva_prefers_cheap_attacker_on_big_victim() {
        let pawn_takes_queen = Move::capture(27, 36, Piece::Pawn, Piece::Queen);
        let queen_takes_queen = Move::capture(3, 36, Piece::Queen, Piece::Queen);
        let pawn_takes_pawn = Move::capture(27, 34, Piece::Pawn, Piece::Pawn);
        assert!(mvv_lva(pawn_takes_queen) > mvv_lva(queen_takes_queen));
        assert!(mvv_lva(queen_takes_queen) > mvv_lva(pawn_takes_pawn));
    }
}
