use castellan::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Plays up to `plies` random legal moves, checking the incremental state at
/// every step, then unwinds the whole game.
fn random_game(seed: u64, fen: &str, plies: usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = Position::from_fen(fen).unwrap();
    let mut position = start.clone();
    let mut played = 0;

    for _ in 0..plies {
        let mut moves = MoveBuffer::new();
        generate_legal_moves(&position, &mut moves);
        if moves.is_empty() {
            break;
        }
        let mv = moves[rng.random_range(0..moves.len())];
        let mover = position.stm;
        position.make_move(mv);
        played += 1;

        assert!(!position.is_in_check(mover), "{mv} left the king in check");
        assert_eq!(position.hash, calculate_hash(&position), "hash drift after {mv}");
        assert!(position.state.is_consistent(), "board tables disagree after {mv}");
        assert_eq!(Position::from_fen(&position.to_fen()).unwrap().hash, position.hash);
    }

    for _ in 0..played {
        assert!(position.unmake_move().is_some());
    }
    assert!(position.unmake_move().is_none());
    assert_eq!(position, start, "seed {seed}");
}

#[test]
fn test_random_games_from_start() {
    init();
    for seed in 0..16 {
        random_game(seed, START_FEN, 120);
    }
}

#[test]
fn test_random_games_from_kiwipete() {
    for seed in 100..108 {
        random_game(seed, KIWIPETE, 80);
    }
}

#[test]
fn test_null_moves_are_reversible() {
    let mut rng = StdRng::seed_from_u64(5);
    let start = Position::from_fen(KIWIPETE).unwrap();
    let mut position = start.clone();

    let mut moves = MoveBuffer::new();
    generate_legal_moves(&position, &mut moves);
    let mv = moves[rng.random_range(0..moves.len())];

    position.make_null_move();
    assert_eq!(position.hash, calculate_hash(&position));
    position.unmake_null_move();
    position.make_move(mv);
    position.make_null_move();
    assert_eq!(position.hash, calculate_hash(&position));
    position.unmake_null_move();
    position.unmake_move();
    assert_eq!(position, start);
}

#[test]
fn test_try_move_rejects_illegal_input() {
    let mut position = Position::new();
    let before = position.clone();
    let bogus = Move::new(12, 36, Piece::Pawn);
    assert!(matches!(
        position.try_move(bogus),
        Err(EngineError::IllegalMove { .. })
    ));
    assert!(position.try_uci_move("e2e5").is_err());
    assert!(position.try_uci_move("zz").is_err());
    assert_eq!(position, before);
}
