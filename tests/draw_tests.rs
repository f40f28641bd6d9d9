use castellan::*;
use castellan::evaluation::terminal_score;

fn play(position: &mut Position, moves: &[&str]) {
    for text in moves {
        position.try_uci_move(text).unwrap();
    }
}

#[test]
fn test_threefold_by_knight_shuffle() {
    let mut position = Position::new();
    let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];

    play(&mut position, &shuffle);
    assert_eq!(position.repetition_count(), 1);
    assert!(!position.is_threefold_repetition());

    play(&mut position, &shuffle);
    assert_eq!(position.repetition_count(), 2);
    assert!(position.is_threefold_repetition());
}

#[test]
fn test_pawn_move_resets_repetition_window() {
    let mut position = Position::new();
    play(&mut position, &["g1f3", "g8f6", "f3g1", "f6g8", "e2e4"]);
    assert_eq!(position.halfmove_clock, 0);
    assert_eq!(position.repetition_count(), 0);
}

#[test]
fn test_fifty_move_rule() {
    let position = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 99 80").unwrap();
    assert!(!position.is_fifty_move_draw());

    let mut position = position;
    play(&mut position, &["a1a2"]);
    assert!(position.is_fifty_move_draw());

    let mut search = search::AlphaBetaSearch::default().with_limits(SearchLimits::depth(3));
    let mut position = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 b - - 100 80").unwrap();
    let result = search.search(&mut position);
    assert!(result.best_move.is_some());
    assert_eq!(result.score, 0);
}

#[test]
fn test_insufficient_material() {
    for fen in [
        "8/8/4k3/8/8/3K4/8/8 w - - 0 1",
        "8/8/4k3/8/8/3KN3/8/8 b - - 0 1",
        "8/8/4kb2/8/8/3K4/8/8 w - - 0 1",
    ] {
        let position = Position::from_fen(fen).unwrap();
        assert!(position.has_insufficient_material(), "{fen}");
        assert_eq!(terminal_score(&position, 0), Some(0), "{fen}");
    }

    for fen in [
        "8/8/4k3/8/8/3KP3/8/8 w - - 0 1",
        "8/8/4kn2/8/8/3KN3/8/8 w - - 0 1",
        "8/8/4k3/8/8/3KR3/8/8 w - - 0 1",
    ] {
        let position = Position::from_fen(fen).unwrap();
        assert!(!position.has_insufficient_material(), "{fen}");
    }
}

#[test]
fn test_stalemate_scores_zero() {
    let position = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(!position.is_in_check(Side::Black));
    assert_eq!(terminal_score(&position, 3), Some(0));
}

#[test]
fn test_search_takes_threefold_when_behind() {
    // White is a queen down and may repeat the start position a third time
    let mut position =
        Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR b KQkq - 0 1").unwrap();
    play(
        &mut position,
        &["g8f6", "g1f3", "f6g8", "f3g1", "g8f6", "g1f3", "f6g8"],
    );
    assert_eq!(position.repetition_count(), 1);

    let mut search = search::AlphaBetaSearch::default().with_limits(SearchLimits::depth(4));
    let result = search.search(&mut position);
    assert_eq!(result.best_move.map(|m| m.uci()), Some("f3g1".to_string()));
    assert_eq!(result.score, 0);
}

#[test]
fn test_second_repetition_costs_a_winning_side() {
    // Locked pawns, White two pawns up. Every king move from a1 leads back
    // to a position already seen once.
    let mut position = Position::from_fen("7k/8/8/2p1p3/2P1P3/2P1P3/8/K7 w - - 0 1").unwrap();
    for square in ["b1", "a2", "b2"] {
        let out = format!("a1{square}");
        let back = format!("{square}a1");
        play(&mut position, &[out.as_str(), "h8g8", back.as_str(), "g8h8"]);
    }

    let search_with = |penalty: i32| {
        let config = search::SearchConfig {
            repetition_penalty: penalty,
            ..Default::default()
        };
        let mut search = search::AlphaBetaSearch::default()
            .with_config(config, search::TtConfig::default())
            .with_limits(SearchLimits::depth(1));
        let mut scratch = position.clone();
        search.search(&mut scratch)
    };

    let plain = search_with(0);
    assert!(plain.score > 100);

    let penalised = search_with(search::SearchConfig::default().repetition_penalty);
    assert_eq!(penalised.score, plain.score - 25);
}
