use castellan::*;

fn legal_moves(position: &Position) -> MoveBuffer {
    let mut moves = MoveBuffer::new();
    generate_legal_moves(position, &mut moves);
    moves
}

fn no_book() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.book.enabled = false;
    config
}

#[test]
fn test_scholars_mate_in_one() {
    init();
    let position = Position::from_fen(
        "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
    )
    .unwrap();
    let mut engine = Engine::new(no_book());
    let result = engine.think_to_depth(&position, 3);
    assert_eq!(result.best_move.map(|m| m.uci()), Some("h5f7".to_string()));
    assert!(result.is_mate);
    assert_eq!(result.mate_in, Some(1));
}

#[test]
fn test_avoids_mate_in_one() {
    // Black must deal with Qxf7#
    let position = Position::from_fen(
        "r1bqkbnr/pppp1ppp/2n5/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 3 3",
    )
    .unwrap();
    let mut engine = Engine::new(no_book());
    let result = engine.think_to_depth(&position, 3);
    let mv = result.best_move.unwrap();

    let mut after = position.clone();
    after.make_move(mv);
    let mated = legal_moves(&after).iter().any(|&reply| {
        let mut line = after.clone();
        line.make_move(reply);
        line.is_in_check(line.stm) && legal_moves(&line).is_empty()
    });
    assert!(!mated, "{mv} allows mate");
}

#[test]
fn test_short_deadline_still_returns_a_move() {
    let position = Position::from_fen(KIWIPETE).unwrap();
    let mut engine = Engine::new(no_book());
    let mv = engine.calculate_move(&position, 1).unwrap();
    assert!(legal_moves(&position).contains(&mv));
}

#[test]
fn test_deadline_is_respected() {
    let position = Position::from_fen(KIWIPETE).unwrap();
    let mut engine = Engine::new(no_book());
    let result = engine.think(&position, 200);
    assert!(result.best_move.is_some());
    assert!(result.time_taken.as_millis() < 1_000);
}

#[test]
fn test_after_e4_e5_nf3() {
    let mut position = Position::new();
    for mv in ["e2e4", "e7e5", "g1f3"] {
        position.try_uci_move(mv).unwrap();
    }
    let legal = legal_moves(&position);
    assert_eq!(legal.len(), 29);

    let mut config = EngineConfig::default();
    config.book.seed = Some(2024);
    let mut engine = Engine::new(config);
    let book_move = engine.calculate_move(&position, 100).unwrap();
    assert!(legal.contains(&book_move));

    let mut engine = Engine::new(no_book());
    let searched = engine.think_to_depth(&position, 1).best_move.unwrap();
    assert!(legal.contains(&searched));
}

#[test]
fn test_mated_side_gets_no_move() {
    let position = Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
        .unwrap();
    let mut engine = Engine::default();
    assert!(engine.calculate_move(&position, 50).is_none());

    let stalemate = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(engine.calculate_move(&stalemate, 50).is_none());
}

#[test]
fn test_search_result_is_consistent() {
    let mut position = Position::from_fen(KIWIPETE).unwrap();
    let mut search = search::AlphaBetaSearch::default().with_limits(SearchLimits::depth(3));
    let result = search.search(&mut position);

    assert_eq!(result.depth, 3);
    assert!(result.nodes_searched > 0);
    assert_eq!(result.pv.first().copied(), result.best_move);

    // The PV replays legally
    let mut line = position.clone();
    for &mv in &result.pv {
        line.try_move(mv).unwrap();
    }
}

#[test]
fn test_deeper_iterations_do_not_lose_ground() {
    use std::sync::{Arc, Mutex};

    // Quiet Italian game, both sides castled
    let position = Position::from_fen(
        "r1bq1rk1/pppp1ppp/2n2n2/2b1p3/2B1P3/3P1N2/PPP2PPP/RNBQ1RK1 w - - 2 6",
    )
    .unwrap();
    let scores = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&scores);

    let mut engine = Engine::new(no_book());
    engine.set_progress_callback(move |p| sink.lock().unwrap().push(p.score));
    let result = engine.think_to_depth(&position, 4);

    let scores = scores.lock().unwrap();
    assert_eq!(scores.len(), 4);
    assert_eq!(scores.last().copied(), Some(result.score));

    let window = SearchConfig::default().aspiration_window;
    for pair in scores.windows(2) {
        assert!(pair[1] >= pair[0] - window, "scores by depth {scores:?}");
    }
}
