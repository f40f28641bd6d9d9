use crate::prelude::*;

const FENS: [&str; 6] = [
    START_FEN,
    KIWIPETE,
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    "rnbqkbnr/pp1p1ppp/8/2pPp3/8/8/PPP1PPPP/RNBQKBNR w KQkq e6 0 3",
];

// Every legal move must be undone exactly, including the signature
fn check_make_unmake_symmetry(fen: &str) {
    init();

    let mut position = Position::from_fen(fen).unwrap();
    let original = position.clone();

    let mut moves = MoveBuffer::new();
    generate_legal_moves(&position, &mut moves);

    for mv in &moves {
        position.make_move(*mv);
        assert_ne!(
            position, original,
            "position should change after {mv} on {fen}"
        );
        assert_eq!(
            position.hash,
            calculate_hash(&position),
            "incremental signature drifted after {mv} on {fen}"
        );
        assert!(
            !position.is_in_check(position.stm.flip()),
            "{mv} left the mover in check on {fen}"
        );

        let undone = position.unmake_move();
        assert_eq!(undone, Some(*mv));
        assert_eq!(position, original, "{mv} was not undone on {fen}");
    }
}

#[test]
fn test_make_unmake_symmetry() {
    for fen in FENS {
        check_make_unmake_symmetry(fen);
    }
}

#[test]
fn test_symmetry_two_plies_deep() {
    init();
    for fen in FENS {
        let mut position = Position::from_fen(fen).unwrap();
        let mut moves = MoveBuffer::new();
        generate_legal_moves(&position, &mut moves);
        for mv in &moves {
            position.make_move(*mv);
            check_make_unmake_symmetry(&position.to_fen());
            position.unmake_move();
        }
        assert_eq!(position.to_fen(), Position::from_fen(fen).unwrap().to_fen());
    }
}

#[test]
fn test_fen_survives_make_unmake() {
    let mut position = Position::from_fen(KIWIPETE).unwrap();
    let mut moves = MoveBuffer::new();
    generate_legal_moves(&position, &mut moves);
    for mv in &moves {
        position.make_move(*mv);
        let after = position.to_fen();
        let reparsed = Position::from_fen(&after).unwrap();
        assert_eq!(reparsed.state, position.state);
        assert_eq!(reparsed.hash, position.hash);
        position.unmake_move();
    }
    assert_eq!(position.to_fen(), KIWIPETE);
}
