use castellan::*;

const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

fn check_perft(fen: &str, expected: &[u64]) {
    init();
    let mut position = Position::from_fen(fen).unwrap();
    let before = position.clone();
    for (depth, &nodes) in expected.iter().enumerate() {
        let depth = depth as u8 + 1;
        let result = perft(&mut position, depth, false);
        assert_eq!(result.nodes, nodes, "{fen} at depth {depth}");
    }
    assert_eq!(position, before, "perft must leave the position as it found it");
}

#[test]
fn test_perft_start_position() {
    check_perft(START_FEN, &[20, 400, 8_902, 197_281]);
}

#[test]
fn test_perft_kiwipete() {
    check_perft(KIWIPETE, &[48, 2_039, 97_862]);
}

#[test]
fn test_perft_position_3() {
    check_perft(POSITION_3, &[14, 191, 2_812, 43_238]);
}

#[test]
fn test_perft_position_4() {
    check_perft(POSITION_4, &[6, 264, 9_467]);
}

#[test]
fn test_perft_position_5() {
    check_perft(POSITION_5, &[44, 1_486, 62_379]);
}

#[test]
fn test_divide_on_position_4() {
    let mut position = Position::from_fen(POSITION_4).unwrap();
    let result = perft(&mut position, 2, true);
    let counts = result.move_counts.unwrap();
    assert_eq!(counts.len(), 6);
    assert_eq!(counts.iter().map(|(_, n)| *n).sum::<u64>(), 264);
}
