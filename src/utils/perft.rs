use crate::prelude::*;
use std::time::{Duration, Instant};
use tracing::info_span;

#[derive(Debug)]
pub struct PerftResult {
    /// Total nodes counted
    pub nodes: u64,
    /// Time taken
    pub duration: Duration,
    /// Nodes per second
    pub nps: u64,
    /// Move breakdown showing count for each move
    pub move_counts: Option<Vec<(Move, u64)>>,
}

impl PerftResult {
    pub fn new(nodes: u64, duration: Duration, move_counts: Option<Vec<(Move, u64)>>) -> Self {
        let nanos = duration.as_nanos();
        let nps = if nanos > 0 {
            (nodes as u128 * 1_000_000_000 / nanos) as u64
        } else {
            0
        };

        Self {
            nodes,
            duration,
            nps,
            move_counts,
        }
    }
}

/// Counts leaf nodes of the legal move tree to `depth`. With `divide`, the
/// count below every root move is kept as well.
pub fn perft(position: &mut Position, depth: u8, divide: bool) -> PerftResult {
    let start_time = Instant::now();

    if depth == 0 {
        return PerftResult::new(1, start_time.elapsed(), None);
    }

    let mut legal_moves = MoveBuffer::new();
    generate_legal_moves(position, &mut legal_moves);

    let mut total_nodes = 0;
    let mut move_counts = divide.then(|| Vec::with_capacity(legal_moves.len()));

    for &m in &legal_moves {
        let sub_nodes = if depth == 1 {
            1
        } else {
            position.make_move(m);
            let nodes = count_nodes(position, depth - 1);
            position.unmake_move();
            nodes
        };

        total_nodes += sub_nodes;
        if let Some(counts) = move_counts.as_mut() {
            counts.push((m, sub_nodes));
        }
    }

    PerftResult::new(total_nodes, start_time.elapsed(), move_counts)
}

fn count_nodes(position: &mut Position, depth: u8) -> u64 {
    let mut legal_moves = MoveBuffer::new();
    generate_legal_moves(position, &mut legal_moves);

    if depth == 1 {
        return legal_moves.len() as u64;
    }

    let mut nodes = 0;
    for &m in &legal_moves {
        position.make_move(m);
        nodes += count_nodes(position, depth - 1);
        position.unmake_move();
    }
    nodes
}

/// Performs a Perft test and prints a per-move breakdown
pub fn perft_divide(position: &mut Position, depth: u8) -> PerftResult {
    let _span = info_span!("perft", depth).entered();
    let result = perft(position, depth, true);

    if let Some(ref move_counts) = result.move_counts {
        println!("Perft results at depth {depth}");
        println!("----------------------------");

        for (mov, count) in move_counts {
            println!("{mov}: {count}");
        }

        println!("----------------------------");
    }
    println!("Total nodes: {}", result.nodes);
    println!("Time: {} ms", result.duration.as_millis());
    println!("Nodes per second: {}", result.nps);

    result
}

/// Runs perft for depths 1 through max_depth
pub fn run_perft_suite(position: &mut Position, max_depth: u8) -> Vec<PerftResult> {
    let _span = info_span!("perft", max_depth).entered();
    info!("Running Perft suite up to depth {max_depth}");

    (1..=max_depth)
        .map(|depth| {
            let result = perft(position, depth, false);
            info!(
                "Depth {}: {} nodes in {} ms ({} nps)",
                depth,
                result.nodes,
                result.duration.as_millis(),
                result.nps
            );
            result
        })
        .collect()
}

#[cfg(test)]
mod perft_tests {
    use super::*;

    #[test]
    fn test_perft_shallow_start() {
        init();
        let mut position = Position::new();
        assert_eq!(perft(&mut position, 0, false).nodes, 1);
        assert_eq!(perft(&mut position, 1, false).nodes, 20);
        assert_eq!(perft(&mut position, 2, false).nodes, 400);
        assert_eq!(position, Position::new());
    }

    #[test]
    fn test_divide_sums_to_total() {
        let mut position = Position::from_fen(KIWIPETE).unwrap();
        let result = perft(&mut position, 2, true);
        let counts = result.move_counts.unwrap();
        assert_eq!(counts.len(), 48);
        assert_eq!(counts.iter().map(|(_, n)| n).sum::<u64>(), 2039);
        assert_eq!(result.nodes, 2039);
    }

    #[test]
    fn test_suite_reports_each_depth() {
        let mut position = Position::new();
        let results = run_perft_suite(&mut position, 3);
        let nodes: Vec<u64> = results.iter().map(|r| r.nodes).collect();
        assert_eq!(nodes, vec![20, 400, 8902]);
    }
}
