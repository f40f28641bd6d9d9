use castellan::book::san::{parse_san, to_san};
use castellan::utils::cli::{Cli, Commands};
use castellan::*;
use clap::Parser;
use tracing::{Level, span, trace};

fn main() -> miette::Result<()> {
    init();
    let cli = Cli::parse();

    set_log_level(cli.log_level)?;
    if cli.log_file {
        toggle_file_logging(true)?;
        if let Some(path) = log_file_path() {
            info!("Logging to {}", path.display());
        }
    }

    let config = match &cli.config {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::default(),
    };

    let span = span!(Level::DEBUG, "main");
    let _guard = span.enter();

    match cli.command {
        Commands::Bestmove { fen, time, moves } => {
            trace!("bestmove fen: {fen}, time: {time}, moves: {moves:?}");
            let position = setup(&fen, &moves)?;
            let mut engine = Engine::new(config);

            if let Some(mv) = engine.book_move(&position) {
                println!("bestmove {mv} (book)");
                return Ok(());
            }
            let result = engine.think(&position, time);
            match result.best_move {
                Some(mv) => {
                    let score = match result.mate_in {
                        Some(n) => format!("mate {n}"),
                        None => format!("cp {}", result.score),
                    };
                    println!(
                        "bestmove {mv} score {score} depth {} nodes {} time {} ms",
                        result.depth,
                        result.nodes_searched,
                        result.time_taken.as_millis()
                    );
                    println!("pv {}", result.pv_string());
                }
                None => println!("bestmove (none)"),
            }
        }
        Commands::Perft { fen, depth, divide } => {
            trace!("perft fen: {fen}, depth: {depth}, divide: {divide}");
            let mut position = Position::from_fen(&fen)?;
            println!("{position}");
            if divide {
                perft_divide(&mut position, depth);
            } else {
                for (i, result) in run_perft_suite(&mut position, depth).iter().enumerate() {
                    println!(
                        "Depth {}: {} nodes, {} ms, {} nps",
                        i + 1,
                        result.nodes,
                        result.duration.as_millis(),
                        result.nps
                    );
                }
            }
        }
        Commands::Eval { fen } => {
            let position = Position::from_fen(&fen)?;
            let evaluator = CompositeEvaluator::default();
            println!("{position}");
            for (name, score) in evaluator.breakdown(&position) {
                println!("{name:>10}: {score:+}");
            }
            println!(
                "{:>10}: {:+} ({:?} to move)",
                "Total",
                evaluator.evaluate(&position),
                position.stm
            );
        }
        Commands::Book { moves } => {
            let engine = Engine::new(config);
            let mut position = Position::new();
            for san in &moves {
                let mv = parse_san(&position, san)?;
                position.make_move(mv);
            }
            let continuations = engine.book().continuations(&position.played_moves());
            if continuations.is_empty() {
                println!("No book moves after '{}'", moves.join(" "));
            }
            let total: u32 = continuations.iter().map(|c| c.weight).sum();
            for entry in continuations {
                println!(
                    "{:<6} {:<6} weight {:>4} ({:.1}%)",
                    entry.san,
                    entry.mv.uci(),
                    entry.weight,
                    100.0 * f64::from(entry.weight) / f64::from(total.max(1))
                );
            }
        }
        Commands::Fen { fen, moves } => {
            let mut position = Position::from_fen(&fen)?;
            let mut sans = Vec::with_capacity(moves.len());
            for text in &moves {
                let mv = position.find_uci_move(text)?;
                sans.push(to_san(&position, mv));
                position.make_move(mv);
            }
            if !sans.is_empty() {
                println!("{}", sans.join(" "));
            }
            println!("{position}");
            println!("{}", position.to_fen());
        }
    }
    Ok(())
}

fn setup(fen: &str, moves: &[String]) -> miette::Result<Position> {
    let mut position = Position::from_fen(fen)?;
    for text in moves {
        position.try_uci_move(text)?;
    }
    Ok(position)
}
