use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;

use crate::START_FEN;

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), version = env!("CASTELLAN_VERSION"), about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// TOML file with search, tt and book settings
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Console log level
    #[arg(long, global = true, default_value = "info")]
    pub log_level: Level,

    /// Also write debug logs to a file under the temp directory
    #[arg(long, global = true, default_value = "false")]
    pub log_file: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pick a move for the given position within a time budget
    Bestmove {
        /// FEN string for starting position
        #[arg(short, long, default_value = START_FEN)]
        fen: String,
        /// Time budget in milliseconds
        #[arg(short, long, default_value = "1000")]
        time: u64,
        /// UCI moves to play before thinking
        #[arg(short, long, num_args = 0..)]
        moves: Vec<String>,
    },

    /// Run perft on game with given FEN and depth, or use default fen
    Perft {
        /// FEN string for starting position
        #[arg(short, long, default_value = START_FEN)]
        fen: String,
        /// set search depth
        #[arg(short, long, default_value = "5")]
        depth: u8,
        /// Print the node count below every root move
        #[arg(long, default_value = "false")]
        divide: bool,
    },

    /// Show the static evaluation, term by term
    Eval {
        #[arg(short, long, default_value = START_FEN)]
        fen: String,
    },

    /// List book continuations after a SAN move sequence from the start position
    Book {
        #[arg(short, long, num_args = 0..)]
        moves: Vec<String>,
    },

    /// Apply UCI moves to a position and print the result
    Fen {
        #[arg(short, long, default_value = START_FEN)]
        fen: String,
        #[arg(short, long, num_args = 0..)]
        moves: Vec<String>,
    },
}
