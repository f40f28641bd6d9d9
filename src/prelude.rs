pub use crate::board::{
    self, Position, UndoRecord,
    components::{
        BitBoard, BitBoardIterator, BoardState, CastlingRights, Piece, PieceInfo, Side, Square,
    },
    zobrist::{ZOBRIST, calculate_hash},
};
pub use crate::book::{self, BookConfig, BookSelection, OpeningBook};
pub use crate::consts::*;
pub use crate::engine::Engine;
pub use crate::error::EngineError;
pub use crate::evaluation::{self, CompositeEvaluator, Evaluator};
pub use crate::moves::{
    self, Direction,
    move_buffer::MoveBuffer,
    move_gen::{self, generate_legal_moves},
    move_info::{Move, MoveKind},
    precomputed::MOVE_TABLES,
};
pub use crate::search::{
    self, SearchEngine, SearchResult,
    common::{SearchConfig, SearchLimits, SearchProgress},
};
pub use crate::utils::{self, config::EngineConfig, log::*, perft::*};
pub use miette::{self, Context, IntoDiagnostic, Result};
pub use std::fmt::Display;
pub use std::str::FromStr;
pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
