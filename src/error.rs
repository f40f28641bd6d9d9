use miette::Diagnostic;
use thiserror::Error;

/// Errors surfaced to callers of the engine API.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid FEN '{fen}': {reason}")]
    #[diagnostic(
        code(castellan::invalid_fen),
        help("expected six fields: placement, side, castling, en passant, halfmove, fullmove")
    )]
    InvalidFen { fen: String, reason: String },

    #[error("illegal move {mv} in position {fen}")]
    #[diagnostic(
        code(castellan::illegal_move),
        help("only moves produced by the legal move generator can be played")
    )]
    IllegalMove { mv: String, fen: String },

    #[error("could not understand move '{0}'")]
    #[diagnostic(code(castellan::invalid_move_notation))]
    InvalidMoveNotation(String),

    #[error("invalid square '{0}'")]
    #[diagnostic(code(castellan::invalid_square))]
    InvalidSquare(String),
}

impl EngineError {
    pub(crate) fn fen(fen: &str, reason: impl Into<String>) -> Self {
        Self::InvalidFen {
            fen: fen.to_string(),
            reason: reason.into(),
        }
    }
}
