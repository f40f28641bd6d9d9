pub mod alpha_beta;
pub mod common;
pub mod move_ordering;
pub mod move_picker;
pub mod tt;

pub use alpha_beta::AlphaBetaSearch;
pub use common::{
    ProgressCallback, SearchConfig, SearchLimits, SearchProgress, SearchResult, SearchStats,
};
pub use tt::TtConfig;

use crate::prelude::Position;

/// A searcher that picks a move for a position under some limits.
///
/// Implementations are not re-entrant: one search per instance at a time.
/// The position is borrowed mutably so the search can make and unmake
/// moves on it, and is handed back unchanged.
pub trait SearchEngine: Send {
    fn search(&mut self, position: &mut Position) -> SearchResult;
    fn set_limits(&mut self, limits: SearchLimits);
    /// Called between iterative-deepening depths with an immutable snapshot
    fn set_progress_callback(&mut self, callback: ProgressCallback);
    /// Statistics of the most recent search
    fn get_stats(&self) -> SearchStats;
}
