//! Top-level entry point: opening book first, then a timed search.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::prelude::*;
use crate::search::{AlphaBetaSearch, ProgressCallback};

#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    book: OpeningBook,
    searcher: AlphaBetaSearch,
    rng: StdRng,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    /// Engine with the embedded opening book
    pub fn new(config: EngineConfig) -> Self {
        Self::with_book(config, OpeningBook::default_book())
    }

    pub fn with_book(config: EngineConfig, book: OpeningBook) -> Self {
        let rng = match config.book.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let searcher = AlphaBetaSearch::default().with_config(config.search, config.tt);

        Self {
            config,
            book,
            searcher,
            rng,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn book(&self) -> &OpeningBook {
        &self.book
    }

    /// Called after every completed search depth
    pub fn set_progress_callback(&mut self, callback: impl FnMut(&SearchProgress) + Send + 'static) {
        let callback: ProgressCallback = Box::new(callback);
        self.searcher.set_progress_callback(callback);
    }

    /// Best move for `position` within `time_ms`, or `None` when the side to
    /// move has no legal moves.
    #[instrument(skip(self, position), fields(fen = %position.to_fen()))]
    pub fn calculate_move(&mut self, position: &Position, time_ms: u64) -> Option<Move> {
        if let Some(mv) = self.book_move(position) {
            info!("Playing book move {mv}");
            return Some(mv);
        }
        self.think(position, time_ms).best_move
    }

    /// Book continuation for `position`, if the book applies to it
    pub fn book_move(&mut self, position: &Position) -> Option<Move> {
        let book_config = self.config.book;
        if !book_config.enabled || !position.is_rooted_at_start() {
            return None;
        }
        let history = position.played_moves();
        if history.len() >= book_config.max_ply {
            return None;
        }
        self.book.lookup(
            &history,
            position.stm,
            position,
            book_config.selection,
            &mut self.rng,
        )
    }

    /// Timed search without consulting the book. The caller's position is
    /// left untouched.
    pub fn think(&mut self, position: &Position, time_ms: u64) -> SearchResult {
        let mut scratch = position.clone();
        self.searcher.set_limits(SearchLimits::time(time_ms));
        let result = self.searcher.search(&mut scratch);
        debug_assert_eq!(&scratch, position, "search must restore the position");

        info!(
            "Search: depth {} score {} nodes {} in {} ms, pv {}",
            result.depth,
            result.score,
            result.nodes_searched,
            result.time_taken.as_millis(),
            result.pv_string()
        );
        result
    }

    /// Search to a fixed depth with no time limit
    pub fn think_to_depth(&mut self, position: &Position, depth: u16) -> SearchResult {
        let mut scratch = position.clone();
        self.searcher.set_limits(SearchLimits::depth(depth));
        self.searcher.search(&mut scratch)
    }

    pub fn evaluate(&self, position: &Position) -> i32 {
        self.searcher.evaluator().evaluate(position)
    }
}
