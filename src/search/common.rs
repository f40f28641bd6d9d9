use serde::{Deserialize, Serialize};
use tracing::debug_span;

use crate::prelude::*;
use std::time::Duration;

/// Counters collected while searching
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchStats {
    // Basic stats
    pub nodes_searched: u64, // Total nodes including qsearch
    pub depth_reached: u16,
    pub time_elapsed: Duration,
    pub nps: u64,
    pub hash_full: u16, // per-mille

    // Node type
    pub main_search_nodes: u64, // Only main search nodes (excludes qsearch)
    pub qsearch_nodes: u64,

    // Early exits
    pub draw_returns: u64,
    pub mate_returns: u64,
    pub standpat_returns: u64,

    // Transposition table
    pub tt_probes: u64,
    pub tt_hits: u64,
    pub tt_cutoffs: u64,

    // Pruning techniques
    pub null_move_attempts: u64,
    pub null_move_cutoffs: u64,
    pub lmr_attempts: u64,
    pub lmr_research: u64,
    pub delta_pruning_cutoffs: u64,
    pub asp_research: u64,

    pub beta_cutoffs_main: u64,
    pub beta_cutoffs_qs: u64,

    /// Index of the move that caused each beta cutoff
    pub cutoff_at_move: [u64; 16],
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn percent(numerator: u64, denominator: u64) -> f64 {
        if denominator == 0 {
            0.0
        } else {
            100.0 * numerator as f64 / denominator as f64
        }
    }

    pub fn calculate_nps(&mut self) {
        let time_ms = self.time_elapsed.as_millis().max(1) as u64;
        self.nps = (self.nodes_searched * 1000) / time_ms;
    }

    pub fn record_cutoff(&mut self, move_index: usize) {
        let slot = move_index.min(self.cutoff_at_move.len() - 1);
        self.cutoff_at_move[slot] += 1;
    }

    pub fn avg_cutoff_index(&self) -> f64 {
        let total_cutoffs: u64 = self.cutoff_at_move.iter().sum();
        if total_cutoffs == 0 {
            0.0
        } else {
            let weighted_sum: u64 = self
                .cutoff_at_move
                .iter()
                .enumerate()
                .map(|(i, &count)| i as u64 * count)
                .sum();
            weighted_sum as f64 / total_cutoffs as f64
        }
    }

    pub fn log_summary(&self) {
        let _span = debug_span!("search_stats").entered();
        debug!("=> SEARCH STATISTICS (depth {})", self.depth_reached);
        debug!(
            "NODES total={} main={} qsearch={} time={:?} nps={}",
            self.nodes_searched,
            self.main_search_nodes,
            self.qsearch_nodes,
            self.time_elapsed,
            self.nps
        );
        debug!(
            "EXITS draws={} mates={} stand_pat={}",
            self.draw_returns, self.mate_returns, self.standpat_returns
        );
        debug!(
            "TT hits={} ({:.2}% of probes) cutoffs={} ({:.2}% of hits) hash_full={}/1000",
            self.tt_hits,
            Self::percent(self.tt_hits, self.tt_probes),
            self.tt_cutoffs,
            Self::percent(self.tt_cutoffs, self.tt_hits),
            self.hash_full
        );
        debug!(
            "NMP attempts={} cutoffs={} ({:.2}%)",
            self.null_move_attempts,
            self.null_move_cutoffs,
            Self::percent(self.null_move_cutoffs, self.null_move_attempts)
        );
        debug!(
            "LMR attempts={} researches={} ({:.2}%)",
            self.lmr_attempts,
            self.lmr_research,
            Self::percent(self.lmr_research, self.lmr_attempts)
        );
        debug!(
            "QS beta_cutoffs={} delta_pruned={}",
            self.beta_cutoffs_qs, self.delta_pruning_cutoffs
        );
        if self.asp_research > 0 {
            debug!("ASP researches={}", self.asp_research);
        }

        let total_cutoffs: u64 = self.cutoff_at_move.iter().sum();
        if total_cutoffs > 0 {
            let histogram: Vec<String> = self
                .cutoff_at_move
                .iter()
                .take(10)
                .enumerate()
                .filter(|&(_, &count)| count > 0)
                .map(|(i, count)| format!("{i}:{count}"))
                .collect();
            debug!(
                "ORDERING beta_cutoffs={} avg_index={:.2} histogram=[{}]",
                self.beta_cutoffs_main,
                self.avg_cutoff_index(),
                histogram.join(", ")
            );
        }
    }
}

/// Configuration for search behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Deepest iteration when no other limit applies
    pub max_depth: u16,
    pub enable_nmp: bool,
    pub enable_lmr: bool,
    pub enable_asp: bool,
    pub enable_extensions: bool,
    pub collect_stats: bool,
    /// Centipawns taken off a winning score that walks into a second repetition
    pub repetition_penalty: i32,
    /// Nodes visited between clock reads
    pub node_check_interval: u64,
    /// Half-width of the aspiration window
    pub aspiration_window: i32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 32,
            enable_nmp: true,
            enable_lmr: true,
            enable_asp: true,
            enable_extensions: true,
            collect_stats: false,
            repetition_penalty: 25,
            node_check_interval: 2048,
            aspiration_window: 50,
        }
    }
}

/// Search limits (time, depth, nodes)
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_depth: Option<u16>,
    pub max_time: Option<Duration>,
    pub max_nodes: Option<u64>,
}

impl SearchLimits {
    pub fn depth(depth: u16) -> Self {
        Self {
            max_depth: Some(depth),
            ..Default::default()
        }
    }

    pub fn time(time_ms: u64) -> Self {
        Self {
            max_time: Some(Duration::from_millis(time_ms)),
            ..Default::default()
        }
    }

    pub fn nodes(nodes: u64) -> Self {
        Self {
            max_nodes: Some(nodes),
            ..Default::default()
        }
    }
}

/// Result of a search
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub score: i32,
    pub depth: u16,
    pub nodes_searched: u64,
    pub time_taken: Duration,
    pub pv: Vec<Move>,
    pub is_mate: bool,
    /// Moves until mate, negative when the mover is being mated
    pub mate_in: Option<i32>,
}

impl SearchResult {
    pub fn nps(&self) -> u64 {
        let time_ms = self.time_taken.as_millis().max(1) as u64;
        (self.nodes_searched * 1000) / time_ms
    }

    pub fn pv_string(&self) -> String {
        self.pv.iter().map(|m| m.uci()).collect::<Vec<_>>().join(" ")
    }
}

/// Snapshot handed to the progress callback after every completed depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchProgress {
    pub depth: u16,
    pub score: i32,
    pub best_move: Option<Move>,
    pub nodes: u64,
    pub elapsed: Duration,
}

pub type ProgressCallback = Box<dyn FnMut(&SearchProgress) + Send>;

/// Per-node flags threaded through the recursion
#[derive(Clone, Copy, Debug)]
pub struct NodeContext {
    pub ply: usize,
    pub is_pv_node: bool,
    /// Every move from the root to here matches the previous iteration's PV
    pub on_prev_pv: bool,
}

impl NodeContext {
    pub fn root() -> Self {
        Self {
            ply: 0,
            is_pv_node: true,
            on_prev_pv: true,
        }
    }

    pub fn new_child(&self, is_pv_child: bool, follows_pv: bool) -> Self {
        NodeContext {
            ply: self.ply + 1,
            is_pv_node: is_pv_child,
            on_prev_pv: self.on_prev_pv && follows_pv,
        }
    }
}

/// Whether a score encodes a forced mate
#[inline(always)]
pub fn is_mate_score(score: i32) -> bool {
    score.abs() > MATE_THRESHOLD
}

/// Adjusts Score to encode mate distance in the score
/// Takes ply-independent score and converts it to also hold ply info
#[inline(always)]
pub fn adjust_score_for_ply(score: i32, ply: usize) -> i32 {
    if is_mate_score(score) {
        if score > 0 {
            score - ply as i32
        } else {
            score + ply as i32
        }
    } else {
        score
    }
}

/// Adjusts Score to be relative to root.
/// To be called before entry is stored in TranspositionTable
#[inline(always)]
pub fn adjust_score_from_ply(score: i32, ply: usize) -> i32 {
    if is_mate_score(score) {
        if score > 0 {
            score + ply as i32
        } else {
            score - ply as i32
        }
    } else {
        score
    }
}

/// Full moves to mate for a mate score, from the mover's point of view
pub fn mate_in(score: i32) -> Option<i32> {
    if !is_mate_score(score) {
        return None;
    }
    let plies = MATE_SCORE - score.abs();
    let moves = (plies + 1) / 2;
    Some(if score > 0 { moves } else { -moves })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ply_adjustment_round_trip() {
        let mate_at_root = MATE_SCORE - 5;
        let stored = adjust_score_from_ply(mate_at_root - 3, 3);
        assert_eq!(stored, mate_at_root);
        assert_eq!(adjust_score_for_ply(stored, 3), mate_at_root - 3);

        assert_eq!(adjust_score_for_ply(150, 10), 150);
        assert_eq!(adjust_score_for_ply(-MATE_SCORE, 4), -MATE_SCORE + 4);
    }

    #[test]
    fn test_mate_in() {
        assert_eq!(mate_in(MATE_SCORE - 1), Some(1));
        assert_eq!(mate_in(MATE_SCORE - 3), Some(2));
        assert_eq!(mate_in(-MATE_SCORE + 2), Some(-1));
        assert_eq!(mate_in(300), None);
    }

    #[test]
    fn test_config_partial_toml() {
        let config: SearchConfig = toml::from_str("max_depth = 6\nenable_nmp = false").unwrap();
        assert_eq!(config.max_depth, 6);
        assert!(!config.enable_nmp);
        assert_eq!(config.repetition_penalty, 25);
        assert_eq!(config.node_check_interval, 2048);
    }
}
