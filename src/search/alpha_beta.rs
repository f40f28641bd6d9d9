//! Negamax search with alpha-beta pruning and iterative deepening.
//! Also implements various standard techniques like:
//! - Principal Variation Search
//! - Late Move Reduction
//! - Null Move Pruning
//! - Check and promotion extensions
//! - Aspiration Windows
//! - Quiescence search with delta pruning

use std::cmp::max;
use std::time::Instant;

use tracing::trace_span;

use crate::moves::move_gen::{CapturesOnly, generate_moves};
use crate::prelude::*;
use crate::search::common::*;
use crate::search::move_ordering::{MainSearchPolicy, OrderingHints, sort_moves};
use crate::search::move_picker::MovePicker;
use crate::search::tt::{Bound, TranspositionEntry, TranspositionTable, TtConfig};
use crate::search::{SearchEngine, SearchStats};

/// Consts
const INF: i32 = MATE_SCORE + 1;
const QS_MAX_DEPTH: usize = 8;
const DELTA_MARGIN: i32 = 200;
const NMP_MIN_DEPTH: u16 = 3;
const LMR_MIN_DEPTH: u16 = 3;
const LMR_MIN_MOVE_INDEX: usize = 3;
const ASP_MIN_DEPTH: u16 = 3;
const HISTORY_CAP: i32 = 500_000;

/// Struct that holds relatively large tables
struct SearchTables {
    killer_moves: [[Option<Move>; 2]; MAX_PLY],
    history: [[i32; NUM_SQUARES]; NUM_SQUARES],
    /// Triangular PV table, row `ply` holds the line from `ply` onwards
    pv_table: Vec<[Move; MAX_PLY]>,
    pv_length: [usize; MAX_PLY],
}

impl SearchTables {
    fn new() -> Box<Self> {
        Box::new(Self {
            killer_moves: [[None; 2]; MAX_PLY],
            history: [[0; NUM_SQUARES]; NUM_SQUARES],
            pv_table: vec![[Move::default(); MAX_PLY]; MAX_PLY],
            pv_length: [0; MAX_PLY],
        })
    }

    /// Stores given `Move` in `killer_moves[ply][0]` while backing up
    /// the prev occupant to `killer_moves[ply][1]`
    fn update_killers(&mut self, ply: usize, mv: Move) {
        if ply < MAX_PLY && self.killer_moves[ply][0] != Some(mv) {
            self.killer_moves[ply][1] = self.killer_moves[ply][0];
            self.killer_moves[ply][0] = Some(mv);
        }
    }

    /// Indexes as `history[mv.from][mv.to]`, scores grow by `depth ^ 2`
    fn update_history(&mut self, mv: Move, depth: u16) {
        let entry = &mut self.history[mv.from.index()][mv.to.index()];
        *entry = (*entry + depth as i32 * depth as i32).min(HISTORY_CAP);
    }

    fn update_pv(&mut self, ply: usize, mv: Move) {
        let child_len = self.pv_length[ply + 1].max(ply + 1);
        self.pv_table[ply][ply] = mv;
        for i in (ply + 1)..child_len {
            self.pv_table[ply][i] = self.pv_table[ply + 1][i];
        }
        self.pv_length[ply] = child_len;
    }

    fn root_pv(&self) -> Vec<Move> {
        self.pv_table[0][..self.pv_length[0]].to_vec()
    }
}

/// State owned by a single call to [`AlphaBetaSearch::find_best_move`].
/// Nothing here survives the call.
pub struct SearchContext<'a> {
    evaluator: &'a dyn Evaluator,
    config: &'a SearchConfig,
    tt: TranspositionTable,
    tables: Box<SearchTables>,
    /// PV of the last completed iteration, searched first
    prev_pv: Vec<Move>,
    nodes: u64,
    deadline: Option<Instant>,
    max_nodes: Option<u64>,
    stopped: bool,
    /// Best root move of the iteration in progress
    root_best: Option<(Move, i32)>,
    stats: SearchStats,
}

impl<'a> SearchContext<'a> {
    fn new(
        evaluator: &'a dyn Evaluator,
        config: &'a SearchConfig,
        tt_config: TtConfig,
        deadline: Option<Instant>,
        max_nodes: Option<u64>,
    ) -> Self {
        Self {
            evaluator,
            config,
            tt: TranspositionTable::new(tt_config),
            tables: SearchTables::new(),
            prev_pv: Vec::new(),
            nodes: 0,
            deadline,
            max_nodes,
            stopped: false,
            root_best: None,
            stats: SearchStats::new(),
        }
    }

    #[inline(always)]
    fn stat(&mut self, update: impl FnOnce(&mut SearchStats)) {
        if self.config.collect_stats {
            update(&mut self.stats);
        }
    }

    /// Counts a node and reads the clock every `node_check_interval` nodes
    #[inline]
    fn visit_node(&mut self) {
        self.nodes += 1;
        if self.max_nodes.is_some_and(|limit| self.nodes >= limit) {
            debug!("Node limit exhausted");
            self.stopped = true;
        }
        if self.nodes % self.config.node_check_interval.max(1) == 0
            && self.deadline.is_some_and(|d| Instant::now() >= d)
        {
            debug!("Max time utilized");
            self.stopped = true;
        }
    }

    #[inline]
    fn static_eval(&self, position: &Position, ply: usize) -> i32 {
        adjust_score_for_ply(self.evaluator.evaluate(position), ply)
    }

    /// Drawn by rule. A checkmate on the hundredth halfmove still counts as mate.
    fn is_draw(position: &Position, in_check: bool) -> bool {
        if position.is_threefold_repetition() || position.has_insufficient_material() {
            return true;
        }
        if !position.is_fifty_move_draw() {
            return false;
        }
        if !in_check {
            return true;
        }
        let mut evasions = MoveBuffer::new();
        generate_legal_moves(position, &mut evasions);
        !evasions.is_empty()
    }

    #[inline]
    fn extension(&self, in_check: bool, mv: Move, ply: usize) -> u16 {
        let extend = self.config.enable_extensions
            && ply < MAX_PLY / 2
            && (in_check || mv.is_promotion());
        extend as u16
    }

    fn aspiration_search(
        &mut self,
        position: &mut Position,
        depth: u16,
        prev_score: i32,
        root_moves: &[Move],
    ) -> (Option<Move>, i32) {
        let use_asp =
            self.config.enable_asp && depth >= ASP_MIN_DEPTH && !is_mate_score(prev_score);

        if use_asp {
            let window = self.config.aspiration_window;
            let (alpha, beta) = (prev_score - window, prev_score + window);
            trace!("ASP window: ({alpha}, {beta})");

            let (best_move, best_score) = self.root_search(position, depth, alpha, beta, root_moves);
            if self.stopped || (best_score > alpha && best_score < beta) {
                return (best_move, best_score);
            }
            trace!("ASP failed with {best_score}, re-searching with full window");
            self.stat(|s| s.asp_research += 1);
        }

        self.root_search(position, depth, -INF, INF, root_moves)
    }

    fn root_search(
        &mut self,
        position: &mut Position,
        depth: u16,
        mut alpha: i32,
        beta: i32,
        root_moves: &[Move],
    ) -> (Option<Move>, i32) {
        let root = NodeContext::root();
        let in_check = position.is_in_check(position.stm);
        self.tables.pv_length[0] = 0;

        let mut best_move = None;
        let mut best_score = -INF;

        for (index, &mv) in root_moves.iter().enumerate() {
            position.make_move(mv);
            let repetitions = position.repetition_count();

            let mut score = if repetitions >= 2 {
                // Third occurrence
                0
            } else {
                let new_depth = depth - 1 + self.extension(in_check, mv, 0);
                let follows_pv = self.prev_pv.first() == Some(&mv);
                if index == 0 {
                    let child = root.new_child(true, follows_pv);
                    -self.alpha_beta(position, child, new_depth, -beta, -alpha)
                } else {
                    let child = root.new_child(false, follows_pv);
                    let mut child_score = -self.alpha_beta(position, child, new_depth, -alpha - 1, -alpha);
                    if child_score > alpha && child_score < beta {
                        let child = root.new_child(true, follows_pv);
                        child_score = -self.alpha_beta(position, child, new_depth, -beta, -alpha);
                    }
                    child_score
                }
            };

            if repetitions == 1 && score > 0 {
                score -= self.config.repetition_penalty;
            }

            position.unmake_move();

            if self.stopped {
                break;
            }

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
                if self.root_best.is_none_or(|(_, s)| score > s) {
                    self.root_best = Some((mv, score));
                }
            }

            if score > alpha {
                alpha = score;
                self.tables.update_pv(0, mv);
                if alpha >= beta {
                    break;
                }
            }
        }

        (best_move, best_score)
    }

    fn alpha_beta(
        &mut self,
        position: &mut Position,
        node: NodeContext,
        depth: u16,
        mut alpha: i32,
        beta: i32,
    ) -> i32 {
        let ply = node.ply;

        // Necessary to prevent search extensions from explosion
        if ply >= MAX_PLY - 1 {
            return self.static_eval(position, ply);
        }
        self.tables.pv_length[ply] = ply;

        if depth == 0 {
            return self.quiescence_search(position, node, alpha, beta, 0);
        }

        if self.stopped {
            return 0;
        }
        self.visit_node();

        let in_check = position.is_in_check(position.stm);
        if Self::is_draw(position, in_check) {
            self.stat(|s| s.draw_returns += 1);
            return 0;
        }

        let hash = position.hash;
        let original_alpha = alpha;

        // TT Probe
        self.stat(|s| s.tt_probes += 1);
        let mut tt_move = None;
        if let Some(entry) = self.tt.probe(hash).copied() {
            self.stat(|s| s.tt_hits += 1);
            tt_move = entry.best_move;

            if !node.is_pv_node && entry.depth >= depth {
                let score = adjust_score_for_ply(entry.score, ply);
                let cutoff = match entry.bound {
                    Bound::Exact => Some(score),
                    Bound::LowerBound if score >= beta => Some(beta),
                    Bound::UpperBound if score <= alpha => Some(alpha),
                    _ => None,
                };
                if let Some(score) = cutoff {
                    self.stat(|s| s.tt_cutoffs += 1);
                    return score;
                }
            }
        }

        if let Some(score) = self.try_null_move_pruning(position, node, depth, beta, in_check) {
            return score;
        }

        let mut legal_moves = MoveBuffer::new();
        generate_legal_moves(position, &mut legal_moves);

        if legal_moves.is_empty() {
            self.stat(|s| s.mate_returns += 1);
            return if in_check {
                -MATE_SCORE + ply as i32
            } else {
                0
            };
        }

        self.stat(|s| s.main_search_nodes += 1);

        let pv_move = if node.on_prev_pv {
            self.prev_pv.get(ply).copied()
        } else {
            None
        };
        let killers = self.tables.killer_moves[ply];
        let hints = OrderingHints {
            pv_move,
            tt_move,
            killers: &killers,
            history: &self.tables.history,
        };
        let mut picker = MovePicker::new(legal_moves.as_mut_slice(), &hints);

        let mut best_score = -INF;
        let mut best_move = None;
        let mut move_index = 0;

        while let Some(mv) = picker.next_best() {
            position.make_move(mv);

            let gives_check = position.is_in_check(position.stm);
            let new_depth = depth - 1 + self.extension(in_check, mv, ply);
            let follows_pv = pv_move == Some(mv);

            let score = if move_index == 0 {
                let child = node.new_child(node.is_pv_node, follows_pv);
                -self.alpha_beta(position, child, new_depth, -beta, -alpha)
            } else {
                let child = node.new_child(false, follows_pv);
                let mut child_score;
                if self.should_reduce(depth, move_index, mv, in_check, gives_check) {
                    let reduction = self.lmr_reduction(depth, move_index, node.is_pv_node);
                    self.stat(|s| s.lmr_attempts += 1);

                    let reduced = new_depth.saturating_sub(reduction);
                    child_score = -self.alpha_beta(position, child, reduced, -alpha - 1, -alpha);
                    if child_score > alpha {
                        self.stat(|s| s.lmr_research += 1);
                        child_score = -self.alpha_beta(position, child, new_depth, -alpha - 1, -alpha);
                    }
                } else {
                    child_score = -self.alpha_beta(position, child, new_depth, -alpha - 1, -alpha);
                }

                if child_score > alpha && child_score < beta {
                    // if ZWS fails, re-search with full window and make this new PV
                    let child = node.new_child(true, follows_pv);
                    child_score = -self.alpha_beta(position, child, new_depth, -beta, -alpha);
                }
                child_score
            };

            position.unmake_move();

            if self.stopped {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }

            if score > alpha {
                alpha = score;
                self.tables.update_pv(ply, mv);

                if alpha >= beta {
                    self.stat(|s| {
                        s.beta_cutoffs_main += 1;
                        s.record_cutoff(move_index);
                    });

                    // Quiet moves that cut are good killer candidates
                    if mv.is_quiet() {
                        self.tables.update_killers(ply, mv);
                        self.tables.update_history(mv, depth);
                    }

                    self.tt.store(TranspositionEntry::new(
                        hash,
                        Some(mv),
                        adjust_score_from_ply(beta, ply),
                        depth,
                        Bound::LowerBound,
                    ));
                    return beta;
                }
            }
            move_index += 1;
        }

        let bound = if alpha > original_alpha {
            Bound::Exact
        } else {
            Bound::UpperBound
        };
        self.tt.store(TranspositionEntry::new(
            hash,
            best_move,
            adjust_score_from_ply(best_score, ply),
            depth,
            bound,
        ));

        alpha
    }

    fn quiescence_search(
        &mut self,
        position: &mut Position,
        node: NodeContext,
        mut alpha: i32,
        beta: i32,
        qs_depth: usize,
    ) -> i32 {
        let ply = node.ply;
        if ply >= MAX_PLY - 1 || qs_depth >= QS_MAX_DEPTH {
            return self.static_eval(position, ply);
        }
        self.tables.pv_length[ply] = ply;

        if self.stopped {
            return 0;
        }
        self.visit_node();

        let in_check = position.is_in_check(position.stm);
        if Self::is_draw(position, in_check) {
            self.stat(|s| s.draw_returns += 1);
            return 0;
        }

        let mut stand_pat = -INF;
        if !in_check {
            stand_pat = self.static_eval(position, ply);
            if stand_pat >= beta {
                self.stat(|s| s.standpat_returns += 1);
                return beta;
            }
            alpha = max(alpha, stand_pat);
        }

        // Evasions when in check, otherwise captures only
        let mut moves = MoveBuffer::new();
        if in_check {
            generate_legal_moves(position, &mut moves);
            if moves.is_empty() {
                self.stat(|s| s.mate_returns += 1);
                return -MATE_SCORE + ply as i32;
            }
        } else {
            generate_moves::<CapturesOnly>(position, &mut moves);
        }

        self.stat(|s| s.qsearch_nodes += 1);

        let mut picker = MovePicker::new_qsearch(moves.as_mut_slice());
        while let Some(mv) = picker.next_best() {
            if !in_check {
                // Delta pruning
                let gain = mv.captured.map_or(0, |p| p.value())
                    + mv.promotion.map_or(0, |p| p.value() - Piece::Pawn.value());
                if stand_pat + gain + DELTA_MARGIN < alpha {
                    self.stat(|s| s.delta_pruning_cutoffs += 1);
                    continue;
                }
            }

            position.make_move(mv);
            let child = node.new_child(node.is_pv_node, false);
            let score = -self.quiescence_search(position, child, -beta, -alpha, qs_depth + 1);
            position.unmake_move();

            if self.stopped {
                return 0;
            }

            if score >= beta {
                self.stat(|s| s.beta_cutoffs_qs += 1);
                return beta;
            }
            alpha = max(alpha, score);
        }
        alpha
    }

    /// Null move pruning
    fn try_null_move_pruning(
        &mut self,
        position: &mut Position,
        node: NodeContext,
        depth: u16,
        beta: i32,
        in_check: bool,
    ) -> Option<i32> {
        let previous_was_null = position.history().last().is_some_and(|r| r.mv.is_none());
        if !self.config.enable_nmp
            || depth < NMP_MIN_DEPTH
            || node.ply == 0
            || node.is_pv_node
            || in_check
            || previous_was_null
            || is_mate_score(beta)
            || !position.has_non_pawn_material(position.stm)
        {
            return None;
        }

        let null_reduction = if depth >= 6 { 3 } else { 2 };
        let null_depth = (depth - 1).saturating_sub(null_reduction);

        self.stat(|s| s.null_move_attempts += 1);

        position.make_null_move();
        let child = node.new_child(false, false);
        let score = -self.alpha_beta(position, child, null_depth, -beta, -beta + 1);
        position.unmake_null_move();

        if self.stopped {
            return None;
        }

        if score >= beta {
            self.stat(|s| s.null_move_cutoffs += 1);
            Some(beta)
        } else {
            None
        }
    }

    /// Check if lmr should be applied
    #[inline]
    fn should_reduce(
        &self,
        depth: u16,
        move_index: usize,
        mv: Move,
        in_check: bool,
        gives_check: bool,
    ) -> bool {
        self.config.enable_lmr
            && depth >= LMR_MIN_DEPTH
            && move_index >= LMR_MIN_MOVE_INDEX
            && mv.is_quiet()
            && !in_check
            && !gives_check
    }

    /// Late Move Reduction
    #[inline]
    fn lmr_reduction(&self, depth: u16, move_index: usize, is_pv_node: bool) -> u16 {
        let base = 0.20 + ((depth as f32).ln() * (move_index as f32).ln()) / 3.35;
        let mut reduction = (base as u16).max(1);
        if is_pv_node && reduction > 1 {
            reduction -= 1;
        }
        reduction.min(depth - 1)
    }
}

pub struct AlphaBetaSearch {
    config: SearchConfig,
    tt_config: TtConfig,
    limits: SearchLimits,
    evaluator: Box<dyn Evaluator>,
    progress: Option<ProgressCallback>,
    stats: SearchStats,
}

impl std::fmt::Debug for AlphaBetaSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaBetaSearch")
            .field("config", &self.config)
            .field("tt_config", &self.tt_config)
            .field("limits", &self.limits)
            .field("evaluator", &self.evaluator.name())
            .field("has_progress_callback", &self.progress.is_some())
            .finish()
    }
}

impl Default for AlphaBetaSearch {
    fn default() -> Self {
        Self::new(Box::new(CompositeEvaluator::balanced()))
    }
}

impl AlphaBetaSearch {
    pub fn new(evaluator: Box<dyn Evaluator>) -> Self {
        Self {
            config: SearchConfig::default(),
            tt_config: TtConfig::default(),
            limits: SearchLimits::default(),
            evaluator,
            progress: None,
            stats: SearchStats::new(),
        }
    }

    /// Constructor to control various techniques in search, for ex,
    /// enable ASP, disable NMP, etc.
    pub fn with_config(mut self, config: SearchConfig, tt_config: TtConfig) -> Self {
        self.config = config;
        self.tt_config = tt_config;
        self
    }

    /// Constructor to set limits for search. Time, node count, depth
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn evaluator(&self) -> &dyn Evaluator {
        &*self.evaluator
    }

    pub fn find_best_move(&mut self, position: &mut Position) -> SearchResult {
        let start = Instant::now();
        let span = trace_span!("search_root");
        let _guard = span.enter();

        debug!(
            "Finding best move for '{}' with max_depth: {:?}, max_time: {:?}",
            position.to_fen(),
            self.limits.max_depth,
            self.limits.max_time
        );

        let mut root_moves = MoveBuffer::new();
        generate_legal_moves(position, &mut root_moves);

        if root_moves.is_empty() {
            debug!("No legal moves");
            let in_check = position.is_in_check(position.stm);
            return SearchResult {
                best_move: None,
                score: if in_check { -MATE_SCORE } else { 0 },
                is_mate: in_check,
                mate_in: in_check.then_some(0),
                time_taken: start.elapsed(),
                ..Default::default()
            };
        }

        if root_moves.len() == 1 {
            let only = root_moves.as_slice()[0];
            debug!("Single legal move {only}, skipping search");
            return SearchResult {
                best_move: Some(only),
                score: self.evaluator.evaluate(position),
                pv: vec![only],
                time_taken: start.elapsed(),
                ..Default::default()
            };
        }

        let max_depth = self
            .limits
            .max_depth
            .unwrap_or(self.config.max_depth)
            .clamp(1, (MAX_PLY / 2) as u16);
        let deadline = self.limits.max_time.map(|t| start + t);
        let soft_limit = self.limits.max_time.map(|t| t / 2);

        let mut ctx = SearchContext::new(
            &*self.evaluator,
            &self.config,
            self.tt_config,
            deadline,
            self.limits.max_nodes,
        );

        let mut best_move: Option<Move> = None;
        let mut best_score = 0;
        let mut completed_depth = 0;
        let mut pv = Vec::new();

        for depth in 1..=max_depth {
            if depth > 1 && soft_limit.is_some_and(|soft| start.elapsed() >= soft) {
                debug!("Soft time limit reached before depth {depth}");
                break;
            }

            let hints = OrderingHints {
                pv_move: best_move,
                tt_move: None,
                killers: &ctx.tables.killer_moves[0],
                history: &ctx.tables.history,
            };
            sort_moves::<MainSearchPolicy>(root_moves.as_mut_slice(), &hints);
            ctx.prev_pv = pv.clone();
            ctx.root_best = None;

            let (local_best_move, local_best_score) =
                ctx.aspiration_search(position, depth, best_score, root_moves.as_slice());

            if ctx.stopped {
                debug!("Depth {depth} interrupted");
                break;
            }

            completed_depth = depth;
            best_move = local_best_move;
            best_score = local_best_score;
            pv = ctx.tables.root_pv();

            debug!(
                "depth {} score cp {} nodes {} pv {}",
                depth,
                best_score,
                ctx.nodes,
                pv.iter().map(|m| m.uci()).collect::<Vec<_>>().join(" ")
            );

            if let Some(callback) = self.progress.as_mut() {
                callback(&SearchProgress {
                    depth,
                    score: best_score,
                    best_move,
                    nodes: ctx.nodes,
                    elapsed: start.elapsed(),
                });
            }

            if is_mate_score(best_score) {
                debug!("Mate found at depth {depth}");
                break;
            }
        }

        // Fallbacks: best of the interrupted iteration, then any legal move
        if best_move.is_none() {
            match ctx.root_best {
                Some((mv, score)) => {
                    debug!("Using partial first iteration result {mv}");
                    best_move = Some(mv);
                    best_score = score;
                }
                None => {
                    warn!("No iteration produced a move, falling back to the first legal move");
                    best_move = root_moves.first().copied();
                }
            }
        }
        if pv.first() != best_move.as_ref() {
            pv = best_move.into_iter().collect();
        }

        let time_taken = start.elapsed();
        let mut stats = ctx.stats;
        stats.nodes_searched = ctx.nodes;
        stats.depth_reached = completed_depth;
        stats.time_elapsed = time_taken;
        stats.hash_full = ctx.tt.hash_full();
        stats.calculate_nps();
        if self.config.collect_stats {
            stats.log_summary();
        }
        self.stats = stats;

        SearchResult {
            best_move,
            score: best_score,
            depth: completed_depth,
            nodes_searched: ctx.nodes,
            time_taken,
            pv,
            is_mate: is_mate_score(best_score),
            mate_in: mate_in(best_score),
        }
    }
}

impl SearchEngine for AlphaBetaSearch {
    fn search(&mut self, position: &mut Position) -> SearchResult {
        self.find_best_move(position)
    }

    fn set_limits(&mut self, limits: SearchLimits) {
        self.limits = limits
    }

    fn set_progress_callback(&mut self, callback: ProgressCallback) {
        self.progress = Some(callback)
    }

    fn get_stats(&self) -> SearchStats {
        self.stats
    }
}
