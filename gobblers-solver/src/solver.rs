//! Iterative retrograde solver.
//!
//! Positions move through `Unseen → Open → Resolved`. The work stack holds
//! the open path; the top key is examined on every iteration:
//!
//! 1. A finished game resolves at distance 0.
//! 2. A move completing the mover's line resolves at distance 1.
//! 3. A resolved child won by the mover resolves at its distance + 1
//!    (shortest first).
//! 4. Otherwise the first child that is neither open nor resolved is pushed.
//! 5. With no such child left: an open child (a repetition) makes a draw at
//!    distance 1, else the shortest drawn child, else the longest loss.
//!
//! Ties go to the first move in generation order.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::time::Instant;

use gobblers_core::{compress, decompress, Key, Move, State};
use log::{debug, info, warn};

use crate::checkpoint::Checkpoint;
use crate::config::SolverConfig;
use crate::error::{Result, SolverError, SolverInvariantViolation};
use crate::stats::{format_bytes, Resolution, SolverStats};
use crate::table::{apply_checked, Metadata, Outcome, OutcomeTable};
use crate::store;

/// Which configured ceiling stopped a run.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Limit {
    TableSize(usize),
    StackDepth(usize),
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::TableSize(max) => write!(f, "table size limit {}", max),
            Limit::StackDepth(max) => write!(f, "stack depth limit {}", max),
        }
    }
}

/// How a run ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SolveStatus {
    Complete(Metadata),
    Interrupted,
    LimitReached(Limit),
}

/// What one look at the top of the stack decided.
enum Step {
    Resolved,
    Push(Key),
}

/// Retrograde solver with its outcome table.
pub struct Solver {
    table: OutcomeTable,
    /// Keys on the active path
    open: HashSet<Key>,
    pub stats: SolverStats,
    config: SolverConfig,
}

impl Solver {
    pub fn new() -> Self {
        Self::with_config(SolverConfig::default())
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            table: OutcomeTable::new(),
            open: HashSet::new(),
            stats: SolverStats::new(),
            config,
        }
    }

    pub fn table(&self) -> &OutcomeTable {
        &self.table
    }

    /// Direct access for seeding known results.
    pub fn table_mut(&mut self) -> &mut OutcomeTable {
        &mut self.table
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Number of keys on the active path. Zero between runs.
    pub fn open_len(&self) -> usize {
        self.open.len()
    }

    /// Metadata of a resolved position.
    pub fn lookup(&self, key: Key) -> Result<Metadata> {
        self.table.get(key).ok_or(SolverError::NotFound(key))
    }

    /// Metadata of `key`, solving its forward closure first if needed.
    pub fn ensure_solved(&mut self, key: Key) -> Result<Metadata> {
        match self.solve(key)? {
            SolveStatus::Complete(meta) => Ok(meta),
            SolveStatus::Interrupted => Err(SolverError::Stopped {
                key,
                reason: "interrupted".into(),
            }),
            SolveStatus::LimitReached(limit) => Err(SolverError::Stopped {
                key,
                reason: limit.to_string(),
            }),
        }
    }

    /// Solve from the start position: every first move, then the start
    /// itself, all into the same table.
    pub fn solve_from_start(&mut self) -> Result<SolveStatus> {
        let start = State::new();
        let start_key = compress(&start);

        for mv in start.legal_moves() {
            let child = compress(&apply_checked(&start, start_key, mv)?);
            info!("Solving first move {} ({})", mv, child);
            match self.solve(child)? {
                SolveStatus::Complete(meta) => {
                    info!("  {:?} in {}", meta.outcome, meta.distance)
                }
                stopped => return Ok(stopped),
            }
        }

        info!("Solving start position ({})", start_key);
        self.solve(start_key)
    }

    /// Resolve `root` and everything it needs.
    ///
    /// The open set is empty again when this returns, whatever the result.
    pub fn solve(&mut self, root: Key) -> Result<SolveStatus> {
        if let Some(meta) = self.table.get(root) {
            return Ok(SolveStatus::Complete(meta));
        }
        decompress(root)?;

        let result = self.run(root);
        self.open.clear();
        result
    }

    fn run(&mut self, root: Key) -> Result<SolveStatus> {
        let mut stack: Vec<Key> = Vec::with_capacity(1024);
        stack.push(root);
        self.open.insert(root);
        debug!("Run from {} with {} known positions", root, self.table.len());

        let mut last_checkpoint = Instant::now();
        let mut last_log = Instant::now();

        while let Some(&key) = stack.last() {
            if let Some(status) = self.stop_reason(stack.len()) {
                self.abort(&stack, status);
                return Ok(status);
            }

            if last_checkpoint.elapsed() >= self.config.checkpoint_interval {
                self.write_checkpoint();
                last_checkpoint = Instant::now();
            }

            if last_log.elapsed() >= self.config.log_interval {
                self.stats
                    .log_progress(self.table.len(), stack.len(), self.open.len());
                last_log = Instant::now();
            }

            match self.step(key)? {
                Step::Resolved => {
                    stack.pop();
                    self.open.remove(&key);
                }
                Step::Push(child) => {
                    self.open.insert(child);
                    stack.push(child);
                    self.stats.record_expansion(stack.len());
                }
            }
        }

        let meta = self
            .table
            .get(root)
            .ok_or(SolverInvariantViolation::MissingRoot { key: root })?;
        debug!("Resolved {}: {:?} in {}", root, meta.outcome, meta.distance);
        Ok(SolveStatus::Complete(meta))
    }

    fn stop_reason(&self, depth: usize) -> Option<SolveStatus> {
        if !self.config.is_running() {
            return Some(SolveStatus::Interrupted);
        }
        if let Some(max) = self.config.max_table_size {
            if self.table.len() >= max {
                return Some(SolveStatus::LimitReached(Limit::TableSize(max)));
            }
        }
        if let Some(max) = self.config.max_stack_depth {
            if depth > max {
                return Some(SolveStatus::LimitReached(Limit::StackDepth(max)));
            }
        }
        None
    }

    /// Drop the open path, keeping every resolved entry.
    fn abort(&mut self, stack: &[Key], status: SolveStatus) {
        warn!(
            "Stopping with {} positions resolved and {} open: {:?}",
            self.table.len(),
            stack.len(),
            status
        );
        debug!("Unresolved path: {:?}", stack);
        self.open.clear();
        self.write_checkpoint();
    }

    fn write_checkpoint(&self) {
        let Some(path) = self.config.checkpoint_path.as_deref() else {
            return;
        };
        let start = Instant::now();
        match Checkpoint::save(path, &self.table) {
            Ok(count) => info!(
                "Saved {} positions ({}) to {} in {:.2}s",
                count,
                format_bytes(Checkpoint::estimate_size(count) as u64),
                path.display(),
                start.elapsed().as_secs_f64()
            ),
            Err(e) => warn!("Checkpoint failed: {}", e),
        }
    }

    fn resolve(&mut self, key: Key, meta: Metadata, rule: Resolution) -> Result<Step> {
        self.table.insert(key, meta)?;
        self.stats.record(rule, meta.outcome);
        Ok(Step::Resolved)
    }

    fn step(&mut self, key: Key) -> Result<Step> {
        let state = decompress(key)?;

        if let Some(winner) = state.winner() {
            let meta = Metadata::terminal(Outcome::win_for(winner));
            return self.resolve(key, meta, Resolution::Terminal);
        }

        let mover = state.mover();
        let win = Outcome::win_for(mover);
        let loss = Outcome::win_for(mover.opponent());

        // Win in one
        let mut children: Vec<(Move, Key)> = Vec::new();
        for mv in state.legal_moves() {
            let child_state = apply_checked(&state, key, mv)?;
            let child = compress(&child_state);
            if child_state.winner() == Some(mover) {
                if self.table.insert_if_absent(child, Metadata::terminal(win)) {
                    self.stats.record(Resolution::Terminal, win);
                }
                return self.resolve(key, Metadata::new(mv, win, 1), Resolution::WinInOne);
            }
            children.push((mv, child));
        }

        // Shortest resolved win
        let mut best_win: Option<(Move, u32)> = None;
        for &(mv, child) in &children {
            if let Some(meta) = self.table.get(child) {
                if meta.outcome == win && best_win.map_or(true, |(_, d)| meta.distance < d) {
                    best_win = Some((mv, meta.distance));
                }
            }
        }
        if let Some((mv, distance)) = best_win {
            let meta = Metadata::new(mv, win, distance + 1);
            return self.resolve(key, meta, Resolution::WinningChild);
        }

        // Expand the first unseen child
        let unseen = children
            .iter()
            .map(|&(_, child)| child)
            .find(|child| !self.open.contains(child) && !self.table.contains(*child));
        if let Some(child) = unseen {
            return Ok(Step::Push(child));
        }

        // Every child is open or resolved
        let repeated = children
            .iter()
            .find(|&&(_, child)| self.open.contains(&child))
            .map(|&(mv, _)| mv);
        if let Some(mv) = repeated {
            let meta = Metadata::new(mv, Outcome::Draw, 1);
            return self.resolve(key, meta, Resolution::OpenChild);
        }

        let mut best_draw: Option<(Move, u32)> = None;
        let mut longest_loss: Option<(Move, u32)> = None;
        for &(mv, child) in &children {
            let meta = self
                .table
                .get(child)
                .ok_or(SolverInvariantViolation::MissingChild { parent: key, child })?;
            match meta.outcome {
                Outcome::Draw => {
                    if best_draw.map_or(true, |(_, d)| meta.distance < d) {
                        best_draw = Some((mv, meta.distance));
                    }
                }
                outcome if outcome == loss => {
                    if longest_loss.map_or(true, |(_, d)| meta.distance > d) {
                        longest_loss = Some((mv, meta.distance));
                    }
                }
                outcome => {
                    return Err(SolverInvariantViolation::UnexpectedOutcome {
                        parent: key,
                        child,
                        outcome,
                    }
                    .into())
                }
            }
        }

        match (best_draw, longest_loss) {
            (Some((mv, d)), _) => {
                self.resolve(key, Metadata::new(mv, Outcome::Draw, d + 1), Resolution::DrawnChild)
            }
            (None, Some((mv, d))) => {
                self.resolve(key, Metadata::new(mv, loss, d + 1), Resolution::ForcedLoss)
            }
            // No legal moves at all
            (None, None) => self.resolve(key, Metadata::terminal(loss), Resolution::NoMoves),
        }
    }

    /// Follow best moves from `key`.
    pub fn principal_line(&self, key: Key) -> Result<Vec<(Key, Metadata)>> {
        self.table.principal_line(key)
    }

    /// Write the table as text records.
    pub fn save(&self, path: &Path) -> Result<usize> {
        store::save(path, &self.table)
    }

    /// Merge a text record file into the table. Returns the entries read.
    pub fn load(&mut self, path: &Path) -> Result<usize> {
        let loaded = store::load(path)?;
        let count = loaded.len();
        self.table.merge(loaded)?;
        Ok(count)
    }

    /// Merge a binary checkpoint into the table. Returns the entries read.
    pub fn load_checkpoint(&mut self, path: &Path) -> Result<usize> {
        let loaded = Checkpoint::load(path)?;
        let count = loaded.len();
        self.table.merge(loaded)?;
        Ok(count)
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}
