//! Solver statistics tracking.

use std::time::Instant;

use log::info;

use crate::table::Outcome;

/// Peak resident set size of this process in bytes.
#[cfg(unix)]
pub fn peak_memory_usage() -> Option<u64> {
    let mut usage = std::mem::MaybeUninit::<libc::rusage>::uninit();
    // SAFETY: getrusage only writes into the struct we hand it
    let usage = unsafe {
        if libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) != 0 {
            return None;
        }
        usage.assume_init()
    };
    let max_rss = u64::try_from(usage.ru_maxrss).ok()?;
    // macOS reports bytes, everything else kilobytes
    if cfg!(target_os = "macos") {
        Some(max_rss)
    } else {
        Some(max_rss * 1024)
    }
}

#[cfg(not(unix))]
pub fn peak_memory_usage() -> Option<u64> {
    None
}

/// Format bytes as human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if unit == UNITS.len() - 1 {
        format!("{:.2} {}", value, UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Which rule resolved a position.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Resolution {
    /// Someone already has a line
    Terminal,
    /// The mover completes a line this move
    WinInOne,
    /// A resolved child is a win for the mover
    WinningChild,
    /// A child is still open on the path
    OpenChild,
    /// Best child is a draw
    DrawnChild,
    /// Every child wins for the opponent
    ForcedLoss,
    /// The mover has no legal moves
    NoMoves,
}

/// Statistics collected during solving.
#[derive(Debug, Default)]
pub struct SolverStats {
    /// Positions resolved by this solver (children written as terminals included)
    pub positions_resolved: u64,

    /// Positions pushed onto the work stack
    pub expansions: u64,

    /// Per-rule breakdown
    pub terminal_positions: u64,
    pub wins_in_one: u64,
    pub winning_children: u64,
    pub open_child_draws: u64,
    pub drawn_children: u64,
    pub forced_losses: u64,
    pub no_move_losses: u64,

    /// Breakdown of resolved outcomes
    pub white_wins: u64,
    pub black_wins: u64,
    pub draws: u64,

    /// Maximum stack depth reached
    pub max_depth: u64,

    /// For rate calculation
    start_time: Option<Instant>,
    last_log_time: Option<Instant>,
    last_log_positions: u64,
}

impl SolverStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            last_log_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Record one newly resolved position.
    pub fn record(&mut self, rule: Resolution, outcome: Outcome) {
        self.positions_resolved += 1;
        match rule {
            Resolution::Terminal => self.terminal_positions += 1,
            Resolution::WinInOne => self.wins_in_one += 1,
            Resolution::WinningChild => self.winning_children += 1,
            Resolution::OpenChild => self.open_child_draws += 1,
            Resolution::DrawnChild => self.drawn_children += 1,
            Resolution::ForcedLoss => self.forced_losses += 1,
            Resolution::NoMoves => self.no_move_losses += 1,
        }
        match outcome {
            Outcome::WhiteWins => self.white_wins += 1,
            Outcome::BlackWins => self.black_wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Unresolved => {}
        }
    }

    /// Record a push onto the work stack.
    pub fn record_expansion(&mut self, depth: usize) {
        self.expansions += 1;
        self.max_depth = self.max_depth.max(depth as u64);
    }

    /// Get current positions per second
    pub fn positions_per_sec(&self) -> f64 {
        if let Some(start) = self.start_time {
            let elapsed = start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                return self.positions_resolved as f64 / elapsed;
            }
        }
        0.0
    }

    /// Log progress and reset log timer
    pub fn log_progress(&mut self, table_size: usize, stack_depth: usize, open_size: usize) {
        let now = Instant::now();
        let elapsed_total = self.start_time.map(|s| s.elapsed().as_secs()).unwrap_or(0);

        // Calculate rate since last log
        let rate = if let Some(last) = self.last_log_time {
            let elapsed = last.elapsed().as_secs_f64();
            let positions = self.positions_resolved - self.last_log_positions;
            if elapsed > 0.0 {
                positions as f64 / elapsed
            } else {
                0.0
            }
        } else {
            self.positions_per_sec()
        };

        let mem_str = peak_memory_usage()
            .map(|m| format!(" peak_mem={}", format_bytes(m)))
            .unwrap_or_default();

        info!(
            "[{:02}:{:02}:{:02}] resolved={} table={} stack={} open={} rate={:.0}/s max_depth={}{}",
            elapsed_total / 3600,
            (elapsed_total % 3600) / 60,
            elapsed_total % 60,
            self.positions_resolved,
            table_size,
            stack_depth,
            open_size,
            rate,
            self.max_depth,
            mem_str,
        );
        info!(
            "           outcomes: white={} black={} draw={}",
            self.white_wins, self.black_wins, self.draws
        );

        self.last_log_time = Some(now);
        self.last_log_positions = self.positions_resolved;
    }

    /// Log final summary
    pub fn log_summary(&self) {
        info!("Positions resolved: {}", self.positions_resolved);
        info!("  - Terminal: {}", self.terminal_positions);
        info!("  - Win in one: {}", self.wins_in_one);
        info!("  - Winning child: {}", self.winning_children);
        info!("  - Open child (draw): {}", self.open_child_draws);
        info!("  - Drawn child: {}", self.drawn_children);
        info!("  - Forced loss: {}", self.forced_losses);
        info!("  - No moves: {}", self.no_move_losses);
        info!(
            "Outcomes: white={} black={} draw={}",
            self.white_wins, self.black_wins, self.draws
        );
        info!("Expansions: {}", self.expansions);
        info!("Max depth: {}", self.max_depth);

        if let Some(start) = self.start_time {
            let elapsed = start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                info!(
                    "Average rate: {:.0} positions/sec",
                    self.positions_resolved as f64 / elapsed
                );
            }
        }
    }
}
