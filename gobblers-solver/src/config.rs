//! Solver run configuration.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Knobs for a solver run. All limits are off by default.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// How often to log progress
    pub log_interval: Duration,
    /// How often to snapshot the table while solving
    pub checkpoint_interval: Duration,
    /// Where snapshots go; no snapshots without one
    pub checkpoint_path: Option<PathBuf>,
    /// Stop once the table holds this many entries
    pub max_table_size: Option<usize>,
    /// Stop once the work stack grows this deep
    pub max_stack_depth: Option<usize>,
    /// Cleared to request a graceful stop
    pub running: Arc<AtomicBool>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            log_interval: Duration::from_secs(5),
            checkpoint_interval: Duration::from_secs(60),
            checkpoint_path: None,
            max_table_size: None,
            max_stack_depth: None,
            running: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_interval(mut self, interval: Duration) -> Self {
        self.log_interval = interval;
        self
    }

    pub fn with_checkpoint(mut self, path: impl Into<PathBuf>, interval: Duration) -> Self {
        self.checkpoint_path = Some(path.into());
        self.checkpoint_interval = interval;
        self
    }

    pub fn with_max_table_size(mut self, max: usize) -> Self {
        self.max_table_size = Some(max);
        self
    }

    pub fn with_max_stack_depth(mut self, max: usize) -> Self {
        self.max_stack_depth = Some(max);
        self
    }

    /// Share an interrupt flag, e.g. one set from a signal handler.
    pub fn with_running(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SolverConfig::default();
        assert_eq!(config.log_interval, Duration::from_secs(5));
        assert_eq!(config.checkpoint_interval, Duration::from_secs(60));
        assert!(config.checkpoint_path.is_none());
        assert!(config.max_table_size.is_none());
        assert!(config.max_stack_depth.is_none());
        assert!(config.is_running());
    }

    #[test]
    fn test_builder() {
        let running = Arc::new(AtomicBool::new(true));
        let config = SolverConfig::new()
            .with_checkpoint("data/solver.bin", Duration::from_secs(30))
            .with_max_table_size(1000)
            .with_max_stack_depth(50)
            .with_running(running.clone());

        assert_eq!(config.checkpoint_path, Some(PathBuf::from("data/solver.bin")));
        assert_eq!(config.checkpoint_interval, Duration::from_secs(30));
        assert_eq!(config.max_table_size, Some(1000));
        assert_eq!(config.max_stack_depth, Some(50));

        running.store(false, Ordering::SeqCst);
        assert!(!config.is_running());
    }
}
