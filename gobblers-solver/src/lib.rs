//! Retrograde solver for Gobblet Gobblers.
//!
//! Resolves every position reachable from a root to a win, loss or draw
//! with its distance and best move, and persists the results.

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod export;
pub mod solver;
pub mod stats;
pub mod store;
pub mod table;

pub use config::SolverConfig;
pub use error::{Result, SolverError, SolverInvariantViolation};
pub use solver::{Limit, SolveStatus, Solver};
pub use table::{AuditIssue, Metadata, Outcome, OutcomeTable};
