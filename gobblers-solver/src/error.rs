//! Solver error types.

use std::io;

use gobblers_core::{IllegalMove, InvariantViolation, Key, Move};
use thiserror::Error;

use crate::table::{Metadata, Outcome};

/// A defect in the solver's own bookkeeping. Always fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverInvariantViolation {
    #[error("child {child} of {parent} is not resolved after expansion")]
    MissingChild { parent: Key, child: Key },

    #[error("root {key} is not resolved after the run finished")]
    MissingRoot { key: Key },

    #[error("key {key} is already resolved as {existing:?}, refusing {attempted:?}")]
    AlreadyResolved {
        key: Key,
        existing: Metadata,
        attempted: Metadata,
    },

    #[error("generated move {mv} is illegal in {key}: {source}")]
    IllegalGeneratedMove {
        key: Key,
        mv: Move,
        #[source]
        source: IllegalMove,
    },

    #[error("refusing to record an unresolved entry for {key}")]
    UnresolvedWrite { key: Key },

    #[error("child {child} of {parent} has outcome {outcome:?}, which cannot follow a full expansion")]
    UnexpectedOutcome {
        parent: Key,
        child: Key,
        outcome: Outcome,
    },
}

/// Errors returned by the solver and its stores.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("position {0} is not resolved")]
    NotFound(Key),

    #[error("solving {key} stopped early: {reason}")]
    Stopped { key: Key, reason: String },

    #[error("solver invariant violated: {0}")]
    Invariant(#[from] SolverInvariantViolation),

    #[error("state invariant violated: {0}")]
    State(#[from] InvariantViolation),

    #[error("malformed record on line {line} ({reason}): {content:?}")]
    MalformedRecord {
        line: u64,
        content: String,
        reason: String,
    },

    #[error("checkpoint: {0}")]
    Checkpoint(String),

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    #[error("record file: {0}")]
    Csv(#[from] csv::Error),

    #[error("database: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl SolverError {
    /// `NotFound`, early stops and plain I/O failures are recoverable;
    /// everything else means the table or the solver can no longer be
    /// trusted.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SolverError::Invariant(_)
                | SolverError::State(_)
                | SolverError::MalformedRecord { .. }
                | SolverError::Checkpoint(_)
        )
    }

    pub(crate) fn io(operation: impl Into<String>, source: io::Error) -> Self {
        SolverError::Io {
            operation: operation.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SolverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classes() {
        assert!(!SolverError::NotFound(Key(7)).is_fatal());
        assert!(!SolverError::io("open", io::Error::from(io::ErrorKind::NotFound)).is_fatal());
        assert!(SolverError::from(InvariantViolation::MoverTag(3)).is_fatal());
        assert!(SolverError::from(SolverInvariantViolation::MissingRoot { key: Key(1) }).is_fatal());
        assert!(SolverError::MalformedRecord {
            line: 3,
            content: "1,2".into(),
            reason: "expected 9 fields, found 2".into(),
        }
        .is_fatal());
    }

    #[test]
    fn test_messages() {
        let err = SolverError::MalformedRecord {
            line: 12,
            content: "oops".into(),
            reason: "unparsable integer".into(),
        };
        assert_eq!(
            err.to_string(),
            "malformed record on line 12 (unparsable integer): \"oops\""
        );
        assert_eq!(SolverError::NotFound(Key(42)).to_string(), "position 42 is not resolved");
    }
}
