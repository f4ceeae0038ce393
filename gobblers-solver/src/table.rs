//! Outcome table: resolved positions and their best moves.
//!
//! The table only grows. An entry, once written, is final; rewriting it with
//! a different value is a solver defect.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use gobblers_core::{compress, decompress, Color, Error, Key, Move, State};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Result, SolverError, SolverInvariantViolation};

/// Game-theoretic value of a position. The discriminants are the values used
/// in persisted records.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Outcome {
    Unresolved = 0,
    WhiteWins = 1,
    BlackWins = 2,
    Draw = 3,
}

impl Outcome {
    /// The outcome in which `color` wins.
    #[inline]
    pub fn win_for(color: Color) -> Outcome {
        match color {
            Color::White => Outcome::WhiteWins,
            Color::Black => Outcome::BlackWins,
        }
    }

    /// The winning color, if the outcome is a win.
    #[inline]
    pub fn winner(self) -> Option<Color> {
        match self {
            Outcome::WhiteWins => Some(Color::White),
            Outcome::BlackWins => Some(Color::Black),
            Outcome::Unresolved | Outcome::Draw => None,
        }
    }

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Outcome> {
        match code {
            0 => Some(Outcome::Unresolved),
            1 => Some(Outcome::WhiteWins),
            2 => Some(Outcome::BlackWins),
            3 => Some(Outcome::Draw),
            _ => None,
        }
    }

    #[inline]
    pub fn is_resolved(self) -> bool {
        self != Outcome::Unresolved
    }
}

/// What the solver knows about one position.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Metadata {
    /// Move achieving the outcome; `None` for terminal positions.
    pub best_move: Option<Move>,
    pub outcome: Outcome,
    /// Moves to the outcome under optimal play.
    pub distance: u32,
}

impl Metadata {
    pub fn new(best_move: Move, outcome: Outcome, distance: u32) -> Self {
        Self {
            best_move: Some(best_move),
            outcome,
            distance,
        }
    }

    /// A finished game (or a mover with no moves): no move, distance 0.
    pub fn terminal(outcome: Outcome) -> Self {
        Self {
            best_move: None,
            outcome,
            distance: 0,
        }
    }
}

/// Map from key to resolved metadata.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutcomeTable {
    entries: HashMap<Key, Metadata>,
}

impl OutcomeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolved position.
    ///
    /// Writing the value already stored is a no-op.
    pub fn insert(
        &mut self,
        key: Key,
        meta: Metadata,
    ) -> std::result::Result<(), SolverInvariantViolation> {
        if !meta.outcome.is_resolved() {
            return Err(SolverInvariantViolation::UnresolvedWrite { key });
        }
        match self.entries.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(meta);
                Ok(())
            }
            Entry::Occupied(slot) if *slot.get() == meta => Ok(()),
            Entry::Occupied(slot) => Err(SolverInvariantViolation::AlreadyResolved {
                key,
                existing: *slot.get(),
                attempted: meta,
            }),
        }
    }

    /// Record `meta` unless the key is already resolved. Returns whether it
    /// was written.
    pub fn insert_if_absent(&mut self, key: Key, meta: Metadata) -> bool {
        if !meta.outcome.is_resolved() || self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, meta);
        true
    }

    #[inline]
    pub fn get(&self, key: Key) -> Option<Metadata> {
        self.entries.get(&key).copied()
    }

    #[inline]
    pub fn contains(&self, key: Key) -> bool {
        self.entries.contains_key(&key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Key, Metadata)> + '_ {
        self.entries.iter().map(|(&key, &meta)| (key, meta))
    }

    /// All entries, ordered by key.
    pub fn sorted_entries(&self) -> Vec<(Key, Metadata)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by_key(|&(key, _)| key);
        entries
    }

    /// Copy every entry of `other` into this table.
    ///
    /// All or nothing: if any key is already resolved to a different value,
    /// the lowest such key is reported and this table is left unchanged.
    pub fn merge(
        &mut self,
        other: OutcomeTable,
    ) -> std::result::Result<(), SolverInvariantViolation> {
        let conflict = other
            .iter()
            .filter_map(|(key, meta)| match self.get(key) {
                Some(existing) if existing != meta => Some((key, existing, meta)),
                _ => None,
            })
            .min_by_key(|&(key, _, _)| key);
        if let Some((key, existing, attempted)) = conflict {
            return Err(SolverInvariantViolation::AlreadyResolved {
                key,
                existing,
                attempted,
            });
        }

        self.entries.reserve(other.len());
        for (key, meta) in other.entries {
            self.entries.entry(key).or_insert(meta);
        }
        Ok(())
    }

    /// Follow best moves from `key`.
    ///
    /// Stops at a terminal entry, at an entry without a move, or when a key
    /// repeats (a repetition draw). The repeated key is not listed twice.
    pub fn principal_line(&self, key: Key) -> Result<Vec<(Key, Metadata)>> {
        let mut line = Vec::new();
        let mut seen = HashSet::new();
        let mut current = key;

        while seen.insert(current) {
            let meta = self.get(current).ok_or(SolverError::NotFound(current))?;
            line.push((current, meta));

            let mv = match meta.best_move {
                Some(mv) if meta.distance > 0 => mv,
                _ => break,
            };
            let state = decompress(current)?;
            current = compress(&apply_checked(&state, current, mv)?);
        }

        Ok(line)
    }

    /// Check every entry against the rules.
    ///
    /// Returns the problems found; an empty list means the table is sound.
    pub fn audit(&self) -> Vec<AuditIssue> {
        let mut issues = Vec::new();
        for (key, meta) in self.sorted_entries() {
            if let Err(issue) = self.audit_entry(key, meta) {
                issues.push(issue);
            }
        }
        issues
    }

    fn audit_entry(&self, key: Key, meta: Metadata) -> std::result::Result<(), AuditIssue> {
        let state =
            decompress(key).map_err(|violation| AuditIssue::Undecodable { key, violation })?;

        let Some(mv) = meta.best_move else {
            // Finished game, or a mover without moves
            let expected = match state.winner() {
                Some(color) => Outcome::win_for(color),
                None if state.legal_moves().is_empty() => {
                    Outcome::win_for(state.mover().opponent())
                }
                None => return Err(AuditIssue::BadTerminal { key, meta }),
            };
            if meta.outcome != expected || meta.distance != 0 {
                return Err(AuditIssue::BadTerminal { key, meta });
            }
            return Ok(());
        };

        if state.winner().is_some() || !state.legal_moves().contains(&mv) {
            return Err(AuditIssue::IllegalBestMove { key, mv });
        }
        let child_state = state
            .apply_move(mv)
            .map_err(|_| AuditIssue::IllegalBestMove { key, mv })?;
        let child = compress(&child_state);
        let child_meta = self
            .get(child)
            .ok_or(AuditIssue::UnresolvedChild { key, child })?;

        // Draws may point at a then-open ancestor whose value came later
        if meta.outcome != Outcome::Draw
            && (child_meta.outcome != meta.outcome || child_meta.distance + 1 != meta.distance)
        {
            return Err(AuditIssue::InconsistentChild {
                key,
                child,
                meta,
                child_meta,
            });
        }
        Ok(())
    }
}

/// Apply a move the solver believes legal.
pub(crate) fn apply_checked(state: &State, key: Key, mv: Move) -> Result<State> {
    state.apply_move(mv).map_err(|err| match err {
        Error::Illegal(source) => {
            SolverInvariantViolation::IllegalGeneratedMove { key, mv, source }.into()
        }
        Error::Invariant(violation) => SolverError::State(violation),
    })
}

/// A table entry that does not agree with the rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditIssue {
    #[error("{key}: key does not decode ({violation})")]
    Undecodable {
        key: Key,
        violation: gobblers_core::InvariantViolation,
    },

    #[error("{key}: best move {mv} is not legal")]
    IllegalBestMove { key: Key, mv: Move },

    #[error("{key}: best move leads to unresolved {child}")]
    UnresolvedChild { key: Key, child: Key },

    #[error("{key}: {meta:?} does not follow from child {child} {child_meta:?}")]
    InconsistentChild {
        key: Key,
        child: Key,
        meta: Metadata,
        child_meta: Metadata,
    },

    #[error("{key}: entry without a move is not a finished game ({meta:?})")]
    BadTerminal { key: Key, meta: Metadata },
}
