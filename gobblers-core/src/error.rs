//! Error types for the game model.
//!
//! Illegal moves are ordinary, recoverable results of `State::apply_move`.
//! Invariant violations mean a state or key no longer satisfies the
//! two-pieces-per-color-and-size rule (or a key's field layout is broken);
//! they indicate a defect and callers treat them as fatal.

use thiserror::Error;

use crate::{Color, Pos, Size};

/// Why a move was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IllegalMove {
    #[error("source and destination are the same cell {pos}")]
    SameCell { pos: Pos },

    #[error("visible piece at {from} does not match the moving {color:?} {size:?}")]
    SourceMismatch {
        from: Pos,
        color: Color,
        size: Size,
    },

    #[error("cannot cover the visible piece at {to} with {size:?}")]
    Covered { to: Pos, size: Size },

    #[error("{got:?} cannot move while {expected:?} is to move")]
    WrongTurn { expected: Color, got: Color },

    #[error("no {size:?} piece left in the {color:?} reserve")]
    ReserveEmpty { color: Color, size: Size },
}

/// A state or key that breaks the model's invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("{color:?} {size:?} count is {count}, expected 2")]
    PieceCount { color: Color, size: Size, count: u8 },

    #[error("mover tag {0} is neither White (1) nor Black (2)")]
    MoverTag(u8),

    #[error("key {0} has bits set above the packed fields")]
    KeyOverflow(u64),

    #[error("coordinate ({row}, {col}) is neither a cell nor the reserve sentinel")]
    Coordinate { row: u8, col: u8 },

    #[error("both {color:?} {size:?} pieces occupy {pos}")]
    DuplicatePiece { color: Color, size: Size, pos: Pos },

    #[error("{size:?} rank at {pos} is claimed by both colors")]
    ContestedRank { size: Size, pos: Pos },

    #[error("key {0} is not in canonical slot order")]
    NonCanonicalKey(u64),

    #[error("{size:?} rank at {pos} is already occupied")]
    RankOccupied { pos: Pos, size: Size },
}

/// Any failure of a state operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("illegal move: {0}")]
    Illegal(#[from] IllegalMove),

    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl Error {
    /// Fatal errors signal a defect; illegal moves are for the caller to handle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Invariant(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
