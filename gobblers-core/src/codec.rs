//! Canonical key encoding.
//!
//! # Key Encoding (50 bits)
//!
//! ```text
//! For White, then Black; for rank Large, Medium, Small; two slots each:
//!   2 bits row, 2 bits col        (row 3, col 3 = piece still in reserve)
//! Then:
//!   2 bits mover tag              (1 = White, 2 = Black)
//!
//! Fields are appended most-significant first: acc = acc * 4 + field.
//! 12 slots x 4 bits + 2 bits = 50 bits.
//! ```
//!
//! The two pieces of a color and rank are interchangeable, so each pair of
//! slots holds the *set* of their locations: on-board cells in row-major
//! order, then one reserve sentinel per unplayed piece. Because the sentinel
//! sorts after every cell, the two slots of a pair are always ascending and
//! `compress` needs no further canonicalization.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvariantViolation;
use crate::{Color, Pos, Size, State, PIECES_PER_RANK};

/// Number of significant bits in a key.
pub const KEY_BITS: u32 = 50;

/// Row/col value marking a piece that is still in reserve.
const SENTINEL: u8 = 3;

/// Collision-free encoding of a `State` up to piece interchangeability.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(pub u64);

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Key {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Key)
    }
}

#[inline]
fn push_field(acc: u64, value: u8) -> u64 {
    (acc << 2) | value as u64
}

#[inline]
fn pop_field(acc: &mut u64) -> u8 {
    let value = (*acc & 0b11) as u8;
    *acc >>= 2;
    value
}

/// Encode a state into its canonical key.
pub fn compress(state: &State) -> Key {
    let mut acc = 0u64;

    for color in Color::ALL {
        for size in Size::ALL {
            let mut slots = 0;
            for pos in Pos::all() {
                if state.cell(pos).occupant(size) == Some(color) {
                    acc = push_field(push_field(acc, pos.row()), pos.col());
                    slots += 1;
                }
            }
            for _ in 0..state.reserve_count(color, size) {
                acc = push_field(push_field(acc, SENTINEL), SENTINEL);
                slots += 1;
            }
            debug_assert_eq!(slots, PIECES_PER_RANK, "{color:?} {size:?} slots");
        }
    }

    Key(push_field(acc, state.mover() as u8))
}

/// Decode a key back into a state.
///
/// Rejects any key `compress` could not have produced, so a successful
/// decode always satisfies `compress(&decompress(key)?) == key`.
pub fn decompress(key: Key) -> Result<State, InvariantViolation> {
    if key.0 >> KEY_BITS != 0 {
        return Err(InvariantViolation::KeyOverflow(key.0));
    }

    let mut acc = key.0;
    let tag = pop_field(&mut acc);
    let mover = Color::from_bits(tag).ok_or(InvariantViolation::MoverTag(tag))?;

    // Fields come off in reverse packing order: Black before White, Small
    // before Large, second slot before first, col before row.
    let mut slots = [[[(0u8, 0u8); 2]; 3]; 2];
    for color in [Color::Black, Color::White] {
        for size in Size::ALL.into_iter().rev() {
            for slot in (0..2).rev() {
                let col = pop_field(&mut acc);
                let row = pop_field(&mut acc);
                slots[color as usize - 1][size as usize][slot] = (row, col);
            }
        }
    }

    let mut state = State::bare(mover);
    for color in Color::ALL {
        for size in Size::ALL {
            let [first, second] = slots[color as usize - 1][size as usize];
            if first > second {
                return Err(InvariantViolation::NonCanonicalKey(key.0));
            }
            for (row, col) in [first, second] {
                match (row, col) {
                    (SENTINEL, SENTINEL) => state.stock(color, size),
                    (SENTINEL, _) | (_, SENTINEL) => {
                        return Err(InvariantViolation::Coordinate { row, col })
                    }
                    _ => {
                        let pos = Pos::from_row_col(row, col);
                        match state.cell(pos).occupant(size) {
                            Some(owner) if owner == color => {
                                return Err(InvariantViolation::DuplicatePiece { color, size, pos })
                            }
                            Some(_) => return Err(InvariantViolation::ContestedRank { size, pos }),
                            None => state.occupy(pos, color, size),
                        }
                    }
                }
            }
        }
    }

    state.check_consistency()?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Move;

    #[test]
    fn test_start_key() {
        // Every slot is the (3,3) sentinel, mover tag 1
        let key = compress(&State::new());
        let expected = (0..12).fold(0u64, |acc, _| (acc << 4) | 0b1111u64);
        assert_eq!(key, Key((expected << 2) | 1));
        assert!(key.0 < 1 << KEY_BITS);
        assert_eq!(decompress(key).unwrap(), State::new());
    }

    #[test]
    fn test_mover_changes_key() {
        let mut state = State::new();
        let white = compress(&state);
        state.set_mover(Color::Black);
        let black = compress(&state);
        assert_ne!(white, black);
        assert_eq!(white.0 >> 2, black.0 >> 2);
    }

    #[test]
    fn test_roundtrip_stacked_position() {
        let mut state = State::new();
        state.push_piece(Pos(0), Color::White, Size::Small).unwrap();
        state.push_piece(Pos(0), Color::Black, Size::Medium).unwrap();
        state.push_piece(Pos(0), Color::White, Size::Large).unwrap();
        state.push_piece(Pos(8), Color::Black, Size::Large).unwrap();
        state.push_piece(Pos(4), Color::Black, Size::Small).unwrap();
        state.push_piece(Pos(5), Color::Black, Size::Small).unwrap();
        state.set_mover(Color::Black);

        let key = compress(&state);
        assert_eq!(decompress(key).unwrap(), state);
    }

    #[test]
    fn test_swapped_pieces_share_key() {
        // Two White mediums on (0,1) and (2,0), placed in either order
        let a = State::new()
            .apply_move(Move::place(Color::White, Size::Medium, Pos(1)))
            .unwrap()
            .apply_move(Move::place(Color::Black, Size::Small, Pos(4)))
            .unwrap()
            .apply_move(Move::place(Color::White, Size::Medium, Pos(6)))
            .unwrap();
        let b = State::new()
            .apply_move(Move::place(Color::White, Size::Medium, Pos(6)))
            .unwrap()
            .apply_move(Move::place(Color::Black, Size::Small, Pos(4)))
            .unwrap()
            .apply_move(Move::place(Color::White, Size::Medium, Pos(1)))
            .unwrap();
        assert_eq!(compress(&a), compress(&b));
    }

    #[test]
    fn test_push_order_does_not_matter() {
        let mut base = State::new();
        base.push_piece(Pos(0), Color::White, Size::Large).unwrap();
        base.push_piece(Pos(1), Color::White, Size::Large).unwrap();
        let mut swapped = State::new();
        swapped
            .push_piece(Pos(1), Color::White, Size::Large)
            .unwrap();
        swapped
            .push_piece(Pos(0), Color::White, Size::Large)
            .unwrap();
        assert_eq!(compress(&base), compress(&swapped));
    }

    #[test]
    fn test_roundtrip_random_playouts() {
        use rand::prelude::*;

        let mut rng = rand::rng();

        for _ in 0..200 {
            let mut state = State::new();
            for _ in 0..rng.random_range(0..25) {
                if state.winner().is_some() {
                    break;
                }
                let moves = state.legal_moves();
                if moves.is_empty() {
                    break;
                }
                let mov = moves[rng.random_range(0..moves.len())];
                state = state.apply_move(mov).unwrap();
            }

            let key = compress(&state);
            let decoded = decompress(key).unwrap();
            assert_eq!(decoded, state, "roundtrip failed for key {}", key);
            assert_eq!(compress(&decoded), key);
        }
    }

    #[test]
    fn test_rejects_overflow_and_mover_tag() {
        let start = compress(&State::new());
        assert_eq!(
            decompress(Key(start.0 | 1u64 << KEY_BITS)),
            Err(InvariantViolation::KeyOverflow(start.0 | 1u64 << KEY_BITS))
        );
        assert_eq!(
            decompress(Key(start.0 & !0b11)),
            Err(InvariantViolation::MoverTag(0))
        );
        assert_eq!(
            decompress(Key(start.0 | 0b11)),
            Err(InvariantViolation::MoverTag(3))
        );
    }

    #[test]
    fn test_rejects_malformed_slots() {
        let mut state = State::new();
        state.push_piece(Pos(4), Color::White, Size::Large).unwrap();
        let key = compress(&state);
        // White Large slots are the top 8 bits: (1,1) then (3,3)
        let shift = KEY_BITS - 8;
        let clear = key.0 & !(0xFFu64 << shift);

        // Slots out of order: (3,3) then (1,1)
        let reversed = Key(clear | (0b1111_0101u64 << shift));
        assert_eq!(
            decompress(reversed),
            Err(InvariantViolation::NonCanonicalKey(reversed.0))
        );

        // Same cell twice
        let doubled = Key(clear | (0b0101_0101u64 << shift));
        assert!(matches!(
            decompress(doubled),
            Err(InvariantViolation::DuplicatePiece { .. })
        ));

        // Half sentinel
        let half = Key(clear | (0b0101_1101u64 << shift));
        assert_eq!(
            decompress(half),
            Err(InvariantViolation::Coordinate { row: 3, col: 1 })
        );
    }

    #[test]
    fn test_rejects_contested_rank() {
        let mut white = State::new();
        white.push_piece(Pos(4), Color::White, Size::Small).unwrap();
        let mut black = State::new();
        black.push_piece(Pos(4), Color::Black, Size::Small).unwrap();

        // White's small slots from one key, Black's from the other
        let white_key = compress(&white).0;
        let black_key = compress(&black).0;
        let black_half = (1u64 << 26) - 1;
        let merged = Key((white_key & !black_half) | (black_key & black_half));
        assert!(matches!(
            decompress(merged),
            Err(InvariantViolation::ContestedRank { .. })
        ));
    }
}
