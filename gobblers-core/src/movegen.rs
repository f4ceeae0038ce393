//! Lazy move generator.
//!
//! Produces the legal moves of a state one at a time, tracking where it left
//! off. Generation order is fixed, which keeps solver results reproducible:
//!
//! 1. Reserve placements: Large → Medium → Small, destinations row-major.
//! 2. Relocations: sources row-major, destinations row-major.
//!
//! A source whose lifting would complete an opponent line (judged on the
//! board with the piece lifted, before it lands anywhere) yields no moves.

use crate::{Color, Move, Pos, Size, State};

/// Iterator over the legal moves of a state.
pub struct MoveGenerator<'a> {
    state: &'a State,
    /// Current phase of generation
    phase: MoveGenPhase,
    /// Color to move
    mover: Color,
    /// Reserve counts, indexed by rank
    reserves: [u8; 3],
    /// Current rank for reserve placements (0=Large, 1=Medium, 2=Small)
    reserve_rank: u8,
    /// Current destination for reserve placements
    reserve_dest_idx: u8,
    /// Current source cell for relocations
    board_from_idx: u8,
    /// Current destination for relocations
    board_to_idx: u8,
    /// Size of the piece lifted from the current source
    moving_size: Option<Size>,
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum MoveGenPhase {
    ReservePlacements,
    BoardMoves,
    Done,
}

impl<'a> MoveGenerator<'a> {
    /// Create a new move generator for the given state.
    pub fn new(state: &'a State) -> Self {
        let mover = state.mover();
        Self {
            state,
            phase: MoveGenPhase::ReservePlacements,
            mover,
            reserves: state.reserve(mover),
            reserve_rank: 0,
            reserve_dest_idx: 0,
            board_from_idx: 0,
            board_to_idx: 0,
            moving_size: None,
        }
    }

    fn next_reserve_move(&mut self) -> Option<Move> {
        while let Some(size) = Size::from_rank(self.reserve_rank) {
            if self.reserves[size as usize] > 0 {
                while self.reserve_dest_idx < 9 {
                    let dest = Pos(self.reserve_dest_idx);
                    self.reserve_dest_idx += 1;

                    if self.state.cell(dest).accepts(size) {
                        return Some(Move::place(self.mover, size, dest));
                    }
                }
            }

            self.reserve_rank += 1;
            self.reserve_dest_idx = 0;
        }
        None
    }

    fn next_board_move(&mut self) -> Option<Move> {
        while self.board_from_idx < 9 {
            let from = Pos(self.board_from_idx);

            let size = match self.moving_size {
                Some(size) => size,
                None => match self.liftable(from) {
                    Some(size) => {
                        self.moving_size = Some(size);
                        self.board_to_idx = 0;
                        size
                    }
                    None => {
                        self.board_from_idx += 1;
                        continue;
                    }
                },
            };

            while self.board_to_idx < 9 {
                let to = Pos(self.board_to_idx);
                self.board_to_idx += 1;

                if to != from && self.state.cell(to).accepts(size) {
                    return Some(Move::relocate(self.mover, size, from, to));
                }
            }

            // Done with this source cell
            self.board_from_idx += 1;
            self.moving_size = None;
        }
        None
    }

    /// Size of the mover's piece at `from` if it may be lifted at all.
    fn liftable(&self, from: Pos) -> Option<Size> {
        match self.state.visible(from) {
            Some((color, size)) if color == self.mover => {
                if self.state.lifting_exposes(from) {
                    None
                } else {
                    Some(size)
                }
            }
            _ => None,
        }
    }
}

impl Iterator for MoveGenerator<'_> {
    type Item = Move;

    fn next(&mut self) -> Option<Move> {
        loop {
            match self.phase {
                MoveGenPhase::ReservePlacements => {
                    if let Some(mov) = self.next_reserve_move() {
                        return Some(mov);
                    }
                    self.phase = MoveGenPhase::BoardMoves;
                    self.board_from_idx = 0;
                }
                MoveGenPhase::BoardMoves => {
                    if let Some(mov) = self.next_board_move() {
                        return Some(mov);
                    }
                    self.phase = MoveGenPhase::Done;
                }
                MoveGenPhase::Done => return None,
            }
        }
    }
}
