//! Gobblet Gobblers game model for exhaustive solving.
//!
//! # State layout
//!
//! ```text
//! Board: 9 cells, row-major
//!   (0,0)=0  (0,1)=1  (0,2)=2
//!   (1,0)=3  (1,1)=4  (1,2)=5
//!   (2,0)=6  (2,1)=7  (2,2)=8
//!
//! Cell: one optional owner per size rank, indexed by rank
//!   rank 0 = Large, rank 1 = Medium, rank 2 = Small
//!   the visible piece is the one at the smallest occupied rank
//!
//! Reserve: unplayed count per color and rank
//! ```
//!
//! Every color owns exactly two pieces of each rank. For every color and
//! rank, the pieces on the board plus the pieces in reserve always total 2;
//! `State::check_consistency` verifies it and `State::apply_move` re-checks
//! it after every successful move.

pub mod codec;
pub mod error;
pub mod movegen;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use codec::{compress, decompress, Key};
pub use error::{Error, IllegalMove, InvariantViolation, Result};
pub use movegen::MoveGenerator;

/// Pieces of each color and rank in the game.
pub const PIECES_PER_RANK: u8 = 2;

/// Piece color. The discriminants are the values used in persisted records.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Color {
    White = 1,
    Black = 2,
}

impl Color {
    /// Both colors, White first.
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    /// Get the opposing color.
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Convert from the domain value (1 or 2).
    #[inline]
    pub fn from_bits(bits: u8) -> Option<Color> {
        match bits {
            1 => Some(Color::White),
            2 => Some(Color::Black),
            _ => None,
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize - 1
    }
}

/// Piece size rank. Smaller rank numbers are larger pieces.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Size {
    Large = 0,
    Medium = 1,
    Small = 2,
}

impl Size {
    /// All ranks, largest first.
    pub const ALL: [Size; 3] = [Size::Large, Size::Medium, Size::Small];

    /// The rank number (0 = large).
    #[inline]
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Check if this size can cover a visible piece of size `other`.
    ///
    /// Only a strictly smaller piece (strictly greater rank number) can be covered.
    #[inline]
    pub fn can_cover(self, other: Size) -> bool {
        (self as u8) < (other as u8)
    }

    /// Convert from a rank number (0, 1, 2).
    #[inline]
    pub fn from_rank(rank: u8) -> Option<Size> {
        match rank {
            0 => Some(Size::Large),
            1 => Some(Size::Medium),
            2 => Some(Size::Small),
            _ => None,
        }
    }
}

/// Position on the 3x3 board (0-8).
///
/// Layout:
/// ```text
///   0 1 2
///   3 4 5
///   6 7 8
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos(pub u8);

impl Pos {
    /// Create a position from row and column (0-2 each).
    #[inline]
    pub fn from_row_col(row: u8, col: u8) -> Pos {
        debug_assert!(row < 3 && col < 3);
        Pos(row * 3 + col)
    }

    /// Get the row (0-2).
    #[inline]
    pub fn row(self) -> u8 {
        self.0 / 3
    }

    /// Get the column (0-2).
    #[inline]
    pub fn col(self) -> u8 {
        self.0 % 3
    }

    /// Check if this is a valid position (0-8).
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 < 9
    }

    /// Iterate over all 9 positions in row-major order.
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..9).map(Pos)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row(), self.col())
    }
}

/// One board cell: an optional owner for each size rank.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub struct Cell([Option<Color>; 3]);

impl Cell {
    pub const EMPTY: Cell = Cell([None; 3]);

    /// Owner of the piece at the given rank, if any.
    #[inline]
    pub fn occupant(&self, size: Size) -> Option<Color> {
        self.0[size as usize]
    }

    /// The visible piece: the occupant of the smallest present rank number.
    pub fn visible(&self) -> Option<(Color, Size)> {
        Size::ALL
            .into_iter()
            .find_map(|size| self.occupant(size).map(|color| (color, size)))
    }

    #[inline]
    pub fn visible_color(&self) -> Option<Color> {
        self.visible().map(|(color, _)| color)
    }

    #[inline]
    pub fn visible_size(&self) -> Option<Size> {
        self.visible().map(|(_, size)| size)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    /// Check if a piece of the given size may be put on this cell.
    #[inline]
    pub fn accepts(&self, size: Size) -> bool {
        match self.visible_size() {
            None => true,
            Some(top) => size.can_cover(top),
        }
    }

    /// The cell with its visible piece taken away.
    pub fn lifted(&self) -> Cell {
        let mut out = *self;
        if let Some((_, size)) = self.visible() {
            out.0[size as usize] = None;
        }
        out
    }

    #[inline]
    fn set(&mut self, size: Size, owner: Option<Color>) {
        self.0[size as usize] = owner;
    }
}

/// A move: a piece of `color` and `size`, taken from `from` (or the reserve
/// when `from` is `None`) and put on `to`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Move {
    pub color: Color,
    pub size: Size,
    pub from: Option<Pos>,
    pub to: Pos,
}

impl Move {
    /// Place a piece from the reserve.
    #[inline]
    pub fn place(color: Color, size: Size, to: Pos) -> Move {
        Move {
            color,
            size,
            from: None,
            to,
        }
    }

    /// Relocate a visible piece from one cell to another.
    #[inline]
    pub fn relocate(color: Color, size: Size, from: Pos, to: Pos) -> Move {
        Move {
            color,
            size,
            from: Some(from),
            to,
        }
    }

    #[inline]
    pub fn is_placement(&self) -> bool {
        self.from.is_none()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.from {
            None => write!(f, "{:?} {:?} reserve->{}", self.color, self.size, self.to),
            Some(from) => write!(f, "{:?} {:?} {}->{}", self.color, self.size, from, self.to),
        }
    }
}

/// The 8 winning lines: 3 rows, 3 columns, 2 diagonals.
pub const WIN_LINES: [[Pos; 3]; 8] = [
    [Pos(0), Pos(1), Pos(2)], // Row 0
    [Pos(3), Pos(4), Pos(5)], // Row 1
    [Pos(6), Pos(7), Pos(8)], // Row 2
    [Pos(0), Pos(3), Pos(6)], // Col 0
    [Pos(1), Pos(4), Pos(7)], // Col 1
    [Pos(2), Pos(5), Pos(8)], // Col 2
    [Pos(0), Pos(4), Pos(8)], // Main diagonal
    [Pos(2), Pos(4), Pos(6)], // Anti-diagonal
];

/// Visible color of every cell, row-major.
pub type VisibleGrid = [Option<Color>; 9];

/// First line of `grid` fully controlled by `color`, if any.
pub fn completed_line(grid: &VisibleGrid, color: Color) -> Option<[Pos; 3]> {
    WIN_LINES
        .iter()
        .find(|line| line.iter().all(|pos| grid[pos.0 as usize] == Some(color)))
        .copied()
}

/// A full game position: board, both reserves and the color to move.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct State {
    cells: [Cell; 9],
    reserves: [[u8; 3]; 2],
    mover: Color,
}

impl State {
    /// The starting position: empty board, full reserves, White to move.
    pub fn new() -> State {
        State {
            cells: [Cell::EMPTY; 9],
            reserves: [[PIECES_PER_RANK; 3]; 2],
            mover: Color::White,
        }
    }

    /// An empty board with empty reserves. Only the codec builds from this.
    pub(crate) fn bare(mover: Color) -> State {
        State {
            cells: [Cell::EMPTY; 9],
            reserves: [[0; 3]; 2],
            mover,
        }
    }

    /// Get the color to move.
    #[inline]
    pub fn mover(&self) -> Color {
        self.mover
    }

    /// Set the color to move.
    #[inline]
    pub fn set_mover(&mut self, color: Color) {
        self.mover = color;
    }

    #[inline]
    pub fn cell(&self, pos: Pos) -> Cell {
        self.cells[pos.0 as usize]
    }

    /// Reserve counts for a color, indexed by rank.
    #[inline]
    pub fn reserve(&self, color: Color) -> [u8; 3] {
        self.reserves[color.index()]
    }

    #[inline]
    pub fn reserve_count(&self, color: Color, size: Size) -> u8 {
        self.reserves[color.index()][size as usize]
    }

    // ========== Setup ==========

    /// Take a piece out of the reserve and put it on `pos` at its rank.
    ///
    /// This is a setup helper: it ignores turn order and coverage, so it can
    /// build any position whose piece counts are valid. The total-2
    /// invariant holds by construction.
    pub fn push_piece(&mut self, pos: Pos, color: Color, size: Size) -> Result<()> {
        if self.reserve_count(color, size) == 0 {
            return Err(IllegalMove::ReserveEmpty { color, size }.into());
        }
        if self.cell(pos).occupant(size).is_some() {
            return Err(InvariantViolation::RankOccupied { pos, size }.into());
        }
        self.reserves[color.index()][size as usize] -= 1;
        self.cells[pos.0 as usize].set(size, Some(color));
        Ok(())
    }

    /// Codec hook: record a decoded on-board piece.
    pub(crate) fn occupy(&mut self, pos: Pos, color: Color, size: Size) {
        self.cells[pos.0 as usize].set(size, Some(color));
    }

    /// Codec hook: record a decoded reserve piece.
    pub(crate) fn stock(&mut self, color: Color, size: Size) {
        self.reserves[color.index()][size as usize] += 1;
    }

    // ========== Visibility & Win Detection ==========

    /// Get the visible piece at a position.
    #[inline]
    pub fn visible(&self, pos: Pos) -> Option<(Color, Size)> {
        self.cell(pos).visible()
    }

    #[inline]
    pub fn visible_color(&self, pos: Pos) -> Option<Color> {
        self.cell(pos).visible_color()
    }

    /// Visible color of all 9 cells.
    pub fn visible_grid(&self) -> VisibleGrid {
        let mut grid = [None; 9];
        for (slot, cell) in grid.iter_mut().zip(self.cells.iter()) {
            *slot = cell.visible_color();
        }
        grid
    }

    /// Visible grid as it would look with the top piece at `from` lifted.
    pub fn visible_grid_without(&self, from: Pos) -> VisibleGrid {
        let mut grid = self.visible_grid();
        grid[from.0 as usize] = self.cell(from).lifted().visible_color();
        grid
    }

    /// Get the first winning line for a color, if any.
    pub fn winning_line(&self, color: Color) -> Option<[Pos; 3]> {
        completed_line(&self.visible_grid(), color)
    }

    /// Check if either color controls a line. White is checked first.
    pub fn winner(&self) -> Option<Color> {
        let grid = self.visible_grid();
        Color::ALL
            .into_iter()
            .find(|&color| completed_line(&grid, color).is_some())
    }

    /// Check if lifting the mover's piece at `from` hands the opponent a line.
    pub fn lifting_exposes(&self, from: Pos) -> bool {
        let grid = self.visible_grid_without(from);
        completed_line(&grid, self.mover.opponent()).is_some()
    }

    // ========== Consistency ==========

    /// Count pieces of each rank on the board for a color.
    pub fn pieces_on_board(&self, color: Color) -> [u8; 3] {
        let mut counts = [0u8; 3];
        for cell in &self.cells {
            for size in Size::ALL {
                if cell.occupant(size) == Some(color) {
                    counts[size as usize] += 1;
                }
            }
        }
        counts
    }

    /// Verify the total-2 invariant for every color and rank.
    pub fn check_consistency(&self) -> std::result::Result<(), InvariantViolation> {
        for color in Color::ALL {
            let on_board = self.pieces_on_board(color);
            for size in Size::ALL {
                let count = on_board[size as usize] + self.reserve_count(color, size);
                if count != PIECES_PER_RANK {
                    return Err(InvariantViolation::PieceCount { color, size, count });
                }
            }
        }
        Ok(())
    }

    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.check_consistency().is_ok()
    }

    // ========== Moves ==========

    /// All legal moves for the color to move, in generation order.
    pub fn legal_moves(&self) -> Vec<Move> {
        MoveGenerator::new(self).collect()
    }

    /// Apply a move, returning the resulting state. `self` is never modified.
    ///
    /// Only the stacking rules are checked here; the no-self-exposure rule
    /// belongs to move generation.
    pub fn apply_move(&self, mov: Move) -> Result<State> {
        if mov.color != self.mover {
            return Err(IllegalMove::WrongTurn {
                expected: self.mover,
                got: mov.color,
            }
            .into());
        }

        let mut next = *self;
        match mov.from {
            None => {
                if self.reserve_count(mov.color, mov.size) == 0 {
                    return Err(IllegalMove::ReserveEmpty {
                        color: mov.color,
                        size: mov.size,
                    }
                    .into());
                }
                next.reserves[mov.color.index()][mov.size as usize] -= 1;
            }
            Some(from) => {
                if from == mov.to {
                    return Err(IllegalMove::SameCell { pos: from }.into());
                }
                if self.visible(from) != Some((mov.color, mov.size)) {
                    return Err(IllegalMove::SourceMismatch {
                        from,
                        color: mov.color,
                        size: mov.size,
                    }
                    .into());
                }
                next.cells[from.0 as usize].set(mov.size, None);
            }
        }

        if !self.cell(mov.to).accepts(mov.size) {
            return Err(IllegalMove::Covered {
                to: mov.to,
                size: mov.size,
            }
            .into());
        }
        next.cells[mov.to.0 as usize].set(mov.size, Some(mov.color));
        next.mover = self.mover.opponent();

        next.check_consistency()?;
        Ok(next)
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(state: &mut State, row: u8, col: u8, color: Color, size: Size) {
        state
            .push_piece(Pos::from_row_col(row, col), color, size)
            .unwrap();
    }

    #[test]
    fn test_color_opponent() {
        assert_eq!(Color::White.opponent(), Color::Black);
        assert_eq!(Color::Black.opponent(), Color::White);
        assert_eq!(Color::from_bits(1), Some(Color::White));
        assert_eq!(Color::from_bits(2), Some(Color::Black));
        assert_eq!(Color::from_bits(3), None);
    }

    #[test]
    fn test_size_can_cover() {
        assert!(!Size::Large.can_cover(Size::Large));
        assert!(Size::Large.can_cover(Size::Medium));
        assert!(Size::Large.can_cover(Size::Small));

        assert!(!Size::Medium.can_cover(Size::Large));
        assert!(!Size::Medium.can_cover(Size::Medium));
        assert!(Size::Medium.can_cover(Size::Small));

        assert!(!Size::Small.can_cover(Size::Large));
        assert!(!Size::Small.can_cover(Size::Medium));
        assert!(!Size::Small.can_cover(Size::Small));
    }

    #[test]
    fn test_pos_row_col() {
        for i in 0..9 {
            let pos = Pos(i);
            assert_eq!(Pos::from_row_col(pos.row(), pos.col()), pos);
        }
        assert_eq!(Pos::from_row_col(1, 2), Pos(5));
        assert_eq!(Pos(7).to_string(), "(2,1)");
    }

    #[test]
    fn test_new_state() {
        let state = State::new();
        assert_eq!(state.mover(), Color::White);
        assert_eq!(state.reserve(Color::White), [2, 2, 2]);
        assert_eq!(state.reserve(Color::Black), [2, 2, 2]);
        assert!(Pos::all().all(|pos| state.cell(pos).is_empty()));
        assert!(state.is_consistent());
        assert_eq!(state.winner(), None);
    }

    #[test]
    fn test_visible_is_smallest_rank() {
        let mut state = State::new();
        put(&mut state, 1, 1, Color::White, Size::Small);
        assert_eq!(state.visible(Pos(4)), Some((Color::White, Size::Small)));
        put(&mut state, 1, 1, Color::Black, Size::Medium);
        assert_eq!(state.visible(Pos(4)), Some((Color::Black, Size::Medium)));
        put(&mut state, 1, 1, Color::White, Size::Large);
        assert_eq!(state.visible(Pos(4)), Some((Color::White, Size::Large)));

        let lifted = state.cell(Pos(4)).lifted();
        assert_eq!(lifted.visible(), Some((Color::Black, Size::Medium)));
    }

    #[test]
    fn test_push_piece_rejects_exhausted_reserve() {
        let mut state = State::new();
        put(&mut state, 0, 0, Color::White, Size::Large);
        put(&mut state, 0, 1, Color::White, Size::Large);
        let err = state
            .push_piece(Pos(2), Color::White, Size::Large)
            .unwrap_err();
        assert_eq!(
            err,
            Error::Illegal(IllegalMove::ReserveEmpty {
                color: Color::White,
                size: Size::Large
            })
        );
    }

    #[test]
    fn test_push_piece_rejects_occupied_rank() {
        let mut state = State::new();
        put(&mut state, 0, 0, Color::White, Size::Medium);
        let err = state
            .push_piece(Pos(0), Color::Black, Size::Medium)
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_winner_rows_columns_diagonals() {
        for line in WIN_LINES {
            let mut state = State::new();
            for (i, pos) in line.iter().enumerate() {
                let size = Size::ALL[i % 3];
                state.push_piece(*pos, Color::Black, size).unwrap();
            }
            assert_eq!(state.winner(), Some(Color::Black), "line {:?}", line);
            assert_eq!(state.winning_line(Color::Black), Some(line));
            assert_eq!(state.winning_line(Color::White), None);
        }
    }

    #[test]
    fn test_covered_piece_does_not_count() {
        let mut state = State::new();
        put(&mut state, 0, 0, Color::White, Size::Small);
        put(&mut state, 0, 1, Color::White, Size::Small);
        put(&mut state, 0, 2, Color::White, Size::Medium);
        assert_eq!(state.winner(), Some(Color::White));

        put(&mut state, 0, 1, Color::Black, Size::Large);
        assert_eq!(state.winner(), None);
    }

    #[test]
    fn test_apply_placement() {
        let state = State::new();
        let mov = Move::place(Color::White, Size::Medium, Pos(4));
        let next = state.apply_move(mov).unwrap();

        assert_eq!(next.visible(Pos(4)), Some((Color::White, Size::Medium)));
        assert_eq!(next.reserve(Color::White), [2, 1, 2]);
        assert_eq!(next.mover(), Color::Black);
        assert!(next.is_consistent());
        // Input untouched
        assert_eq!(state, State::new());
    }

    #[test]
    fn test_apply_cover_and_relocate() {
        let state = State::new()
            .apply_move(Move::place(Color::White, Size::Small, Pos(0)))
            .unwrap()
            .apply_move(Move::place(Color::Black, Size::Large, Pos(0)))
            .unwrap();
        assert_eq!(state.visible(Pos(0)), Some((Color::Black, Size::Large)));

        let next = state
            .apply_move(Move::place(Color::White, Size::Large, Pos(8)))
            .unwrap()
            .apply_move(Move::relocate(Color::Black, Size::Large, Pos(0), Pos(4)))
            .unwrap();

        // Relocation uncovers the small piece underneath
        assert_eq!(next.visible(Pos(0)), Some((Color::White, Size::Small)));
        assert_eq!(next.visible(Pos(4)), Some((Color::Black, Size::Large)));
        assert_eq!(next.mover(), Color::White);
        assert!(next.is_consistent());
    }

    #[test]
    fn test_apply_rejects_wrong_turn() {
        let state = State::new();
        let err = state
            .apply_move(Move::place(Color::Black, Size::Large, Pos(0)))
            .unwrap_err();
        assert_eq!(
            err,
            Error::Illegal(IllegalMove::WrongTurn {
                expected: Color::White,
                got: Color::Black
            })
        );
    }

    #[test]
    fn test_apply_rejects_same_cell() {
        let mut state = State::new();
        put(&mut state, 0, 0, Color::White, Size::Large);
        let err = state
            .apply_move(Move::relocate(Color::White, Size::Large, Pos(0), Pos(0)))
            .unwrap_err();
        assert_eq!(err, Error::Illegal(IllegalMove::SameCell { pos: Pos(0) }));
    }

    #[test]
    fn test_apply_rejects_source_mismatch() {
        let mut state = State::new();
        put(&mut state, 0, 0, Color::White, Size::Small);
        put(&mut state, 0, 0, Color::Black, Size::Medium);

        // Covered piece cannot move
        let covered = Move::relocate(Color::White, Size::Small, Pos(0), Pos(4));
        assert!(matches!(
            state.apply_move(covered),
            Err(Error::Illegal(IllegalMove::SourceMismatch { .. }))
        ));

        // Opponent's piece cannot move
        let foreign = Move::relocate(Color::White, Size::Medium, Pos(0), Pos(4));
        assert!(matches!(
            state.apply_move(foreign),
            Err(Error::Illegal(IllegalMove::SourceMismatch { .. }))
        ));

        // Empty source
        let empty = Move::relocate(Color::White, Size::Large, Pos(3), Pos(4));
        assert!(matches!(
            state.apply_move(empty),
            Err(Error::Illegal(IllegalMove::SourceMismatch { .. }))
        ));
    }

    #[test]
    fn test_apply_rejects_equal_or_larger_cover() {
        let mut state = State::new();
        put(&mut state, 1, 1, Color::Black, Size::Medium);

        for size in [Size::Medium, Size::Small] {
            let err = state
                .apply_move(Move::place(Color::White, size, Pos(4)))
                .unwrap_err();
            assert_eq!(err, Error::Illegal(IllegalMove::Covered { to: Pos(4), size }));
        }
        assert!(state
            .apply_move(Move::place(Color::White, Size::Large, Pos(4)))
            .is_ok());
    }

    #[test]
    fn test_apply_rejects_empty_reserve() {
        let mut state = State::new();
        put(&mut state, 0, 0, Color::White, Size::Small);
        put(&mut state, 2, 2, Color::White, Size::Small);
        let err = state
            .apply_move(Move::place(Color::White, Size::Small, Pos(4)))
            .unwrap_err();
        assert!(!err.is_fatal());
        assert!(matches!(err, Error::Illegal(IllegalMove::ReserveEmpty { .. })));
    }

    #[test]
    fn test_lifting_exposes() {
        let mut state = State::new();
        put(&mut state, 0, 0, Color::Black, Size::Large);
        put(&mut state, 0, 1, Color::Black, Size::Large);
        put(&mut state, 0, 2, Color::Black, Size::Medium);
        put(&mut state, 0, 2, Color::White, Size::Large);

        assert!(state.lifting_exposes(Pos(2)));
        assert_eq!(
            completed_line(&state.visible_grid_without(Pos(2)), Color::Black),
            Some([Pos(0), Pos(1), Pos(2)])
        );
    }

    #[test]
    fn test_random_playouts_stay_consistent() {
        use rand::prelude::*;

        let mut rng = rand::rng();

        for _ in 0..100 {
            let mut state = State::new();
            for _ in 0..30 {
                if state.winner().is_some() {
                    break;
                }
                let moves = state.legal_moves();
                if moves.is_empty() {
                    break;
                }
                let mov = moves[rng.random_range(0..moves.len())];
                let next = state.apply_move(mov).unwrap();
                assert!(next.is_consistent());
                assert_eq!(next.mover(), state.mover().opponent());
                state = next;
            }
        }
    }

    #[test]
    fn test_move_serde() {
        let mov = Move::relocate(Color::Black, Size::Medium, Pos(1), Pos(7));
        let json = serde_json::to_string(&mov).unwrap();
        let back: Move = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mov);
    }
}
