//! Grid coordinates.

use serde::{Deserialize, Serialize};

/// A (row, column) coordinate on the board.
///
/// Row 0 is the top edge. Coordinates are signed so that displacements
/// and off-board lookups can be expressed without wrapping; the board
/// decides what is in bounds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[display("({}, {})", row, column)]
pub struct Position {
    /// Row index, counted from the top.
    pub row: i32,
    /// Column index, counted from the left.
    pub column: i32,
}

impl Position {
    /// Creates a position.
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Returns `(row delta, column delta)` from `self` to `to`.
    pub fn delta_to(self, to: Position) -> (i32, i32) {
        (to.row - self.row, to.column - self.column)
    }

    /// Returns the position shifted by the given deltas.
    pub fn offset(self, rows: i32, columns: i32) -> Position {
        Position::new(self.row + rows, self.column + columns)
    }
}

impl From<(i32, i32)> for Position {
    fn from((row, column): (i32, i32)) -> Self {
        Self::new(row, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_and_offset_agree() {
        let from = Position::new(7, 1);
        let to = Position::new(5, 0);
        let (dr, dc) = from.delta_to(to);
        assert_eq!((dr, dc), (-2, -1));
        assert_eq!(from.offset(dr, dc), to);
    }

    #[test]
    fn test_display() {
        assert_eq!(Position::new(0, 4).to_string(), "(0, 4)");
        assert_eq!(Position::from((-1, 2)).to_string(), "(-1, 2)");
    }
}
