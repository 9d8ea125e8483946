//! The battle board: a small square grid of discrete positions.
//!
//! Distances on the board are Chebyshev distances (diagonal steps cost the
//! same as straight ones), matching how weapon range is measured.

use serde::{Deserialize, Serialize};

/// A square on the battle board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct BoardPosition {
    /// Column, 0 at the left edge.
    pub x: i32,
    /// Row, 0 at the top edge.
    pub y: i32,
}

impl BoardPosition {
    /// Create a new board position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance to another square.
    #[must_use]
    pub fn distance(self, other: Self) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx.max(dy)
    }

    /// Offset this position by a step.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl std::fmt::Display for BoardPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Board geometry: a `size` x `size` grid with coordinates `0..size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: i32,
}

impl Board {
    /// Create a board with the given edge length.
    #[must_use]
    pub const fn new(size: u32) -> Self {
        Self { size: size as i32 }
    }

    /// Edge length of the board.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size as u32
    }

    /// Largest valid coordinate on either axis.
    #[must_use]
    pub const fn max_coordinate(&self) -> i32 {
        self.size - 1
    }

    /// Whether a position lies on the board.
    #[must_use]
    pub const fn contains(&self, position: BoardPosition) -> bool {
        position.x >= 0 && position.y >= 0 && position.x < self.size && position.y < self.size
    }

    /// Clamp a position onto the board.
    #[must_use]
    pub fn clamp(&self, position: BoardPosition) -> BoardPosition {
        BoardPosition::new(
            position.x.clamp(0, self.max_coordinate()),
            position.y.clamp(0, self.max_coordinate()),
        )
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_chebyshev() {
        let a = BoardPosition::new(1, 4);
        let b = BoardPosition::new(8, 5);
        assert_eq!(a.distance(b), 7);
        assert_eq!(b.distance(a), 7);
        assert_eq!(a.distance(a), 0);
        assert_eq!(BoardPosition::new(0, 0).distance(BoardPosition::new(3, 3)), 3);
    }

    #[test]
    fn test_contains_and_clamp() {
        let board = Board::default();
        assert_eq!(board.max_coordinate(), 9);
        assert!(board.contains(BoardPosition::new(0, 9)));
        assert!(!board.contains(BoardPosition::new(10, 0)));
        assert!(!board.contains(BoardPosition::new(-1, 3)));
        assert_eq!(
            board.clamp(BoardPosition::new(-2, 12)),
            BoardPosition::new(0, 9)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(BoardPosition::new(3, 7).to_string(), "(3, 7)");
    }
}
