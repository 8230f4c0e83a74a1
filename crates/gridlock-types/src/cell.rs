//! Grid geometry: cells and the four movement directions.
//!
//! Cells use unsigned column/row coordinates with the origin at the top-left
//! corner; `y` grows downward (row order). All offset arithmetic is checked,
//! so stepping off the addressable space yields `None` rather than wrapping.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A single grid cell, identified by column (`x`) and row (`y`).
///
/// `Cell` doubles as the identity of a registered resource: exactly one
/// resource entry exists per contested cell, keyed by its coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct Cell {
    /// Column, increasing eastward from 0.
    pub x: u32,
    /// Row, increasing southward from 0.
    pub y: u32,
}

impl Cell {
    /// Create a cell from column and row.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// The neighboring cell one step in `direction`, or `None` if the step
    /// would leave the addressable coordinate space.
    pub fn step(self, direction: Direction) -> Option<Self> {
        match direction {
            Direction::North => self.y.checked_sub(1).map(|y| Self { x: self.x, y }),
            Direction::South => self.y.checked_add(1).map(|y| Self { x: self.x, y }),
            Direction::West => self.x.checked_sub(1).map(|x| Self { x, y: self.y }),
            Direction::East => self.x.checked_add(1).map(|x| Self { x, y: self.y }),
        }
    }

    /// All existing orthogonal neighbors, in [`Direction::ALL`] order.
    pub fn neighbors(self) -> impl Iterator<Item = Self> {
        Direction::ALL.into_iter().filter_map(move |d| self.step(d))
    }

    /// Manhattan distance to `other`.
    pub const fn manhattan_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// Whether `other` is exactly one orthogonal step away.
    pub const fn is_adjacent_to(self, other: Self) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl core::fmt::Display for Cell {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four orthogonal movement directions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum Direction {
    /// Toward row 0.
    North,
    /// Toward larger columns.
    East,
    /// Toward larger rows.
    South,
    /// Toward column 0.
    West,
}

impl Direction {
    /// All four directions in a fixed order. Iteration order matters for
    /// deterministic neighbor expansion; keep it stable.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// The direction pointing the opposite way.
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_is_checked_at_the_origin() {
        let origin = Cell::new(0, 0);
        assert_eq!(origin.step(Direction::North), None);
        assert_eq!(origin.step(Direction::West), None);
        assert_eq!(origin.step(Direction::South), Some(Cell::new(0, 1)));
        assert_eq!(origin.step(Direction::East), Some(Cell::new(1, 0)));
    }

    #[test]
    fn neighbors_skip_out_of_range_cells() {
        let corner: Vec<Cell> = Cell::new(0, 0).neighbors().collect();
        assert_eq!(corner, vec![Cell::new(1, 0), Cell::new(0, 1)]);

        let interior: Vec<Cell> = Cell::new(5, 5).neighbors().collect();
        assert_eq!(interior.len(), 4);
    }

    #[test]
    fn manhattan_distance_and_adjacency_agree() {
        let a = Cell::new(3, 4);
        let b = Cell::new(3, 5);
        let c = Cell::new(5, 7);
        assert_eq!(a.manhattan_distance(b), 1);
        assert!(a.is_adjacent_to(b));
        assert_eq!(a.manhattan_distance(c), 5);
        assert!(!a.is_adjacent_to(c));
        assert!(!a.is_adjacent_to(a));
    }

    #[test]
    fn opposite_directions_invert() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
        }
    }

    #[test]
    fn cell_ordering_is_column_major() {
        // BTreeMap iteration over cells relies on the derived lexicographic
        // order: all of column 0 before column 1, rows ascending within.
        let mut cells = vec![Cell::new(1, 0), Cell::new(0, 2), Cell::new(0, 1)];
        cells.sort_unstable();
        assert_eq!(
            cells,
            vec![Cell::new(0, 1), Cell::new(0, 2), Cell::new(1, 0)]
        );
    }
}
