//! The grid map: bounds, walls, and walkability queries.
//!
//! [`GridMap`] is the collaborator-side world model the arbitration engine
//! consumes. It stores walls in an ordered set, so all iteration is
//! deterministic, and answers the queries the engine's setup needs: bounds,
//! walkability, walkable neighbors, and bottleneck classification.

use std::collections::BTreeSet;

use gridlock_types::Cell;
use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// A rectangular grid with a wall set.
///
/// Cells outside the bounds are treated as walls by every query, so callers
/// never need a separate bounds check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridMap {
    /// Number of columns.
    width: u32,
    /// Number of rows.
    height: u32,
    /// All wall cells, ordered.
    walls: BTreeSet<Cell>,
}

impl GridMap {
    /// Create an open grid of the given dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::InvalidDimensions {
                width,
                height,
                reason: "both dimensions must be non-zero".to_owned(),
            });
        }
        Ok(Self {
            width,
            height,
            walls: BTreeSet::new(),
        })
    }

    /// Grid width in columns.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in rows.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Whether `cell` lies inside the grid bounds.
    pub const fn in_bounds(&self, cell: Cell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    /// Mark `cell` as a wall.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if the cell lies outside the grid.
    pub fn set_wall(&mut self, cell: Cell) -> Result<(), GridError> {
        if !self.in_bounds(cell) {
            return Err(GridError::OutOfBounds {
                cell,
                width: self.width,
                height: self.height,
            });
        }
        self.walls.insert(cell);
        Ok(())
    }

    /// Whether `cell` is a wall. Out-of-bounds cells count as walls.
    pub fn is_wall(&self, cell: Cell) -> bool {
        !self.in_bounds(cell) || self.walls.contains(&cell)
    }

    /// Whether `cell` is inside the grid and not a wall.
    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && !self.walls.contains(&cell)
    }

    /// The walkable orthogonal neighbors of `cell`, in stable direction
    /// order.
    pub fn walkable_neighbors(&self, cell: Cell) -> Vec<Cell> {
        cell.neighbors().filter(|n| self.is_walkable(*n)).collect()
    }

    /// Number of walkable orthogonal neighbors of `cell`.
    pub fn walkable_degree(&self, cell: Cell) -> usize {
        cell.neighbors().filter(|n| self.is_walkable(*n)).count()
    }

    /// All walkable cells in row-major order.
    pub fn walkable_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let width = self.width;
        (0..self.height)
            .flat_map(move |y| (0..width).map(move |x| Cell::new(x, y)))
            .filter(|cell| self.is_walkable(*cell))
    }

    /// The bottleneck cells of this grid: walkable cells with exactly two
    /// walkable neighbors. These are the single-file passages (straights and
    /// corners) where mutual exclusion is required; the resulting set seeds
    /// the resource registry at setup time.
    pub fn bottleneck_cells(&self) -> BTreeSet<Cell> {
        self.walkable_cells()
            .filter(|cell| self.walkable_degree(*cell) == 2)
            .collect()
    }

    /// Number of wall cells.
    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }
}
