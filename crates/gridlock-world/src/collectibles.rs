//! Collectible placement and pickup.
//!
//! [`CollectibleField`] tracks the pellets remaining on the grid. Pickup is
//! take-on-arrival: the orchestrator calls [`CollectibleField::take`] for
//! each cell an agent moved onto, strictly after position commit. The
//! remaining count drives the "all collected" termination condition.

use std::collections::{BTreeMap, BTreeSet};

use gridlock_types::{Cell, Collectible};
use tracing::debug;

use crate::error::GridError;
use crate::grid::GridMap;

/// The collectibles currently on the grid, keyed by cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectibleField {
    /// Remaining collectibles, ordered by cell.
    items: BTreeMap<Cell, Collectible>,
}

impl CollectibleField {
    /// Create an empty field.
    pub const fn new() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }

    /// Place a collectible on `cell`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::CellOccupiedByCollectible`] if the cell already
    /// holds one, and [`GridError::NotWalkable`] if it is a wall or out of
    /// bounds on the given grid.
    pub fn place(
        &mut self,
        grid: &GridMap,
        cell: Cell,
        kind: Collectible,
    ) -> Result<(), GridError> {
        if !grid.is_walkable(cell) {
            return Err(GridError::NotWalkable(cell));
        }
        if self.items.contains_key(&cell) {
            return Err(GridError::CellOccupiedByCollectible(cell));
        }
        self.items.insert(cell, kind);
        Ok(())
    }

    /// Scatter ordinary pellets on every walkable cell that is neither in
    /// `skip` nor already occupied by a collectible. Returns the number of
    /// pellets placed.
    pub fn seed_pellets(&mut self, grid: &GridMap, skip: &BTreeSet<Cell>) -> usize {
        let mut placed = 0_usize;
        for cell in grid.walkable_cells() {
            if skip.contains(&cell) || self.items.contains_key(&cell) {
                continue;
            }
            self.items.insert(cell, Collectible::Pellet);
            placed = placed.saturating_add(1);
        }
        debug!(placed, remaining = self.items.len(), "pellets seeded");
        placed
    }

    /// Remove and return the collectible at `cell`, if any.
    pub fn take(&mut self, cell: Cell) -> Option<Collectible> {
        self.items.remove(&cell)
    }

    /// The collectible at `cell` without removing it.
    pub fn peek(&self, cell: Cell) -> Option<Collectible> {
        self.items.get(&cell).copied()
    }

    /// Number of collectibles still on the grid.
    pub fn remaining(&self) -> usize {
        self.items.len()
    }

    /// Whether no collectibles remain.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over remaining collectibles in cell order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, Collectible)> + '_ {
        self.items.iter().map(|(cell, kind)| (*cell, *kind))
    }
}
