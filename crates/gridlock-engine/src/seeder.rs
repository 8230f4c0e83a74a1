//! Collectible seeding for a fresh run.
//!
//! Power pellets go on the midpoint of each edge corridor, ordinary
//! pellets everywhere else walkable. Agent spawn cells stay clear so
//! nobody scores on tick zero without moving.

use std::collections::BTreeSet;

use gridlock_types::{Cell, Collectible};
use gridlock_world::{CollectibleField, GridError, GridMap};
use tracing::debug;

/// What seeding put on the floor.
#[derive(Debug, Clone, Copy)]
pub struct SeedSummary {
    /// Ordinary pellets placed.
    pub pellets: usize,
    /// Power pellets placed.
    pub power_pellets: usize,
}

/// The four candidate power pellet cells: one per edge, at its midpoint.
///
/// On a pillar maze every edge row and column is a continuous corridor,
/// so the midpoints are always walkable. Sites that fall on a wall in
/// hand-built grids are dropped.
pub fn power_pellet_sites(grid: &GridMap) -> Vec<Cell> {
    let mid_x = grid.width() / 2;
    let mid_y = grid.height() / 2;
    let far_x = grid.width().saturating_sub(2);
    let far_y = grid.height().saturating_sub(2);
    let candidates = [
        Cell::new(mid_x, 1),
        Cell::new(1, mid_y),
        Cell::new(far_x, mid_y),
        Cell::new(mid_x, far_y),
    ];
    let unique: BTreeSet<Cell> = candidates
        .into_iter()
        .filter(|cell| grid.is_walkable(*cell))
        .collect();
    unique.into_iter().collect()
}

/// Fill the floor for a new run.
///
/// Power pellets land on the edge-midpoint sites not claimed as spawns,
/// then ordinary pellets cover every remaining walkable cell outside
/// `spawns`.
///
/// # Errors
///
/// Returns [`GridError`] if a power pellet site cannot be placed; with
/// sites pre-filtered for walkability this only fires on double seeding.
pub fn seed_collectibles(
    grid: &GridMap,
    spawns: &BTreeSet<Cell>,
) -> Result<(CollectibleField, SeedSummary), GridError> {
    let mut field = CollectibleField::new();
    let mut power_pellets: usize = 0;
    for site in power_pellet_sites(grid) {
        if spawns.contains(&site) {
            debug!(cell = %site, "Power pellet site occupied by spawn, skipped");
            continue;
        }
        field.place(grid, site, Collectible::PowerPellet)?;
        power_pellets = power_pellets.saturating_add(1);
    }
    let pellets = field.seed_pellets(grid, spawns);
    Ok((
        field,
        SeedSummary {
            pellets,
            power_pellets,
        },
    ))
}
