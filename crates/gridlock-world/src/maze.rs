//! Pillar-maze construction.
//!
//! Builds the classic bordered pillar grid used by the demo binary and the
//! orchestrator tests: a solid border with wall pillars at every interior
//! cell whose column and row are both even. Cells with one odd coordinate
//! become degree-2 corridors; cells with two odd coordinates become degree-4
//! intersections.

use gridlock_types::Cell;
use tracing::debug;

use crate::error::GridError;
use crate::grid::GridMap;

/// Build a bordered pillar maze.
///
/// Both dimensions must be odd and at least 5, so the border lands on even
/// coordinates and the interior lattice stays fully connected.
///
/// # Errors
///
/// Returns [`GridError::InvalidDimensions`] for even or too-small dimensions.
pub fn pillar_maze(width: u32, height: u32) -> Result<GridMap, GridError> {
    if width < 5 || height < 5 {
        return Err(GridError::InvalidDimensions {
            width,
            height,
            reason: "pillar maze needs at least 5x5".to_owned(),
        });
    }
    if width % 2 == 0 || height % 2 == 0 {
        return Err(GridError::InvalidDimensions {
            width,
            height,
            reason: "pillar maze needs odd dimensions".to_owned(),
        });
    }

    let mut grid = GridMap::new(width, height)?;
    let right = width.saturating_sub(1);
    let bottom = height.saturating_sub(1);

    for y in 0..height {
        for x in 0..width {
            let border = x == 0 || y == 0 || x == right || y == bottom;
            let pillar = x % 2 == 0 && y % 2 == 0;
            if border || pillar {
                grid.set_wall(Cell::new(x, y))?;
            }
        }
    }

    debug!(
        width,
        height,
        walls = grid.wall_count(),
        bottlenecks = grid.bottleneck_cells().len(),
        "pillar maze built"
    );
    Ok(grid)
}

/// The four walkable interior corners of a grid, in cell order.
///
/// The usual spawn points for a pillar maze. Corners blocked by walls are
/// omitted.
pub fn corner_spawns(grid: &GridMap) -> Vec<Cell> {
    let far_x = grid.width().saturating_sub(2);
    let far_y = grid.height().saturating_sub(2);
    let corners = [
        Cell::new(1, 1),
        Cell::new(far_x, 1),
        Cell::new(1, far_y),
        Cell::new(far_x, far_y),
    ];
    let mut spawns: Vec<Cell> = corners
        .into_iter()
        .filter(|cell| grid.is_walkable(*cell))
        .collect();
    spawns.sort_unstable();
    spawns.dedup();
    spawns
}
