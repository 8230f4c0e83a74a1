//! Error types for the `gridlock-world` crate.
//!
//! All fallible operations in this crate return [`GridError`] through the
//! standard [`Result`] type alias.

use gridlock_types::Cell;

/// Errors that can occur during grid construction and queries.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A cell lies outside the grid bounds.
    #[error("cell {cell} is outside the {width}x{height} grid")]
    OutOfBounds {
        /// The offending cell.
        cell: Cell,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },

    /// A cell expected to be walkable is a wall.
    #[error("cell {0} is a wall")]
    NotWalkable(Cell),

    /// The requested dimensions cannot form a usable grid.
    #[error("invalid grid dimensions {width}x{height}: {reason}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Why the dimensions were rejected.
        reason: String,
    },

    /// A collectible was placed on a cell that already has one.
    #[error("cell {0} already holds a collectible")]
    CellOccupiedByCollectible(Cell),
}
