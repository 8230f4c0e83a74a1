//! Grid geometry, maze construction, and collectibles for the Gridlock
//! simulation.
//!
//! This crate plays the "external collaborator" role the arbitration core
//! consumes: it builds grids, classifies bottleneck cells, and tracks the
//! collectibles that drive the run's termination condition. The core never
//! constructs world state itself; it receives a [`GridMap`] and a
//! [`CollectibleField`] at setup.
//!
//! # Modules
//!
//! - [`collectibles`] -- Pellet placement and take-on-arrival pickup
//! - [`error`] -- Error types for grid operations
//! - [`grid`] -- [`GridMap`]: bounds, walls, walkability, bottlenecks
//! - [`maze`] -- Bordered pillar-maze builder and spawn corners

pub mod collectibles;
pub mod error;
pub mod grid;
pub mod maze;

// Re-export primary types at crate root.
pub use collectibles::CollectibleField;
pub use error::GridError;
pub use grid::GridMap;
pub use maze::{corner_spawns, pillar_maze};
