//! Shared type definitions for the Gridlock arbitration engine.
//!
//! This crate is the single source of truth for the types used across the
//! Gridlock workspace. Snapshot-facing types flow downstream to `TypeScript`
//! via `ts-rs` for external renderers.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifiers (`AgentId` ordinal, `RunId` UUID v7)
//! - [`cell`] -- Grid geometry: cells and movement directions
//! - [`enums`] -- Collectibles, denial reasons, end-of-run reasons
//! - [`moves`] -- Move intent/outcome types for planner-engine communication
//! - [`structs`] -- Agent runtime state, snapshots, and the run summary

pub mod cell;
pub mod enums;
pub mod ids;
pub mod moves;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use cell::{Cell, Direction};
pub use enums::{Collectible, DenialReason, EndReason};
pub use ids::{AgentId, RunId};
pub use moves::{MoveIntent, MoveOutcome};
pub use structs::{
    AgentReport, AgentState, MetricsReport, ResourceReport, RunSummary, TickSnapshot,
};
