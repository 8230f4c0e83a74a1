//! Agent energy schedule, death, and priority policy for the Gridlock
//! simulation.
//!
//! This crate contains the logic layer for agents: everything that operates
//! on agent state without touching the registry or the grid. It sits between
//! `gridlock-types` (which defines the data structures) and `gridlock-core`
//! (which orchestrates contention and ticks).
//!
//! # Modules
//!
//! - [`config`] -- The single documented energy schedule ([`EnergySchedule`])
//! - [`death`] -- Death conditions and processing ([`DeathCause`])
//! - [`energy`] -- Per-tick energy and score mutation
//! - [`error`] -- Error types for agent operations ([`AgentError`])
//! - [`priority`] -- The pluggable lower-wins priority key
//!   ([`PriorityPolicy`])

pub mod config;
pub mod death;
pub mod energy;
pub mod error;
pub mod priority;

// Re-export primary types at crate root for convenience.
pub use config::EnergySchedule;
pub use death::{DeathCause, check_death, mark_dead};
pub use energy::{apply_idle_cost, apply_move_cost, apply_pickup, apply_stall_penalty};
pub use error::AgentError;
pub use priority::{PriorityPolicy, priority_key};
