//! Tick cycle, resource arbitration, and orchestration for the Gridlock
//! engine.
//!
//! This crate owns the 8-phase tick cycle that drives the simulation:
//! Wake, Plan, Request, Resolve, Commit, Post-move, Metrics, and
//! Termination.
//!
//! # Modules
//!
//! - [`arbitration`] -- Priority contests, the tie-break lottery, swap
//!   detection, and the blocked-move fixpoint.
//! - [`clock`] -- Monotonic tick counter with overflow protection.
//! - [`config`] -- Configuration loading from `gridlock-config.yaml` into
//!   strongly-typed structs.
//! - [`lifecycle`] -- Token release, regrant, revocation, and the
//!   forced-grant sweep.
//! - [`metrics`] -- Contention counters, per-agent tallies, and the
//!   fairness index.
//! - [`pathfind`] -- [`Pathfinder`] trait plus the scripted and
//!   hold-position planners used in tests.
//! - [`registry`] -- Token ownership and wait queues for bottleneck cells.
//! - [`runner`] -- The bounded run loop with operator stop support.
//! - [`tick`] -- The 8-phase tick cycle engine loop.
//!
//! [`Pathfinder`]: pathfind::Pathfinder

pub mod arbitration;
pub mod clock;
pub mod config;
pub mod lifecycle;
pub mod metrics;
pub mod pathfind;
pub mod registry;
pub mod runner;
pub mod tick;
