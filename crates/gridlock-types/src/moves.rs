//! Move intent and outcome types for planner-to-engine communication.
//!
//! A [`MoveIntent`] is what the external planner desires for one agent this
//! tick; a [`MoveOutcome`] is what the arbitration engine actually committed.
//! Both are ephemeral per-tick values, never persisted across ticks.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cell::Cell;
use crate::enums::DenialReason;
use crate::ids::AgentId;

/// One agent's desired move for the current tick.
///
/// A stay-in-place desire (`to == from`) is valid and is never routed
/// through contention resolution.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct MoveIntent {
    /// The agent this intent belongs to.
    pub agent_id: AgentId,
    /// The agent's position when the intent was collected.
    pub from: Cell,
    /// The desired next cell (may equal `from`).
    pub to: Cell,
}

impl MoveIntent {
    /// Create an intent.
    pub const fn new(agent_id: AgentId, from: Cell, to: Cell) -> Self {
        Self { agent_id, from, to }
    }

    /// Whether this intent is a voluntary stay-in-place.
    pub const fn is_stay(self) -> bool {
        self.from.x == self.to.x && self.from.y == self.to.y
    }
}

/// What happened to one agent's intent after Resolve and Commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum MoveOutcome {
    /// The move was authorized and committed.
    Moved {
        /// Position before the tick.
        from: Cell,
        /// Position after the tick.
        to: Cell,
    },
    /// The move was refused; the agent kept its position and paid the
    /// stall penalty.
    Stalled {
        /// Why the move was refused.
        reason: DenialReason,
    },
    /// The agent voluntarily stayed (or submitted no intent).
    Stayed,
}

impl MoveOutcome {
    /// Whether the agent changed position this tick.
    pub const fn moved(self) -> bool {
        matches!(self, Self::Moved { .. })
    }

    /// Whether the agent was forced to stall.
    pub const fn stalled(self) -> bool {
        matches!(self, Self::Stalled { .. })
    }
}
