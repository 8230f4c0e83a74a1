//! Death conditions and processing.
//!
//! Agents die when their energy depletes to zero. Death is detected by the
//! orchestrator (at tick wake and again after post-move effects), never by
//! the energy functions themselves. A dead agent stays in the simulation
//! with `alive = false`; the caller is responsible for force-releasing any
//! resource the agent held, synchronously in the same phase.

use gridlock_types::AgentState;
use tracing::info;

/// Why an agent died.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    /// Energy depleted to zero.
    Exhaustion,
}

impl core::fmt::Display for DeathCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Exhaustion => write!(f, "exhaustion"),
        }
    }
}

/// Check whether a live agent has met a death condition.
///
/// Returns `None` for agents that are already dead.
pub const fn check_death(state: &AgentState) -> Option<DeathCause> {
    if state.alive && state.energy == 0 {
        Some(DeathCause::Exhaustion)
    } else {
        None
    }
}

/// Mark an agent dead and log the event.
pub fn mark_dead(state: &mut AgentState, cause: DeathCause) {
    state.alive = false;
    info!(
        agent = %state.id,
        name = %state.name,
        cause = %cause,
        score = state.score,
        "agent died"
    );
}
