//! The energy schedule: every energy gain and loss an agent can experience.
//!
//! The source variants of this system charged wait penalties differently
//! depending on whether a loss was a lost negotiation, an occupied cell, or
//! a plain stall. This implementation defines one schedule: a committed move
//! costs [`move_cost`], *any* enforced stall costs [`stall_penalty`], and a
//! voluntary stay costs [`idle_cost`]. Pickup regains are capped at
//! [`max_energy`].
//!
//! [`move_cost`]: EnergySchedule::move_cost
//! [`stall_penalty`]: EnergySchedule::stall_penalty
//! [`idle_cost`]: EnergySchedule::idle_cost
//! [`max_energy`]: EnergySchedule::max_energy

use crate::error::AgentError;

/// Every tunable of the agent energy model.
///
/// All values are whole `u32` energy points. The engine constructs this
/// from its YAML configuration at simulation start and passes it into the
/// energy application functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnergySchedule {
    /// Starting energy for new agents (default: 100).
    pub initial_energy: u32,

    /// Hard energy cap; pickup regains never exceed it (default: 200).
    pub max_energy: u32,

    /// Energy spent per committed move (default: 1).
    pub move_cost: u32,

    /// Energy lost for any enforced stall, regardless of the denial reason
    /// (default: 2).
    pub stall_penalty: u32,

    /// Energy lost on a voluntary stay-in-place tick (default: 0).
    pub idle_cost: u32,

    /// Energy regained from an ordinary pellet (default: 2).
    pub pellet_energy: u32,

    /// Energy regained from a power pellet (default: 10).
    pub power_pellet_energy: u32,
}

impl Default for EnergySchedule {
    fn default() -> Self {
        Self {
            initial_energy: 100,
            max_energy: 200,
            move_cost: 1,
            stall_penalty: 2,
            idle_cost: 0,
            pellet_energy: 2,
            power_pellet_energy: 10,
        }
    }
}

impl EnergySchedule {
    /// Check internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidEnergySchedule`] if the cap is zero or
    /// the starting energy exceeds the cap.
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.max_energy == 0 {
            return Err(AgentError::InvalidEnergySchedule {
                reason: "max_energy must be non-zero".to_owned(),
            });
        }
        if self.initial_energy > self.max_energy {
            return Err(AgentError::InvalidEnergySchedule {
                reason: format!(
                    "initial_energy {} exceeds max_energy {}",
                    self.initial_energy, self.max_energy
                ),
            });
        }
        Ok(())
    }
}
