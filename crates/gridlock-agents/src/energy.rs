//! Per-tick energy mechanics.
//!
//! Every mutation of an agent's energy and score goes through this module,
//! applying the single schedule defined by [`EnergySchedule`]. All
//! subtraction saturates at zero (death is detected separately, never by
//! underflow) and all gains clamp at the schedule's cap.

use gridlock_types::{AgentState, Collectible};

use crate::config::EnergySchedule;

/// Charge the cost of a committed move.
pub const fn apply_move_cost(state: &mut AgentState, schedule: &EnergySchedule) {
    state.energy = state.energy.saturating_sub(schedule.move_cost);
}

/// Charge the penalty for an enforced stall.
///
/// The same magnitude applies to every denial reason: lost lottery, held
/// resource, swap cancellation, occupied destination, malformed desire.
pub const fn apply_stall_penalty(state: &mut AgentState, schedule: &EnergySchedule) {
    state.energy = state.energy.saturating_sub(schedule.stall_penalty);
}

/// Charge the cost of a voluntary stay-in-place tick.
pub const fn apply_idle_cost(state: &mut AgentState, schedule: &EnergySchedule) {
    state.energy = state.energy.saturating_sub(schedule.idle_cost);
}

/// Apply a collectible pickup: add its score and regain energy up to the
/// schedule's cap. Returns the score awarded.
pub fn apply_pickup(
    state: &mut AgentState,
    kind: Collectible,
    schedule: &EnergySchedule,
) -> u32 {
    let score = kind.score();
    state.score = state.score.saturating_add(score);

    let regain = match kind {
        Collectible::Pellet => schedule.pellet_energy,
        Collectible::PowerPellet => schedule.power_pellet_energy,
    };
    state.energy = state
        .energy
        .saturating_add(regain)
        .min(schedule.max_energy);
    score
}
