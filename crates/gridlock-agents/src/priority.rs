//! The pluggable negotiation priority key.
//!
//! Contention is always resolved in favor of the *lowest* key ("help the
//! weaker agent"); agents tied at the minimum go to the lottery. Which
//! signal feeds the key is a configurable policy rather than a hard-coded
//! score coupling.

use gridlock_types::AgentState;
use serde::{Deserialize, Serialize};

/// The policy used to compute an agent's priority key. Lower key wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityPolicy {
    /// Favor the agent with the lowest score (the classic "help the
    /// weaker" rule).
    #[default]
    LowestScore,
    /// Favor the agent with the fewest resource grants so far (inverse
    /// fairness signal).
    FewestGrants,
    /// Favor the agent with the least remaining energy.
    LowestEnergy,
}

/// Compute an agent's priority key under `policy`.
///
/// `grants` is the agent's cumulative resource-access count, owned by the
/// metrics tracker and passed in by the resolver.
pub fn priority_key(policy: PriorityPolicy, state: &AgentState, grants: u32) -> u64 {
    match policy {
        PriorityPolicy::LowestScore => u64::from(state.score),
        PriorityPolicy::FewestGrants => u64::from(grants),
        PriorityPolicy::LowestEnergy => u64::from(state.energy),
    }
}

#[cfg(test)]
mod tests {
    use gridlock_types::{AgentId, Cell};

    use super::*;

    fn make_agent(score: u32, energy: u32) -> AgentState {
        let mut state = AgentState::new(
            AgentId::from_index(0),
            "alpha".to_owned(),
            Cell::new(1, 1),
            energy,
        );
        state.score = score;
        state
    }

    #[test]
    fn each_policy_reads_its_own_signal() {
        let agent = make_agent(30, 70);
        assert_eq!(priority_key(PriorityPolicy::LowestScore, &agent, 5), 30);
        assert_eq!(priority_key(PriorityPolicy::FewestGrants, &agent, 5), 5);
        assert_eq!(priority_key(PriorityPolicy::LowestEnergy, &agent, 5), 70);
    }

    #[test]
    fn default_policy_is_lowest_score() {
        assert_eq!(PriorityPolicy::default(), PriorityPolicy::LowestScore);
    }

    #[test]
    fn policy_deserializes_from_snake_case() {
        let parsed: Result<PriorityPolicy, _> = serde_json::from_str("\"fewest_grants\"");
        assert_eq!(parsed.ok(), Some(PriorityPolicy::FewestGrants));
    }
}
