//! Negotiation metrics and the fairness index.
//!
//! The tracker keeps global counters (conflicts, grants, denials, cancelled
//! swaps, anomalies) plus per-agent access tallies, and derives Jain's
//! fairness index over the per-agent grant counts:
//!
//! ```text
//! J = (sum of x_i)^2 / (n * sum of x_i^2)
//! ```
//!
//! `J` is 1.0 when every agent has been granted equally often, approaches
//! `1/n` under total monopoly, and is reported as 0.0 before any grant.
//!
//! Waiting is tracked as both ticks and events. A wait event opens on the
//! first tick an agent is blocked and closes with its next successful move
//! or voluntary stay, so `wait_ticks / wait_events` is the mean length of a
//! blocked episode.

use std::collections::{BTreeMap, BTreeSet};

use gridlock_types::{AgentId, AgentReport, AgentState, MetricsReport};

/// Cumulative negotiation counters for one agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentCounters {
    /// Resource and destination grants received.
    pub grants: u32,
    /// Negotiation denials received.
    pub denials: u32,
    /// Total ticks spent blocked.
    pub wait_ticks: u32,
    /// Number of distinct blocked episodes.
    pub wait_events: u32,
}

/// Running negotiation metrics for a whole simulation.
///
/// Every agent is registered up front so the fairness index always ranges
/// over the full population, including agents that never contend.
#[derive(Debug, Clone, Default)]
pub struct MetricsTracker {
    conflicts_detected: u64,
    successful_negotiations: u64,
    failed_negotiations: u64,
    swaps_cancelled: u64,
    forced_grants: u64,
    anomalies: u64,
    per_agent: BTreeMap<AgentId, AgentCounters>,
    /// Agents currently inside a blocked episode.
    waiting: BTreeSet<AgentId>,
}

impl MetricsTracker {
    /// Create a tracker with a zeroed tally for each agent.
    pub fn new(agents: impl IntoIterator<Item = AgentId>) -> Self {
        let per_agent = agents
            .into_iter()
            .map(|id| (id, AgentCounters::default()))
            .collect();
        Self {
            per_agent,
            ..Self::default()
        }
    }

    /// Record one contested resolution (resource, destination, or swap pair).
    pub fn record_conflict(&mut self) {
        self.conflicts_detected = self.conflicts_detected.saturating_add(1);
    }

    /// Record a grant won through normal resolution.
    pub fn record_grant(&mut self, agent: AgentId) {
        self.successful_negotiations = self.successful_negotiations.saturating_add(1);
        let counters = self.per_agent.entry(agent).or_default();
        counters.grants = counters.grants.saturating_add(1);
    }

    /// Record a grant issued by the forced-arbitration sweep.
    ///
    /// Counts as a successful negotiation as well; the separate counter
    /// only tracks how often the liveness backstop had to fire.
    pub fn record_forced_grant(&mut self, agent: AgentId) {
        self.forced_grants = self.forced_grants.saturating_add(1);
        self.record_grant(agent);
    }

    /// Record a denial (held resource or lost contest).
    pub fn record_denial(&mut self, agent: AgentId) {
        self.failed_negotiations = self.failed_negotiations.saturating_add(1);
        let counters = self.per_agent.entry(agent).or_default();
        counters.denials = counters.denials.saturating_add(1);
    }

    /// Record one blocked tick, opening a wait episode if none is open.
    pub fn record_wait(&mut self, agent: AgentId) {
        let counters = self.per_agent.entry(agent).or_default();
        counters.wait_ticks = counters.wait_ticks.saturating_add(1);
        if self.waiting.insert(agent) {
            counters.wait_events = counters.wait_events.saturating_add(1);
        }
    }

    /// Close the agent's wait episode, if one is open.
    pub fn end_wait(&mut self, agent: AgentId) {
        self.waiting.remove(&agent);
    }

    /// Record a cancelled swap pair. Each pair is one conflict.
    pub fn record_swap_cancelled(&mut self) {
        self.swaps_cancelled = self.swaps_cancelled.saturating_add(1);
        self.record_conflict();
    }

    /// Record an absorbed anomaly (stale release, duplicate request, or
    /// malformed desire).
    pub fn record_anomaly(&mut self) {
        self.anomalies = self.anomalies.saturating_add(1);
    }

    /// Total contested resolutions so far.
    pub const fn conflicts_detected(&self) -> u64 {
        self.conflicts_detected
    }

    /// Total grants so far, forced sweep included.
    pub const fn successful_negotiations(&self) -> u64 {
        self.successful_negotiations
    }

    /// Total denials so far.
    pub const fn failed_negotiations(&self) -> u64 {
        self.failed_negotiations
    }

    /// Total cancelled swap pairs so far.
    pub const fn swaps_cancelled(&self) -> u64 {
        self.swaps_cancelled
    }

    /// Total forced-arbitration grants so far.
    pub const fn forced_grants(&self) -> u64 {
        self.forced_grants
    }

    /// Total absorbed anomalies so far.
    pub const fn anomalies(&self) -> u64 {
        self.anomalies
    }

    /// Counters for one agent; zeroed if the agent is unknown.
    pub fn counters(&self, agent: AgentId) -> AgentCounters {
        self.per_agent.get(&agent).copied().unwrap_or_default()
    }

    /// Jain's fairness index over per-agent grant counts.
    ///
    /// Returns 0.0 while no grant has been recorded, otherwise a value in
    /// `(0, 1]` where 1.0 means perfectly even access.
    pub fn fairness_index(&self) -> f64 {
        let total: u64 = self
            .per_agent
            .values()
            .fold(0u64, |acc, c| acc.saturating_add(u64::from(c.grants)));
        if total == 0 || self.per_agent.is_empty() {
            return 0.0;
        }

        let n = f64::from(u32::try_from(self.per_agent.len()).unwrap_or(u32::MAX));
        let mut sum = 0.0_f64;
        let mut sum_of_squares = 0.0_f64;
        for counters in self.per_agent.values() {
            let x = f64::from(counters.grants);
            sum += x;
            sum_of_squares += x * x;
        }

        ((sum * sum) / (n * sum_of_squares)).clamp(0.0, 1.0)
    }

    /// Mean blocked-episode length for one agent, 0 if it never waited.
    pub fn average_wait(&self, agent: AgentId) -> f64 {
        let counters = self.counters(agent);
        if counters.wait_events == 0 {
            return 0.0;
        }
        f64::from(counters.wait_ticks) / f64::from(counters.wait_events)
    }

    /// Combined state-plus-counters report for one agent.
    pub fn agent_report(&self, state: &AgentState) -> AgentReport {
        let counters = self.counters(state.id);
        AgentReport {
            id: state.id,
            name: state.name.clone(),
            pos: state.pos,
            energy: state.energy,
            score: state.score,
            alive: state.alive,
            grants: counters.grants,
            denials: counters.denials,
            wait_ticks: counters.wait_ticks,
            wait_events: counters.wait_events,
            average_wait: self.average_wait(state.id),
        }
    }

    /// Global counters plus the current fairness index.
    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            conflicts_detected: self.conflicts_detected,
            successful_negotiations: self.successful_negotiations,
            failed_negotiations: self.failed_negotiations,
            swaps_cancelled: self.swaps_cancelled,
            forced_grants: self.forced_grants,
            anomalies: self.anomalies,
            fairness_index: self.fairness_index(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use gridlock_types::Cell;

    use super::*;

    fn make_tracker(count: u32) -> MetricsTracker {
        MetricsTracker::new((0..count).map(AgentId::from_index))
    }

    #[test]
    fn fairness_is_zero_before_any_grant() {
        let tracker = make_tracker(4);
        assert!(tracker.fairness_index().abs() < 1e-12);
    }

    #[test]
    fn fairness_is_one_for_even_access() {
        let mut tracker = make_tracker(3);
        for index in 0..3 {
            tracker.record_grant(AgentId::from_index(index));
            tracker.record_grant(AgentId::from_index(index));
        }
        assert!((tracker.fairness_index() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn fairness_drops_under_monopoly() {
        let mut tracker = make_tracker(4);
        for _ in 0..10 {
            tracker.record_grant(AgentId::from_index(0));
        }
        // One agent out of four taking everything gives J = 1/4.
        assert!((tracker.fairness_index() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn fairness_counts_silent_agents() {
        let mut tracker = make_tracker(2);
        tracker.record_grant(AgentId::from_index(0));
        tracker.record_grant(AgentId::from_index(0));
        tracker.record_grant(AgentId::from_index(1));
        // x = (2, 1): J = 9 / (2 * 5) = 0.9
        assert!((tracker.fairness_index() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn wait_episodes_open_once_per_block() {
        let mut tracker = make_tracker(1);
        let agent = AgentId::from_index(0);

        // Three consecutive blocked ticks form one episode.
        tracker.record_wait(agent);
        tracker.record_wait(agent);
        tracker.record_wait(agent);
        tracker.end_wait(agent);
        // A later single blocked tick is a second episode.
        tracker.record_wait(agent);
        tracker.end_wait(agent);

        let counters = tracker.counters(agent);
        assert_eq!(counters.wait_ticks, 4);
        assert_eq!(counters.wait_events, 2);
        assert!((tracker.average_wait(agent) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn forced_grants_also_count_as_grants() {
        let mut tracker = make_tracker(2);
        let agent = AgentId::from_index(1);
        tracker.record_forced_grant(agent);

        assert_eq!(tracker.forced_grants(), 1);
        assert_eq!(tracker.successful_negotiations(), 1);
        assert_eq!(tracker.counters(agent).grants, 1);
    }

    #[test]
    fn swap_cancellation_is_a_conflict() {
        let mut tracker = make_tracker(2);
        tracker.record_swap_cancelled();
        assert_eq!(tracker.swaps_cancelled(), 1);
        assert_eq!(tracker.conflicts_detected(), 1);
        assert_eq!(tracker.failed_negotiations(), 0);
    }

    #[test]
    fn agent_report_combines_state_and_counters() {
        let mut tracker = make_tracker(1);
        let agent = AgentId::from_index(0);
        tracker.record_grant(agent);
        tracker.record_denial(agent);
        tracker.record_wait(agent);

        let state = AgentState::new(agent, "alpha".to_owned(), Cell::new(2, 3), 88);
        let report = tracker.agent_report(&state);
        assert_eq!(report.name, "alpha");
        assert_eq!(report.energy, 88);
        assert_eq!(report.grants, 1);
        assert_eq!(report.denials, 1);
        assert_eq!(report.wait_ticks, 1);
        assert!((report.average_wait - 1.0).abs() < 1e-12);
    }

    #[test]
    fn report_carries_all_counters() {
        let mut tracker = make_tracker(2);
        tracker.record_conflict();
        tracker.record_grant(AgentId::from_index(0));
        tracker.record_denial(AgentId::from_index(1));
        tracker.record_anomaly();

        let report = tracker.report();
        assert_eq!(report.conflicts_detected, 1);
        assert_eq!(report.successful_negotiations, 1);
        assert_eq!(report.failed_negotiations, 1);
        assert_eq!(report.anomalies, 1);
        assert!(report.fairness_index > 0.0);
    }
}
