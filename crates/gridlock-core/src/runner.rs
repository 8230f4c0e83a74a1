//! Simulation loop runner with operator stop support.
//!
//! This module provides [`run_simulation`], the top-level function that
//! drives the tick loop until the engine reports an end condition or an
//! operator requests a stop. The runner wraps the single-tick
//! [`run_tick`] function and adds the control surface around it: a
//! cloneable [`StopHandle`] (safe to trigger from a signal handler) and a
//! per-tick [`TickCallback`] for observers.
//!
//! [`run_tick`]: crate::tick::run_tick

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tracing::info;

use gridlock_types::{EndReason, RunId, RunSummary};

use crate::pathfind::Pathfinder;
use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Errors that can occur during a simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// A cloneable handle for stopping a run from outside the loop.
///
/// The loop checks the handle before each tick, so a stop lands on a
/// clean tick boundary with all invariants intact.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    /// Create a handle with no stop requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop at the next tick boundary.
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Callback invoked after each tick completes.
///
/// Implementations can use this to stream snapshots, print progress,
/// collect traces, etc. The callback receives the tick summary and the
/// state as it stands after the tick.
pub trait TickCallback {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Run the simulation loop until a termination condition is met.
///
/// This is the main entry point for a bounded run. The engine itself
/// decides when the run is over (collectibles exhausted, extinction, tick
/// limit); the runner only adds the operator stop check and assembles the
/// final [`RunSummary`].
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails unrecoverably.
pub fn run_simulation(
    state: &mut SimulationState,
    planner: &mut dyn Pathfinder,
    stop: &StopHandle,
    callback: &mut dyn TickCallback,
) -> Result<RunSummary, RunnerError> {
    let run_id = RunId::new();
    let started_at = Utc::now();
    let mut total_ticks: u64 = 0;

    info!(
        %run_id,
        seed = state.seed,
        max_ticks = state.max_ticks,
        agents = state.agents.len(),
        resources = state.registry.len(),
        "Run starting"
    );

    let end_reason = loop {
        // --- Check stop request (before tick) ---
        if stop.is_stop_requested() {
            info!(tick = state.clock.tick(), "Operator stop requested");
            break EndReason::OperatorStop;
        }

        // --- Execute tick ---
        let summary = tick::run_tick(state, planner)?;
        total_ticks = total_ticks.saturating_add(1);

        // --- Notify callback ---
        callback.on_tick(&summary, state);

        if let Some(end) = summary.end {
            break end;
        }
    };

    let summary = RunSummary {
        run_id,
        seed: state.seed,
        end_reason,
        total_ticks,
        started_at,
        finished_at: Utc::now(),
        agents: state
            .agents
            .values()
            .map(|a| state.metrics.agent_report(a))
            .collect(),
        metrics: state.metrics.report(),
    };
    log_run_end(&summary);
    Ok(summary)
}

/// Log the run end sequence.
pub fn log_run_end(summary: &RunSummary) {
    info!(
        run_id = %summary.run_id,
        reason = ?summary.end_reason,
        total_ticks = summary.total_ticks,
        conflicts = summary.metrics.conflicts_detected,
        forced_grants = summary.metrics.forced_grants,
        fairness = summary.metrics.fairness_index,
        "Run ended"
    );
}
