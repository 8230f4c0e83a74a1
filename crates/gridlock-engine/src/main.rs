//! Arbitration engine binary for the Gridlock simulation.
//!
//! This is the main entry point that wires together the maze world,
//! collectible seeding, the greedy planner, and the tick loop. It loads
//! configuration, assembles the simulation state, runs the loop until a
//! termination condition is met, and writes the end-of-run report.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `gridlock-config.yaml`
//! 3. Build the pillar maze grid
//! 4. Seed pellets and power pellets
//! 5. Assemble simulation state (agents, registry, metrics, lottery)
//! 6. Create the planner, stop handle, and snapshot callback
//! 7. Run the simulation loop
//! 8. Write the run summary report

mod error;
mod planner;
mod seeder;
mod snapshot_callback;

use std::collections::BTreeSet;
use std::path::Path;

use gridlock_core::config::SimulationConfig;
use gridlock_core::runner::{self, StopHandle};
use gridlock_core::tick::SimulationState;
use gridlock_types::Cell;
use gridlock_world::pillar_maze;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::planner::GreedyPathfinder;
use crate::snapshot_callback::SnapshotCallback;

/// Where the end-of-run report lands, relative to the working directory.
const SUMMARY_PATH: &str = "run-summary.json";

/// Environment variable naming an optional JSONL snapshot trace file.
const TRACE_ENV: &str = "GRIDLOCK_TRACE";

/// Progress log cadence in ticks.
const PROGRESS_EVERY: u64 = 100;

/// Application entry point for the arbitration engine.
///
/// Initializes all subsystems and runs the simulation loop. Returns
/// an error code on failure.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself
/// fails.
fn main() -> Result<(), EngineError> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("gridlock-engine starting");

    // 2. Load and validate configuration.
    let config = load_config()?;
    config.validate()?;
    info!(
        width = config.grid.width,
        height = config.grid.height,
        agents = config.agents.len(),
        policy = ?config.arbitration.policy,
        seed = config.arbitration.seed,
        max_ticks = config.bounds.max_ticks,
        "Configuration loaded"
    );

    // 3. Build the maze.
    let grid = pillar_maze(config.grid.width, config.grid.height)?;
    info!(
        width = grid.width(),
        height = grid.height(),
        bottlenecks = grid.bottleneck_cells().len(),
        "Maze built"
    );

    // 4. Seed collectibles, keeping spawn cells clear.
    let spawns: BTreeSet<Cell> = config
        .agents
        .iter()
        .map(|agent| agent.spawn_cell())
        .collect();
    let (collectibles, seeded) = seeder::seed_collectibles(&grid, &spawns)?;
    info!(
        pellets = seeded.pellets,
        power_pellets = seeded.power_pellets,
        "Collectibles seeded"
    );

    // 5. Assemble simulation state.
    let mut state = SimulationState::new(grid, collectibles, &config)?;
    info!(
        agents = state.agents.len(),
        resources = state.registry.len(),
        "Simulation state assembled, entering tick loop"
    );

    // 6. Create the planner, stop handle, and snapshot callback.
    let mut planner = GreedyPathfinder::new();
    let stop = StopHandle::new();
    let mut callback = match std::env::var(TRACE_ENV) {
        Ok(trace_path) => {
            info!(path = trace_path.as_str(), "Snapshot trace enabled");
            SnapshotCallback::with_jsonl(Path::new(&trace_path), PROGRESS_EVERY)?
        }
        Err(_) => SnapshotCallback::new(PROGRESS_EVERY),
    };

    // 7. Run the simulation.
    let summary = runner::run_simulation(&mut state, &mut planner, &stop, &mut callback)?;
    callback.finish();

    // 8. Write the run summary report.
    let report = serde_json::to_string_pretty(&summary)?;
    std::fs::write(SUMMARY_PATH, report)?;
    info!(path = SUMMARY_PATH, "Run summary written");

    info!(
        end_reason = ?summary.end_reason,
        total_ticks = summary.total_ticks,
        fairness = summary.metrics.fairness_index,
        "gridlock-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration from `gridlock-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = Path::new("gridlock-config.yaml");
    if config_path.exists() {
        let config = SimulationConfig::from_file(config_path)?;
        Ok(config)
    } else {
        info!("Config file not found, using defaults");
        Ok(SimulationConfig::default())
    }
}
