//! Core entity structs: runtime agent state, per-tick snapshots, and the
//! end-of-run summary.
//!
//! Snapshot and summary types are the read-only surface produced for an
//! external renderer or report consumer; they carry no behavior.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cell::Cell;
use crate::enums::EndReason;
use crate::ids::{AgentId, RunId};

// ---------------------------------------------------------------------------
// Agent runtime state
// ---------------------------------------------------------------------------

/// Mutable runtime state of one agent.
///
/// Owned by the simulation; mutated only by the tick orchestrator during its
/// own tick. Cumulative negotiation statistics (waits, grants, denials) live
/// in the metrics tracker, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentState {
    /// Stable identifier, assigned at registration.
    pub id: AgentId,
    /// Human-readable name for logs and reports.
    pub name: String,
    /// Current position.
    pub pos: Cell,
    /// Remaining energy; zero means dead.
    pub energy: u32,
    /// Accumulated score from collectible pickups.
    pub score: u32,
    /// Liveness flag. Dead agents are kept (never removed) but excluded
    /// from planning and contention.
    pub alive: bool,
}

impl AgentState {
    /// Create a live agent at `pos` with the given starting energy.
    pub const fn new(id: AgentId, name: String, pos: Cell, energy: u32) -> Self {
        Self {
            id,
            name,
            pos,
            energy,
            score: 0,
            alive: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-agent report
// ---------------------------------------------------------------------------

/// One agent's state and negotiation statistics, as exposed to the renderer
/// snapshot and the run summary.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentReport {
    /// Stable identifier.
    pub id: AgentId,
    /// Human-readable name.
    pub name: String,
    /// Position at report time.
    pub pos: Cell,
    /// Remaining energy.
    pub energy: u32,
    /// Accumulated score.
    pub score: u32,
    /// Liveness flag.
    pub alive: bool,
    /// Resource grants received (access count).
    pub grants: u32,
    /// Negotiation denials received.
    pub denials: u32,
    /// Total ticks spent waiting.
    pub wait_ticks: u32,
    /// Number of distinct wait events.
    pub wait_events: u32,
    /// Average wait per event (`wait_ticks / wait_events`, 0 if none).
    pub average_wait: f64,
}

// ---------------------------------------------------------------------------
// Resource snapshot
// ---------------------------------------------------------------------------

/// Snapshot of one registered resource for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceReport {
    /// The resource cell.
    pub cell: Cell,
    /// The current holder, if any.
    pub holder: Option<AgentId>,
    /// Number of agents waiting in this resource's queue.
    pub queue_len: u32,
}

// ---------------------------------------------------------------------------
// Metrics report
// ---------------------------------------------------------------------------

/// Process-wide negotiation counters plus the fairness index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MetricsReport {
    /// Contested resolutions: one per contested resource or destination per
    /// tick, one per cancelled swap pair.
    pub conflicts_detected: u64,
    /// Successful grants across all resources.
    pub successful_negotiations: u64,
    /// Denials across all resources and destination contests.
    pub failed_negotiations: u64,
    /// Swap pairs cancelled.
    pub swaps_cancelled: u64,
    /// Grants issued by the forced-arbitration liveness sweep.
    pub forced_grants: u64,
    /// Absorbed anomalies (stale releases, duplicate requests, malformed
    /// desires).
    pub anomalies: u64,
    /// Jain's fairness index over per-agent access counts; 0 when no agent
    /// has ever been granted a resource, otherwise in (0, 1].
    pub fairness_index: f64,
}

// ---------------------------------------------------------------------------
// Tick snapshot
// ---------------------------------------------------------------------------

/// Read-only view of the whole simulation after one tick, for display.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TickSnapshot {
    /// The tick this snapshot describes.
    pub tick: u64,
    /// All agents, dead and alive, in id order.
    pub agents: Vec<AgentReport>,
    /// All registered resources, in cell order.
    pub resources: Vec<ResourceReport>,
    /// Collectibles still on the grid.
    pub collectibles_remaining: u64,
    /// Running negotiation counters.
    pub metrics: MetricsReport,
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

/// End-of-run report: final per-agent statistics, totals, and provenance.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RunSummary {
    /// Unique identifier of this run.
    pub run_id: RunId,
    /// The lottery seed the run was started with.
    pub seed: u64,
    /// Why the run ended.
    pub end_reason: EndReason,
    /// Number of ticks executed.
    pub total_ticks: u64,
    /// Wall-clock start of the run.
    pub started_at: DateTime<Utc>,
    /// Wall-clock end of the run.
    pub finished_at: DateTime<Utc>,
    /// Final per-agent statistics, in id order.
    pub agents: Vec<AgentReport>,
    /// Final negotiation counters and fairness index.
    pub metrics: MetricsReport,
}
