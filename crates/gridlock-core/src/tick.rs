//! The tick cycle: phased execution of one simulation step.
//!
//! Every tick runs the same eight phases in order:
//!
//! 1. Wake: advance the clock and sweep for agents that died outside the
//!    cycle, so their tokens free up before anyone negotiates.
//! 2. Plan: ask the external [`Pathfinder`] for a batch of desired moves
//!    against a read-only [`WorldView`].
//! 3. Request: classify each desire by destination and enqueue resource
//!    requests with the registry.
//! 4. Resolve: run the forced-grant sweep when due, then resource contests,
//!    ordinary destination contests, swap cancellation, and the
//!    blocked-by-stationary fixpoint.
//! 5. Commit: apply all authorized moves simultaneously, transfer tokens
//!    for vacated cells, revoke lapsed grants, and charge energy.
//! 6. Post-move: pick up collectibles, then check for exhaustion deaths.
//! 7. Metrics: fold the per-agent outcomes into the wait bookkeeping.
//! 8. Termination: decide whether the run is over.
//!
//! Registry and agent state mutate only in phases 1, 4, 5, and 6; every
//! other phase reads. That discipline is what makes a tick replayable from
//! its inputs.

use std::collections::{BTreeMap, BTreeSet};

use gridlock_agents::{
    EnergySchedule, PriorityPolicy, check_death, energy, mark_dead, priority_key,
};
use gridlock_types::{
    AgentId, AgentState, Cell, DenialReason, EndReason, MoveIntent, MoveOutcome, TickSnapshot,
};
use gridlock_world::{CollectibleField, GridMap};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info, warn};

use crate::arbitration::{self, Contender};
use crate::clock::TickClock;
use crate::config::SimulationConfig;
use crate::lifecycle;
use crate::metrics::MetricsTracker;
use crate::pathfind::{Pathfinder, WorldView};
use crate::registry::{CellClass, EnqueueOutcome, ResourceRegistry};

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: crate::clock::ClockError,
    },

    /// A token registry operation failed.
    #[error("registry error: {source}")]
    Registry {
        /// The underlying registry error.
        #[from]
        source: crate::registry::RegistryError,
    },

    /// The external planner failed to produce a batch of desires.
    #[error("planner error: {source}")]
    Planner {
        /// The underlying planner error.
        #[from]
        source: crate::pathfind::PathfinderError,
    },
}

/// Errors raised while assembling a [`SimulationState`].
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The configuration names no agents.
    #[error("no agents configured")]
    NoAgents,

    /// An agent spawn cell is a wall or out of bounds.
    #[error("agent {name} spawns on unwalkable cell {cell}")]
    SpawnBlocked {
        /// The offending agent's name.
        name: String,
        /// The unwalkable cell.
        cell: Cell,
    },

    /// Two agents share a spawn cell.
    #[error("two agents spawn on the same cell {cell}")]
    DuplicateSpawn {
        /// The shared cell.
        cell: Cell,
    },

    /// Two agents share a name.
    #[error("duplicate agent name: {name}")]
    DuplicateName {
        /// The repeated name.
        name: String,
    },

    /// The energy schedule is unusable.
    #[error("invalid energy schedule: {source}")]
    Schedule {
        /// The underlying schedule error.
        #[from]
        source: gridlock_agents::AgentError,
    },

    /// Granting a spawn-cell token failed.
    #[error("spawn token grant failed: {source}")]
    Registry {
        /// The underlying registry error.
        #[from]
        source: crate::registry::RegistryError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Final outcome for every agent that was alive when the tick began.
    pub outcomes: BTreeMap<AgentId, MoveOutcome>,
    /// Number of moves committed.
    pub moves_committed: u32,
    /// Number of agents forced to stall.
    pub stalls: u32,
    /// Collectibles picked up this tick.
    pub collected: u32,
    /// Tokens granted this tick (fresh grants, regrants, and forced grants).
    pub grants: u64,
    /// Conflicts detected this tick.
    pub conflicts: u64,
    /// Protocol anomalies absorbed this tick.
    pub anomalies: u64,
    /// Agents who died during this tick.
    pub deaths: Vec<AgentId>,
    /// Number of living agents at end of tick.
    pub agents_alive: u32,
    /// Set when this tick ended the run.
    pub end: Option<EndReason>,
}

/// Validated desires after the planning phase.
struct PlannedMoves {
    /// Moves to an adjacent walkable cell, ready for classification.
    intents: BTreeMap<AgentId, MoveIntent>,
    /// Outcomes already decided during planning: voluntary stays and
    /// malformed desires absorbed as stalls.
    outcomes: BTreeMap<AgentId, MoveOutcome>,
}

/// Requests sorted by destination class after the request phase.
struct RequestedMoves {
    /// Fresh requesters per resource cell this tick.
    resource_requests: BTreeMap<Cell, Vec<Contender>>,
    /// Intents of those requesters, for re-entry into the move set on a win.
    resource_intents: BTreeMap<AgentId, MoveIntent>,
    /// Movers whose destination is an ordinary cell.
    ordinary: BTreeMap<AgentId, MoveIntent>,
    /// Movers already holding their destination token. They skip the queue.
    holders: BTreeMap<AgentId, MoveIntent>,
    /// Priority keys of living agents, frozen for this tick.
    keys: BTreeMap<AgentId, u64>,
}

/// Moves that survived resolution, plus the keys commit needs for regrants.
struct ResolvedMoves {
    /// Authorized moves, one per agent.
    moves: BTreeMap<AgentId, MoveIntent>,
    /// Priority keys carried over from the request phase.
    keys: BTreeMap<AgentId, u64>,
}

/// Result of the post-move phase.
struct PostMoveResult {
    /// Collectibles picked up.
    collected: u32,
    /// Agents who died from this tick's energy costs.
    deaths: Vec<AgentId>,
}

/// The mutable simulation state threaded through the tick cycle.
///
/// This bundles everything the engine needs to run a tick. Construction
/// goes through [`SimulationState::new`], which validates spawns and grants
/// corridor tokens to agents that start on a bottleneck cell.
#[derive(Debug)]
pub struct SimulationState {
    /// The tick clock.
    pub clock: TickClock,
    /// The immutable maze geometry.
    pub grid: GridMap,
    /// Collectibles still on the floor.
    pub collectibles: CollectibleField,
    /// All agents, dead and alive, keyed by id.
    pub agents: BTreeMap<AgentId, AgentState>,
    /// Token ownership and wait queues for every bottleneck cell.
    pub registry: ResourceRegistry,
    /// Contention counters and per-agent tallies.
    pub metrics: MetricsTracker,
    /// Energy costs and rewards.
    pub schedule: EnergySchedule,
    /// How priority keys are derived.
    pub policy: PriorityPolicy,
    /// Forced-grant sweep period in ticks; zero disables the sweep.
    pub sweep_interval: u64,
    /// Tick limit for the run; zero means unlimited.
    pub max_ticks: u64,
    /// The single lottery source. All randomness in a run flows through it.
    pub rng: SmallRng,
    /// Seed the lottery source was built from.
    pub seed: u64,
}

impl SimulationState {
    /// Assemble a fresh state from a grid, a collectible field, and the
    /// run configuration.
    ///
    /// The grid is built by the caller since the maze generator needs the
    /// configured dimensions; everything else is read from `config`. Agent
    /// ids are assigned in declaration order. Agents spawning on a
    /// bottleneck cell receive its token immediately, keeping the
    /// occupant-holds-token invariant true from tick zero.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] if the agent list is empty, a spawn is
    /// blocked or duplicated, a name repeats, or the energy schedule is
    /// unusable.
    pub fn new(
        grid: GridMap,
        collectibles: CollectibleField,
        config: &SimulationConfig,
    ) -> Result<Self, SetupError> {
        let schedule = config.energy.to_schedule();
        schedule.validate()?;

        if config.agents.is_empty() {
            return Err(SetupError::NoAgents);
        }

        let mut agents = BTreeMap::new();
        let mut names = BTreeSet::new();
        let mut spawns = BTreeSet::new();
        for (index, spawn) in config.agents.iter().enumerate() {
            let cell = spawn.spawn_cell();
            if !grid.is_walkable(cell) {
                return Err(SetupError::SpawnBlocked {
                    name: spawn.name.clone(),
                    cell,
                });
            }
            if !spawns.insert(cell) {
                return Err(SetupError::DuplicateSpawn { cell });
            }
            if !names.insert(spawn.name.clone()) {
                return Err(SetupError::DuplicateName {
                    name: spawn.name.clone(),
                });
            }
            let id = AgentId::from_index(u32::try_from(index).unwrap_or(u32::MAX));
            agents.insert(
                id,
                AgentState::new(id, spawn.name.clone(), cell, schedule.initial_energy),
            );
        }

        let mut registry = ResourceRegistry::new(grid.bottleneck_cells());
        for agent in agents.values() {
            if registry.is_resource(agent.pos) {
                registry.grant(agent.pos, agent.id, 0)?;
            }
        }

        let metrics = MetricsTracker::new(agents.keys().copied());

        Ok(Self {
            clock: TickClock::new(),
            grid,
            collectibles,
            agents,
            registry,
            metrics,
            schedule,
            policy: config.arbitration.policy,
            sweep_interval: config.arbitration.sweep_interval,
            max_ticks: config.bounds.max_ticks,
            rng: SmallRng::seed_from_u64(config.arbitration.seed),
            seed: config.arbitration.seed,
        })
    }

    /// Number of living agents.
    pub fn agents_alive(&self) -> u32 {
        let count = self.agents.values().filter(|a| a.alive).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Snapshot of the observable state after the most recent tick.
    pub fn snapshot(&self) -> TickSnapshot {
        TickSnapshot {
            tick: self.clock.tick(),
            agents: self
                .agents
                .values()
                .map(|a| self.metrics.agent_report(a))
                .collect(),
            resources: self.registry.reports(),
            collectibles_remaining: u64::try_from(self.collectibles.remaining())
                .unwrap_or(u64::MAX),
            metrics: self.metrics.report(),
        }
    }

    /// Priority keys of all living agents under the configured policy.
    ///
    /// Keys are frozen at phase boundaries; contests within one phase all
    /// see the same values.
    fn priority_keys(&self) -> BTreeMap<AgentId, u64> {
        self.agents
            .values()
            .filter(|a| a.alive)
            .map(|a| {
                let grants = self.metrics.counters(a.id).grants;
                (a.id, priority_key(self.policy, a, grants))
            })
            .collect()
    }

    /// Positions of all living agents.
    fn live_positions(&self) -> BTreeMap<AgentId, Cell> {
        self.agents
            .values()
            .filter(|a| a.alive)
            .map(|a| (a.id, a.pos))
            .collect()
    }
}

/// Execute one complete tick of the simulation.
///
/// This is the main entry point for the engine. It runs all 8 phases in
/// sequence and returns a summary of what happened. Agent-level anomalies
/// (malformed desires, duplicate requests) are absorbed and counted; an
/// error return means the tick could not run at all and the state should
/// be treated as suspect.
pub fn run_tick(
    state: &mut SimulationState,
    planner: &mut dyn Pathfinder,
) -> Result<TickSummary, TickError> {
    let conflicts_before = state.metrics.conflicts_detected();
    let grants_before = state.metrics.successful_negotiations();
    let anomalies_before = state.metrics.anomalies();

    // --- Phase 1: Wake ---
    let tick = state.clock.advance()?;
    let mut deaths = sweep_deaths(state, tick)?;

    info!(tick, agents_alive = state.agents_alive(), "Tick started");

    // --- Phase 2: Plan ---
    let planned = phase_plan(state, planner, tick)?;
    let mut outcomes = planned.outcomes;

    // --- Phase 3: Request ---
    let requested = phase_request(state, planned.intents, tick)?;

    // --- Phase 4: Resolve ---
    let resolved = phase_resolve(state, requested, &mut outcomes, tick)?;

    // --- Phase 5: Commit ---
    let movers = phase_commit(state, resolved, &mut outcomes, tick)?;

    // --- Phase 6: Post-move ---
    let post = phase_post_move(state, &movers, tick)?;
    deaths.extend(post.deaths);

    // --- Phase 7: Metrics ---
    fold_wait_metrics(state, &outcomes);

    // --- Phase 8: Termination ---
    let end = check_termination(state, tick);

    let stalls = outcomes.values().filter(|o| o.stalled()).count();
    let summary = TickSummary {
        tick,
        outcomes,
        moves_committed: u32::try_from(movers.len()).unwrap_or(u32::MAX),
        stalls: u32::try_from(stalls).unwrap_or(u32::MAX),
        collected: post.collected,
        grants: state
            .metrics
            .successful_negotiations()
            .saturating_sub(grants_before),
        conflicts: state
            .metrics
            .conflicts_detected()
            .saturating_sub(conflicts_before),
        anomalies: state.metrics.anomalies().saturating_sub(anomalies_before),
        deaths,
        agents_alive: state.agents_alive(),
        end,
    };

    debug!(
        tick,
        moves = summary.moves_committed,
        stalls = summary.stalls,
        conflicts = summary.conflicts,
        grants = summary.grants,
        "Tick resolved"
    );

    Ok(summary)
}

/// Mark exhausted agents dead and hand their tokens to queued successors.
///
/// Runs at Wake, catching agents drained outside the cycle (operator
/// edits, restored state), and again after Post-move for this tick's
/// energy costs. Regrant lotteries only consider agents still alive.
fn sweep_deaths(state: &mut SimulationState, tick: u64) -> Result<Vec<AgentId>, TickError> {
    let dying: Vec<_> = state
        .agents
        .values()
        .filter_map(|a| check_death(a).map(|cause| (a.id, cause)))
        .collect();
    if dying.is_empty() {
        return Ok(Vec::new());
    }

    for (id, cause) in &dying {
        if let Some(agent) = state.agents.get_mut(id) {
            mark_dead(agent, *cause);
        }
    }

    // Keys are computed after the marking pass so the dead cannot win
    // their own former tokens back.
    let keys = state.priority_keys();
    let mut deaths = Vec::with_capacity(dying.len());
    for (id, _) in dying {
        let released =
            lifecycle::release_all_for_agent(&mut state.registry, &keys, &mut state.rng, id, tick)?;
        for (cell, outcome) in released {
            if let Some(winner) = outcome.regranted {
                debug!(tick, %cell, %winner, "Token inherited from dead holder");
                state.metrics.record_grant(winner);
            }
        }
        deaths.push(id);
    }
    Ok(deaths)
}

/// Phase 2: Plan.
///
/// Collects a batch of desires from the external planner and validates
/// each one. A desire for a non-adjacent or unwalkable cell is malformed:
/// the agent stalls, the anomaly counter ticks, and the rest of the batch
/// proceeds.
fn phase_plan(
    state: &mut SimulationState,
    planner: &mut dyn Pathfinder,
    tick: u64,
) -> Result<PlannedMoves, TickError> {
    let occupied: BTreeSet<Cell> = state
        .agents
        .values()
        .filter(|a| a.alive)
        .map(|a| a.pos)
        .collect();
    let view = WorldView {
        tick,
        grid: &state.grid,
        collectibles: &state.collectibles,
        agents: &state.agents,
        occupied: &occupied,
    };
    let desires = planner.plan_moves(&view)?;

    let mut intents = BTreeMap::new();
    let mut outcomes = BTreeMap::new();
    let mut malformed = Vec::new();
    for (&id, agent) in &state.agents {
        if !agent.alive {
            continue;
        }
        let Some(&target) = desires.get(&id) else {
            outcomes.insert(id, MoveOutcome::Stayed);
            continue;
        };
        if target == agent.pos {
            outcomes.insert(id, MoveOutcome::Stayed);
            continue;
        }
        if agent.pos.is_adjacent_to(target) && state.grid.is_walkable(target) {
            intents.insert(id, MoveIntent::new(id, agent.pos, target));
        } else {
            warn!(tick, agent = %id, %target, "Malformed desire; agent stalls");
            outcomes.insert(
                id,
                MoveOutcome::Stalled {
                    reason: DenialReason::MalformedDesire,
                },
            );
            malformed.push(id);
        }
    }
    for _ in &malformed {
        state.metrics.record_anomaly();
    }

    Ok(PlannedMoves { intents, outcomes })
}

/// Phase 3: Request.
///
/// Splits validated intents by destination class. Resource-bound movers
/// are enqueued with the registry under their current priority key unless
/// they already hold the destination token. Same-tick duplicates collapse
/// to one queue entry and count as anomalies.
fn phase_request(
    state: &mut SimulationState,
    intents: BTreeMap<AgentId, MoveIntent>,
    tick: u64,
) -> Result<RequestedMoves, TickError> {
    let keys = state.priority_keys();

    let mut resource_requests: BTreeMap<Cell, Vec<Contender>> = BTreeMap::new();
    let mut resource_intents = BTreeMap::new();
    let mut ordinary = BTreeMap::new();
    let mut holders = BTreeMap::new();

    for (id, intent) in intents {
        match state.registry.classify(intent.to) {
            CellClass::Resource(cell) => {
                if state.registry.current_holder(cell) == Some(id) {
                    // Re-entry into an already-held cell needs no queue trip.
                    holders.insert(id, intent);
                    continue;
                }
                let key = keys.get(&id).copied().unwrap_or(u64::MAX);
                let outcome = state.registry.enqueue(cell, id, key, tick)?;
                if outcome == EnqueueOutcome::DuplicateThisTick {
                    warn!(tick, agent = %id, %cell, "Duplicate request collapsed");
                    state.metrics.record_anomaly();
                }
                resource_requests
                    .entry(cell)
                    .or_default()
                    .push(Contender { agent_id: id, key });
                resource_intents.insert(id, intent);
            }
            CellClass::Free => {
                ordinary.insert(id, intent);
            }
        }
    }

    Ok(RequestedMoves {
        resource_requests,
        resource_intents,
        ordinary,
        holders,
        keys,
    })
}

/// Phase 4: Resolve.
///
/// Orders this tick's contention: the forced-grant sweep when due, then
/// resource contests, ordinary destination contests, swap cancellation,
/// and finally the blocked-by-stationary fixpoint. Produces the final set
/// of authorized moves.
#[allow(clippy::too_many_lines)]
fn phase_resolve(
    state: &mut SimulationState,
    requested: RequestedMoves,
    outcomes: &mut BTreeMap<AgentId, MoveOutcome>,
    tick: u64,
) -> Result<ResolvedMoves, TickError> {
    let RequestedMoves {
        resource_requests,
        resource_intents,
        ordinary,
        holders,
        keys,
    } = requested;

    let mut moves: BTreeMap<AgentId, MoveIntent> = holders;

    // 4a. Forced-grant sweep. Queues whose head went stale get their
    // oldest living requester served ahead of any fresh contest.
    let sweep_due =
        state.sweep_interval > 0 && tick.checked_rem(state.sweep_interval) == Some(0);
    if sweep_due {
        let live: BTreeSet<AgentId> = keys.keys().copied().collect();
        let swept = lifecycle::forced_sweep(&mut state.registry, &live, tick)?;
        for (cell, agent) in swept {
            info!(tick, %cell, %agent, "Forced grant to stale queue head");
            state.metrics.record_forced_grant(agent);
        }
    }

    // 4b. Resource contests, in cell order.
    for (cell, contenders) in &resource_requests {
        resolve_resource_cell(
            state,
            *cell,
            contenders,
            &resource_intents,
            &mut moves,
            outcomes,
            tick,
        )?;
    }

    // 4c. Ordinary destination contests.
    let mut by_dest: BTreeMap<Cell, Vec<Contender>> = BTreeMap::new();
    for (id, intent) in &ordinary {
        let key = keys.get(id).copied().unwrap_or(u64::MAX);
        by_dest
            .entry(intent.to)
            .or_default()
            .push(Contender { agent_id: *id, key });
    }
    for (cell, contenders) in &by_dest {
        if contenders.len() < 2 {
            if let Some(sole) = contenders.first() {
                if let Some(intent) = ordinary.get(&sole.agent_id) {
                    moves.insert(sole.agent_id, *intent);
                }
            }
            continue;
        }
        let Some(result) = arbitration::resolve_contest(contenders, &mut state.rng) else {
            continue;
        };
        state.metrics.record_conflict();
        debug!(tick, %cell, winner = %result.winner, "Contested destination resolved");
        if let Some(intent) = ordinary.get(&result.winner) {
            moves.insert(result.winner, *intent);
        }
        for loser in result.losers {
            outcomes.insert(
                loser,
                MoveOutcome::Stalled {
                    reason: DenialReason::LostLottery,
                },
            );
            state.metrics.record_denial(loser);
        }
    }

    // 4d. Swap cancellation. Pairwise position exchanges would teleport
    // through each other, so both sides stall.
    for (a, b) in arbitration::detect_swaps(&moves) {
        for agent in [a, b] {
            if moves.remove(&agent).is_some() {
                outcomes.insert(
                    agent,
                    MoveOutcome::Stalled {
                        reason: DenialReason::SwapCancelled,
                    },
                );
            }
        }
        debug!(tick, first = %a, second = %b, "Swap cancelled");
        state.metrics.record_swap_cancelled();
    }

    // 4e. Blocked-by-stationary fixpoint. Cancelling one move can strand
    // the mover behind it, so this iterates until quiet.
    let mut stationary: BTreeSet<Cell> = state
        .agents
        .values()
        .filter(|a| a.alive && !moves.contains_key(&a.id))
        .map(|a| a.pos)
        .collect();
    for agent in arbitration::cancel_blocked(&mut moves, &mut stationary) {
        debug!(tick, %agent, "Move blocked by stationary occupant");
        outcomes.insert(
            agent,
            MoveOutcome::Stalled {
                reason: DenialReason::DestinationOccupied,
            },
        );
    }

    Ok(ResolvedMoves { moves, keys })
}

/// Resolve one resource cell: deny everyone when it is held, otherwise
/// grant by lowest key with a lottery among ties and empty the queue.
fn resolve_resource_cell(
    state: &mut SimulationState,
    cell: Cell,
    contenders: &[Contender],
    resource_intents: &BTreeMap<AgentId, MoveIntent>,
    moves: &mut BTreeMap<AgentId, MoveIntent>,
    outcomes: &mut BTreeMap<AgentId, MoveOutcome>,
    tick: u64,
) -> Result<(), TickError> {
    if let Some(holder) = state.registry.current_holder(cell) {
        // The holder is never in this batch: re-entry is routed around the
        // queue at request time, and the sweep only grants heads whose
        // request predates this tick. Everyone here waits in place and
        // keeps their queue position.
        for contender in contenders {
            outcomes.insert(
                contender.agent_id,
                MoveOutcome::Stalled {
                    reason: DenialReason::ResourceHeld,
                },
            );
            state.metrics.record_denial(contender.agent_id);
        }
        debug!(tick, %cell, %holder, waiting = contenders.len(), "Resource held; requesters queued");
        return Ok(());
    }

    let Some(result) = arbitration::resolve_contest(contenders, &mut state.rng) else {
        return Ok(());
    };
    state.registry.grant(cell, result.winner, tick)?;
    state.metrics.record_grant(result.winner);
    if result.contested {
        state.metrics.record_conflict();
        debug!(
            tick,
            %cell,
            winner = %result.winner,
            contenders = contenders.len(),
            "Contested resource granted"
        );
    }
    if let Some(intent) = resource_intents.get(&result.winner) {
        moves.insert(result.winner, *intent);
    }
    for loser in result.losers {
        outcomes.insert(
            loser,
            MoveOutcome::Stalled {
                reason: DenialReason::LostLottery,
            },
        );
        state.metrics.record_denial(loser);
    }
    // Resolution empties the queue; losers re-request next tick.
    let _ = state.registry.drain_queue(cell);
    Ok(())
}

/// Phase 5: Commit.
///
/// Applies every authorized move simultaneously, releases tokens for
/// vacated cells (with an immediate regrant lottery over the queue),
/// revokes grants that lapsed unused, and charges energy per outcome.
fn phase_commit(
    state: &mut SimulationState,
    resolved: ResolvedMoves,
    outcomes: &mut BTreeMap<AgentId, MoveOutcome>,
    tick: u64,
) -> Result<Vec<AgentId>, TickError> {
    let ResolvedMoves { moves, keys } = resolved;

    // 5a. Apply moves. From/to cells were frozen at plan time, so update
    // order cannot matter.
    let mut movers = Vec::with_capacity(moves.len());
    for (id, intent) in &moves {
        let Some(agent) = state.agents.get_mut(id) else {
            continue;
        };
        agent.pos = intent.to;
        outcomes.insert(
            *id,
            MoveOutcome::Moved {
                from: intent.from,
                to: intent.to,
            },
        );
        movers.push(*id);
    }

    // 5b. Release vacated tokens. A mover leaving its held cell hands the
    // token straight to the best queued survivor, if any.
    for (id, intent) in &moves {
        if state.registry.current_holder(intent.from) == Some(*id) {
            let outcome = lifecycle::release_and_regrant(
                &mut state.registry,
                &keys,
                &mut state.rng,
                intent.from,
                *id,
                tick,
            )?;
            if let Some(winner) = outcome.regranted {
                debug!(tick, cell = %intent.from, %winner, "Vacated token regranted");
                state.metrics.record_grant(winner);
            }
        }
    }

    // 5c. Revoke grants that lapsed unused. A token granted before this
    // tick whose holder is still standing elsewhere goes back to the pool.
    let positions = state.live_positions();
    let revoked = lifecycle::revoke_unused_grants(
        &mut state.registry,
        &keys,
        &mut state.rng,
        &positions,
        tick,
    )?;
    for revocation in revoked {
        warn!(
            tick,
            cell = %revocation.cell,
            holder = %revocation.holder,
            "Unused grant revoked"
        );
        if let Some(winner) = revocation.regranted {
            state.metrics.record_grant(winner);
        }
    }

    // 5d. Energy accounting per outcome.
    for (id, agent) in &mut state.agents {
        if !agent.alive {
            continue;
        }
        match outcomes.get(id) {
            Some(MoveOutcome::Moved { .. }) => energy::apply_move_cost(agent, &state.schedule),
            Some(MoveOutcome::Stalled { .. }) => {
                energy::apply_stall_penalty(agent, &state.schedule);
            }
            Some(MoveOutcome::Stayed) | None => energy::apply_idle_cost(agent, &state.schedule),
        }
    }

    Ok(movers)
}

/// Phase 6: Post-move.
///
/// Agents that changed position pick up whatever their new cell holds,
/// then this tick's energy costs are checked for deaths. Pickups land
/// before the death check, so a pellet can save a drained agent.
fn phase_post_move(
    state: &mut SimulationState,
    movers: &[AgentId],
    tick: u64,
) -> Result<PostMoveResult, TickError> {
    let mut collected: u32 = 0;
    for id in movers {
        let Some(agent) = state.agents.get_mut(id) else {
            continue;
        };
        if let Some(kind) = state.collectibles.take(agent.pos) {
            let score = energy::apply_pickup(agent, kind, &state.schedule);
            collected = collected.saturating_add(1);
            debug!(tick, agent = %id, cell = %agent.pos, ?kind, score, "Collectible picked up");
        }
    }

    let deaths = sweep_deaths(state, tick)?;
    Ok(PostMoveResult { collected, deaths })
}

/// Phase 7: Metrics.
///
/// Folds the final outcomes into wait bookkeeping. A stall extends (or
/// opens) the agent's wait episode; moving or staying closes it.
fn fold_wait_metrics(state: &mut SimulationState, outcomes: &BTreeMap<AgentId, MoveOutcome>) {
    for (id, outcome) in outcomes {
        match outcome {
            MoveOutcome::Stalled { .. } => state.metrics.record_wait(*id),
            MoveOutcome::Moved { .. } | MoveOutcome::Stayed => state.metrics.end_wait(*id),
        }
    }
}

/// Phase 8: Termination.
fn check_termination(state: &SimulationState, tick: u64) -> Option<EndReason> {
    if state.collectibles.is_empty() {
        return Some(EndReason::CollectiblesExhausted);
    }
    if state.agents_alive() == 0 {
        return Some(EndReason::Extinction);
    }
    if state.max_ticks > 0 && tick >= state.max_ticks {
        return Some(EndReason::TickLimitReached);
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pathfind::{HoldPosition, ScriptedPathfinder};
    use gridlock_types::Collectible;

    /// A 5x3 grid whose middle row is a single-file corridor. Cells
    /// (1,1), (2,1), and (3,1) have exactly two walkable neighbors and
    /// register as resources; (0,1) and (4,1) are dead ends.
    fn corridor_grid() -> GridMap {
        let mut grid = GridMap::new(5, 3).unwrap();
        for x in 0..5 {
            grid.set_wall(Cell::new(x, 0)).unwrap();
            grid.set_wall(Cell::new(x, 2)).unwrap();
        }
        grid
    }

    /// A fully open 5x5 field. Interior cells have degree 3 or 4; only
    /// the four corners register as resources, and no test touches them.
    fn open_grid() -> GridMap {
        GridMap::new(5, 5).unwrap()
    }

    fn config_with_agents(spawns: &[(&str, u32, u32)]) -> SimulationConfig {
        let mut yaml = String::from("agents:\n");
        for (name, x, y) in spawns {
            yaml.push_str(&format!("  - name: {name}\n    x: {x}\n    y: {y}\n"));
        }
        SimulationConfig::parse(&yaml).unwrap()
    }

    fn state_on(grid: GridMap, config: &SimulationConfig) -> SimulationState {
        SimulationState::new(grid, CollectibleField::new(), config).unwrap()
    }

    fn agent(state: &SimulationState, index: u32) -> &AgentState {
        state.agents.get(&AgentId::from_index(index)).unwrap()
    }

    #[test]
    fn spawn_on_bottleneck_grants_token() {
        let config = config_with_agents(&[("a", 1, 1)]);
        let state = state_on(corridor_grid(), &config);
        assert_eq!(
            state.registry.current_holder(Cell::new(1, 1)),
            Some(AgentId::from_index(0))
        );
    }

    #[test]
    fn spawn_on_wall_is_rejected() {
        let config = config_with_agents(&[("a", 0, 0)]);
        let err = SimulationState::new(corridor_grid(), CollectibleField::new(), &config);
        assert!(matches!(err, Err(SetupError::SpawnBlocked { .. })));
    }

    #[test]
    fn duplicate_spawn_is_rejected() {
        let config = config_with_agents(&[("a", 1, 1), ("b", 1, 1)]);
        let err = SimulationState::new(corridor_grid(), CollectibleField::new(), &config);
        assert!(matches!(err, Err(SetupError::DuplicateSpawn { .. })));
    }

    #[test]
    fn lower_priority_key_wins_contested_resource() {
        let config = config_with_agents(&[("a", 1, 1), ("b", 3, 1)]);
        let mut state = state_on(corridor_grid(), &config);
        let a = AgentId::from_index(0);
        let b = AgentId::from_index(1);
        // LowestScore policy: b's higher score makes it yield.
        state.agents.get_mut(&b).unwrap().score = 5;

        let contested = Cell::new(2, 1);
        let mut planner = ScriptedPathfinder::new()
            .with_route(a, [contested])
            .with_route(b, [contested]);
        let mut pellets = CollectibleField::new();
        pellets
            .place(&state.grid, Cell::new(0, 1), Collectible::Pellet)
            .unwrap();
        state.collectibles = pellets;

        let summary = run_tick(&mut state, &mut planner).unwrap();

        assert_eq!(agent(&state, 0).pos, contested);
        assert_eq!(agent(&state, 1).pos, Cell::new(3, 1));
        assert_eq!(state.registry.current_holder(contested), Some(a));
        assert_eq!(state.registry.current_holder(Cell::new(1, 1)), None);
        assert_eq!(state.registry.queue_len(contested), 0);
        assert_eq!(summary.conflicts, 1);
        assert_eq!(
            summary.outcomes.get(&b),
            Some(&MoveOutcome::Stalled {
                reason: DenialReason::LostLottery
            })
        );
        assert_eq!(state.metrics.failed_negotiations(), 1);
        // Mover pays the move cost, staller the stall penalty.
        assert_eq!(agent(&state, 0).energy, 99);
        assert_eq!(agent(&state, 1).energy, 98);
    }

    #[test]
    fn three_way_tie_counts_one_conflict() {
        let config = config_with_agents(&[("a", 1, 2), ("b", 3, 2), ("c", 2, 1)]);
        let mut state = state_on(open_grid(), &config);
        let center = Cell::new(2, 2);
        let mut planner = ScriptedPathfinder::new();
        for index in 0..3 {
            planner.push_step(AgentId::from_index(index), center);
        }
        let mut pellets = CollectibleField::new();
        pellets
            .place(&state.grid, Cell::new(4, 4), Collectible::Pellet)
            .unwrap();
        state.collectibles = pellets;

        let summary = run_tick(&mut state, &mut planner).unwrap();

        assert_eq!(summary.conflicts, 1);
        let moved = summary.outcomes.values().filter(|o| o.moved()).count();
        let lost = summary
            .outcomes
            .values()
            .filter(|o| {
                matches!(
                    o,
                    MoveOutcome::Stalled {
                        reason: DenialReason::LostLottery
                    }
                )
            })
            .count();
        assert_eq!(moved, 1);
        assert_eq!(lost, 2);
        let at_center = state.agents.values().filter(|a| a.pos == center).count();
        assert_eq!(at_center, 1);
    }

    #[test]
    fn held_resource_denies_but_keeps_requester_queued() {
        let config = config_with_agents(&[("holder", 2, 1), ("waiter", 3, 1)]);
        let mut state = state_on(corridor_grid(), &config);
        let waiter = AgentId::from_index(1);
        let held = Cell::new(2, 1);
        let mut planner = ScriptedPathfinder::new().with_route(waiter, [held, held]);
        let mut pellets = CollectibleField::new();
        pellets
            .place(&state.grid, Cell::new(0, 1), Collectible::Pellet)
            .unwrap();
        state.collectibles = pellets;

        for _ in 0..2 {
            let summary = run_tick(&mut state, &mut planner).unwrap();
            assert_eq!(
                summary.outcomes.get(&waiter),
                Some(&MoveOutcome::Stalled {
                    reason: DenialReason::ResourceHeld
                })
            );
        }

        assert_eq!(agent(&state, 1).pos, Cell::new(3, 1));
        assert_eq!(state.registry.queue_len(held), 1);
        assert_eq!(state.metrics.failed_negotiations(), 2);
        // Denials by a holder are not conflicts.
        assert_eq!(state.metrics.conflicts_detected(), 0);
        // Two waiting ticks, one episode.
        let counters = state.metrics.counters(waiter);
        assert_eq!(counters.wait_ticks, 2);
        assert_eq!(counters.wait_events, 1);
        assert_eq!(state.metrics.anomalies(), 0);
    }

    #[test]
    fn inherited_token_admits_waiter_without_requeueing() {
        let config = config_with_agents(&[("holder", 2, 1), ("waiter", 1, 1)]);
        let mut state = state_on(corridor_grid(), &config);
        let waiter = AgentId::from_index(1);
        let inherited = Cell::new(2, 1);
        let mut planner = ScriptedPathfinder::new()
            .with_route(AgentId::from_index(0), [Cell::new(3, 1)])
            .with_route(waiter, [inherited, inherited]);
        let mut pellets = CollectibleField::new();
        pellets
            .place(&state.grid, Cell::new(0, 1), Collectible::Pellet)
            .unwrap();
        state.collectibles = pellets;

        // Tick 1: the cell is held, so the waiter is denied and queued;
        // the departing holder's release hands the token to the waiter
        // at commit.
        let first = run_tick(&mut state, &mut planner).unwrap();
        assert_eq!(
            first.outcomes.get(&waiter),
            Some(&MoveOutcome::Stalled {
                reason: DenialReason::ResourceHeld
            })
        );
        assert_eq!(state.registry.current_holder(inherited), Some(waiter));
        assert_eq!(agent(&state, 1).pos, Cell::new(1, 1));

        // Tick 2: the waiter re-desires the cell it now holds. Entry rides
        // the token straight past the queue, so the held-cell denial path
        // never sees its own holder among the requesters.
        let second = run_tick(&mut state, &mut planner).unwrap();
        assert_eq!(
            second.outcomes.get(&waiter),
            Some(&MoveOutcome::Moved {
                from: Cell::new(1, 1),
                to: inherited
            })
        );
        assert_eq!(agent(&state, 1).pos, inherited);
        assert_eq!(second.grants, 0);
        assert_eq!(state.registry.queue_len(inherited), 0);
        assert_eq!(state.metrics.failed_negotiations(), 1);
        assert_eq!(state.metrics.anomalies(), 0);
    }

    #[test]
    fn three_way_resource_tie_grants_one_and_drains_queue() {
        let config = config_with_agents(&[("a", 1, 0), ("b", 0, 1), ("c", 1, 1)]);
        let mut state = state_on(open_grid(), &config);
        let corner = Cell::new(0, 0);
        // Equal scores force a full tie; the lottery must pick exactly one.
        for contender in state.agents.values_mut() {
            contender.score = 3;
        }

        // A degree-2 cell has only two approach cells, so a same-tick
        // triple is staged directly the way the request phase batches it.
        let keys = state.priority_keys();
        let positions: Vec<(AgentId, Cell)> =
            state.agents.values().map(|a| (a.id, a.pos)).collect();
        let mut contenders = Vec::new();
        let mut intents = BTreeMap::new();
        for (id, pos) in positions {
            let key = keys.get(&id).copied().unwrap();
            state.registry.enqueue(corner, id, key, 1).unwrap();
            contenders.push(Contender { agent_id: id, key });
            intents.insert(id, MoveIntent::new(id, pos, corner));
        }
        assert_eq!(state.registry.queue_len(corner), 3);

        let mut moves = BTreeMap::new();
        let mut outcomes = BTreeMap::new();
        resolve_resource_cell(
            &mut state,
            corner,
            &contenders,
            &intents,
            &mut moves,
            &mut outcomes,
            1,
        )
        .unwrap();

        assert_eq!(moves.len(), 1);
        let winner = *moves.keys().next().unwrap();
        assert_eq!(moves.get(&winner).unwrap().to, corner);
        assert_eq!(state.registry.current_holder(corner), Some(winner));
        // One conflict for the whole pile-up, not one per loser.
        assert_eq!(state.metrics.conflicts_detected(), 1);
        assert_eq!(state.metrics.successful_negotiations(), 1);
        assert_eq!(state.metrics.failed_negotiations(), 2);
        assert_eq!(state.registry.queue_len(corner), 0);
        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes.contains_key(&winner));
        for outcome in outcomes.values() {
            assert_eq!(
                outcome,
                &MoveOutcome::Stalled {
                    reason: DenialReason::LostLottery
                }
            );
        }
    }

    #[test]
    fn corridor_chain_hands_tokens_forward() {
        let config = config_with_agents(&[("a", 1, 1)]);
        let mut state = state_on(corridor_grid(), &config);
        let a = AgentId::from_index(0);
        let mut planner =
            ScriptedPathfinder::new().with_route(a, [Cell::new(2, 1), Cell::new(3, 1)]);
        let mut pellets = CollectibleField::new();
        pellets
            .place(&state.grid, Cell::new(0, 1), Collectible::Pellet)
            .unwrap();
        state.collectibles = pellets;

        let first = run_tick(&mut state, &mut planner).unwrap();
        assert_eq!(first.moves_committed, 1);
        assert_eq!(state.registry.current_holder(Cell::new(1, 1)), None);
        assert_eq!(state.registry.current_holder(Cell::new(2, 1)), Some(a));

        let second = run_tick(&mut state, &mut planner).unwrap();
        assert_eq!(second.moves_committed, 1);
        assert_eq!(agent(&state, 0).pos, Cell::new(3, 1));
        assert_eq!(state.registry.current_holder(Cell::new(2, 1)), None);
        assert_eq!(state.registry.current_holder(Cell::new(3, 1)), Some(a));
        // Two uncontested grants, zero conflicts.
        assert_eq!(state.metrics.successful_negotiations(), 2);
        assert_eq!(state.metrics.conflicts_detected(), 0);
    }

    #[test]
    fn dead_holder_frees_resource_for_queued_waiter() {
        let config = config_with_agents(&[("holder", 2, 1), ("waiter", 3, 1)]);
        let mut state = state_on(corridor_grid(), &config);
        let holder = AgentId::from_index(0);
        let waiter = AgentId::from_index(1);
        let held = Cell::new(2, 1);
        let mut planner = ScriptedPathfinder::new().with_route(waiter, [held, held]);
        let mut pellets = CollectibleField::new();
        pellets
            .place(&state.grid, Cell::new(0, 1), Collectible::Pellet)
            .unwrap();
        state.collectibles = pellets;

        let first = run_tick(&mut state, &mut planner).unwrap();
        assert_eq!(state.registry.queue_len(held), 1);
        assert!(first.deaths.is_empty());

        // Drain the holder between ticks; the wake sweep processes it.
        state.agents.get_mut(&holder).unwrap().energy = 0;
        let second = run_tick(&mut state, &mut planner).unwrap();

        assert_eq!(second.deaths, vec![holder]);
        assert!(!agent(&state, 0).alive);
        assert_eq!(agent(&state, 1).pos, held);
        assert_eq!(state.registry.current_holder(held), Some(waiter));
        assert_eq!(state.registry.current_holder(Cell::new(3, 1)), None);
    }

    #[test]
    fn swap_is_cancelled_for_both_sides() {
        let config = config_with_agents(&[("a", 1, 2), ("b", 2, 2)]);
        let mut state = state_on(open_grid(), &config);
        let a = AgentId::from_index(0);
        let b = AgentId::from_index(1);
        let mut planner = ScriptedPathfinder::new()
            .with_route(a, [Cell::new(2, 2)])
            .with_route(b, [Cell::new(1, 2)]);
        let mut pellets = CollectibleField::new();
        pellets
            .place(&state.grid, Cell::new(4, 4), Collectible::Pellet)
            .unwrap();
        state.collectibles = pellets;

        let summary = run_tick(&mut state, &mut planner).unwrap();

        assert_eq!(summary.moves_committed, 0);
        assert_eq!(agent(&state, 0).pos, Cell::new(1, 2));
        assert_eq!(agent(&state, 1).pos, Cell::new(2, 2));
        for id in [a, b] {
            assert_eq!(
                summary.outcomes.get(&id),
                Some(&MoveOutcome::Stalled {
                    reason: DenialReason::SwapCancelled
                })
            );
            let counters = state.metrics.counters(id);
            assert_eq!(counters.wait_events, 1);
        }
        assert_eq!(state.metrics.swaps_cancelled(), 1);
        assert_eq!(summary.conflicts, 1);
        // A cancelled swap is a wait, not a failed negotiation.
        assert_eq!(state.metrics.failed_negotiations(), 0);
        assert_eq!(agent(&state, 0).energy, 98);
    }

    #[test]
    fn blocked_column_stalls_without_denial() {
        let config = config_with_agents(&[("mover", 1, 2), ("post", 2, 2)]);
        let mut state = state_on(open_grid(), &config);
        let mover = AgentId::from_index(0);
        let mut planner = ScriptedPathfinder::new().with_route(mover, [Cell::new(2, 2)]);
        let mut pellets = CollectibleField::new();
        pellets
            .place(&state.grid, Cell::new(4, 4), Collectible::Pellet)
            .unwrap();
        state.collectibles = pellets;

        let summary = run_tick(&mut state, &mut planner).unwrap();

        assert_eq!(
            summary.outcomes.get(&mover),
            Some(&MoveOutcome::Stalled {
                reason: DenialReason::DestinationOccupied
            })
        );
        assert_eq!(agent(&state, 0).pos, Cell::new(1, 2));
        assert_eq!(summary.conflicts, 0);
        assert_eq!(state.metrics.failed_negotiations(), 0);
        assert_eq!(state.metrics.counters(mover).wait_ticks, 1);
    }

    #[test]
    fn malformed_desire_stalls_and_counts_anomaly() {
        let config = config_with_agents(&[("a", 2, 2)]);
        let mut state = state_on(open_grid(), &config);
        let a = AgentId::from_index(0);
        let mut planner = ScriptedPathfinder::new().with_route(a, [Cell::new(0, 0)]);
        let mut pellets = CollectibleField::new();
        pellets
            .place(&state.grid, Cell::new(4, 4), Collectible::Pellet)
            .unwrap();
        state.collectibles = pellets;

        let summary = run_tick(&mut state, &mut planner).unwrap();

        assert_eq!(summary.anomalies, 1);
        assert_eq!(
            summary.outcomes.get(&a),
            Some(&MoveOutcome::Stalled {
                reason: DenialReason::MalformedDesire
            })
        );
        assert_eq!(agent(&state, 0).energy, 98);
    }

    #[test]
    fn vacated_token_regrant_is_revoked_when_unused() {
        let config = config_with_agents(&[("holder", 2, 1), ("waiter", 1, 1)]);
        let mut state = state_on(corridor_grid(), &config);
        let holder = AgentId::from_index(0);
        let waiter = AgentId::from_index(1);
        let vacated = Cell::new(2, 1);
        // Tick 1: waiter requests the held cell and queues. Tick 2: the
        // holder departs and the waiter inherits the token without moving.
        // Tick 3: the unused grant lapses and is revoked.
        let mut planner = ScriptedPathfinder::new().with_route(holder, [Cell::new(3, 1)]);
        let mut waiter_route = ScriptedPathfinder::new().with_route(waiter, [vacated]);
        let mut pellets = CollectibleField::new();
        pellets
            .place(&state.grid, Cell::new(0, 1), Collectible::Pellet)
            .unwrap();
        state.collectibles = pellets;

        let _ = run_tick(&mut state, &mut waiter_route).unwrap();
        assert_eq!(state.registry.queue_len(vacated), 1);

        let _ = run_tick(&mut state, &mut planner).unwrap();
        assert_eq!(agent(&state, 0).pos, Cell::new(3, 1));
        assert_eq!(state.registry.current_holder(vacated), Some(waiter));
        assert_eq!(agent(&state, 1).pos, Cell::new(1, 1));

        let third = run_tick(&mut state, &mut planner).unwrap();
        assert_eq!(third.tick, 3);
        assert_eq!(state.registry.current_holder(vacated), None);
    }

    #[test]
    fn pickup_ends_run_when_floor_is_clear() {
        let config = config_with_agents(&[("a", 1, 1)]);
        let mut state = state_on(GridMap::new(3, 3).unwrap(), &config);
        let a = AgentId::from_index(0);
        let pellet_cell = Cell::new(2, 1);
        let mut pellets = CollectibleField::new();
        pellets
            .place(&state.grid, pellet_cell, Collectible::Pellet)
            .unwrap();
        state.collectibles = pellets;
        let mut planner = ScriptedPathfinder::new().with_route(a, [pellet_cell]);

        let summary = run_tick(&mut state, &mut planner).unwrap();

        assert_eq!(summary.collected, 1);
        assert_eq!(summary.end, Some(EndReason::CollectiblesExhausted));
        assert_eq!(agent(&state, 0).score, 10);
        // Move cost then pellet energy: 100 - 1 + 2.
        assert_eq!(agent(&state, 0).energy, 101);
        assert!(state.collectibles.is_empty());
    }

    #[test]
    fn stall_deaths_end_run_in_extinction() {
        let config = config_with_agents(&[("a", 1, 2), ("b", 2, 2)]);
        let mut state = state_on(open_grid(), &config);
        let a = AgentId::from_index(0);
        let b = AgentId::from_index(1);
        state.agents.get_mut(&a).unwrap().energy = 1;
        state.agents.get_mut(&b).unwrap().energy = 1;
        let mut planner = ScriptedPathfinder::new()
            .with_route(a, [Cell::new(2, 2)])
            .with_route(b, [Cell::new(1, 2)]);
        let mut pellets = CollectibleField::new();
        pellets
            .place(&state.grid, Cell::new(4, 4), Collectible::Pellet)
            .unwrap();
        state.collectibles = pellets;

        let summary = run_tick(&mut state, &mut planner).unwrap();

        assert_eq!(summary.deaths.len(), 2);
        assert_eq!(summary.agents_alive, 0);
        assert_eq!(summary.end, Some(EndReason::Extinction));
    }

    #[test]
    fn run_stops_at_tick_limit() {
        let config = config_with_agents(&[("a", 1, 1)]);
        let mut state = state_on(GridMap::new(3, 3).unwrap(), &config);
        state.max_ticks = 2;
        let mut pellets = CollectibleField::new();
        pellets
            .place(&state.grid, Cell::new(2, 2), Collectible::Pellet)
            .unwrap();
        state.collectibles = pellets;
        let mut planner = HoldPosition::new();

        let first = run_tick(&mut state, &mut planner).unwrap();
        assert_eq!(first.end, None);
        let second = run_tick(&mut state, &mut planner).unwrap();
        assert_eq!(second.end, Some(EndReason::TickLimitReached));
    }

    #[test]
    fn identical_seeds_replay_identically() {
        let build = || {
            let config = config_with_agents(&[("a", 1, 2), ("b", 3, 2), ("c", 2, 1)]);
            let mut state = state_on(open_grid(), &config);
            let mut pellets = CollectibleField::new();
            pellets
                .place(&state.grid, Cell::new(4, 4), Collectible::Pellet)
                .unwrap();
            state.collectibles = pellets;
            let mut planner = ScriptedPathfinder::new();
            for index in 0..3 {
                planner.push_step(AgentId::from_index(index), Cell::new(2, 2));
            }
            (state, planner)
        };

        let (mut first_state, mut first_planner) = build();
        let (mut second_state, mut second_planner) = build();
        let first = run_tick(&mut first_state, &mut first_planner).unwrap();
        let second = run_tick(&mut second_state, &mut second_planner).unwrap();

        assert_eq!(first.outcomes, second.outcomes);
        let left = serde_json::to_value(first_state.snapshot()).unwrap();
        let right = serde_json::to_value(second_state.snapshot()).unwrap();
        assert_eq!(left, right);
    }

    #[test]
    fn summary_counts_line_up() {
        let config = config_with_agents(&[("a", 1, 1), ("b", 3, 1)]);
        let mut state = state_on(corridor_grid(), &config);
        let contested = Cell::new(2, 1);
        let mut planner = ScriptedPathfinder::new()
            .with_route(AgentId::from_index(0), [contested])
            .with_route(AgentId::from_index(1), [contested]);
        let mut pellets = CollectibleField::new();
        pellets
            .place(&state.grid, Cell::new(0, 1), Collectible::Pellet)
            .unwrap();
        state.collectibles = pellets;

        let summary = run_tick(&mut state, &mut planner).unwrap();

        assert_eq!(summary.tick, 1);
        assert_eq!(summary.moves_committed, 1);
        assert_eq!(summary.stalls, 1);
        assert_eq!(summary.grants, 1);
        assert_eq!(summary.agents_alive, 2);
        assert_eq!(summary.end, None);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.tick, 1);
        assert_eq!(snapshot.collectibles_remaining, 1);
        assert_eq!(snapshot.agents.len(), 2);
    }
}
