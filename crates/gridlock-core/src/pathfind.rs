//! Pathfinder trait and stub implementations.
//!
//! During the planning phase the engine hands the pathfinder a read-only
//! [`WorldView`] and collects one desired destination per live agent. The
//! trait abstracts where desires come from: a search algorithm, a scripted
//! route, or a test stub. Planning is strictly read-only; whatever the
//! pathfinder returns is validated and arbitrated by the tick cycle, never
//! trusted.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use gridlock_types::{AgentId, AgentState, Cell};
use gridlock_world::{CollectibleField, GridMap};

/// Errors from a pathfinder implementation.
#[derive(Debug, thiserror::Error)]
pub enum PathfinderError {
    /// The pathfinder failed internally.
    #[error("pathfinder error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}

/// Read-only view of the world handed to the pathfinder each tick.
#[derive(Debug, Clone, Copy)]
pub struct WorldView<'a> {
    /// The tick being planned.
    pub tick: u64,
    /// The static grid.
    pub grid: &'a GridMap,
    /// Collectibles still on the grid.
    pub collectibles: &'a CollectibleField,
    /// All agents keyed by id, dead ones included.
    pub agents: &'a BTreeMap<AgentId, AgentState>,
    /// Current positions of live agents, the planning agent's own included.
    pub occupied: &'a BTreeSet<Cell>,
}

/// A source of desired moves.
pub trait Pathfinder {
    /// Produce the desired destination for each live agent this tick.
    ///
    /// Agents without an entry stay in place. Entries for dead or unknown
    /// agents are ignored. A destination that is neither the agent's own
    /// cell nor an adjacent walkable cell is malformed; the engine absorbs
    /// it by stalling the agent for the tick.
    ///
    /// # Errors
    ///
    /// Returns [`PathfinderError`] only if planning fails as a whole;
    /// individually bad desires should be returned as-is and left to the
    /// engine to absorb.
    fn plan_moves(
        &mut self,
        view: &WorldView<'_>,
    ) -> Result<BTreeMap<AgentId, Cell>, PathfinderError>;
}

/// A pathfinder that never moves anyone.
///
/// Lets the tick cycle be exercised end-to-end without any movement logic;
/// every agent idles in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldPosition;

impl HoldPosition {
    /// Create a new hold-position pathfinder.
    pub const fn new() -> Self {
        Self
    }
}

impl Pathfinder for HoldPosition {
    fn plan_moves(
        &mut self,
        _view: &WorldView<'_>,
    ) -> Result<BTreeMap<AgentId, Cell>, PathfinderError> {
        Ok(BTreeMap::new())
    }
}

/// A pathfinder that replays pre-programmed routes.
///
/// Each agent pops one step per tick from its route; an exhausted route
/// means the agent stays put. Mainly used to drive precise contention
/// setups in tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPathfinder {
    routes: BTreeMap<AgentId, VecDeque<Cell>>,
}

impl ScriptedPathfinder {
    /// Create a pathfinder with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one step to an agent's route.
    pub fn push_step(&mut self, agent: AgentId, cell: Cell) {
        self.routes.entry(agent).or_default().push_back(cell);
    }

    /// Builder-style variant of [`push_step`](Self::push_step) for a whole
    /// route.
    #[must_use]
    pub fn with_route(mut self, agent: AgentId, route: impl IntoIterator<Item = Cell>) -> Self {
        self.routes.entry(agent).or_default().extend(route);
        self
    }
}

impl Pathfinder for ScriptedPathfinder {
    fn plan_moves(
        &mut self,
        view: &WorldView<'_>,
    ) -> Result<BTreeMap<AgentId, Cell>, PathfinderError> {
        let mut moves = BTreeMap::new();
        for (&id, state) in view.agents {
            if !state.alive {
                continue;
            }
            if let Some(route) = self.routes.get_mut(&id) {
                if let Some(cell) = route.pop_front() {
                    moves.insert(id, cell);
                }
            }
        }
        Ok(moves)
    }
}
