//! Greedy planner chasing the nearest collectible.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use gridlock_core::pathfind::{Pathfinder, PathfinderError, WorldView};
use gridlock_types::{AgentId, Cell};

/// A planner that sends every agent one step along a shortest path to the
/// nearest remaining collectible.
///
/// The search ignores other agents entirely; collisions and corridor
/// contention are the engine's problem, and feeding it naive desires is
/// exactly what exercises the arbitration machinery. Ties between equally
/// near collectibles break on breadth-first expansion order, which is
/// fixed by [`Direction::ALL`], so planning is fully deterministic.
///
/// [`Direction::ALL`]: gridlock_types::Direction::ALL
#[derive(Debug, Default)]
pub struct GreedyPathfinder;

impl GreedyPathfinder {
    /// Create a planner.
    pub const fn new() -> Self {
        Self
    }

    /// First step of a shortest walkable path from `origin` to the nearest
    /// cell holding a collectible, or `None` if nothing is reachable.
    fn first_step_toward_food(view: &WorldView<'_>, origin: Cell) -> Option<Cell> {
        let mut visited = BTreeSet::new();
        let mut first_step: BTreeMap<Cell, Cell> = BTreeMap::new();
        let mut queue = VecDeque::new();
        visited.insert(origin);
        queue.push_back(origin);

        while let Some(current) = queue.pop_front() {
            if current != origin && view.collectibles.peek(current).is_some() {
                return first_step.get(&current).copied();
            }
            for neighbor in view.grid.walkable_neighbors(current) {
                if !visited.insert(neighbor) {
                    continue;
                }
                let step = first_step.get(&current).copied().unwrap_or(neighbor);
                first_step.insert(neighbor, step);
                queue.push_back(neighbor);
            }
        }
        None
    }
}

impl Pathfinder for GreedyPathfinder {
    fn plan_moves(
        &mut self,
        view: &WorldView<'_>,
    ) -> Result<BTreeMap<AgentId, Cell>, PathfinderError> {
        let mut moves = BTreeMap::new();
        for agent in view.agents.values().filter(|a| a.alive) {
            if let Some(step) = Self::first_step_toward_food(view, agent.pos) {
                moves.insert(agent.id, step);
            }
        }
        Ok(moves)
    }
}
