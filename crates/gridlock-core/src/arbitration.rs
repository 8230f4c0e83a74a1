//! Contention resolution for contested cells.
//!
//! Movement conflicts are resolved in layers, each implemented here as a
//! pure function over the tick's move set:
//!
//! 1. **Cell contests**: when several agents want the same cell (a resource
//!    cell or an ordinary destination), the lowest priority key wins and
//!    ties are broken by a uniform lottery.
//! 2. **Swap detection**: two agents exchanging cells in the same tick are
//!    both cancelled; a corridor has no room to pass.
//! 3. **Blocked destinations**: moves into a cell occupied by an agent that
//!    is not moving this tick are cancelled, iterated until no further move
//!    is invalidated. Convoys and rotation cycles survive this pass because
//!    every cell in them is vacated in the same tick.
//!
//! All functions are deterministic given the RNG: candidate sets are put
//! into agent-id order before any draw, so outcomes depend only on the seed
//! and never on caller iteration order.

use std::collections::{BTreeMap, BTreeSet};

use gridlock_types::{AgentId, Cell, MoveIntent};
use rand::Rng;

/// A contender for a single cell, carrying its current priority key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contender {
    /// The agent contending for the cell.
    pub agent_id: AgentId,
    /// Priority key at the moment of resolution. Lower wins.
    pub key: u64,
}

/// The outcome of resolving one cell contest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestResult {
    /// The agent awarded the cell.
    pub winner: AgentId,
    /// Every other contender, in agent-id order.
    pub losers: Vec<AgentId>,
    /// Whether more than one agent was contending.
    pub contested: bool,
}

/// Resolve a contest for a single cell.
///
/// The winner is the contender with the lowest priority key; if several
/// contenders share the minimum, one of them is drawn uniformly at random.
/// A single-candidate minimum consumes no randomness.
///
/// Returns `None` if `contenders` is empty.
pub fn resolve_contest(contenders: &[Contender], rng: &mut impl Rng) -> Option<ContestResult> {
    let min_key = contenders.iter().map(|c| c.key).min()?;
    let mut candidates: Vec<AgentId> = contenders
        .iter()
        .filter(|c| c.key == min_key)
        .map(|c| c.agent_id)
        .collect();
    candidates.sort_unstable();

    let winner = if candidates.len() >= 2 {
        let idx = rng.random_range(0..candidates.len());
        candidates.get(idx).copied()
    } else {
        candidates.first().copied()
    }?;

    let mut losers: Vec<AgentId> = contenders
        .iter()
        .map(|c| c.agent_id)
        .filter(|id| *id != winner)
        .collect();
    losers.sort_unstable();

    Some(ContestResult {
        winner,
        losers,
        contested: contenders.len() >= 2,
    })
}

/// Find all pairs of moves that would exchange cells this tick.
///
/// Returns each pair once as `(smaller id, larger id)`, in ascending order
/// of the first element. Rotation cycles of three or more agents are not
/// swaps and are not reported.
pub fn detect_swaps(moves: &BTreeMap<AgentId, MoveIntent>) -> Vec<(AgentId, AgentId)> {
    let origins: BTreeMap<Cell, (AgentId, Cell)> = moves
        .values()
        .map(|intent| (intent.from, (intent.agent_id, intent.to)))
        .collect();

    let mut pairs = Vec::new();
    for intent in moves.values() {
        if let Some(&(other, other_to)) = origins.get(&intent.to) {
            if other != intent.agent_id && other_to == intent.from && intent.agent_id < other {
                pairs.push((intent.agent_id, other));
            }
        }
    }
    pairs
}

/// Cancel moves whose destination is occupied by an agent that is not
/// moving this tick.
///
/// `stationary` holds the positions of every live agent without a surviving
/// move. Each cancellation parks the mover, so its own cell joins the
/// stationary set and the scan repeats until no move is invalidated.
/// Returns the cancelled agents in the order they were invalidated.
pub fn cancel_blocked(
    moves: &mut BTreeMap<AgentId, MoveIntent>,
    stationary: &mut BTreeSet<Cell>,
) -> Vec<AgentId> {
    let mut cancelled = Vec::new();
    loop {
        let wave: Vec<AgentId> = moves
            .iter()
            .filter(|(_, intent)| stationary.contains(&intent.to))
            .map(|(id, _)| *id)
            .collect();
        if wave.is_empty() {
            break;
        }
        for agent_id in wave {
            if let Some(intent) = moves.remove(&agent_id) {
                stationary.insert(intent.from);
                cancelled.push(agent_id);
            }
        }
    }
    cancelled
}
