//! Token lifecycle transitions: release, immediate re-grant, unused-grant
//! revocation, and the forced-arbitration sweep.
//!
//! A resource moves `free -> held` on grant and `held -> free` when its
//! holder vacates the cell or dies. If the queue is non-empty at release
//! time the token is immediately re-granted to the best live candidate by
//! the same lowest-key-plus-lottery rule used for fresh contention, and the
//! queue is emptied.
//!
//! Two backstops keep the ledger honest:
//!
//! - a grant that was never used (the holder did not arrive within a tick)
//!   is revoked at the next commit, and
//! - a periodic sweep grants the FIFO head of any stale queue that is still
//!   parked on a free cell, skipping dead entries.

use std::collections::{BTreeMap, BTreeSet};

use gridlock_types::{AgentId, Cell};
use rand::Rng;
use tracing::{debug, warn};

use crate::arbitration::{self, Contender};
use crate::registry::{RegistryError, ResourceRegistry};

/// Result of releasing a token and refilling the cell from its queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseOutcome {
    /// Whether the release actually freed the token. `false` means the
    /// caller was not the holder; the request was absorbed as stale.
    pub released: bool,
    /// Agent the freed token was immediately re-granted to, if any.
    pub regranted: Option<AgentId>,
}

/// A grant revoked because the holder never arrived on the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevokedGrant {
    /// The resource cell.
    pub cell: Cell,
    /// The holder whose authorization lapsed.
    pub holder: AgentId,
    /// Agent the token was re-granted to from the queue, if any.
    pub regranted: Option<AgentId>,
}

/// Release `agent`'s token on `cell` and immediately re-grant from the
/// queue.
///
/// `keys` maps each live agent to its current priority key; queued agents
/// absent from it (dead or deregistered) are skipped. On re-grant the queue
/// is emptied. A release by a non-holder is logged and absorbed; the caller
/// should count it as an anomaly.
///
/// # Errors
///
/// Returns [`RegistryError`] if the registry rejects the re-grant, which
/// indicates an inconsistent ledger.
pub fn release_and_regrant(
    registry: &mut ResourceRegistry,
    keys: &BTreeMap<AgentId, u64>,
    rng: &mut impl Rng,
    cell: Cell,
    agent: AgentId,
    tick: u64,
) -> Result<ReleaseOutcome, RegistryError> {
    if !registry.release(cell, agent) {
        warn!(%cell, %agent, tick, "stale release ignored");
        return Ok(ReleaseOutcome {
            released: false,
            regranted: None,
        });
    }
    debug!(%cell, %agent, tick, "token released");

    let regranted = regrant_from_queue(registry, keys, rng, cell, tick)?;
    Ok(ReleaseOutcome {
        released: true,
        regranted,
    })
}

/// Release every token held by `agent`, re-granting each from its queue.
///
/// Used when an agent dies while holding a token.
///
/// # Errors
///
/// Returns [`RegistryError`] if a re-grant fails.
pub fn release_all_for_agent(
    registry: &mut ResourceRegistry,
    keys: &BTreeMap<AgentId, u64>,
    rng: &mut impl Rng,
    agent: AgentId,
    tick: u64,
) -> Result<Vec<(Cell, ReleaseOutcome)>, RegistryError> {
    let mut outcomes = Vec::new();
    for cell in registry.held_cells(agent) {
        let outcome = release_and_regrant(registry, keys, rng, cell, agent, tick)?;
        outcomes.push((cell, outcome));
    }
    Ok(outcomes)
}

/// Revoke every grant whose holder is not standing on the cell and whose
/// grant is at least one tick old, re-granting each from its queue.
///
/// `positions` maps live agents to their current cells. Authorization to
/// enter a resource is only valid for the tick after the grant; a winner
/// whose move was cancelled loses the token here rather than parking it.
///
/// # Errors
///
/// Returns [`RegistryError`] if a re-grant fails.
pub fn revoke_unused_grants(
    registry: &mut ResourceRegistry,
    keys: &BTreeMap<AgentId, u64>,
    rng: &mut impl Rng,
    positions: &BTreeMap<AgentId, Cell>,
    tick: u64,
) -> Result<Vec<RevokedGrant>, RegistryError> {
    let lapsed: Vec<(Cell, AgentId)> = registry
        .resource_cells()
        .filter_map(|cell| {
            let holder = registry.current_holder(cell)?;
            let granted_at = registry.granted_at(cell)?;
            let standing = positions.get(&holder).is_some_and(|pos| *pos == cell);
            (!standing && granted_at < tick).then_some((cell, holder))
        })
        .collect();

    let mut revoked = Vec::new();
    for (cell, holder) in lapsed {
        let outcome = release_and_regrant(registry, keys, rng, cell, holder, tick)?;
        debug!(%cell, %holder, tick, "unused grant revoked");
        revoked.push(RevokedGrant {
            cell,
            holder,
            regranted: outcome.regranted,
        });
    }
    Ok(revoked)
}

/// Grant the FIFO head of every stale queue parked on a free cell.
///
/// A queue is stale when its head request predates the current tick; such
/// queues survive only when no fresh contention has touched the cell since.
/// Dead entries are dropped while scanning for the head. Fresh heads are
/// left for normal resolution.
///
/// # Errors
///
/// Returns [`RegistryError`] if a grant fails.
pub fn forced_sweep(
    registry: &mut ResourceRegistry,
    live: &BTreeSet<AgentId>,
    tick: u64,
) -> Result<Vec<(Cell, AgentId)>, RegistryError> {
    let mut grants = Vec::new();
    for cell in registry.cells_with_queued_requests() {
        if registry.current_holder(cell).is_some() {
            continue;
        }
        loop {
            let Some(head) = registry.queued_requests(cell).next().copied() else {
                break;
            };
            if head.tick >= tick {
                break;
            }
            let Some(popped) = registry.pop_queue_head(cell) else {
                break;
            };
            if live.contains(&popped.agent_id) {
                registry.grant(cell, popped.agent_id, tick)?;
                debug!(%cell, agent = %popped.agent_id, tick, "forced arbitration grant");
                grants.push((cell, popped.agent_id));
                break;
            }
            // Dead stale entry; keep scanning.
        }
    }
    Ok(grants)
}

/// Grant a freed cell to the best queued live candidate, emptying the queue.
fn regrant_from_queue(
    registry: &mut ResourceRegistry,
    keys: &BTreeMap<AgentId, u64>,
    rng: &mut impl Rng,
    cell: Cell,
    tick: u64,
) -> Result<Option<AgentId>, RegistryError> {
    if registry.queue_len(cell) == 0 {
        return Ok(None);
    }

    let pending = registry.drain_queue(cell);
    let contenders: Vec<Contender> = pending
        .iter()
        .filter_map(|request| {
            keys.get(&request.agent_id).map(|key| Contender {
                agent_id: request.agent_id,
                key: *key,
            })
        })
        .collect();

    let Some(result) = arbitration::resolve_contest(&contenders, rng) else {
        // The queue held only dead or departed agents.
        return Ok(None);
    };

    registry.grant(cell, result.winner, tick)?;
    debug!(%cell, winner = %result.winner, tick, "token re-granted from queue");
    Ok(Some(result.winner))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    const CELL: Cell = Cell::new(4, 2);

    fn make_registry() -> ResourceRegistry {
        ResourceRegistry::new([CELL, Cell::new(8, 2)])
    }

    fn make_keys(pairs: &[(u32, u64)]) -> BTreeMap<AgentId, u64> {
        pairs
            .iter()
            .map(|(index, key)| (AgentId::from_index(*index), *key))
            .collect()
    }

    #[test]
    fn release_regrants_best_queued_candidate() {
        let mut registry = make_registry();
        let mut rng = SmallRng::seed_from_u64(5);
        let holder = AgentId::from_index(0);
        registry.grant(CELL, holder, 1).unwrap();
        registry.enqueue(CELL, AgentId::from_index(1), 9, 1).unwrap();
        registry.enqueue(CELL, AgentId::from_index(2), 9, 1).unwrap();

        // Agent 2's key improved since it queued; current keys decide.
        let keys = make_keys(&[(1, 6), (2, 3)]);
        let outcome =
            release_and_regrant(&mut registry, &keys, &mut rng, CELL, holder, 2).unwrap();

        assert!(outcome.released);
        assert_eq!(outcome.regranted, Some(AgentId::from_index(2)));
        assert_eq!(registry.current_holder(CELL), Some(AgentId::from_index(2)));
        assert_eq!(registry.queue_len(CELL), 0);
    }

    #[test]
    fn release_with_empty_queue_leaves_cell_free() {
        let mut registry = make_registry();
        let mut rng = SmallRng::seed_from_u64(5);
        let holder = AgentId::from_index(0);
        registry.grant(CELL, holder, 1).unwrap();

        let outcome =
            release_and_regrant(&mut registry, &BTreeMap::new(), &mut rng, CELL, holder, 2)
                .unwrap();
        assert!(outcome.released);
        assert_eq!(outcome.regranted, None);
        assert_eq!(registry.current_holder(CELL), None);
    }

    #[test]
    fn stale_release_is_absorbed() {
        let mut registry = make_registry();
        let mut rng = SmallRng::seed_from_u64(5);
        registry.grant(CELL, AgentId::from_index(0), 1).unwrap();

        let outcome = release_and_regrant(
            &mut registry,
            &BTreeMap::new(),
            &mut rng,
            CELL,
            AgentId::from_index(7),
            2,
        )
        .unwrap();
        assert!(!outcome.released);
        assert_eq!(registry.current_holder(CELL), Some(AgentId::from_index(0)));
    }

    #[test]
    fn regrant_skips_agents_without_keys() {
        let mut registry = make_registry();
        let mut rng = SmallRng::seed_from_u64(5);
        let holder = AgentId::from_index(0);
        registry.grant(CELL, holder, 1).unwrap();
        registry.enqueue(CELL, AgentId::from_index(1), 1, 1).unwrap();
        registry.enqueue(CELL, AgentId::from_index(2), 2, 1).unwrap();

        // Agent 1 died while queued; only agent 2 is still live.
        let keys = make_keys(&[(2, 8)]);
        let outcome =
            release_and_regrant(&mut registry, &keys, &mut rng, CELL, holder, 2).unwrap();
        assert_eq!(outcome.regranted, Some(AgentId::from_index(2)));
    }

    #[test]
    fn death_releases_every_held_cell() {
        let mut registry = make_registry();
        let mut rng = SmallRng::seed_from_u64(5);
        let agent = AgentId::from_index(0);
        registry.grant(CELL, agent, 1).unwrap();
        registry.grant(Cell::new(8, 2), agent, 1).unwrap();

        let outcomes =
            release_all_for_agent(&mut registry, &BTreeMap::new(), &mut rng, agent, 2).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(registry.current_holder(CELL), None);
        assert_eq!(registry.current_holder(Cell::new(8, 2)), None);
        assert!(registry.held_cells(agent).is_empty());
    }

    #[test]
    fn unused_grant_is_revoked_after_one_tick() {
        let mut registry = make_registry();
        let mut rng = SmallRng::seed_from_u64(5);
        let absent = AgentId::from_index(0);
        registry.grant(CELL, absent, 3).unwrap();

        // The holder is standing somewhere else at tick 4.
        let positions: BTreeMap<AgentId, Cell> =
            [(absent, Cell::new(1, 1))].into_iter().collect();
        let revoked =
            revoke_unused_grants(&mut registry, &BTreeMap::new(), &mut rng, &positions, 4)
                .unwrap();

        assert_eq!(revoked.len(), 1);
        assert_eq!(revoked.first().unwrap().holder, absent);
        assert_eq!(registry.current_holder(CELL), None);
    }

    #[test]
    fn fresh_grants_and_standing_holders_are_kept() {
        let mut registry = make_registry();
        let mut rng = SmallRng::seed_from_u64(5);
        let standing = AgentId::from_index(0);
        let fresh = AgentId::from_index(1);
        registry.grant(CELL, standing, 2).unwrap();
        registry.grant(Cell::new(8, 2), fresh, 4).unwrap();

        let positions: BTreeMap<AgentId, Cell> = [
            (standing, CELL),
            // Fresh winner has not arrived yet; its grant is from this tick.
            (fresh, Cell::new(7, 2)),
        ]
        .into_iter()
        .collect();
        let revoked =
            revoke_unused_grants(&mut registry, &BTreeMap::new(), &mut rng, &positions, 4)
                .unwrap();

        assert!(revoked.is_empty());
        assert_eq!(registry.current_holder(CELL), Some(standing));
        assert_eq!(registry.current_holder(Cell::new(8, 2)), Some(fresh));
    }

    #[test]
    fn sweep_grants_stale_head_in_fifo_order() {
        let mut registry = make_registry();
        registry.enqueue(CELL, AgentId::from_index(2), 9, 10).unwrap();
        registry.enqueue(CELL, AgentId::from_index(0), 1, 11).unwrap();

        let live: BTreeSet<AgentId> =
            [AgentId::from_index(0), AgentId::from_index(2)].into_iter().collect();
        let grants = forced_sweep(&mut registry, &live, 30).unwrap();

        // FIFO wins over priority: agent 2 queued first.
        assert_eq!(grants, vec![(CELL, AgentId::from_index(2))]);
        assert_eq!(registry.current_holder(CELL), Some(AgentId::from_index(2)));
        assert_eq!(registry.queue_len(CELL), 1);
    }

    #[test]
    fn sweep_skips_dead_entries_and_held_cells() {
        let mut registry = make_registry();
        registry.enqueue(CELL, AgentId::from_index(0), 1, 10).unwrap();
        registry.enqueue(CELL, AgentId::from_index(1), 1, 11).unwrap();
        let held = Cell::new(8, 2);
        registry.grant(held, AgentId::from_index(3), 12).unwrap();
        registry.enqueue(held, AgentId::from_index(1), 1, 12).unwrap();

        // Agent 0 died in the queue.
        let live: BTreeSet<AgentId> = [AgentId::from_index(1)].into_iter().collect();
        let grants = forced_sweep(&mut registry, &live, 30).unwrap();

        assert_eq!(grants, vec![(CELL, AgentId::from_index(1))]);
        // The held cell's queue is untouched.
        assert_eq!(registry.queue_len(held), 1);
    }

    #[test]
    fn sweep_leaves_fresh_heads_for_normal_resolution() {
        let mut registry = make_registry();
        registry.enqueue(CELL, AgentId::from_index(0), 1, 30).unwrap();

        let live: BTreeSet<AgentId> = [AgentId::from_index(0)].into_iter().collect();
        let grants = forced_sweep(&mut registry, &live, 30).unwrap();

        assert!(grants.is_empty());
        assert_eq!(registry.queue_len(CELL), 1);
    }
}
