//! Resource registry: token ownership and pending-request queues for
//! bottleneck cells.
//!
//! The registry is seeded once at startup with the set of contested cells
//! (every corridor cell the map analysis flags as a bottleneck) and acts as
//! the tick cycle's ledger: who holds each cell, when the token was granted,
//! and which agents are waiting. It never decides who wins a contest; the
//! resolution logic reads queues from here and writes grants back.
//!
//! Each entry pairs an ordered FIFO queue with a membership index so that
//! duplicate requests are detected in O(1) without scanning the queue.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use gridlock_types::{AgentId, Cell, ResourceReport};

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The cell is not part of the registered resource set.
    #[error("cell {0} is not a registered resource")]
    UnknownResource(Cell),

    /// A grant was attempted on a cell that already has a holder.
    #[error("cell {cell} is already held by {holder}, cannot grant to {candidate}")]
    AlreadyHeld {
        /// The contested cell.
        cell: Cell,
        /// The agent currently holding the token.
        holder: AgentId,
        /// The agent the failed grant was for.
        candidate: AgentId,
    },
}

/// How the registry classifies a destination cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellClass {
    /// Ordinary walkable cell; first-come contention rules apply.
    Free,
    /// Registered bottleneck cell; entry requires holding its token.
    Resource(Cell),
}

/// A queued entry request for a single resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    /// The requesting agent.
    pub agent_id: AgentId,
    /// Priority key captured when the request was made (lower wins).
    pub priority: u64,
    /// Tick on which the request was made or last renewed.
    pub tick: u64,
}

/// Result of enqueueing an entry request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// The agent was appended to the queue.
    Enqueued,
    /// The agent was already queued from an earlier tick; its priority and
    /// request tick were renewed in place, keeping its queue position.
    Renewed,
    /// The agent already requested this resource this tick. The request is
    /// a no-op and should be reported as an anomaly by the caller.
    DuplicateThisTick,
}

/// Ownership and queue state for one registered cell.
#[derive(Debug, Clone, Default)]
struct ResourceEntry {
    /// Agent currently authorized to occupy the cell, if any.
    holder: Option<AgentId>,
    /// Tick of the most recent grant. Cleared on release.
    granted_at: Option<u64>,
    /// Waiting agents in arrival order.
    queue: VecDeque<PendingRequest>,
    /// Membership index over `queue`. Queried only, never iterated.
    queued: HashSet<AgentId>,
}

/// Ledger of token ownership and waiting queues for all registered cells.
///
/// The resource set is fixed at construction; cells cannot be added or
/// removed afterwards. All iteration happens in cell order, so registry
/// walks are deterministic.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    entries: BTreeMap<Cell, ResourceEntry>,
    /// Reverse index holder -> held cells. An agent normally holds at most
    /// one token; a second appears only inside a tick while the agent
    /// transitions between adjacent corridor cells.
    holdings: BTreeMap<AgentId, BTreeSet<Cell>>,
}

impl ResourceRegistry {
    /// Build a registry over the given set of contested cells.
    pub fn new(cells: impl IntoIterator<Item = Cell>) -> Self {
        let entries = cells
            .into_iter()
            .map(|cell| (cell, ResourceEntry::default()))
            .collect();
        Self {
            entries,
            holdings: BTreeMap::new(),
        }
    }

    /// Classify a destination cell as ordinary or resource-controlled.
    pub fn classify(&self, cell: Cell) -> CellClass {
        if self.entries.contains_key(&cell) {
            CellClass::Resource(cell)
        } else {
            CellClass::Free
        }
    }

    /// Whether the cell is part of the registered resource set.
    pub fn is_resource(&self, cell: Cell) -> bool {
        self.entries.contains_key(&cell)
    }

    /// Number of registered resource cells.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no resource cells at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All registered cells in ascending cell order.
    pub fn resource_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.entries.keys().copied()
    }

    /// The agent currently holding the cell's token, if any.
    ///
    /// Returns `None` both for unheld resources and for cells that are not
    /// registered at all; use [`classify`](Self::classify) to distinguish.
    pub fn current_holder(&self, cell: Cell) -> Option<AgentId> {
        self.entries.get(&cell).and_then(|entry| entry.holder)
    }

    /// Tick of the most recent grant for the cell, if it is held.
    pub fn granted_at(&self, cell: Cell) -> Option<u64> {
        self.entries.get(&cell).and_then(|entry| entry.granted_at)
    }

    /// Cells currently held by the agent, in ascending cell order.
    pub fn held_cells(&self, agent: AgentId) -> Vec<Cell> {
        self.holdings
            .get(&agent)
            .map(|cells| cells.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Append an entry request for `agent` to the cell's queue.
    ///
    /// A request from an agent already queued since an earlier tick renews
    /// that entry in place (the agent keeps its position); a second request
    /// within the same tick is collapsed to a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownResource`] if the cell is not
    /// registered.
    pub fn enqueue(
        &mut self,
        cell: Cell,
        agent: AgentId,
        priority: u64,
        tick: u64,
    ) -> Result<EnqueueOutcome, RegistryError> {
        let entry = self
            .entries
            .get_mut(&cell)
            .ok_or(RegistryError::UnknownResource(cell))?;

        if entry.queued.contains(&agent) {
            let Some(pending) = entry
                .queue
                .iter_mut()
                .find(|pending| pending.agent_id == agent)
            else {
                // Membership index and queue disagree; repair by re-adding.
                entry.queue.push_back(PendingRequest {
                    agent_id: agent,
                    priority,
                    tick,
                });
                return Ok(EnqueueOutcome::Enqueued);
            };
            if pending.tick == tick {
                return Ok(EnqueueOutcome::DuplicateThisTick);
            }
            pending.priority = priority;
            pending.tick = tick;
            return Ok(EnqueueOutcome::Renewed);
        }

        entry.queued.insert(agent);
        entry.queue.push_back(PendingRequest {
            agent_id: agent,
            priority,
            tick,
        });
        Ok(EnqueueOutcome::Enqueued)
    }

    /// Grant the cell's token to `agent` at `tick`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownResource`] if the cell is not
    /// registered, or [`RegistryError::AlreadyHeld`] if another agent holds
    /// the token. Granting to the current holder is a no-op.
    pub fn grant(&mut self, cell: Cell, agent: AgentId, tick: u64) -> Result<(), RegistryError> {
        let entry = self
            .entries
            .get_mut(&cell)
            .ok_or(RegistryError::UnknownResource(cell))?;

        match entry.holder {
            Some(holder) if holder == agent => {
                entry.granted_at = Some(tick);
                Ok(())
            }
            Some(holder) => Err(RegistryError::AlreadyHeld {
                cell,
                holder,
                candidate: agent,
            }),
            None => {
                entry.holder = Some(agent);
                entry.granted_at = Some(tick);
                self.holdings.entry(agent).or_default().insert(cell);
                Ok(())
            }
        }
    }

    /// Release the cell's token if `agent` is its holder.
    ///
    /// Returns `true` on success. Returns `false` (leaving all state
    /// untouched) when the agent does not hold the token or the cell is not
    /// registered; callers treat that as a stale release.
    pub fn release(&mut self, cell: Cell, agent: AgentId) -> bool {
        let Some(entry) = self.entries.get_mut(&cell) else {
            return false;
        };
        if entry.holder != Some(agent) {
            return false;
        }
        entry.holder = None;
        entry.granted_at = None;
        if let Some(cells) = self.holdings.get_mut(&agent) {
            cells.remove(&cell);
            if cells.is_empty() {
                self.holdings.remove(&agent);
            }
        }
        true
    }

    /// Number of queued requests for the cell (0 for unknown cells).
    pub fn queue_len(&self, cell: Cell) -> usize {
        self.entries
            .get(&cell)
            .map_or(0, |entry| entry.queue.len())
    }

    /// Queued requests for the cell in arrival order.
    pub fn queued_requests(&self, cell: Cell) -> impl Iterator<Item = &PendingRequest> + '_ {
        self.entries
            .get(&cell)
            .into_iter()
            .flat_map(|entry| entry.queue.iter())
    }

    /// Remove and return every queued request for the cell, oldest first.
    pub fn drain_queue(&mut self, cell: Cell) -> Vec<PendingRequest> {
        let Some(entry) = self.entries.get_mut(&cell) else {
            return Vec::new();
        };
        entry.queued.clear();
        entry.queue.drain(..).collect()
    }

    /// Remove and return the oldest queued request for the cell.
    pub fn pop_queue_head(&mut self, cell: Cell) -> Option<PendingRequest> {
        let entry = self.entries.get_mut(&cell)?;
        let pending = entry.queue.pop_front()?;
        entry.queued.remove(&pending.agent_id);
        Some(pending)
    }

    /// Cells with at least one queued request, in ascending cell order.
    pub fn cells_with_queued_requests(&self) -> Vec<Cell> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.queue.is_empty())
            .map(|(cell, _)| *cell)
            .collect()
    }

    /// Per-resource reports for snapshots, in ascending cell order.
    pub fn reports(&self) -> Vec<ResourceReport> {
        self.entries
            .iter()
            .map(|(cell, entry)| ResourceReport {
                cell: *cell,
                holder: entry.holder,
                queue_len: u32::try_from(entry.queue.len()).unwrap_or(u32::MAX),
            })
            .collect()
    }
}
