//! Tick clock for the Gridlock engine.
//!
//! The clock is the single source of truth for simulation time. Every other
//! temporal fact (queue request ages, grant timestamps, forced-arbitration
//! cadence) is expressed relative to its counter. The counter advances
//! exactly once per tick, at the start of the wake phase, so tick `0` is
//! "before the first tick" and the first executed tick is numbered `1`.
//!
//! All arithmetic on the counter is checked; the clock refuses to advance
//! past `u64::MAX` rather than wrapping.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// Monotonic tick counter driving the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickClock {
    /// Current tick number. Zero until the first [`advance`](Self::advance).
    tick: u64,
}

impl TickClock {
    /// Create a clock at tick 0.
    pub const fn new() -> Self {
        Self { tick: 0 }
    }

    /// Create a clock at an explicit tick (useful for testing and state
    /// restoration).
    pub const fn at(tick: u64) -> Self {
        Self { tick }
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }
}
