//! Error types for the `gridlock-agents` crate.

/// Errors that can occur during agent configuration and state operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The energy schedule is internally inconsistent.
    #[error("invalid energy schedule: {reason}")]
    InvalidEnergySchedule {
        /// Why the schedule was rejected.
        reason: String,
    },
}
