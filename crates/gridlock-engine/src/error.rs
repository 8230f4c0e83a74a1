//! Error types for the Gridlock engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and simulation execution.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: gridlock_core::config::ConfigError,
    },

    /// Maze construction or collectible seeding failed.
    #[error("world error: {source}")]
    World {
        /// The underlying grid error.
        #[from]
        source: gridlock_world::GridError,
    },

    /// Simulation state assembly failed.
    #[error("setup error: {source}")]
    Setup {
        /// The underlying setup error.
        #[from]
        source: gridlock_core::tick::SetupError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: gridlock_core::runner::RunnerError,
    },

    /// A filesystem operation failed.
    #[error("io error: {source}")]
    Io {
        /// The underlying io error.
        #[from]
        source: std::io::Error,
    },

    /// Serializing a report failed.
    #[error("serialization error: {source}")]
    Json {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
