//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and the run, so
//! `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: colony_core::ConfigError,
    },

    /// World clock initialization failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: colony_core::ClockError,
    },

    /// A unit could not be added to the roster.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: colony_agents::AgentError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: colony_core::runner::RunnerError,
    },

    /// The starting layout could not be built.
    #[error("spawner error: {message}")]
    Spawner {
        /// Description of the spawner failure.
        message: String,
    },
}
