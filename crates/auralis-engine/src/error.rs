//! Engine error type.

use auralis_config::ConfigError;
use auralis_core::{NodeId, PlanError};
use auralis_io::BackendError;
use thiserror::Error;

/// Errors raised by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A platform operation failed.
    #[error("audio backend error: {0}")]
    Backend(#[from] BackendError),

    /// Neither direct nor capture-stream binding worked.
    #[error("cannot bind media '{media}': {source}")]
    SourceBinding {
        /// Label of the media element.
        media: String,
        /// Error of the last binding attempt.
        #[source]
        source: BackendError,
    },

    /// The topology description was rejected.
    #[error("invalid topology: {0}")]
    Plan(#[from] PlanError),

    /// A planned node has no native counterpart.
    #[error("planned node {0} is not bound to a native node")]
    Unbound(NodeId),

    /// Settings could not be read or written.
    #[error("settings error: {0}")]
    Config(#[from] ConfigError),

    /// The extension is switched off.
    #[error("processing is disabled")]
    Disabled,
}

/// Convenience result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
