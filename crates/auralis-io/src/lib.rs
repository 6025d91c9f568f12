//! Native audio platform layer for auralis.
//!
//! This crate provides:
//!
//! - **Platform traits**: [`AudioContext`], [`FrameScheduler`] and
//!   [`Platform`], the seam between the engine and whatever owns the real
//!   audio graph (a browser, a host application, a test)
//! - **Scoped cleanup**: [`NodeScope`], which releases every node it created
//!   unless the caller commits
//! - **Offline backend**: [`OfflinePlatform`], a deterministic in-memory
//!   implementation that records nodes, edges, parameter automation and frame
//!   requests, with failure injection for tests
//! - **WAV export**: [`write_impulse_wav`] / [`read_impulse_wav`] for reverb
//!   impulses
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────┐
//! │          auralis-engine          │
//! │   (Session, AudioGraph, ...)     │
//! └──────────────┬───────────────────┘
//!                │ uses Platform / AudioContext
//!                ▼
//! ┌──────────────────────────────────┐
//! │  Platform: FrameScheduler        │
//! │    create_context() -> Context   │
//! └──────────────┬───────────────────┘
//!        ┌───────┴────────┐
//!        ▼                ▼
//! ┌─────────────┐  ┌─────────────┐
//! │  Offline    │  │ host glue   │
//! │  (tests,    │  │ (WebAudio,  │
//! │   CLI)      │  │  ...)       │
//! └─────────────┘  └─────────────┘
//! ```
//!
//! All traits are single-threaded: the host event loop drives them one call
//! at a time.

mod context;
mod offline;
mod scope;
mod wav;

pub use context::{
    AudioContext, ContextState, FrameId, FrameScheduler, MediaElement, NodeHandle, Platform,
};
pub use offline::{
    Fault, OfflineContext, OfflineEdge, OfflineNode, OfflinePlatform, OfflineProbe, ParamEvent,
    SourceMode,
};
pub use scope::{NodeScope, release_all};
pub use wav::{read_impulse_wav, write_impulse_wav};

use auralis_core::{NodeTag, ParamKey};

/// Error types for platform operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The audio context could not be created.
    #[error("audio context creation failed: {0}")]
    ContextCreation(String),

    /// A processing node could not be constructed.
    #[error("failed to construct {kind} node: {reason}")]
    NodeConstruction {
        /// Kind of node requested.
        kind: NodeTag,
        /// Platform-provided reason.
        reason: String,
    },

    /// The media element could not be bound as a source.
    #[error("media source binding failed: {0}")]
    SourceBinding(String),

    /// The handle does not name a live node of this context.
    #[error("unknown node {0}")]
    UnknownNode(NodeHandle),

    /// The connection is not allowed.
    #[error("cannot connect {from} -> {to}: {reason}")]
    InvalidConnection {
        /// Source node.
        from: NodeHandle,
        /// Destination node.
        to: NodeHandle,
        /// Why the connection was refused.
        reason: &'static str,
    },

    /// The node has no such parameter.
    #[error("{node} has no parameter '{param}'")]
    UnsupportedParam {
        /// Target node.
        node: NodeHandle,
        /// Requested parameter.
        param: ParamKey,
    },

    /// The context has been closed.
    #[error("audio context is closed")]
    ContextClosed,

    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),
}

/// Convenience result type for platform operations.
pub type Result<T> = std::result::Result<T, BackendError>;
