//! Dynamic audio graph engine for auralis.
//!
//! Attaches a processing graph to a media element and keeps it in step with
//! the user's settings:
//!
//! - **Processing chain**: quality low-pass, three-band EQ, optional dynamics
//!   stage, master gain, analyser and a shared convolution reverb
//!   ([`ProcessingChain`])
//! - **Topology manager**: [`AudioGraph`] rebuilds the graph from a fresh
//!   [`GraphPlan`](auralis_core::GraphPlan) on every rewire
//! - **Spatial branches**: 2 to 12 orbiting bass/voice units realized per
//!   plan ([`BranchSet`]) and animated frame by frame ([`SpatialAnimator`])
//! - **Reconciler**: [`reconcile`] splits a settings change into parameter
//!   updates and an optional rewire
//! - **Session**: [`Session`] is what the host talks to
//!
//! # Example
//!
//! ```rust
//! use auralis_config::{MemoryStore, Settings};
//! use auralis_core::BranchCount;
//! use auralis_engine::Session;
//! use auralis_io::{MediaElement, OfflinePlatform};
//!
//! let settings = Settings {
//!     dimensional_audio_on: true,
//!     dimensional_preset: BranchCount::new(4),
//!     ..Settings::default()
//! };
//! let platform = OfflinePlatform::new();
//! let probe = platform.probe();
//! let mut session = Session::new(platform, MemoryStore::new(settings));
//!
//! let report = session.attach(&MediaElement::new(1, "video")).unwrap();
//! assert_eq!(report.rewire.branches_built, 4);
//! assert!(report.animating);
//!
//! let frame = probe.deliver_next_frame().unwrap();
//! session.on_frame(frame);
//! assert_eq!(probe.pending_frames().len(), 1);
//! ```

mod animator;
mod branch;
mod chain;
mod config;
mod error;
mod reconcile;
mod session;
mod topology;

pub use animator::{AnimatorState, SpatialAnimator, StepOutcome};
pub use branch::{Bindings, BranchFailure, BranchSet, LiveBranch, realize_branch};
pub use chain::{
    BASS_SHELF_HZ, BindingMode, ChainNode, ChainSlot, MID_PEAK_HZ, ProcessingChain,
    QUALITY_CUTOFF_HZ, TREBLE_SHELF_HZ,
};
pub use config::{ANALYSER_FFT_SIZE, EngineConfig, ReverbConfig};
pub use error::{EngineError, Result};
pub use reconcile::{ParamUpdates, Reconciliation, TopologyAction, reconcile};
pub use session::{AttachReport, AttachResult, Session};
pub use topology::{AudioGraph, RewireReport, SpatialState};
