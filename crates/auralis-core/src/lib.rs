//! Auralis Core - building blocks for the dimensional audio graph
//!
//! This crate holds everything about the processing graph that can be computed
//! without a native audio context: the topology description, the deterministic
//! branch layout, the orbit math driven by the animator, and the synthetic
//! reverb impulse.
//!
//! # Core Abstractions
//!
//! ## Graph Description
//!
//! - [`GraphPlan`] - Ordered nodes plus typed edges, validated on every connect
//! - [`NodeKind`] - What a node is (filter, gain, panner, convolver, ...)
//! - [`NodeGroup`] - Which unit a node belongs to (fixed chain or a branch)
//!
//! ## Spatial Branches
//!
//! - [`BranchCount`] - Branch count clamped into `[2, 12]`
//! - [`create_branch`] - Deterministic [`BranchLayout`] for `(index, count)`
//! - [`OrbitFrame`] - Instantaneous bass position and voice pan
//!
//! ## Reverb
//!
//! - [`generate_impulse`] - Stereo decaying noise impulse
//! - [`wet_level`] - Reverb mix level derived from the branch count
//!
//! # no_std Support
//!
//! Disable the default `std` feature to build against `alloc` only:
//!
//! ```toml
//! [dependencies]
//! auralis-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use auralis_core::{BranchCount, create_branch};
//!
//! let count = BranchCount::new(4);
//! let branch = create_branch(1, count);
//! assert!((branch.base_angle - core::f64::consts::FRAC_PI_2).abs() < 1e-12);
//! assert!((branch.output_gain - 0.25).abs() < 1e-6);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod count;
pub mod graph;
pub mod math;
pub mod param;
pub mod reverb;
pub mod spatial;

pub use count::BranchCount;
pub use graph::{
    BiquadSpec, CompressorParams, DistanceModel, Edge, EdgeId, EdgeKind, FilterType, GraphPlan,
    NodeGroup, NodeId, NodeKind, NodeTag, PannerSpec, PanningModel, PlanError, PlanNode,
};
pub use math::db_to_linear;
pub use param::ParamKey;
pub use reverb::{
    DEFAULT_DECAY, DEFAULT_DURATION_SECS, DEFAULT_SEED, ImpulseResponse, generate_impulse,
    wet_level,
};
pub use spatial::{
    BranchLayout, BranchNodeIds, BranchTaps, ORBIT_RADIUS, OrbitFrame, SPLIT_FREQUENCY_HZ,
    branch_layouts, create_branch,
};
