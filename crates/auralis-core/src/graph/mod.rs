//! Explicit topology description for the dimensional audio graph.
//!
//! A rewire never connects native nodes ad hoc. It first describes the whole
//! target topology as a [`GraphPlan`] (ordered nodes + typed edges), then the
//! engine realizes that plan against a native context in one pass, one
//! [`NodeGroup`] at a time. A group is realized completely or not at all.
//!
//! # Groups
//!
//! - [`NodeGroup::Chain`] nodes are built once per attached source and bound
//!   to existing native handles during realization.
//! - [`NodeGroup::Branch`] nodes are created fresh by every rewire.
//!
//! # Example
//!
//! ```rust
//! use auralis_core::graph::{EdgeKind, GraphPlan, NodeGroup, NodeKind};
//!
//! let mut plan = GraphPlan::new();
//! let source = plan.add_node(NodeKind::Source, NodeGroup::Chain, "source");
//! let master = plan.add_node(NodeKind::Gain(1.0), NodeGroup::Chain, "master");
//! let out = plan.add_node(NodeKind::Destination, NodeGroup::Chain, "destination");
//!
//! plan.connect(source, master, EdgeKind::Chain).unwrap();
//! plan.connect(master, out, EdgeKind::Chain).unwrap();
//! assert!(plan.connect(master, source, EdgeKind::Chain).is_err());
//! ```

pub mod edge;
pub mod node;
mod plan;

pub use edge::{Edge, EdgeId, EdgeKind};
pub use node::{
    BiquadSpec, CompressorParams, DistanceModel, FilterType, NodeGroup, NodeId, NodeKind, NodeTag,
    PannerSpec, PanningModel,
};
pub use plan::{GraphPlan, PlanError, PlanNode};
