//! Branch realization.
//!
//! A planned branch group becomes native nodes here. Each branch is built
//! inside its own [`NodeScope`], so a failure halfway through releases
//! whatever that branch already created and leaves the rest of the set
//! untouched.

use std::collections::BTreeMap;

use auralis_core::{BranchLayout, BranchNodeIds, GraphPlan, NodeId};
use auralis_io::{AudioContext, NodeHandle, NodeScope, release_all};

use crate::error::{EngineError, Result};

/// Plan-to-native bindings.
pub type Bindings = BTreeMap<NodeId, NodeHandle>;

/// A branch whose nodes exist in the context.
#[derive(Clone, Debug, PartialEq)]
pub struct LiveBranch {
    /// Static layout.
    pub layout: BranchLayout,
    /// Every native node of the branch, in creation order.
    pub nodes: Vec<NodeHandle>,
    /// Bass 3D panner.
    pub bass_panner: NodeHandle,
    /// Voice stereo panner.
    pub voice_panner: NodeHandle,
}

/// A branch that could not be built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BranchFailure {
    /// Index of the branch in its set.
    pub index: usize,
    /// What went wrong.
    pub error: String,
}

/// The live branch set.
#[derive(Debug, Default)]
pub struct BranchSet {
    branches: Vec<LiveBranch>,
}

impl BranchSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a realized branch.
    pub fn push(&mut self, branch: LiveBranch) {
        self.branches.push(branch);
    }

    /// Number of live branches.
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Returns `true` if no branch is live.
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Live branches in index order.
    pub fn iter(&self) -> impl Iterator<Item = &LiveBranch> {
        self.branches.iter()
    }

    /// Releases every branch node and empties the set. Best effort.
    pub fn release<C: AudioContext + ?Sized>(&mut self, ctx: &mut C) {
        for branch in self.branches.drain(..) {
            release_all(ctx, &branch.nodes);
        }
    }
}

/// Creates the nodes of one planned branch and connects every edge that
/// touches it.
///
/// Edges into the chain resolve through `chain`; edges between branch nodes
/// resolve through the nodes created here. Any failure releases the
/// branch's nodes, which also drops the connections already made to them.
pub fn realize_branch<C: AudioContext + ?Sized>(
    ctx: &mut C,
    plan: &GraphPlan,
    layout: BranchLayout,
    ids: BranchNodeIds,
    chain: &Bindings,
) -> Result<LiveBranch> {
    let group = layout.group();
    let mut scope = NodeScope::new(ctx);
    let mut local = Bindings::new();

    for node in plan.nodes_in(group) {
        let handle = scope.create(&node.kind)?;
        local.insert(node.id, handle);
    }

    let resolve = |id: NodeId| {
        local
            .get(&id)
            .or_else(|| chain.get(&id))
            .copied()
            .ok_or(EngineError::Unbound(id))
    };
    for edge in plan.edges_touching(group) {
        let (from, to) = (resolve(edge.from)?, resolve(edge.to)?);
        scope.connect(from, to)?;
    }

    let bass_panner = resolve(ids.bass_panner)?;
    let voice_panner = resolve(ids.voice_panner)?;
    let nodes = scope.commit();

    tracing::debug!(index = layout.index, nodes = nodes.len(), "branch realized");
    Ok(LiveBranch {
        layout,
        nodes,
        bass_panner,
        voice_panner,
    })
}
