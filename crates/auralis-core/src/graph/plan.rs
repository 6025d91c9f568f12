//! Graph plan: mutation API and validation.
//!
//! [`GraphPlan`] is built fresh for every rewire. Connections are validated as
//! they are added, so a plan that exists is always a well-formed DAG: no
//! unknown endpoints, no duplicate edges, no cycles, nothing flowing into the
//! source or out of the destination.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use core::fmt;

use super::edge::{Edge, EdgeId, EdgeKind};
use super::node::{NodeGroup, NodeId, NodeKind, NodeTag};

/// Errors raised while building a plan.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanError {
    /// The specified node does not exist in this plan.
    NodeNotFound(NodeId),
    /// An edge between these nodes already exists.
    DuplicateEdge(NodeId, NodeId),
    /// Adding this edge would create a cycle.
    CycleDetected(NodeId, NodeId),
    /// The connection is structurally invalid (e.g. an edge into the source).
    InvalidConnection(&'static str),
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "node {id} not found"),
            Self::DuplicateEdge(a, b) => write!(f, "edge from {a} to {b} already exists"),
            Self::CycleDetected(a, b) => write!(f, "edge from {a} to {b} would create a cycle"),
            Self::InvalidConnection(msg) => write!(f, "invalid connection: {msg}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PlanError {}

/// A node entry in a [`GraphPlan`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanNode {
    /// Node identifier.
    pub id: NodeId,
    /// What to build.
    pub kind: NodeKind,
    /// Owning unit.
    pub group: NodeGroup,
    /// Short role name ("bass_eq", "voice_panner", ...).
    pub label: &'static str,
}

/// Ordered nodes plus typed edges describing one complete topology.
#[derive(Clone, Debug, Default)]
pub struct GraphPlan {
    nodes: Vec<PlanNode>,
    edges: Vec<Edge>,
}

impl GraphPlan {
    /// Creates an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty plan with room for `nodes` nodes and `edges` edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            edges: Vec::with_capacity(edges),
        }
    }

    /// Appends a node and returns its ID.
    pub fn add_node(&mut self, kind: NodeKind, group: NodeGroup, label: &'static str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(PlanNode {
            id,
            kind,
            group,
            label,
        });
        #[cfg(feature = "tracing")]
        tracing::trace!("plan_add: {id} {label} ({group})");
        id
    }

    /// Connects two nodes with a directed edge.
    ///
    /// Returns an error if:
    /// - Either node doesn't exist
    /// - The edge runs into the source or out of the destination
    /// - A duplicate edge already exists
    /// - The edge would create a cycle
    pub fn connect(&mut self, from: NodeId, to: NodeId, kind: EdgeKind) -> Result<EdgeId, PlanError> {
        let from_tag = self.node(from).ok_or(PlanError::NodeNotFound(from))?.kind.tag();
        let to_tag = self.node(to).ok_or(PlanError::NodeNotFound(to))?.kind.tag();

        if to_tag == NodeTag::Source {
            return Err(PlanError::InvalidConnection("source cannot have inputs"));
        }
        if from_tag == NodeTag::Destination {
            return Err(PlanError::InvalidConnection("destination cannot have outputs"));
        }
        if self.has_edge(from, to) {
            return Err(PlanError::DuplicateEdge(from, to));
        }
        // A cycle exists if `to` can already reach `from`.
        if from == to || self.can_reach(to, from) {
            return Err(PlanError::CycleDetected(from, to));
        }

        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Edge { id, from, to, kind });
        #[cfg(feature = "tracing")]
        tracing::trace!("plan_connect: {from} → {to} ({})", kind.as_str());
        Ok(id)
    }

    /// Returns the node with the given ID.
    pub fn node(&self, id: NodeId) -> Option<&PlanNode> {
        self.nodes.get(id.0 as usize)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[PlanNode] {
        &self.nodes
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns true if an edge `from → to` exists.
    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.edges.iter().any(|e| e.from == from && e.to == to)
    }

    /// Nodes owned by `group`, in insertion order.
    pub fn nodes_in(&self, group: NodeGroup) -> impl Iterator<Item = &PlanNode> {
        self.nodes.iter().filter(move |n| n.group == group)
    }

    /// Distinct branch groups, in order of first appearance.
    pub fn branch_groups(&self) -> Vec<NodeGroup> {
        let mut groups: Vec<NodeGroup> = Vec::new();
        for node in &self.nodes {
            if matches!(node.group, NodeGroup::Branch(_)) && !groups.contains(&node.group) {
                groups.push(node.group);
            }
        }
        groups
    }

    /// Edges with both endpoints in the fixed chain.
    pub fn chain_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| {
            self.group_of(e.from) == Some(NodeGroup::Chain)
                && self.group_of(e.to) == Some(NodeGroup::Chain)
        })
    }

    /// Edges with at least one endpoint in `group`.
    ///
    /// For a branch group this includes the fan-out from the chain and the
    /// mix and send edges into shared nodes.
    pub fn edges_touching(&self, group: NodeGroup) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| {
            self.group_of(e.from) == Some(group) || self.group_of(e.to) == Some(group)
        })
    }

    /// Outgoing edges of `id`.
    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.from == id)
    }

    /// Incoming edges of `id`.
    pub fn incoming(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.to == id)
    }

    /// Drops every node of `group` and every edge touching it.
    ///
    /// Remaining nodes and edges are renumbered in order, so IDs handed out
    /// before the call are stale afterwards.
    pub fn remove_group(&mut self, group: NodeGroup) {
        let mut remap: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        let mut kept = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if node.group == group {
                continue;
            }
            let id = NodeId(kept.len() as u32);
            remap[node.id.0 as usize] = Some(id);
            kept.push(PlanNode { id, ..*node });
        }
        let mut edges = Vec::with_capacity(self.edges.len());
        for edge in &self.edges {
            if let (Some(from), Some(to)) = (remap[edge.from.0 as usize], remap[edge.to.0 as usize]) {
                let id = EdgeId(edges.len() as u32);
                edges.push(Edge { id, from, to, kind: edge.kind });
            }
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(
            "plan_remove: {group} ({} nodes)",
            self.nodes.len() - kept.len()
        );
        self.nodes = kept;
        self.edges = edges;
    }

    fn group_of(&self, id: NodeId) -> Option<NodeGroup> {
        self.node(id).map(|n| n.group)
    }

    /// Depth-first reachability over existing edges.
    fn can_reach(&self, start: NodeId, target: NodeId) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            let idx = current.0 as usize;
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            stack.extend(self.outgoing(current).map(|e| e.to));
        }
        false
    }
}

impl fmt::Display for GraphPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "nodes ({}):", self.nodes.len())?;
        for node in &self.nodes {
            match node.group {
                NodeGroup::Chain => write!(f, "  [{:>3}] {:<10}", node.id.0, "chain")?,
                NodeGroup::Branch(i) => write!(f, "  [{:>3}] branch[{i:>2}]", node.id.0)?,
            }
            writeln!(f, " {:<14} {}", node.label, node.kind.tag().as_str())?;
        }
        writeln!(f, "edges ({}):", self.edges.len())?;
        for edge in &self.edges {
            let from = self.node(edge.from).map_or("?", |n| n.label);
            let to = self.node(edge.to).map_or("?", |n| n.label);
            writeln!(
                f,
                "  {:>3} → {:<3} {:<8} {} → {}",
                edge.from.0,
                edge.to.0,
                edge.kind.as_str(),
                from,
                to
            )?;
        }
        Ok(())
    }
}
