//! Edge types for the graph description.
//!
//! An [`Edge`] is a directed signal connection between two planned nodes.
//! Its [`EdgeKind`] records why the connection exists, which the engine uses
//! for logging and the CLI uses for display; realization treats all kinds the
//! same.

use core::fmt;

use super::node::NodeId;

/// Identifier of an edge inside one [`GraphPlan`](super::GraphPlan).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub(crate) u32);

impl EdgeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

/// Role of a connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Serial link inside the processing chain or inside a branch path.
    Chain,
    /// Chain output fanning out into a branch input.
    FanOut,
    /// Branch output summing into the master gain.
    Mix,
    /// Signal sent towards the shared reverb.
    Send,
    /// Reverb return into the master gain.
    Return,
}

impl EdgeKind {
    /// Lowercase name for logs and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chain => "chain",
            Self::FanOut => "fan-out",
            Self::Mix => "mix",
            Self::Send => "send",
            Self::Return => "return",
        }
    }
}

/// A directed connection between two planned nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    /// Edge identifier.
    pub id: EdgeId,
    /// Source node.
    pub from: NodeId,
    /// Destination node.
    pub to: NodeId,
    /// Why the connection exists.
    pub kind: EdgeKind,
}
