//! Scoped node ownership.
//!
//! Graph construction creates several native nodes before it knows whether
//! the whole unit will succeed. [`NodeScope`] tracks every node created
//! through it and releases them all when dropped, unless [`NodeScope::commit`]
//! hands them over first. Every early return with `?` therefore cleans up.

use auralis_core::NodeKind;

use crate::context::{AudioContext, NodeHandle};
use crate::Result;

/// Releases `nodes` in reverse creation order, best effort.
///
/// Errors are logged and skipped; cleanup never fails.
pub fn release_all<C: AudioContext + ?Sized>(ctx: &mut C, nodes: &[NodeHandle]) {
    for &node in nodes.iter().rev() {
        if let Err(e) = ctx.release(node) {
            tracing::debug!(%node, error = %e, "release failed");
        }
    }
}

/// Guard that owns nodes until committed.
///
/// ```rust
/// use auralis_core::NodeKind;
/// use auralis_io::{AudioContext, NodeScope, OfflinePlatform, Platform};
///
/// let mut platform = OfflinePlatform::new();
/// let probe = platform.probe();
/// let mut ctx = platform.create_context().unwrap();
///
/// {
///     let mut scope = NodeScope::new(&mut ctx);
///     scope.create(&NodeKind::Gain(1.0)).unwrap();
///     scope.create(&NodeKind::StereoPanner).unwrap();
///     // dropped without commit
/// }
/// assert_eq!(probe.live_node_count(), 1); // only the destination remains
/// ```
pub struct NodeScope<'a, C: AudioContext + ?Sized> {
    ctx: &'a mut C,
    created: Vec<NodeHandle>,
    committed: bool,
}

impl<'a, C: AudioContext + ?Sized> NodeScope<'a, C> {
    /// Opens a scope over `ctx`.
    pub fn new(ctx: &'a mut C) -> Self {
        Self {
            ctx,
            created: Vec::new(),
            committed: false,
        }
    }

    /// Creates a node owned by this scope.
    pub fn create(&mut self, kind: &NodeKind) -> Result<NodeHandle> {
        let node = self.ctx.create_node(kind)?;
        self.created.push(node);
        Ok(node)
    }

    /// Takes ownership of a node created elsewhere.
    pub fn adopt(&mut self, node: NodeHandle) -> NodeHandle {
        self.created.push(node);
        node
    }

    /// Connects two nodes through the scoped context.
    pub fn connect(&mut self, from: NodeHandle, to: NodeHandle) -> Result<()> {
        self.ctx.connect(from, to)
    }

    /// The underlying context.
    pub fn context(&mut self) -> &mut C {
        &mut *self.ctx
    }

    /// Keeps every owned node alive and returns them in creation order.
    pub fn commit(mut self) -> Vec<NodeHandle> {
        self.committed = true;
        std::mem::take(&mut self.created)
    }
}

impl<C: AudioContext + ?Sized> Drop for NodeScope<'_, C> {
    fn drop(&mut self) {
        if self.committed || self.created.is_empty() {
            return;
        }
        tracing::debug!(nodes = self.created.len(), "releasing uncommitted scope");
        release_all(&mut *self.ctx, &self.created);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OfflinePlatform, Platform};

    #[test]
    fn commit_keeps_nodes() {
        let mut platform = OfflinePlatform::new();
        let probe = platform.probe();
        let mut ctx = platform.create_context().unwrap();

        let mut scope = NodeScope::new(&mut ctx);
        let a = scope.create(&NodeKind::Gain(1.0)).unwrap();
        let b = scope.create(&NodeKind::Gain(0.5)).unwrap();
        scope.connect(a, b).unwrap();
        let kept = scope.commit();

        assert_eq!(kept, vec![a, b]);
        assert_eq!(probe.live_node_count(), 3);
        assert_eq!(probe.live_edges().len(), 1);
    }

    #[test]
    fn drop_releases_nodes_and_edges() {
        let mut platform = OfflinePlatform::new();
        let probe = platform.probe();
        let mut ctx = platform.create_context().unwrap();
        let dest = ctx.destination();

        let result: Result<()> = (|| {
            let mut scope = NodeScope::new(&mut ctx);
            let a = scope.create(&NodeKind::Gain(1.0))?;
            scope.connect(a, dest)?;
            scope.connect(a, NodeHandle(999))?;
            scope.commit();
            Ok(())
        })();

        assert!(result.is_err());
        assert_eq!(probe.live_node_count(), 1);
        assert!(probe.live_edges().is_empty());
    }

    #[test]
    fn release_all_skips_failures() {
        let mut platform = OfflinePlatform::new();
        let probe = platform.probe();
        let mut ctx = platform.create_context().unwrap();
        let a = ctx.create_node(&NodeKind::Gain(1.0)).unwrap();

        release_all(&mut ctx, &[NodeHandle(999), a]);
        assert_eq!(probe.live_node_count(), 1);
    }
}
