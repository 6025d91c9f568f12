//! Graph topology manager.
//!
//! [`AudioGraph`] owns the context, the processing chain and the spatial
//! state. The topology only changes through [`AudioGraph::rewire`], which
//! always tears every connection down and realizes a fresh [`GraphPlan`]:
//!
//! 1. cancel the pending animation frame
//! 2. disconnect every chain node
//! 3. release every branch node
//! 4. plan the complete topology
//! 5. connect the chain, then realize each branch group
//! 6. set the reverb wet level
//!
//! Because nothing survives from the previous topology, calling `rewire` twice
//! with the same count yields the same graph.

use auralis_core::{BranchCount, BranchLayout, BranchNodeIds, GraphPlan, branch_layouts, wet_level};
use auralis_io::{AudioContext, BackendError, FrameId, FrameScheduler, MediaElement};

use crate::animator::{SpatialAnimator, StepOutcome};
use crate::branch::{Bindings, BranchFailure, BranchSet, realize_branch};
use crate::chain::ProcessingChain;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::reconcile::ParamUpdates;

/// Spatial branches and their animation.
#[derive(Debug, Default)]
pub struct SpatialState {
    dimensional: Option<BranchCount>,
    branches: BranchSet,
    animator: SpatialAnimator,
}

impl SpatialState {
    /// Requested branch count, `None` when spatialization is off.
    pub fn dimensional(&self) -> Option<BranchCount> {
        self.dimensional
    }

    /// Live branches.
    pub fn branches(&self) -> &BranchSet {
        &self.branches
    }

    /// The animator.
    pub fn animator(&self) -> &SpatialAnimator {
        &self.animator
    }
}

/// What a rewire produced.
#[derive(Clone, Debug, PartialEq)]
pub struct RewireReport {
    /// Requested branch count.
    pub dimensional: Option<BranchCount>,
    /// Branches realized.
    pub branches_built: usize,
    /// Branches skipped.
    pub failed: Vec<BranchFailure>,
    /// Reverb return level.
    pub wet_level: f32,
}

struct TopologyPlan {
    plan: GraphPlan,
    chain: Bindings,
    branches: Vec<(BranchLayout, BranchNodeIds)>,
}

/// The audio graph of one attached media element.
#[derive(Debug)]
pub struct AudioGraph<C: AudioContext> {
    ctx: C,
    chain: ProcessingChain,
    spatial: SpatialState,
    config: EngineConfig,
    plan: GraphPlan,
    torn_down: bool,
}

impl<C: AudioContext> AudioGraph<C> {
    /// Binds `media` in `ctx` and builds the processing chain.
    ///
    /// The chain is left unconnected until the first [`rewire`](Self::rewire).
    /// On failure every node created so far is released and the context is
    /// closed.
    pub fn build(mut ctx: C, media: &MediaElement, config: EngineConfig) -> Result<Self> {
        match ProcessingChain::build(&mut ctx, media, &config) {
            Ok(chain) => Ok(Self {
                ctx,
                chain,
                spatial: SpatialState::default(),
                config,
                plan: GraphPlan::new(),
                torn_down: false,
            }),
            Err(e) => {
                if let Err(close) = ctx.close() {
                    tracing::debug!(error = %close, "closing context after failed build");
                }
                Err(e)
            }
        }
    }

    /// Writes parameter updates into the chain.
    pub fn apply_params(&mut self, params: &ParamUpdates) {
        if self.torn_down {
            return;
        }
        self.chain.apply(&mut self.ctx, params);
    }

    /// Rebuilds the topology for `dimensional` branches, or without branches.
    ///
    /// Branches that fail to build are skipped, listed in the report and
    /// left out of the stored plan. Failing to connect the chain itself is
    /// an error; the graph is then left with no connections, no branches and
    /// an empty plan.
    pub fn rewire(
        &mut self,
        scheduler: &mut dyn FrameScheduler,
        dimensional: Option<BranchCount>,
    ) -> Result<RewireReport> {
        if self.torn_down {
            return Err(BackendError::ContextClosed.into());
        }

        match dimensional {
            Some(_) => self.spatial.animator.cancel(scheduler),
            None => self.spatial.animator.reset(scheduler),
        }
        self.chain.disconnect_all(&mut self.ctx);
        self.spatial.branches.release(&mut self.ctx);
        self.spatial.dimensional = None;
        self.plan = GraphPlan::new();

        let TopologyPlan {
            mut plan,
            chain,
            branches,
        } = self.plan_topology(dimensional)?;

        if let Err(e) = self.connect_chain(&plan, &chain) {
            self.chain.disconnect_all(&mut self.ctx);
            tracing::warn!(error = %e, "chain connection failed, graph left unconnected");
            return Err(e);
        }
        self.spatial.dimensional = dimensional;

        let mut failed = Vec::new();
        let mut skipped = Vec::new();
        for (layout, ids) in branches {
            match realize_branch(&mut self.ctx, &plan, layout, ids, &chain) {
                Ok(branch) => self.spatial.branches.push(branch),
                Err(e) => {
                    tracing::warn!(index = layout.index, error = %e, "branch skipped");
                    skipped.push(layout.group());
                    failed.push(BranchFailure {
                        index: layout.index,
                        error: e.to_string(),
                    });
                }
            }
        }
        // after the loop: removal renumbers the IDs the loop still needs
        for group in skipped {
            plan.remove_group(group);
        }

        let wet = dimensional.map_or(0.0, wet_level);
        self.chain.set_wet_level(&mut self.ctx, wet);
        self.plan = plan;

        let report = RewireReport {
            dimensional,
            branches_built: self.spatial.branches.len(),
            failed,
            wet_level: wet,
        };
        tracing::info!(
            branches = report.branches_built,
            skipped = report.failed.len(),
            wet = report.wet_level,
            nodes = self.plan.node_count(),
            edges = self.plan.edge_count(),
            "topology rewired"
        );
        Ok(report)
    }

    fn connect_chain(&mut self, plan: &GraphPlan, chain: &Bindings) -> Result<()> {
        for edge in plan.chain_edges() {
            let from = chain.get(&edge.from).ok_or(EngineError::Unbound(edge.from))?;
            let to = chain.get(&edge.to).ok_or(EngineError::Unbound(edge.to))?;
            self.ctx.connect(*from, *to)?;
        }
        Ok(())
    }

    fn plan_topology(&self, dimensional: Option<BranchCount>) -> Result<TopologyPlan> {
        let layouts: Vec<BranchLayout> = dimensional.into_iter().flat_map(branch_layouts).collect();
        let mut plan = GraphPlan::with_capacity(12 + layouts.len() * 8, 10 + layouts.len() * 12);
        let (taps, bindings) = self.chain.plan_into(&mut plan, dimensional.is_none())?;
        let branches = layouts
            .into_iter()
            .map(|layout| Ok((layout, layout.plan_into(&mut plan, taps)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(TopologyPlan {
            plan,
            chain: bindings.into_iter().collect(),
            branches,
        })
    }

    /// Starts the animation if spatialization is on. Returns whether a frame
    /// is pending.
    pub fn start_animation(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        if self.torn_down || self.spatial.dimensional.is_none() {
            return false;
        }
        let (state, now) = (self.ctx.state(), self.ctx.current_time());
        self.spatial
            .animator
            .start(scheduler, state, now, &self.spatial.branches)
    }

    /// Delivers an animation frame.
    pub fn on_frame(&mut self, frame: FrameId, scheduler: &mut dyn FrameScheduler) -> StepOutcome {
        let enabled = !self.torn_down && self.spatial.dimensional.is_some();
        self.spatial
            .animator
            .step(frame, &mut self.ctx, &self.spatial.branches, scheduler, enabled)
    }

    /// Cancels animation, releases every node and closes the context.
    ///
    /// Safe to call more than once.
    pub fn teardown(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.torn_down {
            return;
        }
        self.spatial.animator.reset(scheduler);
        self.spatial.branches.release(&mut self.ctx);
        self.spatial.dimensional = None;
        self.chain.release(&mut self.ctx);
        if let Err(e) = self.ctx.close() {
            tracing::warn!(error = %e, "closing audio context failed");
        }
        self.plan = GraphPlan::new();
        self.torn_down = true;
        tracing::info!("audio graph torn down");
    }

    /// The most recently realized plan. Empty before the first rewire and
    /// after teardown.
    pub fn plan(&self) -> &GraphPlan {
        &self.plan
    }

    /// The processing chain.
    pub fn chain(&self) -> &ProcessingChain {
        &self.chain
    }

    /// Spatial branches and animation.
    pub fn spatial(&self) -> &SpatialState {
        &self.spatial
    }

    /// The audio context.
    pub fn context(&self) -> &C {
        &self.ctx
    }

    /// Construction settings.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns `true` after [`teardown`](Self::teardown).
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auralis_core::{EdgeKind, NodeGroup, NodeTag};
    use auralis_io::{ContextState, Fault, OfflinePlatform, OfflineProbe, Platform};

    use crate::chain::ChainSlot;

    /// Chain nodes plus the destination.
    const CHAIN_NODES: usize = 11;

    fn graph(platform: &mut OfflinePlatform) -> AudioGraph<auralis_io::OfflineContext> {
        let ctx = platform.create_context().unwrap();
        AudioGraph::build(ctx, &MediaElement::new(1, "video"), EngineConfig::default()).unwrap()
    }

    fn setup() -> (OfflinePlatform, OfflineProbe, AudioGraph<auralis_io::OfflineContext>) {
        let mut platform = OfflinePlatform::new();
        let probe = platform.probe();
        let g = graph(&mut platform);
        (platform, probe, g)
    }

    #[test]
    fn build_leaves_chain_unconnected() {
        let (_platform, probe, g) = setup();
        assert_eq!(probe.live_node_count(), CHAIN_NODES);
        assert!(probe.live_edges().is_empty());
        assert!(g.plan().nodes().is_empty());
        let convolver = g.chain().handle(ChainSlot::Convolver).unwrap();
        assert_eq!(probe.node(convolver).unwrap().impulse_frames, Some(76_800));
    }

    #[test]
    fn direct_topology() {
        let (mut platform, probe, mut g) = setup();
        let report = g.rewire(&mut platform, None).unwrap();

        assert_eq!(report.branches_built, 0);
        assert_eq!(report.wet_level, 0.0);
        assert_eq!(probe.live_edges().len(), 10);
        let tail = g.chain().tail().handle;
        let master = g.chain().handle(ChainSlot::Master).unwrap();
        assert!(probe.has_edge(tail, master));
    }

    #[test]
    fn dimensional_topology() {
        let (mut platform, probe, mut g) = setup();
        let report = g.rewire(&mut platform, Some(BranchCount::new(4))).unwrap();

        assert_eq!(report.branches_built, 4);
        assert!((report.wet_level - 0.11).abs() < 1e-6);
        assert_eq!(probe.live_node_count(), CHAIN_NODES + 32);
        assert_eq!(probe.live_edges().len(), 9 + 4 * 12);
        assert_eq!(probe.nodes_with_tag(NodeTag::Panner).len(), 4);

        let tail = g.chain().tail().handle;
        let master = g.chain().handle(ChainSlot::Master).unwrap();
        assert!(!probe.has_edge(tail, master));
        assert_eq!(
            g.plan().edges().iter().filter(|e| e.kind == EdgeKind::FanOut).count(),
            4
        );
    }

    #[test]
    fn rewire_is_idempotent() {
        let (mut platform, probe, mut g) = setup();
        let count = Some(BranchCount::new(6));
        g.rewire(&mut platform, count).unwrap();
        let nodes = probe.live_node_count();
        let edges = probe.live_edges().len();

        g.rewire(&mut platform, count).unwrap();

        assert_eq!(probe.live_node_count(), nodes);
        assert_eq!(probe.live_edges().len(), edges);
        assert_eq!(probe.duplicate_edges(), 0);
    }

    #[test]
    fn switching_off_releases_branches() {
        let (mut platform, probe, mut g) = setup();
        g.rewire(&mut platform, Some(BranchCount::new(12))).unwrap();
        g.rewire(&mut platform, None).unwrap();

        assert_eq!(probe.live_node_count(), CHAIN_NODES);
        assert_eq!(probe.live_edges().len(), 10);
        assert!(g.spatial().branches().is_empty());
    }

    #[test]
    fn failed_branch_is_skipped() {
        let (mut platform, probe, mut g) = setup();
        // the first branch's voice panner
        probe.inject(Fault::NodeCreation {
            tag: NodeTag::StereoPanner,
            nth: 1,
        });

        let report = g.rewire(&mut platform, Some(BranchCount::new(3))).unwrap();

        assert_eq!(report.branches_built, 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].index, 0);
        assert_eq!(probe.live_node_count(), CHAIN_NODES + 16);
        assert_eq!(probe.live_edges().len(), 9 + 2 * 12);

        let plan = g.plan();
        assert_eq!(plan.node_count(), CHAIN_NODES + 16);
        assert_eq!(plan.edge_count(), probe.live_edges().len());
        assert_eq!(
            plan.branch_groups(),
            vec![NodeGroup::Branch(1), NodeGroup::Branch(2)]
        );
        assert!(!plan.to_string().contains("branch[ 0]"));
    }

    #[test]
    fn chain_connect_failure_leaves_nothing_connected() {
        let (mut platform, probe, mut g) = setup();
        g.rewire(&mut platform, Some(BranchCount::new(4))).unwrap();
        assert!(g.start_animation(&mut platform));
        // 57 connects so far; fail the third chain edge of the next rewire
        probe.inject(Fault::Connect { nth: 9 + 4 * 12 + 3 });

        let err = g.rewire(&mut platform, Some(BranchCount::new(8))).unwrap_err();

        assert!(matches!(err, EngineError::Backend(_)));
        assert!(probe.live_edges().is_empty());
        assert_eq!(probe.live_node_count(), CHAIN_NODES);
        assert!(g.spatial().branches().is_empty());
        assert_eq!(g.spatial().dimensional(), None);
        assert!(g.plan().nodes().is_empty());
        assert!(!g.start_animation(&mut platform));
        assert!(probe.pending_frames().is_empty());

        // the graph is still usable
        g.rewire(&mut platform, Some(BranchCount::new(8))).unwrap();
        assert_eq!(probe.live_node_count(), CHAIN_NODES + 64);
        assert_eq!(g.plan().node_count(), CHAIN_NODES + 64);
    }

    #[test]
    fn missing_compressor_shortens_chain() {
        let mut platform = OfflinePlatform::new();
        let probe = platform.probe();
        probe.inject(Fault::EveryNode(NodeTag::Compressor));
        let mut g = graph(&mut platform);

        assert!(!g.chain().has_compressor());
        g.rewire(&mut platform, None).unwrap();

        let treble = g.chain().handle(ChainSlot::Treble).unwrap();
        let master = g.chain().handle(ChainSlot::Master).unwrap();
        assert!(probe.has_edge(treble, master));
        assert_eq!(probe.live_node_count(), CHAIN_NODES - 1);
    }

    #[test]
    fn binding_failure_closes_context() {
        let mut platform = OfflinePlatform::new();
        let probe = platform.probe();
        probe.inject(Fault::ElementSource);
        probe.inject(Fault::StreamSource);
        let ctx = platform.create_context().unwrap();

        let err = AudioGraph::build(ctx, &MediaElement::new(1, "video"), EngineConfig::default())
            .unwrap_err();

        assert!(matches!(err, EngineError::SourceBinding { .. }));
        assert_eq!(probe.context_state(), Some(ContextState::Closed));
        assert_eq!(probe.live_node_count(), 0);
    }

    #[test]
    fn teardown_is_reentrant() {
        let (mut platform, probe, mut g) = setup();
        g.rewire(&mut platform, Some(BranchCount::new(3))).unwrap();
        assert!(g.start_animation(&mut platform));

        g.teardown(&mut platform);
        g.teardown(&mut platform);

        assert!(g.is_torn_down());
        assert!(probe.pending_frames().is_empty());
        assert_eq!(probe.context_state(), Some(ContextState::Closed));
        assert!(g.spatial().branches().is_empty());
        assert!(g.rewire(&mut platform, None).is_err());
    }

    #[test]
    fn count_change_keeps_animation_origin() {
        let (mut platform, probe, mut g) = setup();
        probe.advance_time(2.0);
        g.rewire(&mut platform, Some(BranchCount::new(4))).unwrap();
        g.start_animation(&mut platform);
        probe.advance_time(1.0);

        g.rewire(&mut platform, Some(BranchCount::new(8))).unwrap();
        g.start_animation(&mut platform);

        assert_eq!(g.spatial().animator().origin(), Some(2.0));
        assert_eq!(probe.pending_frames().len(), 1);

        g.rewire(&mut platform, None).unwrap();
        assert_eq!(g.spatial().animator().origin(), None);
        assert!(probe.pending_frames().is_empty());
    }
}
