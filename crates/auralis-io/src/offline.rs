//! Deterministic in-memory platform.
//!
//! [`OfflinePlatform`] implements the platform traits without producing any
//! sound. It keeps a record of everything the engine did, which tests and the
//! CLI inspect through an [`OfflineProbe`]:
//!
//! - every node with its kind, liveness and current parameter values
//! - every live connection, including accidental duplicates
//! - every parameter write, immediate or scheduled
//! - requested, cancelled and pending animation frames
//!
//! Failures are injected with [`Fault`]s, so error paths (a source that cannot
//! be bound, a branch node that fails to construct) can be driven on demand.
//!
//! ```rust
//! use auralis_core::{NodeKind, NodeTag};
//! use auralis_io::{AudioContext, Fault, OfflinePlatform, Platform};
//!
//! let mut platform = OfflinePlatform::new();
//! let probe = platform.probe();
//! probe.inject(Fault::NodeCreation { tag: NodeTag::Panner, nth: 1 });
//!
//! let mut ctx = platform.create_context().unwrap();
//! assert!(ctx.create_node(&NodeKind::Panner(auralis_core::PannerSpec::ORBIT)).is_err());
//! assert!(ctx.create_node(&NodeKind::Panner(auralis_core::PannerSpec::ORBIT)).is_ok());
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

use auralis_core::{ImpulseResponse, NodeKind, NodeTag, ParamKey};

use crate::context::{
    AudioContext, ContextState, FrameId, FrameScheduler, MediaElement, NodeHandle, Platform,
};
use crate::{BackendError, Result};

const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// How the media source was bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceMode {
    /// Bound directly to the element.
    Element,
    /// Bound through the element's capture stream.
    Stream,
}

/// A failure to inject into the offline platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fault {
    /// `create_context` fails.
    ContextCreation,
    /// Direct element binding fails.
    ElementSource,
    /// Capture-stream binding fails.
    StreamSource,
    /// The `nth` creation (1-based, counted across the platform's lifetime)
    /// of a node with `tag` fails.
    NodeCreation {
        /// Node kind to fail.
        tag: NodeTag,
        /// Which creation fails.
        nth: usize,
    },
    /// Every creation of a node with this tag fails.
    EveryNode(NodeTag),
    /// The `nth` `connect` call (1-based, counted across the platform's
    /// lifetime) fails.
    Connect {
        /// Which call fails.
        nth: usize,
    },
}

/// A node as recorded by the offline context.
#[derive(Clone, Debug, PartialEq)]
pub struct OfflineNode {
    /// Node handle.
    pub handle: NodeHandle,
    /// What the node is.
    pub kind: NodeKind,
    /// Binding mode, for source nodes.
    pub source: Option<SourceMode>,
    /// `false` once released or closed.
    pub live: bool,
    /// Latest value of every parameter.
    pub values: BTreeMap<ParamKey, f32>,
    /// Frames of the loaded impulse, for convolvers.
    pub impulse_frames: Option<usize>,
}

impl OfflineNode {
    /// Node kind discriminant.
    pub fn tag(&self) -> NodeTag {
        self.kind.tag()
    }
}

/// A live connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OfflineEdge {
    /// Source node.
    pub from: NodeHandle,
    /// Destination node.
    pub to: NodeHandle,
}

/// A recorded parameter write.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamEvent {
    /// Target node.
    pub node: NodeHandle,
    /// Parameter written.
    pub param: ParamKey,
    /// New value.
    pub value: f32,
    /// Context time for scheduled writes, `None` for immediate ones.
    pub at: Option<f64>,
}

#[derive(Debug)]
struct GraphState {
    state: ContextState,
    time: f64,
    sample_rate: u32,
    next_handle: u64,
    nodes: Vec<OfflineNode>,
    edges: Vec<OfflineEdge>,
    events: Vec<ParamEvent>,
}

impl GraphState {
    fn new(state: ContextState, sample_rate: u32, time: f64) -> Self {
        let mut graph = Self {
            state,
            time,
            sample_rate,
            next_handle: 0,
            nodes: Vec::new(),
            edges: Vec::new(),
            events: Vec::new(),
        };
        graph.insert(NodeKind::Destination, None);
        graph
    }

    fn insert(&mut self, kind: NodeKind, source: Option<SourceMode>) -> NodeHandle {
        let handle = NodeHandle(self.next_handle);
        self.next_handle += 1;
        let values = ALL_PARAMS
            .iter()
            .filter_map(|&p| p.initial_value(&kind).map(|v| (p, v)))
            .collect();
        self.nodes.push(OfflineNode {
            handle,
            kind,
            source,
            live: true,
            values,
            impulse_frames: None,
        });
        handle
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == ContextState::Closed {
            Err(BackendError::ContextClosed)
        } else {
            Ok(())
        }
    }

    fn live(&self, handle: NodeHandle) -> Result<&OfflineNode> {
        self.nodes
            .get(handle.0 as usize)
            .filter(|n| n.live)
            .ok_or(BackendError::UnknownNode(handle))
    }

    fn live_mut(&mut self, handle: NodeHandle) -> Result<&mut OfflineNode> {
        self.nodes
            .get_mut(handle.0 as usize)
            .filter(|n| n.live)
            .ok_or(BackendError::UnknownNode(handle))
    }

    fn write_param(
        &mut self,
        node: NodeHandle,
        param: ParamKey,
        value: f32,
        at: Option<f64>,
    ) -> Result<()> {
        self.ensure_open()?;
        let entry = self.live_mut(node)?;
        if !param.accepted_by(entry.tag()) {
            return Err(BackendError::UnsupportedParam { node, param });
        }
        entry.values.insert(param, value);
        self.events.push(ParamEvent {
            node,
            param,
            value,
            at,
        });
        Ok(())
    }
}

const ALL_PARAMS: [ParamKey; 12] = [
    ParamKey::Frequency,
    ParamKey::Q,
    ParamKey::Gain,
    ParamKey::Threshold,
    ParamKey::Knee,
    ParamKey::Ratio,
    ParamKey::Attack,
    ParamKey::Release,
    ParamKey::PositionX,
    ParamKey::PositionY,
    ParamKey::PositionZ,
    ParamKey::Pan,
];

#[derive(Debug)]
struct OfflineState {
    initial_state: ContextState,
    sample_rate: u32,
    start_time: f64,
    contexts: Vec<GraphState>,
    faults: Vec<Fault>,
    creations: HashMap<NodeTag, usize>,
    connects: usize,
    next_frame: u64,
    pending_frames: BTreeSet<FrameId>,
    frames_requested: usize,
    frames_cancelled: usize,
}

impl OfflineState {
    fn graph(&self, index: usize) -> &GraphState {
        &self.contexts[index]
    }

    fn graph_mut(&mut self, index: usize) -> &mut GraphState {
        &mut self.contexts[index]
    }

    fn has_fault(&self, fault: Fault) -> bool {
        self.faults.contains(&fault)
    }

    /// Counts one creation of `tag` and reports whether it must fail.
    fn creation_fails(&mut self, tag: NodeTag) -> bool {
        let count = self.creations.entry(tag).or_insert(0);
        *count += 1;
        let nth = *count;
        self.faults.iter().any(|f| match *f {
            Fault::NodeCreation { tag: t, nth: n } => t == tag && n == nth,
            Fault::EveryNode(t) => t == tag,
            _ => false,
        })
    }

    /// Counts one `connect` call and reports whether it must fail.
    fn connect_fails(&mut self) -> bool {
        self.connects += 1;
        let nth = self.connects;
        self.faults.contains(&Fault::Connect { nth })
    }
}

type Shared = Rc<RefCell<OfflineState>>;

/// In-memory [`Platform`].
#[derive(Debug)]
pub struct OfflinePlatform {
    shared: Shared,
}

impl Default for OfflinePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl OfflinePlatform {
    /// Platform producing running 48 kHz contexts.
    pub fn new() -> Self {
        Self {
            shared: Rc::new(RefCell::new(OfflineState {
                initial_state: ContextState::Running,
                sample_rate: DEFAULT_SAMPLE_RATE,
                start_time: 0.0,
                contexts: Vec::new(),
                faults: Vec::new(),
                creations: HashMap::new(),
                connects: 0,
                next_frame: 1,
                pending_frames: BTreeSet::new(),
                frames_requested: 0,
                frames_cancelled: 0,
            })),
        }
    }

    /// Sets the sample rate of contexts created from now on.
    pub fn with_sample_rate(self, sample_rate: u32) -> Self {
        self.shared.borrow_mut().sample_rate = sample_rate;
        self
    }

    /// Sets the clock reading of contexts created from now on, as for a
    /// page that has been playing for a while.
    pub fn with_start_time(self, seconds: f64) -> Self {
        self.shared.borrow_mut().start_time = seconds;
        self
    }

    /// Sets the state new contexts start in.
    pub fn with_initial_state(self, state: ContextState) -> Self {
        self.shared.borrow_mut().initial_state = state;
        self
    }

    /// Inspection handle sharing this platform's record.
    pub fn probe(&self) -> OfflineProbe {
        OfflineProbe {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl FrameScheduler for OfflinePlatform {
    fn request_frame(&mut self) -> FrameId {
        let mut s = self.shared.borrow_mut();
        let frame = FrameId(s.next_frame);
        s.next_frame += 1;
        s.frames_requested += 1;
        s.pending_frames.insert(frame);
        frame
    }

    fn cancel_frame(&mut self, frame: FrameId) {
        let mut s = self.shared.borrow_mut();
        if s.pending_frames.remove(&frame) {
            s.frames_cancelled += 1;
        }
    }
}

impl Platform for OfflinePlatform {
    type Context = OfflineContext;

    fn create_context(&mut self) -> Result<OfflineContext> {
        let mut s = self.shared.borrow_mut();
        if s.has_fault(Fault::ContextCreation) {
            return Err(BackendError::ContextCreation(
                "audio output unavailable".into(),
            ));
        }
        let graph = GraphState::new(s.initial_state, s.sample_rate, s.start_time);
        s.contexts.push(graph);
        let index = s.contexts.len() - 1;
        tracing::debug!(index, "offline context created");
        Ok(OfflineContext {
            shared: Rc::clone(&self.shared),
            index,
        })
    }
}

/// In-memory [`AudioContext`].
#[derive(Debug)]
pub struct OfflineContext {
    shared: Shared,
    index: usize,
}

impl OfflineContext {
    fn with_graph<T>(&self, f: impl FnOnce(&GraphState) -> T) -> T {
        f(self.shared.borrow().graph(self.index))
    }

    fn with_graph_mut<T>(&self, f: impl FnOnce(&mut GraphState) -> T) -> T {
        f(self.shared.borrow_mut().graph_mut(self.index))
    }

    fn bind_source(&mut self, media: &MediaElement, mode: SourceMode) -> Result<NodeHandle> {
        let mut s = self.shared.borrow_mut();
        s.graph(self.index).ensure_open()?;
        let fault = match mode {
            SourceMode::Element => Fault::ElementSource,
            SourceMode::Stream => Fault::StreamSource,
        };
        if s.has_fault(fault) {
            return Err(BackendError::SourceBinding(format!(
                "{} refused {:?} binding",
                media.label, mode
            )));
        }
        if mode == SourceMode::Stream && !media.supports_capture {
            return Err(BackendError::SourceBinding(format!(
                "{} has no capture stream",
                media.label
            )));
        }
        Ok(s.graph_mut(self.index).insert(NodeKind::Source, Some(mode)))
    }
}

impl AudioContext for OfflineContext {
    fn state(&self) -> ContextState {
        self.with_graph(|g| g.state)
    }

    fn current_time(&self) -> f64 {
        self.with_graph(|g| g.time)
    }

    fn sample_rate(&self) -> u32 {
        self.with_graph(|g| g.sample_rate)
    }

    fn destination(&self) -> NodeHandle {
        NodeHandle(0)
    }

    fn create_node(&mut self, kind: &NodeKind) -> Result<NodeHandle> {
        let tag = kind.tag();
        if matches!(tag, NodeTag::Source | NodeTag::Destination) {
            return Err(BackendError::NodeConstruction {
                kind: tag,
                reason: "owned by the context".into(),
            });
        }
        let mut s = self.shared.borrow_mut();
        s.graph(self.index).ensure_open()?;
        if s.creation_fails(tag) {
            return Err(BackendError::NodeConstruction {
                kind: tag,
                reason: "injected failure".into(),
            });
        }
        Ok(s.graph_mut(self.index).insert(*kind, None))
    }

    fn create_media_element_source(&mut self, media: &MediaElement) -> Result<NodeHandle> {
        self.bind_source(media, SourceMode::Element)
    }

    fn create_media_stream_source(&mut self, media: &MediaElement) -> Result<NodeHandle> {
        self.bind_source(media, SourceMode::Stream)
    }

    fn connect(&mut self, from: NodeHandle, to: NodeHandle) -> Result<()> {
        let mut s = self.shared.borrow_mut();
        s.graph(self.index).ensure_open()?;
        if s.connect_fails() {
            return Err(BackendError::InvalidConnection {
                from,
                to,
                reason: "connection refused",
            });
        }
        drop(s);
        self.with_graph_mut(|g| {
            let from_tag = g.live(from)?.tag();
            let to_tag = g.live(to)?.tag();
            if from_tag == NodeTag::Destination {
                return Err(BackendError::InvalidConnection {
                    from,
                    to,
                    reason: "destination has no outputs",
                });
            }
            if to_tag == NodeTag::Source {
                return Err(BackendError::InvalidConnection {
                    from,
                    to,
                    reason: "source has no inputs",
                });
            }
            g.edges.push(OfflineEdge { from, to });
            Ok(())
        })
    }

    fn disconnect(&mut self, node: NodeHandle) -> Result<()> {
        self.with_graph_mut(|g| {
            g.ensure_open()?;
            g.live(node)?;
            g.edges.retain(|e| e.from != node);
            Ok(())
        })
    }

    fn release(&mut self, node: NodeHandle) -> Result<()> {
        self.with_graph_mut(|g| {
            g.ensure_open()?;
            if node == NodeHandle(0) {
                return Err(BackendError::UnknownNode(node));
            }
            g.live_mut(node)?.live = false;
            g.edges.retain(|e| e.from != node && e.to != node);
            Ok(())
        })
    }

    fn set_param(&mut self, node: NodeHandle, param: ParamKey, value: f32) -> Result<()> {
        self.with_graph_mut(|g| g.write_param(node, param, value, None))
    }

    fn schedule_param(
        &mut self,
        node: NodeHandle,
        param: ParamKey,
        value: f32,
        at: f64,
    ) -> Result<()> {
        self.with_graph_mut(|g| g.write_param(node, param, value, Some(at)))
    }

    fn set_convolver_buffer(&mut self, node: NodeHandle, impulse: &ImpulseResponse) -> Result<()> {
        self.with_graph_mut(|g| {
            g.ensure_open()?;
            let entry = g.live_mut(node)?;
            if entry.tag() != NodeTag::Convolver {
                return Err(BackendError::NodeConstruction {
                    kind: entry.tag(),
                    reason: "not a convolver".into(),
                });
            }
            entry.impulse_frames = Some(impulse.len());
            Ok(())
        })
    }

    fn close(&mut self) -> Result<()> {
        self.with_graph_mut(|g| {
            g.ensure_open()?;
            g.state = ContextState::Closed;
            g.edges.clear();
            for node in &mut g.nodes {
                node.live = false;
            }
            Ok(())
        })
    }
}

/// Read access to an [`OfflinePlatform`]'s record, plus host-side controls
/// (context state changes, clock, frame delivery, faults).
///
/// Queries describe the most recently created context.
#[derive(Debug, Clone)]
pub struct OfflineProbe {
    shared: Shared,
}

impl OfflineProbe {
    fn with_latest<T>(&self, default: T, f: impl FnOnce(&GraphState) -> T) -> T {
        self.shared.borrow().contexts.last().map_or(default, f)
    }

    /// Adds a fault.
    pub fn inject(&self, fault: Fault) {
        self.shared.borrow_mut().faults.push(fault);
    }

    /// Removes every fault.
    pub fn clear_faults(&self) {
        self.shared.borrow_mut().faults.clear();
    }

    /// Number of contexts created so far.
    pub fn contexts_created(&self) -> usize {
        self.shared.borrow().contexts.len()
    }

    /// State of the latest context.
    pub fn context_state(&self) -> Option<ContextState> {
        self.shared.borrow().contexts.last().map(|g| g.state)
    }

    /// Changes the latest context's state, as a host would after user
    /// interaction. Closing through here does not release nodes.
    pub fn set_context_state(&self, state: ContextState) {
        if let Some(g) = self.shared.borrow_mut().contexts.last_mut() {
            g.state = state;
        }
    }

    /// Advances the latest context's clock.
    pub fn advance_time(&self, seconds: f64) {
        if let Some(g) = self.shared.borrow_mut().contexts.last_mut() {
            g.time += seconds;
        }
    }

    /// Clock of the latest context.
    pub fn current_time(&self) -> f64 {
        self.with_latest(0.0, |g| g.time)
    }

    /// Live nodes, destination included.
    pub fn live_nodes(&self) -> Vec<OfflineNode> {
        self.with_latest(Vec::new(), |g| {
            g.nodes.iter().filter(|n| n.live).cloned().collect()
        })
    }

    /// Number of live nodes, destination included.
    pub fn live_node_count(&self) -> usize {
        self.with_latest(0, |g| g.nodes.iter().filter(|n| n.live).count())
    }

    /// Live nodes of one kind.
    pub fn nodes_with_tag(&self, tag: NodeTag) -> Vec<OfflineNode> {
        self.with_latest(Vec::new(), |g| {
            g.nodes
                .iter()
                .filter(|n| n.live && n.tag() == tag)
                .cloned()
                .collect()
        })
    }

    /// A node by handle, live or not.
    pub fn node(&self, handle: NodeHandle) -> Option<OfflineNode> {
        self.with_latest(None, |g| g.nodes.get(handle.0 as usize).cloned())
    }

    /// Live connections in creation order.
    pub fn live_edges(&self) -> Vec<OfflineEdge> {
        self.with_latest(Vec::new(), |g| g.edges.clone())
    }

    /// Whether `from → to` is connected.
    pub fn has_edge(&self, from: NodeHandle, to: NodeHandle) -> bool {
        self.with_latest(false, |g| {
            g.edges.iter().any(|e| e.from == from && e.to == to)
        })
    }

    /// Connections made more than once.
    pub fn duplicate_edges(&self) -> usize {
        self.with_latest(0, |g| {
            let unique: BTreeSet<(NodeHandle, NodeHandle)> =
                g.edges.iter().map(|e| (e.from, e.to)).collect();
            g.edges.len() - unique.len()
        })
    }

    /// Every parameter write, oldest first.
    pub fn param_events(&self) -> Vec<ParamEvent> {
        self.with_latest(Vec::new(), |g| g.events.clone())
    }

    /// Latest value of a parameter, including construction values.
    pub fn param_value(&self, node: NodeHandle, param: ParamKey) -> Option<f32> {
        self.with_latest(None, |g| {
            g.nodes
                .get(node.0 as usize)
                .and_then(|n| n.values.get(&param).copied())
        })
    }

    /// Binding mode of the live source, if any.
    pub fn source_mode(&self) -> Option<SourceMode> {
        self.with_latest(None, |g| {
            g.nodes
                .iter()
                .find(|n| n.live && n.tag() == NodeTag::Source)
                .and_then(|n| n.source)
        })
    }

    /// Frames requested and not yet cancelled or delivered.
    pub fn pending_frames(&self) -> Vec<FrameId> {
        self.shared.borrow().pending_frames.iter().copied().collect()
    }

    /// Total frames requested.
    pub fn frames_requested(&self) -> usize {
        self.shared.borrow().frames_requested
    }

    /// Total frames cancelled while pending.
    pub fn frames_cancelled(&self) -> usize {
        self.shared.borrow().frames_cancelled
    }

    /// Removes and returns the oldest pending frame, as the host does when it
    /// fires the callback.
    pub fn deliver_next_frame(&self) -> Option<FrameId> {
        self.shared.borrow_mut().pending_frames.pop_first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auralis_core::{BiquadSpec, FilterType};

    fn context() -> (OfflinePlatform, OfflineProbe, OfflineContext) {
        let mut platform = OfflinePlatform::new();
        let probe = platform.probe();
        let ctx = platform.create_context().unwrap();
        (platform, probe, ctx)
    }

    #[test]
    fn new_context_has_only_destination() {
        let (_, probe, ctx) = context();
        assert_eq!(ctx.state(), ContextState::Running);
        assert_eq!(ctx.sample_rate(), 48_000);
        let nodes = probe.live_nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].handle, ctx.destination());
        assert_eq!(nodes[0].tag(), NodeTag::Destination);
    }

    #[test]
    fn construction_values_are_recorded() {
        let (_, probe, mut ctx) = context();
        let eq = ctx
            .create_node(&NodeKind::Biquad(BiquadSpec::new(FilterType::Peaking, 1_000.0)))
            .unwrap();
        assert_eq!(probe.param_value(eq, ParamKey::Frequency), Some(1_000.0));
        assert_eq!(probe.param_value(eq, ParamKey::Q), Some(1.0));
        assert!(probe.param_events().is_empty());
    }

    #[test]
    fn params_are_validated_per_kind() {
        let (_, probe, mut ctx) = context();
        let pan = ctx.create_node(&NodeKind::StereoPanner).unwrap();
        ctx.schedule_param(pan, ParamKey::Pan, -0.5, 0.25).unwrap();
        assert!(matches!(
            ctx.set_param(pan, ParamKey::Gain, 1.0),
            Err(BackendError::UnsupportedParam { .. })
        ));
        assert_eq!(
            probe.param_events(),
            [ParamEvent {
                node: pan,
                param: ParamKey::Pan,
                value: -0.5,
                at: Some(0.25)
            }]
        );
    }

    #[test]
    fn connect_rules() {
        let (_, probe, mut ctx) = context();
        let dest = ctx.destination();
        let source = ctx
            .create_media_element_source(&MediaElement::new(1, "video"))
            .unwrap();
        let gain = ctx.create_node(&NodeKind::Gain(1.0)).unwrap();

        ctx.connect(source, gain).unwrap();
        ctx.connect(gain, dest).unwrap();
        assert!(ctx.connect(dest, gain).is_err());
        assert!(ctx.connect(gain, source).is_err());
        assert!(ctx.connect(gain, NodeHandle(77)).is_err());

        ctx.connect(gain, dest).unwrap();
        assert_eq!(probe.duplicate_edges(), 1);
        assert_eq!(probe.source_mode(), Some(SourceMode::Element));
    }

    #[test]
    fn disconnect_only_removes_outgoing() {
        let (_, probe, mut ctx) = context();
        let a = ctx.create_node(&NodeKind::Gain(1.0)).unwrap();
        let b = ctx.create_node(&NodeKind::Gain(1.0)).unwrap();
        ctx.connect(a, b).unwrap();
        ctx.connect(b, ctx.destination()).unwrap();

        ctx.disconnect(b).unwrap();
        assert!(probe.has_edge(a, b));
        assert!(!probe.has_edge(b, ctx.destination()));

        ctx.release(b).unwrap();
        assert!(probe.live_edges().is_empty());
        assert!(ctx.disconnect(b).is_err());
    }

    #[test]
    fn stream_binding_needs_capture_support() {
        let (_, probe, mut ctx) = context();
        let media = MediaElement::new(3, "audio").with_capture(false);
        assert!(ctx.create_media_stream_source(&media).is_err());

        probe.inject(Fault::ElementSource);
        assert!(ctx.create_media_element_source(&media).is_err());
        probe.clear_faults();
        assert!(ctx.create_media_element_source(&media).is_ok());
    }

    #[test]
    fn close_kills_everything() {
        let (_, probe, mut ctx) = context();
        let a = ctx.create_node(&NodeKind::Convolver).unwrap();
        ctx.connect(a, ctx.destination()).unwrap();
        ctx.close().unwrap();

        assert_eq!(ctx.state(), ContextState::Closed);
        assert_eq!(probe.live_node_count(), 0);
        assert!(matches!(ctx.close(), Err(BackendError::ContextClosed)));
        assert!(matches!(
            ctx.create_node(&NodeKind::StereoPanner),
            Err(BackendError::ContextClosed)
        ));
    }

    #[test]
    fn frames_are_tracked() {
        let (mut platform, probe, _) = context();
        let a = platform.request_frame();
        let b = platform.request_frame();
        assert_ne!(a, b);
        platform.cancel_frame(a);
        platform.cancel_frame(a);
        assert_eq!(probe.pending_frames(), [b]);
        assert_eq!(probe.frames_cancelled(), 1);
        assert_eq!(probe.deliver_next_frame(), Some(b));
        assert_eq!(probe.deliver_next_frame(), None);
    }

    #[test]
    fn context_creation_fault() {
        let mut platform = OfflinePlatform::new();
        platform.probe().inject(Fault::ContextCreation);
        assert!(matches!(
            platform.create_context(),
            Err(BackendError::ContextCreation(_))
        ));
    }

    #[test]
    fn connect_fault_hits_only_the_nth_call() {
        let (_, probe, mut ctx) = context();
        let a = ctx.create_node(&NodeKind::Gain(1.0)).unwrap();
        let b = ctx.create_node(&NodeKind::Gain(1.0)).unwrap();
        probe.inject(Fault::Connect { nth: 2 });

        ctx.connect(a, b).unwrap();
        assert!(matches!(
            ctx.connect(b, ctx.destination()),
            Err(BackendError::InvalidConnection { .. })
        ));
        assert!(!probe.has_edge(b, ctx.destination()));
        ctx.connect(b, ctx.destination()).unwrap();
        assert_eq!(probe.live_edges().len(), 2);
    }

    #[test]
    fn new_contexts_start_at_the_configured_clock() {
        let mut platform = OfflinePlatform::new().with_start_time(12.5);
        let probe = platform.probe();
        let ctx = platform.create_context().unwrap();
        assert_eq!(ctx.current_time(), 12.5);
        probe.advance_time(0.5);
        assert_eq!(probe.current_time(), 13.0);
    }

    #[test]
    fn convolver_buffer_records_length() {
        let (_, probe, mut ctx) = context();
        let conv = ctx.create_node(&NodeKind::Convolver).unwrap();
        let ir = auralis_core::generate_impulse(8_000, 0.5, 2.2, 1);
        ctx.set_convolver_buffer(conv, &ir).unwrap();
        assert_eq!(probe.node(conv).and_then(|n| n.impulse_frames), Some(4_000));

        let gain = ctx.create_node(&NodeKind::Gain(1.0)).unwrap();
        assert!(ctx.set_convolver_buffer(gain, &ir).is_err());
    }
}
