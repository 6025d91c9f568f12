//! The fixed processing chain.
//!
//! ```text
//! source → quality → bass → mid → treble → [compressor] ─┬─▶ master → analyser → destination
//!                                                         └─▶ branches (dimensional)
//!                                    convolver → reverb wet ──▶ master
//! ```
//!
//! One chain exists per attached media element. It is built once and only
//! rewired afterwards; branches come and go around it.

use auralis_core::{
    BiquadSpec, BranchTaps, CompressorParams, EdgeKind, FilterType, GraphPlan, NodeGroup, NodeId, NodeKind,
    ParamKey, PlanError, generate_impulse,
};
use auralis_io::{AudioContext, MediaElement, NodeHandle, NodeScope, release_all};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::reconcile::ParamUpdates;

/// Quality low-pass cutoff at construction.
pub const QUALITY_CUTOFF_HZ: f32 = 22_000.0;
/// Bass shelf corner.
pub const BASS_SHELF_HZ: f32 = 200.0;
/// Mid peak center.
pub const MID_PEAK_HZ: f32 = 1_000.0;
/// Treble shelf corner.
pub const TREBLE_SHELF_HZ: f32 = 3_000.0;

/// Position of a node in the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChainSlot {
    /// Bound media source.
    Source,
    /// Quality low-pass.
    Quality,
    /// Bass low shelf.
    Bass,
    /// Mid peak.
    Mid,
    /// Treble high shelf.
    Treble,
    /// Optional dynamics stage.
    Compressor,
    /// Master gain.
    Master,
    /// Analyser tap.
    Analyser,
    /// Shared convolution reverb.
    Convolver,
    /// Reverb return level.
    ReverbWet,
    /// Context output.
    Destination,
}

impl ChainSlot {
    /// Plan label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Quality => "quality",
            Self::Bass => "bass_eq",
            Self::Mid => "mid_eq",
            Self::Treble => "treble_eq",
            Self::Compressor => "compressor",
            Self::Master => "master",
            Self::Analyser => "analyser",
            Self::Convolver => "convolver",
            Self::ReverbWet => "reverb_wet",
            Self::Destination => "destination",
        }
    }
}

/// How the media source was bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindingMode {
    /// Bound directly to the element.
    Element,
    /// Bound through the element's capture stream.
    CaptureStream,
}

/// A chain node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChainNode {
    /// Position in the chain.
    pub slot: ChainSlot,
    /// Native handle.
    pub handle: NodeHandle,
    /// Construction settings.
    pub kind: NodeKind,
}

/// The live processing chain of one media element.
#[derive(Debug)]
pub struct ProcessingChain {
    source: ChainNode,
    quality: ChainNode,
    bass: ChainNode,
    mid: ChainNode,
    treble: ChainNode,
    compressor: Option<ChainNode>,
    master: ChainNode,
    analyser: ChainNode,
    convolver: ChainNode,
    reverb_wet: ChainNode,
    destination: ChainNode,
    binding: BindingMode,
}

impl ProcessingChain {
    /// Binds `media` and builds every chain node.
    ///
    /// A failing dynamics stage is logged and left out. Any other failure
    /// releases the nodes created so far.
    pub fn build<C: AudioContext>(
        ctx: &mut C,
        media: &MediaElement,
        config: &EngineConfig,
    ) -> Result<Self> {
        let mut scope = NodeScope::new(ctx);
        let (source, binding) = bind_source(scope.context(), media)?;
        scope.adopt(source);

        let source = ChainNode {
            slot: ChainSlot::Source,
            handle: source,
            kind: NodeKind::Source,
        };
        let quality = create(
            &mut scope,
            ChainSlot::Quality,
            NodeKind::Biquad(BiquadSpec::new(FilterType::Lowpass, QUALITY_CUTOFF_HZ)),
        )?;
        let bass = create(
            &mut scope,
            ChainSlot::Bass,
            NodeKind::Biquad(BiquadSpec::new(FilterType::Lowshelf, BASS_SHELF_HZ)),
        )?;
        let mid = create(
            &mut scope,
            ChainSlot::Mid,
            NodeKind::Biquad(BiquadSpec::new(FilterType::Peaking, MID_PEAK_HZ)),
        )?;
        let treble = create(
            &mut scope,
            ChainSlot::Treble,
            NodeKind::Biquad(BiquadSpec::new(FilterType::Highshelf, TREBLE_SHELF_HZ)),
        )?;
        let compressor = match create(
            &mut scope,
            ChainSlot::Compressor,
            NodeKind::Compressor(CompressorParams::NATIVE_DEFAULT),
        ) {
            Ok(node) => Some(node),
            Err(e) => {
                tracing::warn!(error = %e, "dynamics stage unavailable, continuing without it");
                None
            }
        };
        let master = create(&mut scope, ChainSlot::Master, NodeKind::Gain(1.0))?;
        let analyser = create(
            &mut scope,
            ChainSlot::Analyser,
            NodeKind::Analyser {
                fft_size: config.analyser_fft_size,
            },
        )?;
        let convolver = create(&mut scope, ChainSlot::Convolver, NodeKind::Convolver)?;
        let reverb_wet = create(&mut scope, ChainSlot::ReverbWet, NodeKind::Gain(0.0))?;
        let destination = ChainNode {
            slot: ChainSlot::Destination,
            handle: scope.context().destination(),
            kind: NodeKind::Destination,
        };

        let chain = Self {
            source,
            quality,
            bass,
            mid,
            treble,
            compressor,
            master,
            analyser,
            convolver,
            reverb_wet,
            destination,
            binding,
        };
        chain.load_impulse(scope.context(), config);
        scope.commit();

        tracing::info!(
            media = %media.label,
            binding = ?binding,
            dynamics = chain.has_compressor(),
            "processing chain built"
        );
        Ok(chain)
    }

    fn load_impulse<C: AudioContext + ?Sized>(&self, ctx: &mut C, config: &EngineConfig) {
        let r = config.reverb;
        let impulse = generate_impulse(ctx.sample_rate(), r.duration_secs, r.decay, r.seed);
        if let Err(e) = ctx.set_convolver_buffer(self.convolver.handle, &impulse) {
            tracing::warn!(error = %e, "reverb impulse not loaded");
        }
    }

    /// Every chain node in signal order, destination last.
    pub fn nodes(&self) -> Vec<ChainNode> {
        let mut nodes = vec![self.source, self.quality, self.bass, self.mid, self.treble];
        nodes.extend(self.compressor);
        nodes.extend([
            self.master,
            self.analyser,
            self.convolver,
            self.reverb_wet,
            self.destination,
        ]);
        nodes
    }

    /// Native handle of `slot`, if present.
    pub fn handle(&self, slot: ChainSlot) -> Option<NodeHandle> {
        self.nodes()
            .into_iter()
            .find(|n| n.slot == slot)
            .map(|n| n.handle)
    }

    /// How the source was bound.
    pub fn binding(&self) -> BindingMode {
        self.binding
    }

    /// Whether the dynamics stage exists.
    pub fn has_compressor(&self) -> bool {
        self.compressor.is_some()
    }

    /// Last processing stage before master or the branches.
    pub fn tail(&self) -> ChainNode {
        self.compressor.unwrap_or(self.treble)
    }

    /// Removes every outgoing connection of every chain node. Best effort.
    pub fn disconnect_all<C: AudioContext + ?Sized>(&self, ctx: &mut C) {
        for node in self.owned() {
            if let Err(e) = ctx.disconnect(node.handle) {
                tracing::debug!(slot = node.slot.label(), error = %e, "disconnect failed");
            }
        }
    }

    /// Releases every chain node. Best effort.
    pub fn release<C: AudioContext + ?Sized>(&self, ctx: &mut C) {
        let handles: Vec<NodeHandle> = self.owned().into_iter().map(|n| n.handle).collect();
        release_all(ctx, &handles);
    }

    /// Nodes owned by the chain: everything except the context destination.
    fn owned(&self) -> Vec<ChainNode> {
        let mut nodes = self.nodes();
        nodes.pop();
        nodes
    }

    /// Adds the chain to `plan`.
    ///
    /// Chain edges: source through the EQ stages to the tail, master through
    /// the analyser to the destination, and the reverb return. The tail feeds
    /// master directly only when `direct` is set; otherwise branches sit in
    /// between.
    ///
    /// Returns the taps branches attach to and the plan-to-native bindings.
    pub fn plan_into(
        &self,
        plan: &mut GraphPlan,
        direct: bool,
    ) -> std::result::Result<(BranchTaps, Vec<(NodeId, NodeHandle)>), PlanError> {
        let mut add = |node: ChainNode| {
            (
                plan.add_node(node.kind, NodeGroup::Chain, node.slot.label()),
                node.handle,
            )
        };
        let mut serial: Vec<(NodeId, NodeHandle)> = [
            self.source,
            self.quality,
            self.bass,
            self.mid,
            self.treble,
        ]
        .into_iter()
        .chain(self.compressor)
        .map(&mut add)
        .collect();
        let master = add(self.master);
        let analyser = add(self.analyser);
        let convolver = add(self.convolver);
        let wet = add(self.reverb_wet);
        let destination = add(self.destination);

        let tail = serial[serial.len() - 1].0;
        for pair in serial.windows(2) {
            plan.connect(pair[0].0, pair[1].0, EdgeKind::Chain)?;
        }
        if direct {
            plan.connect(tail, master.0, EdgeKind::Chain)?;
        }
        plan.connect(master.0, analyser.0, EdgeKind::Chain)?;
        plan.connect(analyser.0, destination.0, EdgeKind::Chain)?;
        plan.connect(convolver.0, wet.0, EdgeKind::Return)?;
        plan.connect(wet.0, master.0, EdgeKind::Return)?;

        serial.extend([master, analyser, convolver, wet, destination]);
        let taps = BranchTaps {
            input: tail,
            master: master.0,
            convolver: convolver.0,
        };
        Ok((taps, serial))
    }

    /// Writes EQ, quality, dynamics and master gain. Failures are logged.
    pub fn apply<C: AudioContext + ?Sized>(&self, ctx: &mut C, params: &ParamUpdates) {
        let now = ctx.current_time();
        for (node, param, value) in [
            (self.bass, ParamKey::Gain, params.eq.bass),
            (self.mid, ParamKey::Gain, params.eq.mids),
            (self.treble, ParamKey::Gain, params.eq.treble),
            (self.quality, ParamKey::Frequency, params.quality_cutoff_hz),
        ] {
            log_param(node.slot, param, ctx.schedule_param(node.handle, param, value, now));
        }

        if let Some(comp) = self.compressor {
            let c = params.compressor;
            for (param, value) in [
                (ParamKey::Threshold, c.threshold),
                (ParamKey::Knee, c.knee),
                (ParamKey::Ratio, c.ratio),
                (ParamKey::Attack, c.attack),
                (ParamKey::Release, c.release),
            ] {
                log_param(comp.slot, param, ctx.set_param(comp.handle, param, value));
            }
        }

        log_param(
            ChainSlot::Master,
            ParamKey::Gain,
            ctx.set_param(self.master.handle, ParamKey::Gain, params.master_gain),
        );
    }

    /// Sets the reverb return level.
    pub fn set_wet_level<C: AudioContext + ?Sized>(&self, ctx: &mut C, level: f32) {
        log_param(
            ChainSlot::ReverbWet,
            ParamKey::Gain,
            ctx.set_param(self.reverb_wet.handle, ParamKey::Gain, level),
        );
    }
}

fn create<C: AudioContext + ?Sized>(
    scope: &mut NodeScope<'_, C>,
    slot: ChainSlot,
    kind: NodeKind,
) -> auralis_io::Result<ChainNode> {
    let handle = scope.create(&kind)?;
    Ok(ChainNode { slot, handle, kind })
}

fn log_param(slot: ChainSlot, param: ParamKey, result: auralis_io::Result<()>) {
    if let Err(e) = result {
        tracing::warn!(slot = slot.label(), %param, error = %e, "parameter update failed");
    }
}

/// Binds `media` directly, falling back to its capture stream.
fn bind_source<C: AudioContext + ?Sized>(
    ctx: &mut C,
    media: &MediaElement,
) -> Result<(NodeHandle, BindingMode)> {
    match ctx.create_media_element_source(media) {
        Ok(node) => Ok((node, BindingMode::Element)),
        Err(direct) if media.supports_capture => {
            tracing::info!(media = %media.label, error = %direct, "direct binding refused, trying capture stream");
            ctx.create_media_stream_source(media)
                .map(|node| (node, BindingMode::CaptureStream))
                .map_err(|source| EngineError::SourceBinding {
                    media: media.label.clone(),
                    source,
                })
        }
        Err(source) => Err(EngineError::SourceBinding {
            media: media.label.clone(),
            source,
        }),
    }
}
