//! Branch factory and orbit math.
//!
//! A dimensional set is `count` identical branches spread evenly around the
//! listener. Each branch splits its input at [`SPLIT_FREQUENCY_HZ`]: the bass
//! band feeds a 3D panner that orbits at radius [`ORBIT_RADIUS`], the voice
//! band feeds a stereo panner swept in the opposite rotational direction.
//!
//! ```text
//!            ┌─ lowpass ─ panner(3D) ─ bass_out ──┬──▶ master
//! in_gain ───┤                                    ├──▶ reverb_send ──▶ convolver
//!            └─ highpass ─ stereo ─── voice_out ──┘
//! ```
//!
//! Everything here is a pure function of `(index, count, elapsed)` so the
//! engine can rebuild a branch set or recompute a frame from scratch at any
//! time.

use core::f64::consts::TAU;

use libm::{cos, sin};

use crate::count::BranchCount;
use crate::graph::{
    BiquadSpec, EdgeKind, FilterType, GraphPlan, NodeGroup, NodeId, NodeKind, PannerSpec,
    PlanError,
};

/// Bass/voice split frequency shared by every branch.
pub const SPLIT_FREQUENCY_HZ: f32 = 250.0;

/// Bass panner orbit radius.
pub const ORBIT_RADIUS: f32 = 1.2;

/// Gain of each branch's reverb send.
pub const REVERB_SEND_GAIN: f32 = 1.0;

const BASS_SPEED_BASE: f64 = 0.12;
const BASS_SPEED_STEP: f64 = 0.01;
const VOICE_SPEED_BASE: f64 = 0.20;
const VOICE_SPEED_STEP: f64 = 0.015;

/// Static description of one spatial branch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BranchLayout {
    /// Position in the set, `0..count`.
    pub index: usize,
    /// Size of the set this branch belongs to.
    pub count: BranchCount,
    /// Starting angle in radians, `2π·index/count`.
    pub base_angle: f64,
    /// Bass orbit speed in rotations per second.
    pub bass_speed: f64,
    /// Voice sweep speed in rotations per second.
    pub voice_speed: f64,
    /// Bass orbit radius.
    pub radius: f32,
    /// Level of each output stage, `1/count`.
    pub output_gain: f32,
    /// Bass/voice split frequency in Hz.
    pub split_hz: f32,
}

/// Instantaneous spatial state of one branch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitFrame {
    /// Bass orbit angle in radians.
    pub angle_bass: f64,
    /// Voice sweep angle in radians.
    pub angle_voice: f64,
    /// Bass panner position `(x, y, z)`.
    pub bass_position: [f32; 3],
    /// Voice stereo pan in `[-1, 1]`.
    pub voice_pan: f32,
}

/// Shared nodes a branch connects to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BranchTaps {
    /// Node whose output feeds every branch input.
    pub input: NodeId,
    /// Master gain that sums branch outputs.
    pub master: NodeId,
    /// Shared convolution reverb.
    pub convolver: NodeId,
}

/// Plan IDs of one branch's nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BranchNodeIds {
    /// Branch input gain.
    pub in_gain: NodeId,
    /// Bass band low-pass.
    pub low_filter: NodeId,
    /// Voice band high-pass.
    pub high_filter: NodeId,
    /// Bass 3D panner.
    pub bass_panner: NodeId,
    /// Voice stereo panner.
    pub voice_panner: NodeId,
    /// Bass output gain.
    pub bass_out: NodeId,
    /// Voice output gain.
    pub voice_out: NodeId,
    /// Reverb send gain.
    pub reverb_send: NodeId,
}

/// Builds the layout of branch `index` in a set of `count`.
///
/// Deterministic: the same `(index, count)` always yields the same layout.
///
/// # Example
///
/// ```rust
/// use auralis_core::{BranchCount, create_branch};
///
/// let b = create_branch(5, BranchCount::new(8));
/// assert!((b.bass_speed - 0.14).abs() < 1e-12);   // 0.12 + (5 mod 3)·0.01
/// assert!((b.voice_speed - 0.215).abs() < 1e-12); // 0.20 + (5 mod 4)·0.015
/// ```
pub fn create_branch(index: usize, count: BranchCount) -> BranchLayout {
    debug_assert!(index < count.get(), "branch index {index} out of range for {count}");
    let n = count.get();
    BranchLayout {
        index,
        count,
        base_angle: TAU * index as f64 / n as f64,
        bass_speed: BASS_SPEED_BASE + (index % 3) as f64 * BASS_SPEED_STEP,
        voice_speed: VOICE_SPEED_BASE + (index % 4) as f64 * VOICE_SPEED_STEP,
        radius: ORBIT_RADIUS,
        output_gain: 1.0 / n as f32,
        split_hz: SPLIT_FREQUENCY_HZ,
    }
}

/// Layouts of every branch in a set of `count`.
pub fn branch_layouts(count: BranchCount) -> impl Iterator<Item = BranchLayout> {
    (0..count.get()).map(move |i| create_branch(i, count))
}

impl BranchLayout {
    /// Bass and voice angles after `elapsed` seconds.
    ///
    /// Bass rotates forward, voice rotates backward, so the two bands never
    /// move together.
    pub fn angles_at(&self, elapsed: f64) -> (f64, f64) {
        let bass = self.base_angle + self.bass_speed * TAU * elapsed;
        let voice = self.base_angle - self.voice_speed * TAU * elapsed;
        (bass, voice)
    }

    /// Full spatial state after `elapsed` seconds.
    pub fn frame_at(&self, elapsed: f64) -> OrbitFrame {
        let (angle_bass, angle_voice) = self.angles_at(elapsed);
        let radius = f64::from(self.radius);
        OrbitFrame {
            angle_bass,
            angle_voice,
            bass_position: [
                (radius * cos(angle_bass)) as f32,
                0.0,
                (radius * sin(angle_bass)) as f32,
            ],
            voice_pan: (cos(angle_voice) as f32).clamp(-1.0, 1.0),
        }
    }

    /// Group this branch's nodes belong to.
    pub fn group(&self) -> NodeGroup {
        NodeGroup::Branch(self.index as u8)
    }

    /// Adds this branch's nodes and edges to `plan`.
    pub fn plan_into(&self, plan: &mut GraphPlan, taps: BranchTaps) -> Result<BranchNodeIds, PlanError> {
        let group = self.group();
        let ids = BranchNodeIds {
            in_gain: plan.add_node(NodeKind::Gain(1.0), group, "in_gain"),
            low_filter: plan.add_node(
                NodeKind::Biquad(BiquadSpec::new(FilterType::Lowpass, self.split_hz)),
                group,
                "low_filter",
            ),
            high_filter: plan.add_node(
                NodeKind::Biquad(BiquadSpec::new(FilterType::Highpass, self.split_hz)),
                group,
                "high_filter",
            ),
            bass_panner: plan.add_node(NodeKind::Panner(PannerSpec::ORBIT), group, "bass_panner"),
            voice_panner: plan.add_node(NodeKind::StereoPanner, group, "voice_panner"),
            bass_out: plan.add_node(NodeKind::Gain(self.output_gain), group, "bass_out"),
            voice_out: plan.add_node(NodeKind::Gain(self.output_gain), group, "voice_out"),
            reverb_send: plan.add_node(NodeKind::Gain(REVERB_SEND_GAIN), group, "reverb_send"),
        };

        plan.connect(taps.input, ids.in_gain, EdgeKind::FanOut)?;

        // bass path
        plan.connect(ids.in_gain, ids.low_filter, EdgeKind::Chain)?;
        plan.connect(ids.low_filter, ids.bass_panner, EdgeKind::Chain)?;
        plan.connect(ids.bass_panner, ids.bass_out, EdgeKind::Chain)?;
        plan.connect(ids.bass_out, taps.master, EdgeKind::Mix)?;
        plan.connect(ids.bass_out, ids.reverb_send, EdgeKind::Send)?;

        // voice path
        plan.connect(ids.in_gain, ids.high_filter, EdgeKind::Chain)?;
        plan.connect(ids.high_filter, ids.voice_panner, EdgeKind::Chain)?;
        plan.connect(ids.voice_panner, ids.voice_out, EdgeKind::Chain)?;
        plan.connect(ids.voice_out, taps.master, EdgeKind::Mix)?;
        plan.connect(ids.voice_out, ids.reverb_send, EdgeKind::Send)?;

        plan.connect(ids.reverb_send, taps.convolver, EdgeKind::Send)?;

        Ok(ids)
    }
}
