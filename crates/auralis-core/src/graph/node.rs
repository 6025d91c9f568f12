//! Node types for the graph description.
//!
//! Each planned node has a [`NodeId`], a [`NodeKind`] describing what native
//! node to build and its construction-time settings, and a [`NodeGroup`]
//! saying which unit owns it.

use core::fmt;

/// Identifier of a node inside one [`GraphPlan`](super::GraphPlan).
///
/// IDs are assigned sequentially from zero and are only meaningful within the
/// plan that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Biquad response shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterType {
    /// Low-pass.
    Lowpass,
    /// High-pass.
    Highpass,
    /// Low shelf (boost/cut below frequency).
    Lowshelf,
    /// High shelf (boost/cut above frequency).
    Highshelf,
    /// Peaking bell around frequency.
    Peaking,
}

impl FilterType {
    /// Lowercase name as used by native audio APIs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lowpass => "lowpass",
            Self::Highpass => "highpass",
            Self::Lowshelf => "lowshelf",
            Self::Highshelf => "highshelf",
            Self::Peaking => "peaking",
        }
    }
}

/// Construction settings for a biquad filter node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiquadSpec {
    /// Response shape.
    pub filter_type: FilterType,
    /// Cutoff or center frequency in Hz.
    pub frequency: f32,
    /// Quality factor.
    pub q: f32,
    /// Gain in dB (shelf and peaking only).
    pub gain_db: f32,
}

impl BiquadSpec {
    /// Creates a spec with Q = 1 and 0 dB gain.
    pub const fn new(filter_type: FilterType, frequency: f32) -> Self {
        Self {
            filter_type,
            frequency,
            q: 1.0,
            gain_db: 0.0,
        }
    }

    /// Sets the gain in dB.
    pub const fn with_gain_db(mut self, gain_db: f32) -> Self {
        self.gain_db = gain_db;
        self
    }
}

/// Dynamics compressor settings in physical units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompressorParams {
    /// Threshold in dB.
    pub threshold: f32,
    /// Knee width in dB.
    pub knee: f32,
    /// Compression ratio.
    pub ratio: f32,
    /// Attack in seconds.
    pub attack: f32,
    /// Release in seconds.
    pub release: f32,
}

impl CompressorParams {
    /// Settings a freshly created native compressor starts with.
    pub const NATIVE_DEFAULT: Self = Self {
        threshold: -24.0,
        knee: 30.0,
        ratio: 12.0,
        attack: 0.003,
        release: 0.25,
    };
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self::NATIVE_DEFAULT
    }
}

/// Spatialization algorithm of a 3D panner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PanningModel {
    /// Simple equal-power panning.
    EqualPower,
    /// Head-related transfer function convolution.
    Hrtf,
}

/// Distance attenuation law of a 3D panner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DistanceModel {
    /// Linear rolloff.
    Linear,
    /// Inverse-distance rolloff.
    Inverse,
    /// Exponential rolloff.
    Exponential,
}

/// Construction settings for a 3D positional panner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PannerSpec {
    /// Spatialization algorithm.
    pub panning_model: PanningModel,
    /// Distance attenuation law.
    pub distance_model: DistanceModel,
    /// Distance at which attenuation starts.
    pub ref_distance: f32,
    /// Distance beyond which no further attenuation happens.
    pub max_distance: f32,
    /// Attenuation speed.
    pub rolloff_factor: f32,
}

impl PannerSpec {
    /// HRTF panner with inverse rolloff, used for the bass orbit.
    pub const ORBIT: Self = Self {
        panning_model: PanningModel::Hrtf,
        distance_model: DistanceModel::Inverse,
        ref_distance: 1.0,
        max_distance: 20.0,
        rolloff_factor: 1.0,
    };
}

/// What a planned node is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeKind {
    /// The bound media source. Exactly one per plan; never has inputs.
    Source,
    /// Biquad filter.
    Biquad(BiquadSpec),
    /// Gain stage with its initial linear level.
    Gain(f32),
    /// Dynamics compressor.
    Compressor(CompressorParams),
    /// 3D positional panner.
    Panner(PannerSpec),
    /// Two-channel stereo panner.
    StereoPanner,
    /// Convolution reverb.
    Convolver,
    /// Frequency-domain analysis tap.
    Analyser {
        /// FFT size in samples.
        fft_size: u32,
    },
    /// Context output. Never has outputs.
    Destination,
}

impl NodeKind {
    /// Discriminant without construction settings.
    pub fn tag(&self) -> NodeTag {
        match self {
            Self::Source => NodeTag::Source,
            Self::Biquad(_) => NodeTag::Biquad,
            Self::Gain(_) => NodeTag::Gain,
            Self::Compressor(_) => NodeTag::Compressor,
            Self::Panner(_) => NodeTag::Panner,
            Self::StereoPanner => NodeTag::StereoPanner,
            Self::Convolver => NodeTag::Convolver,
            Self::Analyser { .. } => NodeTag::Analyser,
            Self::Destination => NodeTag::Destination,
        }
    }
}

/// [`NodeKind`] discriminant, usable as a map key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeTag {
    /// Media source.
    Source,
    /// Biquad filter.
    Biquad,
    /// Gain stage.
    Gain,
    /// Dynamics compressor.
    Compressor,
    /// 3D panner.
    Panner,
    /// Stereo panner.
    StereoPanner,
    /// Convolution reverb.
    Convolver,
    /// Analyser tap.
    Analyser,
    /// Context output.
    Destination,
}

impl NodeTag {
    /// Lowercase name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Biquad => "biquad",
            Self::Gain => "gain",
            Self::Compressor => "compressor",
            Self::Panner => "panner",
            Self::StereoPanner => "stereo_panner",
            Self::Convolver => "convolver",
            Self::Analyser => "analyser",
            Self::Destination => "destination",
        }
    }
}

impl fmt::Display for NodeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unit that owns a planned node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeGroup {
    /// Fixed processing chain, built once per attached source.
    Chain,
    /// Spatial branch with the given index.
    Branch(u8),
}

impl fmt::Display for NodeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chain => f.write_str("chain"),
            Self::Branch(i) => write!(f, "branch[{i}]"),
        }
    }
}
