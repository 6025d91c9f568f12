//! Automatable node parameters.

use core::fmt;

use crate::graph::{NodeKind, NodeTag};

/// Identifies one automatable parameter on a native node.
///
/// Which keys a node accepts depends on its [`NodeKind`](crate::NodeKind):
///
/// | Node | Keys |
/// |------|------|
/// | Biquad | `Frequency`, `Q`, `Gain` (dB) |
/// | Gain | `Gain` (linear) |
/// | Compressor | `Threshold`, `Knee`, `Ratio`, `Attack`, `Release` |
/// | Panner | `PositionX`, `PositionY`, `PositionZ` |
/// | StereoPanner | `Pan` |
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamKey {
    /// Filter cutoff or center frequency in Hz.
    Frequency,
    /// Filter quality factor.
    Q,
    /// Filter gain in dB, or gain node level (linear).
    Gain,
    /// Compressor threshold in dB.
    Threshold,
    /// Compressor knee width in dB.
    Knee,
    /// Compressor ratio.
    Ratio,
    /// Compressor attack in seconds.
    Attack,
    /// Compressor release in seconds.
    Release,
    /// Panner X position.
    PositionX,
    /// Panner Y position.
    PositionY,
    /// Panner Z position.
    PositionZ,
    /// Stereo pan in `[-1, 1]`.
    Pan,
}

impl ParamKey {
    /// Stable lowercase name used in logs and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Frequency => "frequency",
            Self::Q => "q",
            Self::Gain => "gain",
            Self::Threshold => "threshold",
            Self::Knee => "knee",
            Self::Ratio => "ratio",
            Self::Attack => "attack",
            Self::Release => "release",
            Self::PositionX => "positionX",
            Self::PositionY => "positionY",
            Self::PositionZ => "positionZ",
            Self::Pan => "pan",
        }
    }

    /// Whether a node of kind `tag` exposes this parameter.
    pub fn accepted_by(self, tag: NodeTag) -> bool {
        match tag {
            NodeTag::Biquad => matches!(self, Self::Frequency | Self::Q | Self::Gain),
            NodeTag::Gain => self == Self::Gain,
            NodeTag::Compressor => matches!(
                self,
                Self::Threshold | Self::Knee | Self::Ratio | Self::Attack | Self::Release
            ),
            NodeTag::Panner => matches!(self, Self::PositionX | Self::PositionY | Self::PositionZ),
            NodeTag::StereoPanner => self == Self::Pan,
            _ => false,
        }
    }

    /// Construction-time value of this parameter on a node of `kind`.
    pub fn initial_value(self, kind: &NodeKind) -> Option<f32> {
        if !self.accepted_by(kind.tag()) {
            return None;
        }
        let value = match (kind, self) {
            (NodeKind::Biquad(spec), Self::Frequency) => spec.frequency,
            (NodeKind::Biquad(spec), Self::Q) => spec.q,
            (NodeKind::Biquad(spec), Self::Gain) => spec.gain_db,
            (NodeKind::Gain(level), _) => *level,
            (NodeKind::Compressor(c), Self::Threshold) => c.threshold,
            (NodeKind::Compressor(c), Self::Knee) => c.knee,
            (NodeKind::Compressor(c), Self::Ratio) => c.ratio,
            (NodeKind::Compressor(c), Self::Attack) => c.attack,
            (NodeKind::Compressor(c), Self::Release) => c.release,
            _ => 0.0,
        };
        Some(value)
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
