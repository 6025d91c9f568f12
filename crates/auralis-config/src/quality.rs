//! Audio quality presets for the bandwidth-limiting low-pass stage.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Cutoff used when quality limiting is off.
pub const FULL_BANDWIDTH_HZ: f32 = 22_000.0;

/// Simulated streaming quality.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum QualityPreset {
    /// Full bandwidth.
    #[default]
    Hd,
    /// 480p-class audio.
    P480,
    /// 360p-class audio.
    P360,
    /// 240p-class audio.
    P240,
    /// 180p-class audio.
    P180,
}

impl QualityPreset {
    /// Every preset, best first.
    pub const ALL: [Self; 5] = [Self::Hd, Self::P480, Self::P360, Self::P240, Self::P180];

    /// Stored name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hd => "hd",
            Self::P480 => "480p",
            Self::P360 => "360p",
            Self::P240 => "240p",
            Self::P180 => "180p",
        }
    }

    /// Low-pass cutoff in Hz.
    pub fn cutoff_hz(self) -> f32 {
        match self {
            Self::Hd => FULL_BANDWIDTH_HZ,
            Self::P480 => 11_000.0,
            Self::P360 => 8_000.0,
            Self::P240 => 5_000.0,
            Self::P180 => 3_000.0,
        }
    }

    /// Looks up a stored name; unknown names give [`QualityPreset::Hd`].
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(name))
            .unwrap_or_default()
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for QualityPreset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for QualityPreset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = crate::lenient::text(deserializer)?;
        Ok(Self::from_name(&name))
    }
}
