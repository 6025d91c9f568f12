//! The persisted settings snapshot.
//!
//! Keys are stored in camelCase. Every field is optional on input and parsed
//! leniently (see the crate docs), so a snapshot written by an older or
//! sloppier control panel still loads.
//!
//! ```json
//! {
//!   "bass": 4, "mids": 0, "treble": -1,
//!   "audioQualityOn": true, "audioQualityPreset": "240p",
//!   "dimensionalAudioOn": true, "dimensionalPreset": "8",
//!   "presetMode": "movie", "enabled": true,
//!   "audioToolAttachStatus": "attached"
//! }
//! ```

use std::path::Path;

use auralis_core::BranchCount;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::factory_presets::{
    EqGains, OFF_PRESET, ProcessingPreset, get_factory_preset, resolve_preset,
};
use crate::lenient;
use crate::quality::{FULL_BANDWIDTH_HZ, QualityPreset};

/// Outcome of the last attach attempt, as shown by the control panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachStatus {
    /// The graph is attached to a media element.
    Attached,
    /// The media element could not be bound.
    AttachFailed,
    /// No attempt yet, or a status this version does not know.
    #[default]
    #[serde(other)]
    Unknown,
}

impl AttachStatus {
    /// Stored name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Attached => "attached",
            Self::AttachFailed => "attach_failed",
        }
    }
}

/// A complete settings snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Bass shelf gain in dB.
    #[serde(deserialize_with = "lenient::number")]
    pub bass: f32,
    /// Mid peak gain in dB.
    #[serde(deserialize_with = "lenient::number")]
    pub mids: f32,
    /// Treble shelf gain in dB.
    #[serde(deserialize_with = "lenient::number")]
    pub treble: f32,
    /// Whether the quality limiter is active.
    #[serde(deserialize_with = "lenient::flag")]
    pub audio_quality_on: bool,
    /// Simulated quality when the limiter is active.
    pub audio_quality_preset: QualityPreset,
    /// Whether dimensional spatialization is active.
    #[serde(deserialize_with = "lenient::flag")]
    pub dimensional_audio_on: bool,
    /// Branch count of the dimensional set.
    #[serde(
        deserialize_with = "lenient::branch_count",
        serialize_with = "lenient::serialize_count"
    )]
    pub dimensional_preset: BranchCount,
    /// Selected processing preset name.
    #[serde(deserialize_with = "lenient::text")]
    pub preset_mode: String,
    /// Master switch; `false` tears the session down.
    #[serde(deserialize_with = "lenient::flag_default_on")]
    pub enabled: bool,
    /// Last attach outcome, written by the engine.
    pub audio_tool_attach_status: AttachStatus,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bass: 0.0,
            mids: 0.0,
            treble: 0.0,
            audio_quality_on: false,
            audio_quality_preset: QualityPreset::Hd,
            dimensional_audio_on: false,
            dimensional_preset: BranchCount::DEFAULT,
            preset_mode: OFF_PRESET.to_string(),
            enabled: true,
            audio_tool_attach_status: AttachStatus::Unknown,
        }
    }
}

impl Settings {
    /// Current EQ band gains.
    pub fn eq(&self) -> EqGains {
        EqGains::new(self.bass, self.mids, self.treble)
    }

    /// Quality low-pass cutoff in Hz.
    ///
    /// Full bandwidth when the limiter is off.
    pub fn quality_cutoff_hz(&self) -> f32 {
        if self.audio_quality_on {
            self.audio_quality_preset.cutoff_hz()
        } else {
            FULL_BANDWIDTH_HZ
        }
    }

    /// Requested branch count, or `None` when spatialization is off.
    pub fn dimensional(&self) -> Option<BranchCount> {
        self.dimensional_audio_on.then_some(self.dimensional_preset)
    }

    /// The processing preset in effect; unknown names resolve to `off`.
    pub fn preset(&self) -> ProcessingPreset {
        resolve_preset(&self.preset_mode)
    }

    /// Selects a factory preset the way the control panel does: stores the
    /// name and copies the preset's EQ triple into the band gains.
    ///
    /// # Example
    ///
    /// ```rust
    /// use auralis_config::Settings;
    ///
    /// let mut settings = Settings::default();
    /// settings.select_preset("movie").unwrap();
    /// assert_eq!((settings.bass, settings.mids, settings.treble), (4.0, 0.0, -1.0));
    /// assert!(settings.select_preset("disco").is_err());
    /// ```
    pub fn select_preset(&mut self, name: &str) -> Result<(), ConfigError> {
        let preset =
            get_factory_preset(name).ok_or_else(|| ConfigError::PresetNotFound(name.to_string()))?;
        self.bass = preset.eq.bass;
        self.mids = preset.eq.mids;
        self.treble = preset.eq.treble;
        self.preset_mode = preset.name;
        Ok(())
    }

    /// Parse a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot from TOML.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load a snapshot; `.json` files are JSON, anything else is TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        if is_json(path) {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }

    /// Save the snapshot, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = if is_json(path) {
            self.to_json()?
        } else {
            self.to_toml()?
        };
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
