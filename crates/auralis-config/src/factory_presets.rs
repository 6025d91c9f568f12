//! Processing presets bundled with the library.
//!
//! Each preset sets the three EQ bands, an optional dynamics stage and a
//! master gain in dB. The presets are embedded as TOML and always available.

use auralis_core::{CompressorParams, db_to_linear};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of the neutral preset.
pub const OFF_PRESET: &str = "off";

/// Array of factory preset names for external access.
pub static FACTORY_PRESET_NAMES: &[&str] = &[
    "off", "music", "game", "movie", "pop", "jazz", "rock", "melody",
];

/// TOML content for factory presets.
static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("off", OFF),
    ("music", MUSIC),
    ("game", GAME),
    ("movie", MOVIE),
    ("pop", POP),
    ("jazz", JAZZ),
    ("rock", ROCK),
    ("melody", MELODY),
];

const OFF: &str = r#"
name = "off"
description = "Flat EQ, no dynamics, unity gain"
gain_db = 0.0

[eq]
bass = 0.0
mids = 0.0
treble = 0.0
"#;

const MUSIC: &str = r#"
name = "music"
description = "Warm low end with a gentle top lift"
gain_db = 1.2

[eq]
bass = 3.0
mids = 0.0
treble = 2.0

[compressor]
threshold = -20.0
knee = 5.0
ratio = 2.5
attack = 0.02
release = 0.25
"#;

const GAME: &str = r#"
name = "game"
description = "Bright and forward for footsteps and cues"
gain_db = 1.0

[eq]
bass = 1.0
mids = 1.0
treble = 3.0

[compressor]
threshold = -12.0
knee = 4.0
ratio = 3.0
attack = 0.01
release = 0.15
"#;

const MOVIE: &str = r#"
name = "movie"
description = "Deep bass, softened highs, wide dynamics"
gain_db = 1.5

[eq]
bass = 4.0
mids = 0.0
treble = -1.0

[compressor]
threshold = -24.0
knee = 6.0
ratio = 2.0
attack = 0.03
release = 0.3
"#;

const POP: &str = r#"
name = "pop"
description = "Punchy and bright"
gain_db = 1.2

[eq]
bass = 2.0
mids = 1.0
treble = 3.0

[compressor]
threshold = -18.0
knee = 4.0
ratio = 2.6
attack = 0.02
release = 0.22
"#;

const JAZZ: &str = r#"
name = "jazz"
description = "Open mids, light touch on dynamics"
gain_db = 1.0

[eq]
bass = 1.0
mids = 2.0
treble = 1.0

[compressor]
threshold = -22.0
knee = 5.0
ratio = 2.2
attack = 0.03
release = 0.28
"#;

const ROCK: &str = r#"
name = "rock"
description = "Heavy low end, tight compression"
gain_db = 1.4

[eq]
bass = 4.0
mids = 1.0
treble = 2.0

[compressor]
threshold = -16.0
knee = 6.0
ratio = 3.5
attack = 0.015
release = 0.2
"#;

const MELODY: &str = r#"
name = "melody"
description = "Vocal presence"
gain_db = 1.0

[eq]
bass = 0.0
mids = 3.0
treble = 2.0

[compressor]
threshold = -20.0
knee = 5.0
ratio = 2.0
attack = 0.03
release = 0.25
"#;

/// Gains of the three EQ bands in dB.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EqGains {
    /// Low shelf gain.
    #[serde(default)]
    pub bass: f32,
    /// Mid peak gain.
    #[serde(default)]
    pub mids: f32,
    /// High shelf gain.
    #[serde(default)]
    pub treble: f32,
}

impl EqGains {
    /// Creates a gain triple.
    pub const fn new(bass: f32, mids: f32, treble: f32) -> Self {
        Self { bass, mids, treble }
    }
}

/// Dynamics settings as written in preset files.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompressorConfig {
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

impl From<CompressorConfig> for CompressorParams {
    fn from(c: CompressorConfig) -> Self {
        CompressorParams {
            threshold: c.threshold,
            knee: c.knee,
            ratio: c.ratio,
            attack: c.attack,
            release: c.release,
        }
    }
}

/// A named processing preset.
///
/// The default value is the neutral `off` preset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessingPreset {
    /// Preset identifier.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// EQ band gains.
    #[serde(default)]
    pub eq: EqGains,

    /// Dynamics stage settings; `None` leaves the stage at its native defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compressor: Option<CompressorConfig>,

    /// Master gain in dB.
    #[serde(default)]
    pub gain_db: f32,
}

impl Default for ProcessingPreset {
    fn default() -> Self {
        Self {
            name: OFF_PRESET.to_string(),
            description: None,
            eq: EqGains::default(),
            compressor: None,
            gain_db: 0.0,
        }
    }
}

impl ProcessingPreset {
    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Master gain as a linear factor, `10^(gain_db/20)`.
    pub fn master_gain(&self) -> f32 {
        db_to_linear(self.gain_db)
    }

    /// Compressor settings to apply.
    ///
    /// Presets without a dynamics section restore the native defaults.
    pub fn compressor_params(&self) -> CompressorParams {
        self.compressor
            .map(CompressorParams::from)
            .unwrap_or(CompressorParams::NATIVE_DEFAULT)
    }
}

/// Get all factory presets.
///
/// # Example
///
/// ```rust
/// use auralis_config::factory_presets;
///
/// for preset in factory_presets() {
///     println!("{:>8}: {:+.1} dB", preset.name, preset.gain_db);
/// }
/// ```
pub fn factory_presets() -> Vec<ProcessingPreset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| ProcessingPreset::from_toml(toml).ok())
        .collect()
}

/// Get a factory preset by name (case-insensitive).
///
/// # Example
///
/// ```rust
/// use auralis_config::get_factory_preset;
///
/// let movie = get_factory_preset("Movie").unwrap();
/// assert_eq!(movie.eq.treble, -1.0);
/// ```
pub fn get_factory_preset(name: &str) -> Option<ProcessingPreset> {
    let name = name.trim();
    FACTORY_PRESETS_TOML
        .iter()
        .find(|(preset_name, _)| preset_name.eq_ignore_ascii_case(name))
        .and_then(|(_, toml)| ProcessingPreset::from_toml(toml).ok())
}

/// Factory preset by name, falling back to the neutral preset.
pub fn resolve_preset(name: &str) -> ProcessingPreset {
    get_factory_preset(name).unwrap_or_default()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_factory_presets_parse() {
        for (name, toml) in FACTORY_PRESETS_TOML {
            let preset = ProcessingPreset::from_toml(toml);
            assert!(preset.is_ok(), "{name} failed: {:?}", preset.err());
            assert_eq!(preset.unwrap().name, *name);
        }
        assert_eq!(factory_presets().len(), FACTORY_PRESET_NAMES.len());
    }

    #[test]
    fn names_match_table() {
        let names: Vec<&str> = FACTORY_PRESETS_TOML.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, FACTORY_PRESET_NAMES);
    }

    #[test]
    fn off_is_neutral() {
        let off = get_factory_preset("off").unwrap();
        assert_eq!(off, ProcessingPreset {
            description: off.description.clone(),
            ..ProcessingPreset::default()
        });
        assert_eq!(off.compressor_params(), CompressorParams::NATIVE_DEFAULT);
        assert!((off.master_gain() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn movie_values() {
        let movie = get_factory_preset("movie").unwrap();
        assert_eq!(movie.eq, EqGains::new(4.0, 0.0, -1.0));
        assert!((movie.master_gain() - 1.1885).abs() < 1e-3);
        let comp = movie.compressor_params();
        assert_eq!(comp.threshold, -24.0);
        assert_eq!(comp.knee, 6.0);
        assert_eq!(comp.ratio, 2.0);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let rock = get_factory_preset(" ROCK ").unwrap();
        assert_eq!(rock.compressor.map(|c| c.ratio), Some(3.5));
        assert_eq!(resolve_preset("Melody").name, "melody");
    }

    #[test]
    fn only_off_lacks_dynamics() {
        for preset in factory_presets() {
            assert_eq!(preset.compressor.is_none(), preset.name == OFF_PRESET, "{}", preset.name);
        }
    }

    #[test]
    fn unknown_preset_resolves_to_off() {
        assert!(get_factory_preset("disco").is_none());
        assert_eq!(resolve_preset("disco").name, OFF_PRESET);
    }

    #[test]
    fn toml_round_trip_keeps_values() {
        let jazz = get_factory_preset("jazz").unwrap();
        let text = jazz.to_toml().unwrap();
        assert_eq!(ProcessingPreset::from_toml(&text).unwrap(), jazz);
    }
}
