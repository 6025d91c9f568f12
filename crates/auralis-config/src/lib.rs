//! Settings and presets for the auralis audio engine.
//!
//! # Features
//!
//! - **Settings**: the persisted [`Settings`] snapshot, with camelCase keys
//!   and forgiving value parsing
//! - **Quality presets**: simulated streaming bandwidth ([`QualityPreset`])
//! - **Factory presets**: EQ, dynamics and gain bundles ([`ProcessingPreset`])
//! - **Storage**: the [`SettingsStore`] seam plus memory and file stores
//! - **Paths**: platform-specific settings location
//!
//! # Lenient parsing
//!
//! Numbers may be strings (`"4"`), flags may be `0`/`1`, and the branch count
//! is read like `parseInt`: `"8"`, `"8d"` and `8.9` all give 8, garbage gives
//! 2, and the result is clamped into `[2, 12]`. Unknown quality names mean
//! full bandwidth; unknown preset names mean `off`.
//!
//! # Example
//!
//! ```rust
//! use auralis_config::Settings;
//!
//! let settings = Settings::from_json(
//!     r#"{"audioQualityOn": true, "audioQualityPreset": "240p", "dimensionalAudioOn": true, "dimensionalPreset": "8"}"#,
//! ).unwrap();
//! assert_eq!(settings.quality_cutoff_hz(), 5000.0);
//! assert_eq!(settings.dimensional().map(|c| c.get()), Some(8));
//! ```

mod error;
mod lenient;
mod quality;
mod settings;
mod store;

/// Platform-specific settings paths.
pub mod paths;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use error::ConfigError;
pub use factory_presets::{
    CompressorConfig, EqGains, FACTORY_PRESET_NAMES, OFF_PRESET, ProcessingPreset,
    factory_presets, get_factory_preset, resolve_preset,
};
pub use paths::{user_config_dir, user_settings_path};
pub use quality::{FULL_BANDWIDTH_HZ, QualityPreset};
pub use settings::{AttachStatus, Settings};
pub use store::{FileStore, MemoryStore, SettingsStore};
