//! Platform-specific paths for the settings file.
//!
//! - Linux: `~/.config/auralis/settings.toml`
//! - macOS: `~/Library/Application Support/auralis/settings.toml`
//! - Windows: `%APPDATA%\auralis\settings.toml`

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "auralis";

/// Settings file name.
const SETTINGS_FILE: &str = "settings.toml";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the path of the user's settings file.
pub fn user_settings_path() -> PathBuf {
    user_config_dir().join(SETTINGS_FILE)
}
