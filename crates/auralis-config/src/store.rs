//! Settings storage.
//!
//! The engine reads snapshots from a [`SettingsStore`] and writes back the
//! attach status. Hosts deliver change notifications by calling the session
//! with the new snapshot; the store itself only persists.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::settings::{AttachStatus, Settings};

/// Persistent home of the settings snapshot.
pub trait SettingsStore {
    /// Current snapshot. A store with nothing saved yet returns defaults.
    fn load(&self) -> Result<Settings, ConfigError>;

    /// Replaces the stored snapshot.
    fn save(&mut self, settings: &Settings) -> Result<(), ConfigError>;

    /// Records the outcome of an attach attempt.
    fn set_attach_status(&mut self, status: AttachStatus) -> Result<(), ConfigError> {
        let mut settings = self.load()?;
        settings.audio_tool_attach_status = status;
        self.save(&settings)
    }
}

/// In-memory store, used by tests and the offline simulator.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    settings: Settings,
    status_history: Vec<AttachStatus>,
}

impl MemoryStore {
    /// Creates a store holding `settings`.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            status_history: Vec::new(),
        }
    }

    /// Borrow the stored snapshot.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Applies `edit` to the stored snapshot and returns the result.
    pub fn update(&mut self, edit: impl FnOnce(&mut Settings)) -> Settings {
        edit(&mut self.settings);
        self.settings.clone()
    }

    /// Every status written, oldest first.
    pub fn status_history(&self) -> &[AttachStatus] {
        &self.status_history
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Settings, ConfigError> {
        Ok(self.settings.clone())
    }

    fn save(&mut self, settings: &Settings) -> Result<(), ConfigError> {
        self.settings = settings.clone();
        Ok(())
    }

    fn set_attach_status(&mut self, status: AttachStatus) -> Result<(), ConfigError> {
        self.settings.audio_tool_attach_status = status;
        self.status_history.push(status);
        Ok(())
    }
}

/// Store backed by a TOML or JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store for `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at [`user_settings_path`](crate::user_settings_path).
    pub fn user() -> Self {
        Self::new(crate::paths::user_settings_path())
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileStore {
    fn load(&self) -> Result<Settings, ConfigError> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }
        Settings::load(&self.path)
    }

    fn save(&mut self, settings: &Settings) -> Result<(), ConfigError> {
        settings.save(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_records_statuses() {
        let mut store = MemoryStore::default();
        store.set_attach_status(AttachStatus::AttachFailed).unwrap();
        store.set_attach_status(AttachStatus::Attached).unwrap();
        assert_eq!(store.status_history(), [AttachStatus::AttachFailed, AttachStatus::Attached]);
        assert_eq!(
            store.load().unwrap().audio_tool_attach_status,
            AttachStatus::Attached
        );
    }

    #[test]
    fn memory_store_update_returns_snapshot() {
        let mut store = MemoryStore::default();
        let s = store.update(|s| s.dimensional_audio_on = true);
        assert!(s.dimensional_audio_on);
        assert_eq!(store.settings(), &s);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent.toml"));
        assert_eq!(store.load().unwrap(), Settings::default());
    }
}
