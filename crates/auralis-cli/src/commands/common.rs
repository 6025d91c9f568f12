//! Shared helpers for commands that run a session.

use std::path::PathBuf;

use anyhow::Context;
use auralis_config::{FileStore, MemoryStore, Settings, SettingsStore};
use auralis_core::BranchCount;
use auralis_engine::{AttachReport, EngineConfig, Session};
use auralis_io::{MediaElement, OfflinePlatform, OfflineProbe};
use clap::Args;

/// Where the settings snapshot comes from.
#[derive(Args, Debug)]
pub struct SettingsArgs {
    /// Settings file (TOML, or JSON with a .json extension); defaults to the
    /// user settings file
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Enable dimensional audio with N branches (clamped to 2-12)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub dim: Option<i64>,

    /// Select a factory preset, copying its EQ into the snapshot
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,
}

impl SettingsArgs {
    /// Loads the snapshot and applies command-line overrides.
    pub fn resolve(&self) -> anyhow::Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => Settings::load(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => FileStore::user().load().context("loading user settings")?,
        };
        if let Some(n) = self.dim {
            settings.dimensional_audio_on = true;
            settings.dimensional_preset = BranchCount::new(n);
        }
        if let Some(name) = &self.preset {
            settings.select_preset(name)?;
        }
        Ok(settings)
    }
}

/// A session attached to a synthetic media element on the offline backend.
pub struct OfflineSession {
    pub session: Session<OfflinePlatform, MemoryStore>,
    pub probe: OfflineProbe,
    pub report: AttachReport,
}

/// Attaches a fresh offline session for `settings`.
pub fn attach_offline(settings: Settings, sample_rate: u32, seed: u32) -> anyhow::Result<OfflineSession> {
    let platform = OfflinePlatform::new().with_sample_rate(sample_rate);
    let probe = platform.probe();
    let mut session = Session::new(platform, MemoryStore::new(settings))
        .with_config(EngineConfig::default().with_seed(seed));
    let report = session
        .attach(&MediaElement::new(1, "offline"))
        .context("attaching offline session")?;
    Ok(OfflineSession {
        session,
        probe,
        report,
    })
}
