//! Settings file round trips and store behaviour on disk.

use auralis_config::{
    AttachStatus, ConfigError, FileStore, QualityPreset, Settings, SettingsStore,
};
use auralis_core::BranchCount;

fn sample() -> Settings {
    let mut s = Settings {
        audio_quality_on: true,
        audio_quality_preset: QualityPreset::P360,
        dimensional_audio_on: true,
        dimensional_preset: BranchCount::new(9),
        ..Settings::default()
    };
    s.select_preset("rock").unwrap();
    s
}

#[test]
fn toml_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.toml");
    sample().save(&path).unwrap();
    assert_eq!(Settings::load(&path).unwrap(), sample());
}

#[test]
fn json_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    sample().save(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"presetMode\": \"rock\""));
    assert_eq!(Settings::load(&path).unwrap(), sample());
}

#[test]
fn load_missing_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Settings::load(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn malformed_toml_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "bass = [").unwrap();
    assert!(matches!(Settings::load(&path), Err(ConfigError::TomlParse(_))));
}

#[test]
fn file_store_persists_attach_status() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path().join("settings.toml"));
    store.save(&sample()).unwrap();
    store.set_attach_status(AttachStatus::AttachFailed).unwrap();

    let reopened = FileStore::new(store.path());
    let loaded = reopened.load().unwrap();
    assert_eq!(loaded.audio_tool_attach_status, AttachStatus::AttachFailed);
    assert_eq!(loaded.preset_mode, "rock");
}
