mod common;

use common::write_preset;
use openpeon::config::{Config, Layout, Mapping, Suppression, Trigger};
use openpeon::store::{MappingStore, StoreError};
use std::fs;

fn custom_config() -> Config {
    Config {
        volume: 7,
        mappings: vec![Mapping {
            name: "edits".to_string(),
            triggers: vec![
                Trigger::tool_after("edit"),
                Trigger::event_with_role("message.updated", "user"),
            ],
            sounds: vec!["pack/a.wav".to_string(), "pack/b.wav".to_string()],
            whisper: true,
        }],
        random_preset: Some(false),
        suppression: Suppression {
            debounce_ms: 250,
            ..Suppression::default()
        },
    }
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("openpeon.json");

    for config in [Config::default(), custom_config()] {
        config.save(&path).unwrap();
        assert_eq!(Config::load_from_path(&path).unwrap(), config);
    }
}

#[test]
fn missing_or_malformed_config_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("openpeon.json");
    assert_eq!(Config::load_or_default(&path), Config::default());

    fs::write(&path, "{ volume: ").unwrap();
    assert_eq!(Config::load_or_default(&path), Config::default());
}

#[test]
fn out_of_range_volume_loads_as_is() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("openpeon.json");
    fs::write(&path, r#"{"volume": 42, "mappings": []}"#).unwrap();

    let config = Config::load_or_default(&path);
    assert_eq!(config.volume, 42);
    assert!(config.validate().is_err());
}

#[test]
fn set_volume_clamps() {
    let dir = tempfile::tempdir().unwrap();
    let layout = Layout::new(dir.path());
    let mut store = MappingStore::open(&layout);

    assert_eq!(store.set_volume(0).unwrap(), 1);
    assert_eq!(store.config().volume, 1);
    assert_eq!(store.set_volume(15).unwrap(), 10);
    assert_eq!(store.config().volume, 10);

    let saved = Config::load_from_path(&layout.config_path()).unwrap();
    assert_eq!(saved.volume, 10);
}

#[test]
fn set_volume_only_touches_the_volume_field() {
    let dir = tempfile::tempdir().unwrap();
    let layout = Layout::new(dir.path());
    custom_config().save(&layout.config_path()).unwrap();
    write_preset(dir.path(), "retro", &Config::default());

    let mut store = MappingStore::open(&layout);
    store.switch_preset("retro").unwrap();
    store.set_volume(3).unwrap();

    let saved = Config::load_from_path(&layout.config_path()).unwrap();
    assert_eq!(saved.volume, 3);
    assert_eq!(saved.mappings, custom_config().mappings);
    assert_eq!(store.config().mappings, Config::default().mappings);
}

#[test]
fn set_volume_reports_persist_failure_but_applies() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "file").unwrap();
    let mut store = MappingStore::new(
        Config::default(),
        blocker.join("openpeon.json"),
        dir.path().join("presets"),
    );

    let err = store.set_volume(9).unwrap_err();
    assert!(matches!(err, StoreError::Persist { .. }));
    assert_eq!(store.config().volume, 9);
}

#[test]
fn missing_preset_leaves_config_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = MappingStore::open(&Layout::new(dir.path()));
    let before = store.config().clone();

    let err = store.switch_preset("missing").unwrap_err();
    assert!(matches!(err, StoreError::PresetNotFound(ref name) if name == "missing"));
    assert_eq!(store.config(), &before);
    assert_eq!(store.active_preset(), None);
}

#[test]
fn malformed_preset_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("presets")).unwrap();
    fs::write(dir.path().join("presets").join("broken.json"), "[1, 2").unwrap();
    let mut store = MappingStore::open(&Layout::new(dir.path()));

    let err = store.switch_preset("broken").unwrap_err();
    assert!(matches!(err, StoreError::PresetMalformed { .. }));
    assert_eq!(store.config(), &Config::default());
}

#[test]
fn preset_names_cannot_escape_presets_dir() {
    let dir = tempfile::tempdir().unwrap();
    let store = MappingStore::open(&Layout::new(dir.path()));

    for name in ["../openpeon", "a/b", "", ".."] {
        assert!(matches!(
            store.load_preset(name),
            Err(StoreError::InvalidPresetName(_))
        ));
    }
}

#[test]
fn switch_preset_replaces_volume_and_mappings() {
    let dir = tempfile::tempdir().unwrap();
    write_preset(dir.path(), "custom", &custom_config());
    let mut store = MappingStore::open(&Layout::new(dir.path()));

    let config = store.switch_preset("custom").unwrap();
    assert_eq!(config.volume, 7);
    assert_eq!(config.mappings, custom_config().mappings);
    assert_eq!(store.active_preset(), Some("custom"));
    assert!(!dir.path().join("openpeon.json").exists());
}

#[test]
fn list_presets_filters_and_sorts() {
    let dir = tempfile::tempdir().unwrap();
    let store = MappingStore::open(&Layout::new(dir.path()));
    assert!(store.list_presets().is_empty());

    write_preset(dir.path(), "zelda", &Config::default());
    write_preset(dir.path(), "peon", &Config::default());
    fs::write(dir.path().join("presets").join("notes.txt"), "").unwrap();
    fs::create_dir_all(dir.path().join("presets").join("nested.json")).unwrap();

    assert_eq!(store.list_presets(), vec!["peon", "zelda"]);
}

#[test]
fn default_config_validates() {
    Config::default().validate().unwrap();
}

#[test]
fn duplicate_mapping_names_fail_validation() {
    let mut config = Config::default();
    let copy = config.mappings[0].clone();
    config.mappings.push(copy);
    assert!(config.validate().is_err());
}
