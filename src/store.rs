//! The active configuration and its preset lifecycle.

use crate::audio::curve::clamp_level;
use crate::config::{Config, Layout, PRESET_SUFFIX};
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("preset \"{0}\" not found")]
    PresetNotFound(String),
    #[error("invalid preset name \"{0}\"")]
    InvalidPresetName(String),
    #[error("read preset \"{name}\"")]
    PresetRead {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("preset \"{name}\" is malformed")]
    PresetMalformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("serialize config for {path}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("persist config to {path}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug)]
pub struct MappingStore {
    config: Config,
    config_path: PathBuf,
    presets_dir: PathBuf,
    active_preset: Option<String>,
}

impl MappingStore {
    pub fn new(config: Config, config_path: PathBuf, presets_dir: PathBuf) -> Self {
        Self {
            config,
            config_path,
            presets_dir,
            active_preset: None,
        }
    }

    pub fn open(layout: &Layout) -> Self {
        let config_path = layout.config_path();
        let config = Config::load_or_default(&config_path);
        Self::new(config, config_path, layout.presets_dir())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn active_preset(&self) -> Option<&str> {
        self.active_preset.as_deref()
    }

    /// Preset names found in the presets directory, sorted. A missing or
    /// unreadable directory yields an empty list.
    pub fn list_presets(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.presets_dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let file_name = entry.file_name().to_string_lossy().into_owned();
                file_name
                    .strip_suffix(PRESET_SUFFIX)
                    .filter(|stem| !stem.is_empty())
                    .map(str::to_string)
            })
            .collect();
        names.sort();
        names
    }

    /// Reads a preset document from disk. Presets are never cached.
    pub fn load_preset(&self, name: &str) -> Result<Config, StoreError> {
        let path = self.preset_path(name)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::PresetNotFound(name.to_string()))
            }
            Err(source) => {
                return Err(StoreError::PresetRead {
                    name: name.to_string(),
                    source,
                })
            }
        };
        serde_json::from_str(&raw).map_err(|source| StoreError::PresetMalformed {
            name: name.to_string(),
            source,
        })
    }

    /// Replaces the active volume and mappings with the named preset. The
    /// config document on disk is left alone, and on failure so is the
    /// active configuration.
    pub fn switch_preset(&mut self, name: &str) -> Result<&Config, StoreError> {
        let preset = self.load_preset(name)?;
        self.config.volume = preset.volume;
        self.config.mappings = preset.mappings;
        self.active_preset = Some(name.to_string());
        tracing::info!(preset = name, "switched preset");
        Ok(&self.config)
    }

    /// Clamps `level` to 1–10, applies it, then writes it to the `volume`
    /// field of the config document. The in-memory change stands even when
    /// persisting fails.
    pub fn set_volume(&mut self, level: i64) -> Result<i64, StoreError> {
        let level = clamp_level(level);
        self.config.volume = level;
        self.persist_volume(level)?;
        Ok(level)
    }

    fn persist_volume(&self, level: i64) -> Result<(), StoreError> {
        let path = &self.config_path;
        let existing = fs::read_to_string(path)
            .ok()
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
            .filter(Value::is_object);
        // Only the volume field changes; a missing or broken document is
        // replaced by the defaults.
        let mut document = match existing {
            Some(document) => document,
            None => serde_json::to_value(Config::default()).map_err(|source| {
                StoreError::Serialize {
                    path: path.clone(),
                    source,
                }
            })?,
        };
        document["volume"] = Value::from(level);

        let raw = serde_json::to_string_pretty(&document).map_err(|source| {
            StoreError::Serialize {
                path: path.clone(),
                source,
            }
        })?;
        write_atomic(path, raw.as_bytes()).map_err(|source| StoreError::Persist {
            path: path.clone(),
            source,
        })
    }

    fn preset_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        let mut components = Path::new(name).components();
        let single_normal = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if name.is_empty() || !single_normal {
            return Err(StoreError::InvalidPresetName(name.to_string()));
        }
        Ok(self.presets_dir.join(format!("{name}{PRESET_SUFFIX}")))
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;
    let mut temp = NamedTempFile::new_in(&dir)?;
    temp.write_all(bytes)?;
    temp.flush()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
