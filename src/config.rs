use crate::events::{MESSAGE_UPDATED, PERMISSION_ASKED, SESSION_IDLE};
use anyhow::{bail, Context};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "openpeon.json";
pub const PRESETS_DIR: &str = "presets";
pub const SOUNDS_DIR: &str = "sounds";
pub const PRESET_SUFFIX: &str = ".json";

pub const MIN_VOLUME: i64 = 1;
pub const MAX_VOLUME: i64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_volume")]
    pub volume: i64,
    #[serde(default)]
    pub mappings: Vec<Mapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_preset: Option<bool>,
    #[serde(default, skip_serializing_if = "Suppression::is_default")]
    pub suppression: Suppression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    pub name: String,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    #[serde(default)]
    pub sounds: Vec<String>,
    #[serde(default)]
    pub whisper: bool,
}

/// A single matching condition. The set of kinds is closed; kinds written by
/// newer tools load as `Unknown` and never match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Trigger {
    #[serde(rename = "event")]
    Event {
        #[serde(alias = "event")]
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        role: Option<String>,
    },
    #[serde(rename = "tool.before")]
    ToolBefore {
        #[serde(alias = "tool")]
        value: String,
    },
    #[serde(rename = "tool.after")]
    ToolAfter {
        #[serde(alias = "tool")]
        value: String,
    },
    #[serde(other, rename = "unknown")]
    Unknown,
}

impl Trigger {
    pub fn event(name: impl Into<String>) -> Self {
        Trigger::Event {
            value: name.into(),
            role: None,
        }
    }

    pub fn event_with_role(name: impl Into<String>, role: impl Into<String>) -> Self {
        Trigger::Event {
            value: name.into(),
            role: Some(role.into()),
        }
    }

    pub fn tool_before(tool: impl Into<String>) -> Self {
        Trigger::ToolBefore { value: tool.into() }
    }

    pub fn tool_after(tool: impl Into<String>) -> Self {
        Trigger::ToolAfter { value: tool.into() }
    }
}

/// Which suppression strategies the gate applies. Identity dedup and
/// timestamp debounce are switched independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suppression {
    #[serde(default = "default_enabled")]
    pub dedup_messages: bool,
    #[serde(default = "default_enabled")]
    pub dedup_permissions: bool,
    #[serde(default = "default_debounce_events")]
    pub debounce_events: Vec<String>,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Suppression {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn debounces(&self, event_name: &str) -> bool {
        self.debounce_events.iter().any(|name| name == event_name)
    }
}

impl Default for Suppression {
    fn default() -> Self {
        Self {
            dedup_messages: true,
            dedup_permissions: true,
            debounce_events: default_debounce_events(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Config {
    /// Loads the document at `path`, falling back to the built-in defaults on
    /// any read or parse failure.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config document; using defaults");
            return Self::default();
        }

        match Self::load_from_path(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), "using default config: {err:#}");
                Self::default()
            }
        }
    }

    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config at {}", path.display()))?;
        let config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("parse config at {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create config dir {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(path, raw).with_context(|| format!("write config at {}", path.display()))?;
        Ok(())
    }

    pub fn init_default(path: &Path) -> anyhow::Result<()> {
        if path.exists() {
            bail!("config already exists at {}", path.display());
        }
        Self::default().save(path)
    }

    pub fn wants_random_preset(&self) -> bool {
        self.random_preset.unwrap_or(false)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(MIN_VOLUME..=MAX_VOLUME).contains(&self.volume) {
            bail!("volume must be between {MIN_VOLUME} and {MAX_VOLUME}");
        }

        let mut names = HashSet::new();
        for mapping in &self.mappings {
            if mapping.name.trim().is_empty() {
                bail!("mapping names must not be empty");
            }
            if !names.insert(mapping.name.as_str()) {
                bail!("duplicate mapping name: {}", mapping.name);
            }
            if mapping.triggers.iter().any(|t| *t == Trigger::Unknown) {
                bail!("mapping {} has a trigger of unknown type", mapping.name);
            }
            if mapping.triggers.is_empty() || mapping.sounds.is_empty() {
                tracing::warn!(mapping = %mapping.name, "mapping has no triggers or no sounds and will never fire");
            }
        }

        if self.suppression.debounce_ms == 0 && !self.suppression.debounce_events.is_empty() {
            bail!("suppression.debounceMs must be greater than 0 when debounceEvents is set");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            mappings: vec![
                Mapping {
                    name: "acknowledge".to_string(),
                    triggers: vec![
                        Trigger::event("tui.command.execute"),
                        Trigger::event("command.executed"),
                        Trigger::event("permission.replied"),
                        Trigger::event_with_role(MESSAGE_UPDATED, "user"),
                    ],
                    sounds: (1..=4).map(|n| format!("acknowledge{n}.wav")).collect(),
                    whisper: false,
                },
                Mapping {
                    name: "work-complete".to_string(),
                    triggers: vec![Trigger::event(SESSION_IDLE)],
                    sounds: vec!["work-complete.wav".to_string()],
                    whisper: false,
                },
                Mapping {
                    name: "permission-asked".to_string(),
                    triggers: vec![
                        Trigger::event(PERMISSION_ASKED),
                        Trigger::tool_before("question"),
                    ],
                    sounds: vec!["selected4.wav".to_string()],
                    whisper: false,
                },
            ],
            random_preset: None,
            suppression: Suppression::default(),
        }
    }
}

/// On-disk layout: one root holding the config document, presets and sounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Explicit root, then `OPENPEON_HOME`, then the current directory when it
    /// holds a config document, then the host's plugin directory.
    pub fn resolve(root: Option<PathBuf>) -> anyhow::Result<Self> {
        if let Some(root) = root {
            return Ok(Self::new(root));
        }

        if let Some(home) = std::env::var_os("OPENPEON_HOME") {
            return Ok(Self::new(home));
        }

        if Path::new(CONFIG_FILE).exists() {
            return Ok(Self::new("."));
        }

        Self::default_root().map(Self::new)
    }

    pub fn default_root() -> anyhow::Result<PathBuf> {
        let base = BaseDirs::new().context("unable to resolve home directory")?;
        Ok(base
            .config_dir()
            .join("opencode")
            .join("plugins")
            .join("openpeon"))
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn presets_dir(&self) -> PathBuf {
        self.root.join(PRESETS_DIR)
    }

    pub fn sounds_dir(&self) -> PathBuf {
        self.root.join(SOUNDS_DIR)
    }
}

/// Location of the append-only debug log enabled by `OPENPEON_DEBUG`.
pub fn debug_log_path() -> Option<PathBuf> {
    let base = BaseDirs::new()?;
    Some(base.config_dir().join("opencode").join("peon-debug.log"))
}

fn default_enabled() -> bool {
    true
}

fn default_volume() -> i64 {
    5
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_debounce_events() -> Vec<String> {
    ["tui.command.execute", "command.executed", "permission.replied"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
