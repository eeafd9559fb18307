//! Administrative commands the host can invoke, answered with text.

use crate::engine::Engine;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    ListPresets,
    SwitchPreset(String),
    ShowConfig,
    SetVolume(String),
}

impl AdminCommand {
    /// Parses a host command name and its raw argument string.
    pub fn parse(name: &str, arguments: &str) -> Option<Self> {
        let arguments = arguments.trim();
        match name {
            "presets" | "peon-presets" => Some(AdminCommand::ListPresets),
            "preset" | "peon-preset" => Some(AdminCommand::SwitchPreset(arguments.to_string())),
            "config" | "peon-config" => Some(AdminCommand::ShowConfig),
            "volume" | "peon-volume" => Some(AdminCommand::SetVolume(arguments.to_string())),
            _ => None,
        }
    }
}

pub fn execute(engine: &mut Engine, command: &AdminCommand) -> String {
    match command {
        AdminCommand::ListPresets => list_presets(engine),
        AdminCommand::SwitchPreset(name) => switch_preset(engine, name),
        AdminCommand::ShowConfig => describe_config(engine),
        AdminCommand::SetVolume(raw) => set_volume(engine, raw),
    }
}

fn list_presets(engine: &Engine) -> String {
    let names = engine.store().list_presets();
    if names.is_empty() {
        return "No presets available.".to_string();
    }

    let active = engine.store().active_preset();
    let mut out = String::from("Presets:");
    for name in names {
        let marker = if Some(name.as_str()) == active { " (active)" } else { "" };
        let _ = write!(out, "\n- {name}{marker}");
    }
    out
}

fn switch_preset(engine: &mut Engine, name: &str) -> String {
    if name.is_empty() {
        return "Usage: preset <name>".to_string();
    }

    match engine.store_mut().switch_preset(name) {
        Ok(config) => format!(
            "Switched to preset \"{name}\" ({} mappings, volume {}).",
            config.mappings.len(),
            config.volume
        ),
        Err(err) => format!("Failed to switch preset: {}", error_chain(&err)),
    }
}

fn describe_config(engine: &Engine) -> String {
    let store = engine.store();
    let config = store.config();

    let mut out = String::new();
    let _ = writeln!(out, "Volume: {}", config.volume);
    let _ = writeln!(out, "Preset: {}", store.active_preset().unwrap_or("(default)"));
    if engine.sink().is_disabled() {
        let _ = writeln!(out, "Audio: disabled");
    }
    let _ = write!(out, "Mappings:");
    if config.mappings.is_empty() {
        let _ = write!(out, " none");
    }
    for mapping in &config.mappings {
        let whisper = if mapping.whisper { ", whisper" } else { "" };
        let _ = write!(
            out,
            "\n- {} ({} triggers, {} sounds{whisper})",
            mapping.name,
            mapping.triggers.len(),
            mapping.sounds.len()
        );
    }
    out
}

fn set_volume(engine: &mut Engine, raw: &str) -> String {
    let level: i64 = match raw.parse() {
        Ok(level) => level,
        Err(_) => return format!("Invalid volume \"{raw}\"; expected a number from 1 to 10."),
    };

    match engine.store_mut().set_volume(level) {
        Ok(applied) => format!("Volume set to {applied}."),
        Err(err) => format!(
            "Volume set to {} for this session, but saving failed: {}",
            engine.store().config().volume,
            error_chain(&err)
        ),
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(message, ": {cause}");
        source = cause.source();
    }
    message
}
