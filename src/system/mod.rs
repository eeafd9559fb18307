use serde::Serialize;
use std::path::{Path, PathBuf};

pub const PLAYER_BINARY: &str = "afplay";
const FALLBACK_PLAYER: &str = "/usr/bin/afplay";

#[derive(Debug, Serialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub audio_supported: bool,
    pub player: Option<PathBuf>,
}

pub fn detect() -> SystemInfo {
    SystemInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        audio_supported: audio_supported(),
        player: find_player(),
    }
}

/// Playback goes through `afplay`, which only ships with macOS.
pub fn audio_supported() -> bool {
    cfg!(target_os = "macos")
}

pub fn find_player() -> Option<PathBuf> {
    find_in_path(PLAYER_BINARY).or_else(|| {
        let fallback = Path::new(FALLBACK_PLAYER);
        fallback.is_file().then(|| fallback.to_path_buf())
    })
}

fn find_in_path(binary: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}
