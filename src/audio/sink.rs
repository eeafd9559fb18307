use crate::system;
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Fire-and-forget audio output. Implementations must never block the
/// caller or surface playback failures.
pub trait AudioSink: Send {
    fn emit(&self, sound: &str, amplitude: f32);
    fn is_disabled(&self) -> bool;
}

/// Plays sounds by launching the platform player as a detached process.
///
/// The sink disables itself for good when the platform or player is missing
/// at construction, or when any launch fails at runtime. There is no retry.
#[derive(Debug, Clone)]
pub struct ProcessSink {
    player: PathBuf,
    sounds_dir: PathBuf,
    disabled: Arc<AtomicBool>,
}

impl ProcessSink {
    pub fn detect(sounds_dir: PathBuf) -> Self {
        if !system::audio_supported() {
            tracing::debug!(os = std::env::consts::OS, "audio disabled: unsupported platform");
            return Self::disabled(sounds_dir);
        }

        match system::find_player() {
            Some(player) => Self::with_player(player, sounds_dir),
            None => {
                tracing::debug!(player = system::PLAYER_BINARY, "audio disabled: player missing");
                Self::disabled(sounds_dir)
            }
        }
    }

    pub fn with_player(player: PathBuf, sounds_dir: PathBuf) -> Self {
        Self {
            player,
            sounds_dir,
            disabled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn disabled(sounds_dir: PathBuf) -> Self {
        Self {
            player: PathBuf::from(system::PLAYER_BINARY),
            sounds_dir,
            disabled: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Resolves a sound id to a file under the sounds directory. Ids that
    /// would escape the directory are rejected.
    pub fn resolve(&self, sound: &str) -> Option<PathBuf> {
        let relative = Path::new(sound);
        let contained = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if sound.is_empty() || !contained {
            return None;
        }
        Some(self.sounds_dir.join(relative))
    }
}

impl AudioSink for ProcessSink {
    fn emit(&self, sound: &str, amplitude: f32) {
        if self.is_disabled() {
            return;
        }

        let path = match self.resolve(sound) {
            Some(path) => path,
            None => {
                tracing::warn!(sound, "sound id outside sounds dir; skipping");
                return;
            }
        };
        if !path.is_file() {
            tracing::warn!(path = %path.display(), "sound file missing; skipping");
            return;
        }

        let spawned = Command::new(&self.player)
            .arg("-v")
            .arg(amplitude.to_string())
            .arg(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(err) => {
                self.disabled.store(true, Ordering::SeqCst);
                tracing::warn!(error = %err, player = %self.player.display(), "player launch failed; audio disabled");
                return;
            }
        };

        // Playback is never awaited by the caller; this thread only reaps.
        let disabled = Arc::clone(&self.disabled);
        thread::spawn(move || {
            match child.wait() {
                Ok(status) if !status.success() => {
                    tracing::debug!(%status, path = %path.display(), "player exited unsuccessfully");
                }
                Ok(_) => {}
                Err(err) => {
                    disabled.store(true, Ordering::SeqCst);
                    tracing::warn!(error = %err, "player process error; audio disabled");
                }
            }
        });
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }
}
