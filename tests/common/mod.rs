#![allow(dead_code)]

use openpeon::audio::AudioSink;
use openpeon::config::Config;
use openpeon::engine::Engine;
use openpeon::gate::ManualClock;
use openpeon::store::MappingStore;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Sink that remembers what it was asked to play.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    played: Arc<Mutex<Vec<(String, f32)>>>,
}

impl RecordingSink {
    pub fn played(&self) -> Vec<(String, f32)> {
        self.played.lock().unwrap().clone()
    }

    pub fn sounds(&self) -> Vec<String> {
        self.played().into_iter().map(|(sound, _)| sound).collect()
    }
}

impl AudioSink for RecordingSink {
    fn emit(&self, sound: &str, amplitude: f32) {
        self.played.lock().unwrap().push((sound.to_string(), amplitude));
    }

    fn is_disabled(&self) -> bool {
        false
    }
}

pub struct Harness {
    pub engine: Engine,
    pub sink: RecordingSink,
    pub clock: ManualClock,
}

pub fn harness(config: Config, root: &Path) -> Harness {
    let store = MappingStore::new(config, root.join("openpeon.json"), root.join("presets"));
    let sink = RecordingSink::default();
    let clock = ManualClock::new();
    let engine = Engine::new(store, sink.clone())
        .with_seed(7)
        .with_clock(clock.clone());
    Harness {
        engine,
        sink,
        clock,
    }
}

pub fn write_preset(root: &Path, name: &str, config: &Config) {
    let dir = root.join("presets");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join(format!("{name}.json")),
        serde_json::to_string_pretty(config).unwrap(),
    )
    .unwrap();
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-6
}
