//! The event-to-sound dispatch engine.
//!
//! One `Engine` owns its mapping store, suppression state, audio sink, random
//! source and clock, so independent engines never share state. The host
//! delivers stimuli one at a time through `&mut self`.

use crate::audio::curve::{amplitude, select_sound};
use crate::audio::AudioSink;
use crate::events::{Stimulus, STARTUP};
use crate::gate::{Clock, SuppressionGate, SystemClock};
use crate::matcher;
use crate::store::MappingStore;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// A sound handed to the sink for one matched mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub mapping: String,
    pub sound: String,
    pub amplitude: f32,
}

pub struct Engine {
    store: MappingStore,
    gate: SuppressionGate,
    sink: Box<dyn AudioSink>,
    rng: StdRng,
    clock: Box<dyn Clock>,
}

impl Engine {
    pub fn new(store: MappingStore, sink: impl AudioSink + 'static) -> Self {
        Self {
            store,
            gate: SuppressionGate::new(),
            sink: Box::new(sink),
            rng: StdRng::from_entropy(),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn store(&self) -> &MappingStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MappingStore {
        &mut self.store
    }

    pub fn sink(&self) -> &dyn AudioSink {
        self.sink.as_ref()
    }

    pub fn gate(&self) -> &SuppressionGate {
        &self.gate
    }

    /// Prepares the engine before the first host stimulus: applies a random
    /// preset when the config asks for one, then plays the startup event.
    pub fn boot(&mut self) -> Vec<Dispatch> {
        if self.store.config().wants_random_preset() {
            self.apply_random_preset();
        }
        self.handle(&Stimulus::event(STARTUP))
    }

    /// Switches to a uniformly chosen preset. Returns the chosen name, or
    /// `None` when no preset could be applied and the current config stays.
    pub fn apply_random_preset(&mut self) -> Option<String> {
        let names = self.store.list_presets();
        let name = match names.choose(&mut self.rng) {
            Some(name) => name.clone(),
            None => {
                tracing::debug!("random preset requested but none available");
                return None;
            }
        };

        match self.store.switch_preset(&name) {
            Ok(_) => Some(name),
            Err(err) => {
                tracing::warn!(preset = %name, error = ?err, "random preset failed; keeping config");
                None
            }
        }
    }

    /// Handles one stimulus. Never fails: suppressed, unmatched or malformed
    /// stimuli simply produce no dispatches.
    pub fn handle(&mut self, stimulus: &Stimulus) -> Vec<Dispatch> {
        let now = self.clock.now();
        let config = self.store.config();

        let admission = self.gate.admit(stimulus, &config.suppression, now);
        if !admission.is_accepted() {
            tracing::debug!(stimulus = %stimulus.label(), ?admission, "suppressed");
            return Vec::new();
        }

        let mut dispatches = Vec::new();
        for mapping in matcher::matches(stimulus, &config.mappings) {
            let Some(sound) = select_sound(&mapping.sounds, &mut self.rng) else {
                continue;
            };
            let amplitude = amplitude(config.volume, mapping.whisper);
            tracing::debug!(
                stimulus = %stimulus.label(),
                mapping = %mapping.name,
                sound,
                amplitude,
                "play"
            );
            self.sink.emit(sound, amplitude);
            dispatches.push(Dispatch {
                mapping: mapping.name.clone(),
                sound: sound.to_string(),
                amplitude,
            });
        }

        if !dispatches.is_empty() {
            self.gate.record(stimulus, &config.suppression, now);
        }

        dispatches
    }
}
