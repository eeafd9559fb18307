use crate::config::{MAX_VOLUME, MIN_VOLUME};
use rand::seq::SliceRandom;
use rand::Rng;

/// Maps a 1–10 loudness level to a playback amplitude with a square-law
/// curve. Whispered mappings always play at the minimum level. Levels
/// outside 1–10 are not validated here.
pub fn amplitude(level: i64, whisper: bool) -> f32 {
    let level = if whisper { MIN_VOLUME } else { level };
    let normalized = level as f32 / MAX_VOLUME as f32;
    normalized * normalized
}

pub fn clamp_level(level: i64) -> i64 {
    level.clamp(MIN_VOLUME, MAX_VOLUME)
}

/// Uniform choice over `sounds`; `None` when there is nothing to choose.
pub fn select_sound<'a, R: Rng + ?Sized>(sounds: &'a [String], rng: &mut R) -> Option<&'a str> {
    sounds.choose(rng).map(String::as_str)
}
