//! Runtime configuration for the event manager.
//!
//! The frame rate is fixed by [`GAME_FRAME_RATE`](crate::types::GAME_FRAME_RATE)
//! and is not configurable.

use std::env;

/// Env var overriding [`EventsConfig::poll_interval_ms`].
pub const POLL_INTERVAL_ENV_VAR: &str = "EVENTS_POLL_MS";
/// Env var overriding [`EventsConfig::blink_interval_frames`].
pub const BLINK_FRAMES_ENV_VAR: &str = "EVENTS_BLINK_FRAMES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsConfig {
    /// Sleep between polls inside blocking waits.
    pub poll_interval_ms: u64,
    /// Frames between cursor blink toggles.
    pub blink_interval_frames: u16,
    /// Palette entry toggled by the cursor blink.
    pub blink_color_index: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10,
            blink_interval_frames: 16,
            blink_color_index: 128,
        }
    }
}

impl EventsConfig {
    /// Defaults with env overrides applied. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(ms) = read_env::<u64>(POLL_INTERVAL_ENV_VAR) {
            config.poll_interval_ms = ms;
        }
        if let Some(frames) = read_env::<u16>(BLINK_FRAMES_ENV_VAR) {
            config.blink_interval_frames = frames.max(1);
        }
        config
    }
}

fn read_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("ignoring invalid {}={:?}", name, raw);
            None
        }
    }
}
