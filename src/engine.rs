//! Owning engine seam.
//!
//! The manager calls back into the engine through [`EngineHooks`]. Every
//! method has a no-op default so hosts only implement what they use.

/// Kind of a logged game event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Video,
    Audio,
    Evidence,
    Computer,
}

impl EventKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Evidence => "Evidence",
            Self::Computer => "Computer",
        }
    }
}

/// An entry of the engine's event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRecord {
    pub hour: u8,
    pub minute: u8,
    pub is_am: bool,
    pub kind: EventKind,
}

pub trait EngineHooks {
    /// Blocking waits return early once this is true.
    fn should_quit(&self) -> bool {
        false
    }

    /// Called once per second of game time by the master clock.
    fn on_clock_second(&mut self) {}

    /// Called at the end of every frame pass (screen update point).
    fn on_frame(&mut self) {}

    /// Push `colors` (RGB triplets) to the hardware palette from `start`.
    fn present_palette(&mut self, _start: usize, _colors: &[u8]) {}

    /// Event log lookup for [`EventsManager::evid_string`](crate::EventsManager::evid_string).
    fn event_record(&self, _index: usize) -> Option<EventRecord> {
        None
    }
}

/// Engine that ignores every callback.
#[derive(Debug, Default)]
pub struct NullEngine;

impl EngineHooks for NullEngine {}
