//! Wall-clock sources for the frame counter.
//!
//! - [`SystemClock`] - Real time via `Instant`
//! - [`ManualClock`] - Shared virtual time; sleeping advances it

use std::cell::Cell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

/// Millisecond clock consumed by the frame counter and blocking waits.
pub trait FrameClock {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_millis(&self) -> u64;

    /// Give up control for roughly `ms` milliseconds.
    fn sleep_millis(&mut self, ms: u64);
}

// =============================================================================
// System clock
// =============================================================================

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn now_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn sleep_millis(&mut self, ms: u64) {
        thread::sleep(Duration::from_millis(ms));
    }
}

// =============================================================================
// Manual clock
// =============================================================================

/// Virtual clock for tests and replays.
///
/// Clones share the same time, so a test can keep a handle and advance the
/// clock the manager reads from.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl FrameClock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.get()
    }

    fn sleep_millis(&mut self, ms: u64) {
        self.advance(ms);
    }
}
