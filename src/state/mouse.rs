//! Mouse Module - Position, held buttons and edge-triggered clicks
//!
//! Two parallel flag sets are kept:
//!
//! - **held** - Follows the physical buttons (down sets, up clears)
//! - **new** - Set on press only, cleared only when the consumer reads them
//!
//! A single physical press is therefore reported by the "new" flags exactly
//! once, no matter how many polls happen before it is read.
//!
//! # API
//!
//! - `apply(event)` - Fold a host event into the state
//! - `position` / `position_signal` - Cursor position
//! - `held` - Currently held buttons
//! - `peek_new` / `take_new` / `clear_new` - Edge-triggered clicks
//! - `reset` - Clear every flag

use spark_signals::{Signal, signal};

use crate::input::{HostEvent, MouseButton};
use crate::types::Point;

// =============================================================================
// TYPES
// =============================================================================

/// One flag per mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    pub left: bool,
    pub right: bool,
    pub middle: bool,
}

impl ButtonState {
    /// Any button (the "mouse clicked" flag).
    pub fn any(&self) -> bool {
        self.left || self.right || self.middle
    }

    fn set(&mut self, button: MouseButton, value: bool) {
        match button {
            MouseButton::Left => self.left = value,
            MouseButton::Right => self.right = value,
            MouseButton::Middle => self.middle = value,
        }
    }
}

/// Snapshot returned by [`EventsManager::get_mouse_info`](crate::EventsManager::get_mouse_info).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseInfo {
    pub position: Point,
    pub held: ButtonState,
    /// Presses since the previous read (consumed by the read).
    pub clicked: ButtonState,
}

// =============================================================================
// STATE
// =============================================================================

pub struct MouseState {
    position: Signal<Point>,
    held: ButtonState,
    new: ButtonState,
}

impl Default for MouseState {
    fn default() -> Self {
        Self::new()
    }
}

impl MouseState {
    pub fn new() -> Self {
        Self {
            position: signal(Point::default()),
            held: ButtonState::default(),
            new: ButtonState::default(),
        }
    }

    /// Fold one host event into the state. Returns true for button events.
    pub fn apply(&mut self, event: &HostEvent) -> bool {
        match *event {
            HostEvent::MouseMove(pos) => {
                self.set_position(pos);
                false
            }
            HostEvent::ButtonDown(button, pos) => {
                self.set_position(pos);
                self.held.set(button, true);
                self.new.set(button, true);
                true
            }
            HostEvent::ButtonUp(button, pos) => {
                self.set_position(pos);
                self.held.set(button, false);
                true
            }
            HostEvent::Quit => false,
        }
    }

    pub fn position(&self) -> Point {
        self.position.get()
    }

    pub fn set_position(&mut self, pos: Point) {
        if self.position.get() != pos {
            self.position.set(pos);
        }
    }

    /// Reactive handle on the position, for the presentation layer.
    pub fn position_signal(&self) -> Signal<Point> {
        self.position.clone()
    }

    pub fn held(&self) -> ButtonState {
        self.held
    }

    /// Edge-triggered flags without consuming them.
    pub fn peek_new(&self) -> ButtonState {
        self.new
    }

    /// Read and clear the edge-triggered flags.
    pub fn take_new(&mut self) -> ButtonState {
        std::mem::take(&mut self.new)
    }

    pub fn clear_new(&mut self) {
        self.new = ButtonState::default();
    }

    /// Clear held and edge-triggered flags. Position is kept.
    pub fn reset(&mut self) {
        self.held = ButtonState::default();
        self.new = ButtonState::default();
    }
}

// =============================================================================
// TESTS
// =============================================================================
