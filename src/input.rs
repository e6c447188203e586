//! Input Module - Host input sources
//!
//! The event manager pulls input through [`HostInput`]; nothing is pushed
//! into it. Two sources are provided:
//!
//! - [`CrosstermInput`] - Terminal mouse events via crossterm
//! - [`ScriptedInput`] - A queue of prepared events (tests, replays)
//!
//! # Example
//!
//! ```ignore
//! use playback_events::input::{enable_mouse, CrosstermInput};
//!
//! enable_mouse()?;
//! events.set_input(Box::new(CrosstermInput::new()));
//! ```

use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode, KeyModifiers,
    MouseButton as CrosstermMouseButton, MouseEvent as CrosstermMouseEvent, MouseEventKind,
    poll, read,
};
use crossterm::execute;
use std::collections::VecDeque;
use std::io::stdout;
use std::time::Duration;

use crate::types::Point;

// =============================================================================
// HOST EVENTS
// =============================================================================

/// Mouse button reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Raw event from the host input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    MouseMove(Point),
    ButtonDown(MouseButton, Point),
    ButtonUp(MouseButton, Point),
    /// Host asked the game to close.
    Quit,
}

/// A pull-based source of host events.
pub trait HostInput {
    /// Next pending event, without blocking.
    fn poll(&mut self) -> Option<HostEvent>;
}

/// Source that never produces events.
#[derive(Debug, Default)]
pub struct NoInput;

impl HostInput for NoInput {
    fn poll(&mut self) -> Option<HostEvent> {
        None
    }
}

// =============================================================================
// SCRIPTED INPUT
// =============================================================================

/// Replays queued events in order.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    queue: VecDeque<HostEvent>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: HostEvent) {
        self.queue.push_back(event);
    }

    /// Queue a press followed by a release at `pos`.
    pub fn push_click(&mut self, button: MouseButton, pos: Point) {
        self.push(HostEvent::ButtonDown(button, pos));
        self.push(HostEvent::ButtonUp(button, pos));
    }

    pub fn from_events(events: impl IntoIterator<Item = HostEvent>) -> Self {
        Self {
            queue: events.into_iter().collect(),
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl HostInput for ScriptedInput {
    fn poll(&mut self) -> Option<HostEvent> {
        self.queue.pop_front()
    }
}

// =============================================================================
// CROSSTERM INPUT
// =============================================================================

/// Bridges crossterm's terminal events to [`HostEvent`]s.
///
/// Terminal cells are reported as pixel coordinates one-to-one. Ctrl+C maps
/// to [`HostEvent::Quit`].
#[derive(Debug, Default)]
pub struct CrosstermInput;

impl CrosstermInput {
    pub fn new() -> Self {
        Self
    }
}

impl HostInput for CrosstermInput {
    fn poll(&mut self) -> Option<HostEvent> {
        loop {
            match poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => return None,
                Err(err) => {
                    log::warn!("input poll failed: {}", err);
                    return None;
                }
            }
            let event = match read() {
                Ok(event) => event,
                Err(err) => {
                    log::warn!("input read failed: {}", err);
                    return None;
                }
            };
            // Skip events with no meaning here and keep draining.
            if let Some(event) = convert_event(event) {
                return Some(event);
            }
        }
    }
}

/// Convert a crossterm event, or `None` if it is not relevant.
pub fn convert_event(event: CrosstermEvent) -> Option<HostEvent> {
    match event {
        CrosstermEvent::Mouse(mouse) => convert_mouse_event(mouse),
        CrosstermEvent::Key(key)
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Some(HostEvent::Quit)
        }
        _ => None,
    }
}

/// Convert a crossterm mouse event. Scrolling is ignored.
pub fn convert_mouse_event(event: CrosstermMouseEvent) -> Option<HostEvent> {
    let pos = Point::new(clamp_coord(event.column), clamp_coord(event.row));
    match event.kind {
        MouseEventKind::Down(btn) => Some(HostEvent::ButtonDown(convert_mouse_button(btn), pos)),
        MouseEventKind::Up(btn) => Some(HostEvent::ButtonUp(convert_mouse_button(btn), pos)),
        MouseEventKind::Drag(_) | MouseEventKind::Moved => Some(HostEvent::MouseMove(pos)),
        MouseEventKind::ScrollUp
        | MouseEventKind::ScrollDown
        | MouseEventKind::ScrollLeft
        | MouseEventKind::ScrollRight => None,
    }
}

fn convert_mouse_button(btn: CrosstermMouseButton) -> MouseButton {
    match btn {
        CrosstermMouseButton::Left => MouseButton::Left,
        CrosstermMouseButton::Right => MouseButton::Right,
        CrosstermMouseButton::Middle => MouseButton::Middle,
    }
}

fn clamp_coord(value: u16) -> i16 {
    value.min(i16::MAX as u16) as i16
}

// =============================================================================
// MOUSE CAPTURE
// =============================================================================

/// Enable mouse capture.
pub fn enable_mouse() -> std::io::Result<()> {
    execute!(stdout(), EnableMouseCapture)
}

/// Disable mouse capture.
pub fn disable_mouse() -> std::io::Result<()> {
    execute!(stdout(), DisableMouseCapture)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyEventKind, KeyEventState};

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> CrosstermMouseEvent {
        CrosstermMouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::empty(),
        }
    }

    #[test]
    fn test_convert_mouse_down() {
        let kind = MouseEventKind::Down(CrosstermMouseButton::Left);
        let event = convert_mouse_event(mouse(kind, 10, 5));
        assert_eq!(
            event,
            Some(HostEvent::ButtonDown(MouseButton::Left, Point::new(10, 5)))
        );
    }

    #[test]
    fn test_convert_mouse_up() {
        let kind = MouseEventKind::Up(CrosstermMouseButton::Right);
        let event = convert_mouse_event(mouse(kind, 20, 15));
        assert_eq!(
            event,
            Some(HostEvent::ButtonUp(MouseButton::Right, Point::new(20, 15)))
        );
    }

    #[test]
    fn test_convert_drag_is_move() {
        let kind = MouseEventKind::Drag(CrosstermMouseButton::Left);
        let event = convert_mouse_event(mouse(kind, 3, 4));
        assert_eq!(event, Some(HostEvent::MouseMove(Point::new(3, 4))));
    }

    #[test]
    fn test_scroll_ignored() {
        assert_eq!(convert_mouse_event(mouse(MouseEventKind::ScrollDown, 0, 0)), None);
    }

    #[test]
    fn test_large_coordinates_clamped() {
        let event = convert_mouse_event(mouse(MouseEventKind::Moved, u16::MAX, 1));
        assert_eq!(event, Some(HostEvent::MouseMove(Point::new(i16::MAX, 1))));
    }

    #[test]
    fn test_ctrl_c_quits() {
        let key = KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        };
        assert_eq!(convert_event(CrosstermEvent::Key(key)), Some(HostEvent::Quit));
    }

    #[test]
    fn test_scripted_input_order() {
        let mut input = ScriptedInput::new();
        input.push_click(MouseButton::Left, Point::new(1, 1));
        assert_eq!(input.pending(), 2);
        assert!(matches!(input.poll(), Some(HostEvent::ButtonDown(MouseButton::Left, _))));
        assert!(matches!(input.poll(), Some(HostEvent::ButtonUp(MouseButton::Left, _))));
        assert_eq!(input.poll(), None);
    }
}
