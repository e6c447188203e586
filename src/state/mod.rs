//! State Module - Input and cursor state owned by the events manager
//!
//! - **Mouse** - Position, held buttons, edge-triggered clicks
//! - **Cursor** - Cursor image, visibility, blink phase

pub mod cursor;
pub mod mouse;

pub use cursor::{CursorImage, CursorState};
pub use mouse::{ButtonState, MouseInfo, MouseState};
