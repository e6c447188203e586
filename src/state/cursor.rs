//! Cursor State - Image, visibility and blink
//!
//! The presentation layer reads the active image and visibility from here;
//! visibility is also published as a reactive signal so it can redraw on
//! change.
//!
//! # Functions
//!
//! - [`CursorState::replace_image`] - Exclusively swap the cursor image
//! - [`CursorState::show`], [`CursorState::hide`] - Idempotent visibility
//! - [`cursor_color`] - Tint for a cursor color mode

use spark_signals::{Signal, signal};

use crate::resources::PictureResource;
use crate::types::{Point, Rgb};

/// Cursor tints selected by [`cursor_color`] mode 0..=3.
pub const CURSOR_COLORS: [Rgb; 4] = [
    Rgb::new(90, 90, 232),
    Rgb::new(232, 90, 90),
    Rgb::new(90, 232, 90),
    Rgb::new(90, 232, 232),
];

/// Blink entry color while lit.
pub const BLINK_LIT: Rgb = Rgb::new(220, 20, 20);
/// Blink entry color between flashes.
pub const BLINK_DARK: Rgb = Rgb::new(220, 220, 220);

/// Tint for a cursor color mode, or `None` for unknown modes.
pub fn cursor_color(mode: usize) -> Option<Rgb> {
    CURSOR_COLORS.get(mode).copied()
}

// =============================================================================
// Image
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorImage {
    pub width: u16,
    pub height: u16,
    pub hotspot: Point,
    /// Transparent palette index, if any.
    pub key_color: Option<u8>,
    pub pixels: Vec<u8>,
}

impl CursorImage {
    /// Hotspot at the center of the bitmap.
    pub fn centered(width: u16, height: u16, key_color: Option<u8>, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            hotspot: Point::new((width / 2) as i16, (height / 2) as i16),
            key_color,
            pixels,
        }
    }
}

impl From<&PictureResource> for CursorImage {
    fn from(pic: &PictureResource) -> Self {
        Self::centered(pic.width, pic.height, Some(0), pic.pixels.clone())
    }
}

// =============================================================================
// State
// =============================================================================

pub struct CursorState {
    image: Option<CursorImage>,
    visible: Signal<bool>,
    /// Blink phase; true while the blink entry shows [`BLINK_DARK`].
    pub(crate) blinked: bool,
}

impl Default for CursorState {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorState {
    /// Hidden, no image.
    pub fn new() -> Self {
        Self {
            image: None,
            visible: signal(false),
            blinked: false,
        }
    }

    pub fn image(&self) -> Option<&CursorImage> {
        self.image.as_ref()
    }

    /// Install `image`, returning the one it replaces.
    pub fn replace_image(&mut self, image: CursorImage) -> Option<CursorImage> {
        self.image.replace(image)
    }

    pub fn show(&mut self) {
        self.set_visible(true);
    }

    pub fn hide(&mut self) {
        self.set_visible(false);
    }

    fn set_visible(&mut self, visible: bool) {
        if self.visible.get() != visible {
            self.visible.set(visible);
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn visible_signal(&self) -> Signal<bool> {
        self.visible.clone()
    }

    pub fn blinked(&self) -> bool {
        self.blinked
    }

    /// Flip the blink phase and return the color the blink entry shows now.
    pub(crate) fn toggle_blink(&mut self) -> Rgb {
        self.blinked = !self.blinked;
        if self.blinked { BLINK_DARK } else { BLINK_LIT }
    }
}
