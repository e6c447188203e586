//! Core types shared across the playback event system.
//!
//! - [`Point`] - Screen coordinate
//! - [`Rgb`] - Palette color (VGA 8-bit components)
//! - Flag sets for nodes, color maps and cycling (bitflags)

// =============================================================================
// Timing
// =============================================================================

/// Virtual clock rate. Animation timing depends on this being exact.
pub const GAME_FRAME_RATE: u32 = 50;

/// Length of one tick in milliseconds.
pub const GAME_FRAME_TIME: u64 = 1000 / GAME_FRAME_RATE as u64;

// =============================================================================
// Palette
// =============================================================================

/// Number of entries in the VGA palette.
pub const PALETTE_COLORS: usize = 256;

/// Size of a raw palette buffer (RGB triplets).
pub const PALETTE_SIZE: usize = PALETTE_COLORS * 3;

/// A single palette color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Read the color at `index` from a raw RGB palette buffer.
    pub fn read(palette: &[u8], index: usize) -> Self {
        let i = index * 3;
        Self::new(palette[i], palette[i + 1], palette[i + 2])
    }

    /// Write this color at `index` into a raw RGB palette buffer.
    pub fn write(self, palette: &mut [u8], index: usize) {
        let i = index * 3;
        palette[i] = self.r;
        palette[i + 1] = self.g;
        palette[i + 2] = self.b;
    }

    /// Sum of components, used to tell a fade's direction.
    pub fn brightness(self) -> u32 {
        self.r as u32 + self.g as u32 + self.b as u32
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// Screen position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Point {
    pub x: i16,
    pub y: i16,
}

impl Point {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

// =============================================================================
// Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Modifiers on how the dispatcher treats an [`IntNode`](crate::scheduler::IntNode).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u32 {
        /// Node stays in the active list but is skipped.
        const DISABLED = 1 << 0;
        /// Node fires every tick without counting down.
        const EVERY_TICK = 1 << 1;
    }
}

bitflags::bitflags! {
    /// Flags carried by a color map resource.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CMapFlags: u8 {
        /// Every palette index fades toward the map's first color.
        const UNIFORM = 1 << 0;
        /// Prepare the fade but hold it until `skip_fading` is cleared.
        const HOLD = 1 << 1;
    }
}

bitflags::bitflags! {
    /// Color cycling status.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CycleStatus: u8 {
        /// Global gate for all cycle slots.
        const ENABLED = 1 << 0;
    }
}
