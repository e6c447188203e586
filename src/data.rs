//! Shared timer state and palette buffer for fades, flashes and flips.

use crate::types::{PALETTE_COLORS, PALETTE_SIZE};

/// Which [`IntData`] the fade and cycle handlers operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSlot {
    #[default]
    Game,
    Overlay,
}

impl DataSlot {
    pub(crate) fn index(self) -> usize {
        match self {
            Self::Game => 0,
            Self::Overlay => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntData {
    /// A double-buffer flip is pending.
    pub flip_wait: bool,
    /// Ticks until the next flash toggle.
    pub flash_timer: i32,
    /// Flash period; 0 when no flash runs.
    pub flash_step: i32,
    /// Ticks before a pending flip completes. Decremented every frame; once
    /// it is not positive the pending flip is released.
    pub flip_delay: i32,
    /// `palette[pal_start_index..=pal_end_index]` must be pushed to the display.
    pub has_palette: bool,
    /// Fade steps are held while set.
    pub skip_fading: bool,
    pub pal_start_index: usize,
    pub pal_end_index: usize,
    palette: Vec<u8>,
}

impl Default for IntData {
    fn default() -> Self {
        Self::new()
    }
}

impl IntData {
    /// Black palette, empty dirty range.
    pub fn new() -> Self {
        Self {
            flip_wait: false,
            flash_timer: 0,
            flash_step: 0,
            flip_delay: 0,
            has_palette: false,
            skip_fading: false,
            pal_start_index: PALETTE_COLORS - 1,
            pal_end_index: 0,
            palette: vec![0; PALETTE_SIZE],
        }
    }

    pub fn palette(&self) -> &[u8] {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut [u8] {
        &mut self.palette
    }

    /// Replace the owned buffer. The previous one is dropped. Short buffers
    /// are padded with black, long ones truncated.
    pub fn set_palette(&mut self, mut palette: Vec<u8>) {
        palette.resize(PALETTE_SIZE, 0);
        self.palette = palette;
        self.mark_dirty(0, PALETTE_COLORS - 1);
    }

    /// Widen the dirty range to cover `start..=end` and flag it for push.
    pub fn mark_dirty(&mut self, start: usize, end: usize) {
        self.pal_start_index = self.pal_start_index.min(start);
        self.pal_end_index = self.pal_end_index.max(end);
        self.has_palette = true;
    }

    /// Take the dirty range, resetting it. `None` when nothing is pending.
    pub fn take_dirty(&mut self) -> Option<(usize, usize)> {
        if !self.has_palette {
            return None;
        }
        self.has_palette = false;
        let range = (self.pal_start_index, self.pal_end_index);
        self.pal_start_index = PALETTE_COLORS - 1;
        self.pal_end_index = 0;
        (range.0 <= range.1).then_some(range)
    }

    /// Advance the flip countdown by one frame; releases a pending flip
    /// when it expires.
    pub(crate) fn tick_flip(&mut self) {
        self.flip_delay -= 1;
        if self.flip_delay <= 0 {
            self.flip_wait = false;
            self.flip_delay = 0;
        }
    }

    /// Request a flip released after `delay` frames.
    pub fn request_flip(&mut self, delay: i32) {
        self.flip_wait = true;
        self.flip_delay = delay;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirty_range_widens() {
        let mut data = IntData::new();
        assert_eq!(data.take_dirty(), None);
        data.mark_dirty(10, 20);
        data.mark_dirty(5, 12);
        assert_eq!(data.take_dirty(), Some((5, 20)));
        assert_eq!(data.take_dirty(), None);
    }

    #[test]
    fn test_set_palette_replaces_and_pads() {
        let mut data = IntData::new();
        data.set_palette(vec![9; 6]);
        assert_eq!(data.palette().len(), PALETTE_SIZE);
        assert_eq!(&data.palette()[..7], &[9, 9, 9, 9, 9, 9, 0]);
        assert_eq!(data.take_dirty(), Some((0, 255)));
    }

    #[test]
    fn test_flip_released_after_delay() {
        let mut data = IntData::new();
        data.request_flip(2);
        data.tick_flip();
        assert!(data.flip_wait);
        data.tick_flip();
        assert!(!data.flip_wait);
    }
}
