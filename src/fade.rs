//! Fade Engine - Palette interpolation, brightness levels, flash
//!
//! A [`Fade`] interpolates a palette range toward a color map in 16.8 fixed
//! point, one step per fire of the fade node. [`FadeLevels`] ramps two
//! brightness levels used by the video layer. [`Flash`] toggles a single
//! palette entry for signaling.

use crate::data::DataSlot;
use crate::resources::CMapResource;
use crate::types::Rgb;

/// Upper bound of a brightness level (6-bit VGA DAC).
pub const MAX_FADE_LEVEL: i32 = 63;

// =============================================================================
// Palette fade
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadeState {
    #[default]
    Idle,
    FadingIn,
    FadingOut,
    Complete,
}

impl FadeState {
    pub fn is_active(self) -> bool {
        matches!(self, Self::FadingIn | Self::FadingOut)
    }
}

/// Interpolation state of one palette index.
#[derive(Debug, Clone, Copy)]
struct FadeEntry {
    index: usize,
    value: [i32; 3],
    change: [i32; 3],
    target: Rgb,
}

impl FadeEntry {
    fn new(index: usize, from: Rgb, to: Rgb, steps: i32) -> Self {
        let value = [(from.r as i32) << 8, (from.g as i32) << 8, (from.b as i32) << 8];
        let goal = [(to.r as i32) << 8, (to.g as i32) << 8, (to.b as i32) << 8];
        let change = [
            (goal[0] - value[0]) / steps,
            (goal[1] - value[1]) / steps,
            (goal[2] - value[2]) / steps,
        ];
        Self {
            index,
            value,
            change,
            target: to,
        }
    }

    fn advance(&mut self) -> Rgb {
        for (value, change) in self.value.iter_mut().zip(self.change) {
            *value += change;
        }
        let [r, g, b] = self.value.map(|v| (v >> 8).clamp(0, 255) as u8);
        Rgb::new(r, g, b)
    }
}

#[derive(Debug, Default)]
pub struct Fade {
    state: FadeState,
    first_col: usize,
    last_col: usize,
    count: u16,
    entries: Vec<FadeEntry>,
}

impl Fade {
    pub fn state(&self) -> FadeState {
        self.state
    }

    /// Steps left before the fade completes.
    pub fn remaining(&self) -> u16 {
        self.count
    }

    /// Inclusive palette range of the current or last fade.
    pub fn range(&self) -> (usize, usize) {
        (self.first_col, self.last_col)
    }

    /// Prepare a stepped fade from `palette` toward `map`. `map.steps` must
    /// be non-zero.
    pub(crate) fn begin(&mut self, map: &CMapResource, palette: &[u8]) {
        let steps = map.steps.max(1);
        self.first_col = map.start;
        self.last_col = map.end;
        self.count = steps;

        let mut from_total = 0;
        let mut to_total = 0;
        self.entries = (map.start..=map.end)
            .map(|index| {
                let from = Rgb::read(palette, index);
                let to = map.target(index);
                from_total += from.brightness();
                to_total += to.brightness();
                FadeEntry::new(index, from, to, steps as i32)
            })
            .collect();

        self.state = if to_total > from_total {
            FadeState::FadingIn
        } else {
            FadeState::FadingOut
        };
    }

    /// Write `map` straight into `palette` with no steps.
    pub(crate) fn apply_now(&mut self, map: &CMapResource, palette: &mut [u8]) {
        self.first_col = map.start;
        self.last_col = map.end;
        self.count = 0;
        self.entries.clear();
        for index in map.start..=map.end {
            map.target(index).write(palette, index);
        }
        self.state = FadeState::Complete;
    }

    /// Advance one step into `palette`. Returns true when colors were
    /// written. The last step lands exactly on the target colors.
    pub(crate) fn step(&mut self, palette: &mut [u8]) -> bool {
        if self.count == 0 {
            return false;
        }
        self.count -= 1;
        let last = self.count == 0;
        for entry in &mut self.entries {
            let color = entry.advance();
            let color = if last { entry.target } else { color };
            color.write(palette, entry.index);
        }
        if last {
            self.state = FadeState::Complete;
            self.entries.clear();
        }
        true
    }
}

// =============================================================================
// Brightness levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelDirection {
    #[default]
    None,
    Up,
    Down,
}

/// Two brightness levels ramped every tick by the `fade2` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FadeLevels {
    pub direction: LevelDirection,
    pub amount1: i32,
    pub amount2: i32,
    pub step1: i32,
    pub step2: i32,
}

impl FadeLevels {
    pub fn step(&mut self) {
        match self.direction {
            LevelDirection::Up => {
                self.amount1 = (self.amount1 + self.step1).min(MAX_FADE_LEVEL);
                self.amount2 = (self.amount2 + self.step2).min(MAX_FADE_LEVEL);
                if self.amount1 == MAX_FADE_LEVEL && self.amount2 == MAX_FADE_LEVEL {
                    self.direction = LevelDirection::None;
                }
            }
            LevelDirection::Down => {
                self.amount1 = (self.amount1 - self.step1).max(0);
                self.amount2 = (self.amount2 - self.step2).max(0);
                if self.amount1 == 0 && self.amount2 == 0 {
                    self.direction = LevelDirection::None;
                }
            }
            LevelDirection::None => {}
        }
    }
}

// =============================================================================
// Flash
// =============================================================================

/// A palette entry alternating between its own color and a flash color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flash {
    /// Context whose palette the flash writes.
    pub slot: DataSlot,
    pub index: usize,
    pub color: Rgb,
    pub saved: Rgb,
    pub lit: bool,
}

impl Flash {
    /// Flip the entry and return the color now shown.
    pub(crate) fn toggle(&mut self) -> Rgb {
        self.lit = !self.lit;
        if self.lit { self.color } else { self.saved }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CMapFlags, PALETTE_SIZE};

    fn map(start: usize, end: usize, steps: u16, color: Rgb) -> CMapResource {
        let entries = [color.r, color.g, color.b];
        CMapResource::new(start, end, steps, CMapFlags::UNIFORM, entries.to_vec()).unwrap()
    }

    #[test]
    fn test_fade_completes_after_steps() {
        let mut palette = vec![0u8; PALETTE_SIZE];
        let mut fade = Fade::default();
        fade.begin(&map(0, 1, 4, Rgb::new(63, 30, 10)), &palette);
        assert_eq!(fade.state(), FadeState::FadingIn);

        for _ in 0..3 {
            assert!(fade.step(&mut palette));
            assert!(fade.state().is_active());
        }
        assert!(fade.step(&mut palette));
        assert_eq!(fade.state(), FadeState::Complete);
        assert_eq!(Rgb::read(&palette, 0), Rgb::new(63, 30, 10));
        assert_eq!(Rgb::read(&palette, 1), Rgb::new(63, 30, 10));

        let before = palette.clone();
        assert!(!fade.step(&mut palette));
        assert_eq!(palette, before);
    }

    #[test]
    fn test_fade_intermediate_values() {
        let mut palette = vec![0u8; PALETTE_SIZE];
        let mut fade = Fade::default();
        fade.begin(&map(5, 5, 2, Rgb::new(40, 40, 40)), &palette);
        fade.step(&mut palette);
        assert_eq!(Rgb::read(&palette, 5), Rgb::new(20, 20, 20));
    }

    #[test]
    fn test_fade_out_direction() {
        let mut palette = vec![0u8; PALETTE_SIZE];
        Rgb::new(60, 60, 60).write(&mut palette, 3);
        let mut fade = Fade::default();
        fade.begin(&map(3, 3, 3, Rgb::new(0, 0, 0)), &palette);
        assert_eq!(fade.state(), FadeState::FadingOut);
        assert_eq!(fade.remaining(), 3);
    }

    #[test]
    fn test_apply_now() {
        let mut palette = vec![0u8; PALETTE_SIZE];
        let mut fade = Fade::default();
        fade.apply_now(&map(7, 8, 0, Rgb::new(1, 2, 3)), &mut palette);
        assert_eq!(fade.state(), FadeState::Complete);
        assert_eq!(Rgb::read(&palette, 8), Rgb::new(1, 2, 3));
        assert_eq!(fade.remaining(), 0);
    }

    #[test]
    fn test_levels_ramp_up_then_stop() {
        let mut levels = FadeLevels {
            direction: LevelDirection::Up,
            amount1: 50,
            amount2: 0,
            step1: 10,
            step2: 32,
        };
        levels.step();
        assert_eq!((levels.amount1, levels.amount2), (60, 32));
        levels.step();
        assert_eq!((levels.amount1, levels.amount2), (63, 63));
        assert_eq!(levels.direction, LevelDirection::None);
    }

    #[test]
    fn test_levels_ramp_down() {
        let mut levels = FadeLevels {
            direction: LevelDirection::Down,
            amount1: 5,
            amount2: 7,
            step1: 4,
            step2: 4,
        };
        levels.step();
        levels.step();
        assert_eq!((levels.amount1, levels.amount2), (0, 0));
        assert_eq!(levels.direction, LevelDirection::None);
    }
}
