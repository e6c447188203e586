//! Decoded resources consumed by the event manager.
//!
//! Loading from the game archives happens elsewhere; these types only hold
//! the decoded data and validate it on construction.
//!
//! - [`CMapResource`] - Fade target colors for a palette range
//! - [`PictureResource`] - Cursor bitmap
//! - [`CycleResource`] - Up to four color-cycle descriptors

use crate::error::ResourceError;
use crate::types::{CMapFlags, PALETTE_COLORS, Rgb};

fn read_u16(data: &[u8], offset: usize) -> Result<u16, ResourceError> {
    let bytes = data.get(offset..offset + 2).ok_or(ResourceError::Truncated {
        needed: offset + 2,
        got: data.len(),
    })?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u8(data: &[u8], offset: usize) -> Result<u8, ResourceError> {
    data.get(offset).copied().ok_or(ResourceError::Truncated {
        needed: offset + 1,
        got: data.len(),
    })
}

fn check_range(start: usize, end: usize) -> Result<(), ResourceError> {
    if start > end || end >= PALETTE_COLORS {
        return Err(ResourceError::InvalidRange { start, end });
    }
    Ok(())
}

// =============================================================================
// Color map
// =============================================================================

/// Fade target for palette entries `start..=end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CMapResource {
    pub start: usize,
    pub end: usize,
    /// Number of interpolation steps; 0 applies the colors at once.
    pub steps: u16,
    pub flags: CMapFlags,
    /// RGB triplets, one per index (or a single one with `UNIFORM`).
    pub entries: Vec<u8>,
}

impl CMapResource {
    pub fn new(
        start: usize,
        end: usize,
        steps: u16,
        flags: CMapFlags,
        entries: Vec<u8>,
    ) -> Result<Self, ResourceError> {
        let map = Self {
            start,
            end,
            steps,
            flags,
            entries,
        };
        map.validate()?;
        Ok(map)
    }

    /// Decode `steps:u8 flags:u8 start:u16le end:u16le rgb...`.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ResourceError> {
        let steps = read_u8(data, 0)? as u16;
        let flags = CMapFlags::from_bits_truncate(read_u8(data, 1)?);
        let start = read_u16(data, 2)? as usize;
        let end = read_u16(data, 4)? as usize;
        check_range(start, end)?;

        let count = if flags.contains(CMapFlags::UNIFORM) {
            1
        } else {
            end - start + 1
        };
        let needed = 6 + count * 3;
        if data.len() < needed {
            return Err(ResourceError::Truncated {
                needed,
                got: data.len(),
            });
        }
        Self::new(start, end, steps, flags, data[6..needed].to_vec())
    }

    pub fn validate(&self) -> Result<(), ResourceError> {
        check_range(self.start, self.end)?;
        let needed = self.color_count();
        let got = self.entries.len() / 3;
        if got < needed {
            return Err(ResourceError::MissingColors { needed, got });
        }
        Ok(())
    }

    fn color_count(&self) -> usize {
        if self.flags.contains(CMapFlags::UNIFORM) {
            1
        } else {
            self.end - self.start + 1
        }
    }

    /// Target color for palette `index`.
    pub fn target(&self, index: usize) -> Rgb {
        let slot = if self.flags.contains(CMapFlags::UNIFORM) {
            0
        } else {
            index - self.start
        };
        Rgb::read(&self.entries, slot)
    }
}

// =============================================================================
// Picture
// =============================================================================

/// 8-bit indexed bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureResource {
    pub width: u16,
    pub height: u16,
    pub pixels: Vec<u8>,
}

impl PictureResource {
    pub fn new(width: u16, height: u16, pixels: Vec<u8>) -> Result<Self, ResourceError> {
        let needed = width as usize * height as usize;
        if pixels.len() != needed || needed == 0 {
            return Err(ResourceError::BitmapSize {
                width,
                height,
                needed,
                got: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }
}

// =============================================================================
// Color cycling
// =============================================================================

pub const CYCLE_SLOTS: usize = 4;

/// Direction of a palette rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDirection {
    /// First entry moves to the end of the range.
    Forward,
    /// Last entry moves to the start of the range.
    Backward,
}

/// One explicit palette write of a sequence cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleStep {
    pub index: usize,
    /// Ticks until the next step. Zero chains the next step into this one.
    pub delay: u8,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleSlot {
    Rotate {
        start: usize,
        end: usize,
        rate: u8,
        direction: CycleDirection,
    },
    Sequence(Vec<CycleStep>),
}

impl CycleSlot {
    /// Number of positions before the slot wraps around.
    pub fn len(&self) -> usize {
        match self {
            Self::Rotate { start, end, .. } => end - start + 1,
            Self::Sequence(steps) => steps.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Descriptors for the four cycle slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleResource {
    pub slots: [Option<CycleSlot>; CYCLE_SLOTS],
}

impl CycleResource {
    pub fn new(slots: [Option<CycleSlot>; CYCLE_SLOTS]) -> Result<Self, ResourceError> {
        let resource = Self { slots };
        resource.validate()?;
        Ok(resource)
    }

    /// Check every slot's palette range and that sequences are non-empty.
    pub fn validate(&self) -> Result<(), ResourceError> {
        for (idx, slot) in self.slots.iter().enumerate() {
            match slot {
                Some(CycleSlot::Rotate { start, end, .. }) => check_range(*start, *end)?,
                Some(CycleSlot::Sequence(steps)) => {
                    if steps.is_empty() {
                        return Err(ResourceError::EmptySequence(idx));
                    }
                    for step in steps {
                        check_range(step.index, step.index)?;
                    }
                }
                None => {}
            }
        }
        Ok(())
    }

    /// Decode four slots, each `type:u8` followed by its body:
    ///
    /// - type 0: unused slot
    /// - type 1: `start:u16le end:u16le rate:u8 direction:u8` (direction 1 = forward)
    /// - type 2: `count:u16le` then `index:u16le delay:u8 r g b` per step
    pub fn from_bytes(data: &[u8]) -> Result<Self, ResourceError> {
        let mut slots: [Option<CycleSlot>; CYCLE_SLOTS] = Default::default();
        let mut pos = 0;

        for (idx, slot) in slots.iter_mut().enumerate() {
            let kind = read_u8(data, pos)?;
            pos += 1;
            *slot = match kind {
                0 => None,
                1 => {
                    let start = read_u16(data, pos)? as usize;
                    let end = read_u16(data, pos + 2)? as usize;
                    let rate = read_u8(data, pos + 4)?;
                    let direction = if read_u8(data, pos + 5)? == 1 {
                        CycleDirection::Forward
                    } else {
                        CycleDirection::Backward
                    };
                    pos += 6;
                    Some(CycleSlot::Rotate {
                        start,
                        end,
                        rate,
                        direction,
                    })
                }
                2 => {
                    let count = read_u16(data, pos)? as usize;
                    pos += 2;
                    let mut steps = Vec::with_capacity(count);
                    for _ in 0..count {
                        steps.push(CycleStep {
                            index: read_u16(data, pos)? as usize,
                            delay: read_u8(data, pos + 2)?,
                            color: Rgb::new(
                                read_u8(data, pos + 3)?,
                                read_u8(data, pos + 4)?,
                                read_u8(data, pos + 5)?,
                            ),
                        });
                        pos += 6;
                    }
                    Some(CycleSlot::Sequence(steps))
                }
                other => return Err(ResourceError::UnknownCycleType(other, idx)),
            };
        }

        Self::new(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmap_from_bytes() {
        let data = [4, 0, 10, 0, 11, 0, 1, 2, 3, 4, 5, 6];
        let map = CMapResource::from_bytes(&data).unwrap();
        assert_eq!((map.start, map.end, map.steps), (10, 11, 4));
        assert_eq!(map.target(10), Rgb::new(1, 2, 3));
        assert_eq!(map.target(11), Rgb::new(4, 5, 6));
    }

    #[test]
    fn test_cmap_uniform_uses_one_color() {
        let data = [0, 1, 0, 0, 99, 0, 7, 8, 9];
        let map = CMapResource::from_bytes(&data).unwrap();
        assert_eq!(map.target(0), Rgb::new(7, 8, 9));
        assert_eq!(map.target(99), Rgb::new(7, 8, 9));
    }

    #[test]
    fn test_cmap_truncated() {
        let data = [4, 0, 0, 0, 3, 0, 1, 2, 3];
        assert_eq!(
            CMapResource::from_bytes(&data),
            Err(ResourceError::Truncated { needed: 18, got: 9 })
        );
    }

    #[test]
    fn test_cmap_rejects_bad_range() {
        let err = CMapResource::new(20, 10, 1, CMapFlags::empty(), vec![0; 3]).unwrap_err();
        assert_eq!(err, ResourceError::InvalidRange { start: 20, end: 10 });

        let err = CMapResource::new(0, 256, 1, CMapFlags::empty(), vec![0; 771]).unwrap_err();
        assert_eq!(err, ResourceError::InvalidRange { start: 0, end: 256 });
    }

    #[test]
    fn test_cmap_missing_colors() {
        let err = CMapResource::new(0, 3, 1, CMapFlags::empty(), vec![0; 6]).unwrap_err();
        assert_eq!(err, ResourceError::MissingColors { needed: 4, got: 2 });
    }

    #[test]
    fn test_picture_size_checked() {
        assert!(PictureResource::new(2, 2, vec![0; 4]).is_ok());
        assert!(matches!(
            PictureResource::new(2, 2, vec![0; 3]),
            Err(ResourceError::BitmapSize { needed: 4, got: 3, .. })
        ));
    }

    #[test]
    fn test_cycle_from_bytes() {
        let data = [
            1, 16, 0, 31, 0, 2, 1, // slot 0: rotate 16..=31 every 2 ticks forward
            0, // slot 1: unused
            2, 2, 0, 5, 0, 3, 10, 20, 30, 6, 0, 0, 40, 50, 60, // slot 2: two steps
            0, // slot 3: unused
        ];
        let cycles = CycleResource::from_bytes(&data).unwrap();
        assert_eq!(
            cycles.slots[0],
            Some(CycleSlot::Rotate {
                start: 16,
                end: 31,
                rate: 2,
                direction: CycleDirection::Forward
            })
        );
        assert!(cycles.slots[1].is_none());
        match &cycles.slots[2] {
            Some(CycleSlot::Sequence(steps)) => {
                assert_eq!(steps.len(), 2);
                assert_eq!(steps[1].index, 6);
                assert_eq!(steps[1].color, Rgb::new(40, 50, 60));
            }
            other => panic!("unexpected slot {:?}", other),
        }
        assert_eq!(cycles.slots[0].as_ref().map(CycleSlot::len), Some(16));
    }

    #[test]
    fn test_cycle_unknown_type() {
        let data = [0, 7];
        assert_eq!(
            CycleResource::from_bytes(&data),
            Err(ResourceError::UnknownCycleType(7, 1))
        );
    }

    #[test]
    fn test_cycle_empty_sequence() {
        let data = [2, 0, 0, 0, 0, 0];
        assert_eq!(
            CycleResource::from_bytes(&data),
            Err(ResourceError::EmptySequence(0))
        );
    }
}
