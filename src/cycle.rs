//! Color Cycling - Four independent palette animation slots
//!
//! All slots share one [`CycleResource`]. Each keeps its own countdown and
//! position; the global [`CycleStatus::ENABLED`] gate stops every slot.

use crate::resources::{CYCLE_SLOTS, CycleDirection, CycleResource, CycleSlot};
use crate::types::CycleStatus;

#[derive(Debug, Default)]
pub struct ColorCycle {
    pub status: CycleStatus,
    resource: Option<CycleResource>,
    time: [i32; CYCLE_SLOTS],
    next: [usize; CYCLE_SLOTS],
}

impl ColorCycle {
    /// Install a resource and restart every slot. Slots fire on the next tick.
    pub fn load(&mut self, resource: CycleResource) {
        self.resource = Some(resource);
        self.time = [0; CYCLE_SLOTS];
        self.next = [0; CYCLE_SLOTS];
    }

    pub fn unload(&mut self) -> Option<CycleResource> {
        self.status.remove(CycleStatus::ENABLED);
        self.resource.take()
    }

    pub fn resource(&self) -> Option<&CycleResource> {
        self.resource.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.status.contains(CycleStatus::ENABLED)
    }

    /// Countdown of a slot.
    pub fn time(&self, slot: usize) -> i32 {
        self.time[slot]
    }

    /// Position of a slot within its range or sequence.
    pub fn position(&self, slot: usize) -> usize {
        self.next[slot]
    }

    /// Run one tick. Returns the palette range that changed, if any.
    pub(crate) fn step(&mut self, palette: &mut [u8]) -> Option<(usize, usize)> {
        if !self.is_enabled() {
            return None;
        }
        let resource = self.resource.as_ref()?;
        let mut dirty: Option<(usize, usize)> = None;
        let mut touch = |start: usize, end: usize| {
            dirty = Some(match dirty {
                Some((lo, hi)) => (lo.min(start), hi.max(end)),
                None => (start, end),
            });
        };

        for idx in (0..CYCLE_SLOTS).rev() {
            let Some(slot) = &resource.slots[idx] else {
                continue;
            };
            self.time[idx] -= 1;
            if self.time[idx] > 0 {
                continue;
            }

            match slot {
                CycleSlot::Rotate {
                    start,
                    end,
                    rate,
                    direction,
                } => {
                    let range = &mut palette[start * 3..(end + 1) * 3];
                    match direction {
                        CycleDirection::Forward => range.rotate_left(3),
                        CycleDirection::Backward => range.rotate_right(3),
                    }
                    self.next[idx] = (self.next[idx] + 1) % slot.len();
                    self.time[idx] = *rate as i32;
                    touch(*start, *end);
                }
                CycleSlot::Sequence(steps) => {
                    let first = self.next[idx];
                    loop {
                        let step = steps[self.next[idx]];
                        step.color.write(palette, step.index);
                        touch(step.index, step.index);
                        self.next[idx] = (self.next[idx] + 1) % steps.len();
                        if step.delay != 0 {
                            self.time[idx] = step.delay as i32;
                            break;
                        }
                        if self.next[idx] == first {
                            // Every step chains; apply them once per tick.
                            self.time[idx] = 1;
                            break;
                        }
                    }
                }
            }
        }

        dirty
    }
}
