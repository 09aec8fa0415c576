//! Fixed-capacity pipe arena.
//!
//! Eight slots plus an occupancy mask. Bit `i` of the mask is set exactly
//! when slot `i` holds a pipe; every operation keeps the two in step.

use crate::config::MAX_PIPES;

/// A vertical pipe with a passable gap between `gap_top` and `gap_bottom`.
///
/// Everything above `gap_top` and below `gap_bottom` is solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pipe {
    pub position_x: i32,
    pub gap_top: i32,
    pub gap_bottom: i32,
}

#[derive(Debug, Default)]
pub struct PipePool {
    slots: [Option<Pipe>; MAX_PIPES],
    mask: u8,
}

impl PipePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a pipe in the lowest free slot and returns its index.
    ///
    /// A full pool drops the pipe and returns `None`.
    pub fn spawn(&mut self, position_x: i32, gap_top: i32, gap_bottom: i32) -> Option<usize> {
        let slot = (0..MAX_PIPES).find(|&i| self.mask & (1 << i) == 0)?;
        self.slots[slot] = Some(Pipe {
            position_x,
            gap_top,
            gap_bottom,
        });
        self.mask |= 1 << slot;
        self.check();
        Some(slot)
    }

    pub fn scroll(&mut self, distance: i32) {
        for pipe in self.slots.iter_mut().flatten() {
            pipe.position_x -= distance;
        }
    }

    /// Frees every pipe at or past the left edge. Returns how many went.
    pub fn retire(&mut self) -> usize {
        let mut retired = 0;
        for i in 0..MAX_PIPES {
            if self.mask & (1 << i) == 0 {
                continue;
            }
            if matches!(self.slots[i], Some(p) if p.position_x > 0) {
                continue;
            }
            self.slots[i] = None;
            self.mask &= !(1 << i);
            retired += 1;
        }
        self.check();
        retired
    }

    /// Live pipes in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Pipe> {
        self.slots.iter().flatten()
    }

    pub fn mask(&self) -> u8 {
        self.mask
    }

    pub fn len(&self) -> usize {
        self.mask.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == MAX_PIPES
    }

    fn check(&self) {
        debug_assert!(
            self.slots
                .iter()
                .enumerate()
                .all(|(i, s)| s.is_some() == (self.mask & (1 << i) != 0)),
            "occupancy mask {:08b} out of step with slots",
            self.mask
        );
    }
}
