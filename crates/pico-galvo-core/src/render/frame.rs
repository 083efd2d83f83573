//! Double-buffered waypoint storage.
//!
//! Two fixed-capacity frame buffers; at any instant one is *active* (walked
//! by the renderer) and the other *inactive* (writable by the command layer).
//! Swapping flips an index — the tick context never sees either buffer, so no
//! critical section is needed around the flip.

use crate::math::fixed::FixedPoint;

/// Waypoints per frame buffer.
pub const FRAME_CAPACITY: usize = 256;

/// ILDA IDTF blanking bit: set means the laser is off for this waypoint.
pub const BLANKING_BIT: u8 = 0x40;

/// ILDA IDTF last-point marker. Carried but not interpreted by the renderer.
pub const LAST_POINT_BIT: u8 = 0x80;

/// A user-supplied source point: 8-bit coordinates plus ILDA-style flags.
/// Flag bits 0-5 are reserved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Waypoint {
    pub x: u8,
    pub y: u8,
    pub flags: u8,
}

impl Waypoint {
    pub const fn new(x: u8, y: u8, flags: u8) -> Self {
        Self { x, y, flags }
    }

    /// Laser state for this waypoint (blanking bit clear = beam on).
    pub fn laser_on(self) -> bool {
        self.flags & BLANKING_BIT == 0
    }

    pub fn is_last(self) -> bool {
        self.flags & LAST_POINT_BIT != 0
    }

    /// Lift the coordinates into Q12.4.
    pub fn to_fixed(self) -> FixedPoint {
        FixedPoint::from_coord8(self.x, self.y)
    }
}

/// Rejected frame-buffer write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameError {
    /// Waypoint index at or beyond `FRAME_CAPACITY`.
    IndexOutOfRange,
    /// Point count beyond `FRAME_CAPACITY`.
    CountOutOfRange,
}

/// One waypoint frame: an ordered sequence of up to `FRAME_CAPACITY` points.
///
/// `point_count` bounds the rendered range; slots beyond it may hold stale
/// data. Out-of-range writes are rejected without touching the buffer.
pub struct FrameBuffer {
    points: [Waypoint; FRAME_CAPACITY],
    count: usize,
}

impl FrameBuffer {
    pub const fn new() -> Self {
        Self {
            points: [Waypoint::new(0, 0, 0); FRAME_CAPACITY],
            count: 0,
        }
    }

    pub fn clear(&mut self) {
        self.points = [Waypoint::new(0, 0, 0); FRAME_CAPACITY];
        self.count = 0;
    }

    pub fn set_point(&mut self, index: usize, point: Waypoint) -> Result<(), FrameError> {
        if index >= FRAME_CAPACITY {
            return Err(FrameError::IndexOutOfRange);
        }
        self.points[index] = point;
        Ok(())
    }

    /// Read a waypoint. `None` for indices at or beyond the point count;
    /// callers are expected to bound-check against `point_count` first.
    pub fn point(&self, index: usize) -> Option<Waypoint> {
        if index >= self.count {
            return None;
        }
        Some(self.points[index])
    }

    pub fn set_point_count(&mut self, count: usize) -> Result<(), FrameError> {
        if count > FRAME_CAPACITY {
            return Err(FrameError::CountOutOfRange);
        }
        self.count = count;
        Ok(())
    }

    pub fn point_count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Which of the two frame buffers an operation addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameSelect {
    Active,
    Inactive,
}

/// The active/inactive frame buffer pair, selected by index.
pub struct FramePair {
    frames: [FrameBuffer; 2],
    active: usize,
}

impl FramePair {
    pub const fn new() -> Self {
        Self {
            frames: [FrameBuffer::new(), FrameBuffer::new()],
            active: 0,
        }
    }

    pub fn active(&self) -> &FrameBuffer {
        &self.frames[self.active]
    }

    pub fn inactive(&self) -> &FrameBuffer {
        &self.frames[self.active ^ 1]
    }

    pub fn inactive_mut(&mut self) -> &mut FrameBuffer {
        &mut self.frames[self.active ^ 1]
    }

    pub fn buffer(&self, which: FrameSelect) -> &FrameBuffer {
        match which {
            FrameSelect::Active => self.active(),
            FrameSelect::Inactive => self.inactive(),
        }
    }

    pub fn buffer_mut(&mut self, which: FrameSelect) -> &mut FrameBuffer {
        let index = match which {
            FrameSelect::Active => self.active,
            FrameSelect::Inactive => self.active ^ 1,
        };
        &mut self.frames[index]
    }

    /// Exchange the active and inactive designations.
    pub fn swap(&mut self) {
        self.active ^= 1;
    }
}

impl Default for FramePair {
    fn default() -> Self {
        Self::new()
    }
}
