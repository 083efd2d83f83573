//! Q12.4 fixed-point geometry for galvo coordinates.
//!
//! A point is a pair of signed 16-bit scalars with 12 integer and 4
//! fractional bits (scale factor 16, range -2048.0 to +2047.9375). Waypoint
//! coordinates are 8-bit and lift into this format with a left shift of 4;
//! the output stage truncates the fractional bits away again, so they exist
//! purely to keep accumulated interpolation steps honest.

use core::ops::{Add, AddAssign, Shl, ShlAssign, Shr, ShrAssign, Sub, SubAssign};

/// Fractional bits in the Q12.4 format.
pub const FRACT_BITS: u32 = 4;

/// Q12.4 scale factor (2^4).
pub const SCALE: i16 = 1 << FRACT_BITS;

/// Largest 8-bit coordinate lifted into Q12.4 (255.0).
pub const COORD8_MAX_Q: i16 = (u8::MAX as i16) << FRACT_BITS;

/// A 2D point in Q12.4 signed fixed-point.
///
/// Addition and subtraction wrap on overflow; inputs are bounded by the
/// 8-bit waypoint domain, which lifts well inside the representable range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedPoint {
    pub x: i16,
    pub y: i16,
}

impl FixedPoint {
    pub const ZERO: Self = Self::new(0, 0);

    /// Construct from raw Q12.4 component values.
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Lift integer coordinates into Q12.4.
    pub const fn from_int(x: i16, y: i16) -> Self {
        Self {
            x: x << FRACT_BITS,
            y: y << FRACT_BITS,
        }
    }

    /// Lift 8-bit waypoint coordinates into Q12.4.
    pub const fn from_coord8(x: u8, y: u8) -> Self {
        Self::from_int(x as i16, y as i16)
    }

    /// Truncate to integer coordinates, discarding the fractional bits.
    pub const fn to_int(self) -> (i16, i16) {
        (self.x >> FRACT_BITS, self.y >> FRACT_BITS)
    }

    /// Chebyshev (L-infinity) distance to `other`: the controlling axis for
    /// interpolation is whichever has the larger magnitude of travel.
    pub fn chebyshev(self, other: Self) -> u16 {
        let dx = (self.x as i32 - other.x as i32).unsigned_abs();
        let dy = (self.y as i32 - other.y as i32).unsigned_abs();
        dx.max(dy) as u16
    }

    /// Divide both components by a sub-step count, widening to 32 bits so a
    /// large delta cannot overflow mid-division.
    pub fn div_steps(self, steps: u8) -> Self {
        debug_assert!(steps >= 1);
        let n = steps.max(1) as i32;
        Self {
            x: (self.x as i32 / n) as i16,
            y: (self.y as i32 / n) as i16,
        }
    }

    /// Component-wise `<` on both axes. Diagnostic only.
    pub fn lt_all(self, other: Self) -> bool {
        self.x < other.x && self.y < other.y
    }

    /// Component-wise `<=` on both axes. Diagnostic only.
    pub fn le_all(self, other: Self) -> bool {
        self.x <= other.x && self.y <= other.y
    }

    /// Component-wise `>` on both axes. Diagnostic only.
    pub fn gt_all(self, other: Self) -> bool {
        self.x > other.x && self.y > other.y
    }

    /// Component-wise `>=` on both axes. Diagnostic only.
    pub fn ge_all(self, other: Self) -> bool {
        self.x >= other.x && self.y >= other.y
    }
}

impl Add for FixedPoint {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x.wrapping_add(rhs.x), self.y.wrapping_add(rhs.y))
    }
}

impl AddAssign for FixedPoint {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for FixedPoint {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x.wrapping_sub(rhs.x), self.y.wrapping_sub(rhs.y))
    }
}

impl SubAssign for FixedPoint {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Shr<u32> for FixedPoint {
    type Output = Self;

    /// Arithmetic right shift of both components.
    fn shr(self, rhs: u32) -> Self {
        Self::new(self.x >> rhs, self.y >> rhs)
    }
}

impl ShrAssign<u32> for FixedPoint {
    fn shr_assign(&mut self, rhs: u32) {
        *self = *self >> rhs;
    }
}

impl Shl<u32> for FixedPoint {
    type Output = Self;

    fn shl(self, rhs: u32) -> Self {
        Self::new(self.x << rhs, self.y << rhs)
    }
}

impl ShlAssign<u32> for FixedPoint {
    fn shl_assign(&mut self, rhs: u32) {
        *self = *self << rhs;
    }
}
