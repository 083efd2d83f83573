//! Q12.4 format and arithmetic tests.

use pico_galvo_core::math::fixed::{FixedPoint, COORD8_MAX_Q, SCALE};

#[test]
fn coord8_lifts_by_scale() {
    let p = FixedPoint::from_coord8(0, 255);
    assert_eq!(p.x, 0);
    assert_eq!(p.y, 255 * SCALE);
    assert_eq!(p.y, COORD8_MAX_Q);
}

#[test]
fn int_roundtrip_truncates_fraction() {
    let p = FixedPoint::from_int(100, -3);
    assert_eq!(p.to_int(), (100, -3));

    // 0x64F has fractional bits set; truncation keeps the integer part.
    let q = FixedPoint::new(0x64F, 0x641);
    assert_eq!(q.to_int(), (0x64, 0x64));
}

#[test]
fn add_sub_are_componentwise() {
    let a = FixedPoint::new(0x100, 0x40);
    let b = FixedPoint::new(0x20, 0x10);
    assert_eq!(a + b, FixedPoint::new(0x120, 0x50));
    assert_eq!(a - b, FixedPoint::new(0xE0, 0x30));

    let mut c = a;
    c += b;
    c -= b;
    assert_eq!(c, a);
}

#[test]
fn shifts_are_componentwise_and_arithmetic() {
    let p = FixedPoint::new(0x100, -0x100);
    assert_eq!(p >> 2, FixedPoint::new(0x40, -0x40));
    assert_eq!(p << 1, FixedPoint::new(0x200, -0x200));

    let mut q = p;
    q >>= 4;
    assert_eq!(q, FixedPoint::new(0x10, -0x10));
}

#[test]
fn chebyshev_takes_the_dominant_axis() {
    let a = FixedPoint::new(0, 0);
    assert_eq!(a.chebyshev(FixedPoint::new(0x100, 0x40)), 0x100);
    assert_eq!(a.chebyshev(FixedPoint::new(-0x100, 0x40)), 0x100);
    assert_eq!(a.chebyshev(FixedPoint::new(0x10, -0x200)), 0x200);
    assert_eq!(a.chebyshev(a), 0);
}

#[test]
fn div_steps_uses_truncating_division() {
    let delta = FixedPoint::new(0x100, -0x100);
    assert_eq!(delta.div_steps(4), FixedPoint::new(0x40, -0x40));

    // 0xA0 / 3 truncates toward zero on both signs.
    let odd = FixedPoint::new(0xA0, -0xA0);
    assert_eq!(odd.div_steps(3), FixedPoint::new(0x35, -0x35));
}

#[test]
fn componentwise_comparisons_require_both_axes() {
    let a = FixedPoint::new(1, 1);
    let b = FixedPoint::new(2, 2);
    let mixed = FixedPoint::new(0, 3);

    assert!(a.lt_all(b));
    assert!(b.gt_all(a));
    assert!(a.le_all(a));
    assert!(a.ge_all(a));

    // One axis ahead, one behind: no ordering holds.
    assert!(!a.lt_all(mixed));
    assert!(!a.gt_all(mixed));
}

#[test]
fn wrapping_addition_does_not_panic() {
    let a = FixedPoint::new(i16::MAX, i16::MIN);
    let b = FixedPoint::new(1, -1);
    let sum = a + b;
    assert_eq!(sum, FixedPoint::new(i16::MIN, i16::MAX));
}
