//! Sub-pixel layout coordinates using fixed-point arithmetic.
//!
//! Line geometry is accumulated run by run, so rounding every advance to whole
//! pixels would drift. We use 1/64px units stored as i32, matching Chromium's
//! `LayoutUnit` implementation.

use core::iter::Sum;
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use serde::Serialize;

/// Fixed-point coordinate in 1/64px units.
///
/// All line, run and float geometry uses this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Serialize)]
pub struct LayoutUnit(i32);

impl LayoutUnit {
    /// Number of fractional bits (6 bits = 1/64px precision)
    pub const FRACTIONAL_BITS: u32 = 6;

    /// Scale factor (2^6 = 64)
    pub const SCALE: i32 = 1 << Self::FRACTIONAL_BITS;

    /// Create from raw 1/64px units
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Create from pixels (f32)
    #[inline]
    pub fn from_px(pixels: f32) -> Self {
        Self((pixels * Self::SCALE as f32).round() as i32)
    }

    /// Create from pixels (i32)
    #[inline]
    pub const fn from_px_i32(pixels: i32) -> Self {
        Self(pixels * Self::SCALE)
    }

    /// Convert to pixels (f32)
    #[inline]
    pub const fn to_px(self) -> f32 {
        self.0 as f32 / Self::SCALE as f32
    }

    /// Convert to pixels, rounding toward negative infinity
    #[inline]
    pub const fn to_px_floor(self) -> i32 {
        self.0.div_euclid(Self::SCALE)
    }

    /// Convert to pixels, rounding toward positive infinity
    #[inline]
    pub const fn to_px_ceil(self) -> i32 {
        (self.0 + Self::SCALE - 1).div_euclid(Self::SCALE)
    }

    /// Snap down to a whole pixel, keeping the unit.
    #[inline]
    #[must_use]
    pub const fn floor(self) -> Self {
        Self::from_px_i32(self.to_px_floor())
    }

    /// Snap up to a whole pixel, keeping the unit.
    #[inline]
    #[must_use]
    pub const fn ceil(self) -> Self {
        Self::from_px_i32(self.to_px_ceil())
    }

    /// Get raw value in 1/64px units
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Zero value
    #[inline]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Clamp negative values to zero.
    #[inline]
    #[must_use]
    pub fn clamp_negative_to_zero(self) -> Self {
        self.max(Self::zero())
    }
}

// Arithmetic operations
impl Add for LayoutUnit {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for LayoutUnit {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for LayoutUnit {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for LayoutUnit {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for LayoutUnit {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<i32> for LayoutUnit {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: i32) -> Self {
        Self(self.0 * rhs)
    }
}

impl Mul<f32> for LayoutUnit {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Self((self.0 as f32 * rhs).round() as i32)
    }
}

impl Div<i32> for LayoutUnit {
    type Output = Self;

    #[inline]
    fn div(self, rhs: i32) -> Self {
        Self(self.0 / rhs)
    }
}

impl Sum for LayoutUnit {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test basic conversions between pixels and layout units.
    ///
    /// # Panics
    /// Panics if conversions do not match expected values.
    #[test]
    fn test_conversions() {
        assert!((LayoutUnit::from_px(10.0).to_px() - 10.0).abs() < 0.01);
        assert!((LayoutUnit::from_px(8.328_125).to_px() - 8.328_125).abs() < 0.01);
        assert!((LayoutUnit::from_px_i32(5).to_px() - 5.0).abs() < 0.01);
    }

    /// Test sub-pixel precision with 1/64px units.
    ///
    /// # Panics
    /// Panics if sub-pixel precision is not maintained.
    #[test]
    fn test_subpixel_precision() {
        let value = LayoutUnit::from_px(8.328_125);
        assert_eq!(value.raw(), 533); // 8.328125 * 64 = 533
        assert!((value.to_px() - 8.328_125).abs() < 0.01);
    }

    /// Floor and ceil snap to whole pixels on both sides of zero.
    ///
    /// # Panics
    /// Panics if snapping rounds in the wrong direction.
    #[test]
    fn test_floor_and_ceil() {
        assert_eq!(LayoutUnit::from_px(10.75).floor(), LayoutUnit::from_px_i32(10));
        assert_eq!(LayoutUnit::from_px(10.25).ceil(), LayoutUnit::from_px_i32(11));
        assert_eq!(LayoutUnit::from_px(-0.5).floor(), LayoutUnit::from_px_i32(-1));
        assert_eq!(LayoutUnit::from_px(-0.5).ceil(), LayoutUnit::zero());
        assert_eq!(LayoutUnit::from_px_i32(3).floor(), LayoutUnit::from_px_i32(3));
    }

    /// Summing an iterator of units matches repeated addition.
    ///
    /// # Panics
    /// Panics if the sum is wrong.
    #[test]
    fn test_sum() {
        let total: LayoutUnit = [1, 2, 3].into_iter().map(LayoutUnit::from_px_i32).sum();
        assert_eq!(total, LayoutUnit::from_px_i32(6));
    }
}
