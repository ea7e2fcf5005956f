//! Points and axis-aligned rectangles in `LayoutUnit` space.

use crate::LayoutUnit;
use serde::Serialize;

/// A point in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize)]
pub struct LayoutPoint {
    pub x: LayoutUnit,
    pub y: LayoutUnit,
}

impl LayoutPoint {
    #[inline]
    pub const fn new(x: LayoutUnit, y: LayoutUnit) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::new(LayoutUnit::zero(), LayoutUnit::zero())
    }

    /// Create from whole pixels.
    #[inline]
    pub const fn from_px_i32(x: i32, y: i32) -> Self {
        Self::new(LayoutUnit::from_px_i32(x), LayoutUnit::from_px_i32(y))
    }
}

/// Axis-aligned rectangle. Edges are half-open: `[x, max_x) x [y, max_y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize)]
pub struct LayoutRect {
    pub x: LayoutUnit,
    pub y: LayoutUnit,
    pub width: LayoutUnit,
    pub height: LayoutUnit,
}

impl LayoutRect {
    #[inline]
    pub const fn new(x: LayoutUnit, y: LayoutUnit, width: LayoutUnit, height: LayoutUnit) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create from whole pixels.
    #[inline]
    pub const fn from_px_i32(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(
            LayoutUnit::from_px_i32(x),
            LayoutUnit::from_px_i32(y),
            LayoutUnit::from_px_i32(width),
            LayoutUnit::from_px_i32(height),
        )
    }

    #[inline]
    pub const fn origin(&self) -> LayoutPoint {
        LayoutPoint::new(self.x, self.y)
    }

    #[inline]
    pub fn max_x(&self) -> LayoutUnit {
        self.x + self.width
    }

    #[inline]
    pub fn max_y(&self) -> LayoutUnit {
        self.y + self.height
    }

    /// True when the rectangle covers no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= LayoutUnit::zero() || self.height <= LayoutUnit::zero()
    }

    /// Half-open overlap test. Empty rectangles never intersect anything.
    pub fn intersects(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.max_x()
            && other.x < self.max_x()
            && self.y < other.max_y()
            && other.y < self.max_y()
    }

    /// Whether the vertical extent overlaps `[top, bottom)`.
    ///
    /// Zero-height rectangles overlap the band when their top lies inside it,
    /// so line breaks and collapsed runs stay reachable by band queries.
    pub fn intersects_vertical_band(&self, top: LayoutUnit, bottom: LayoutUnit) -> bool {
        if self.height <= LayoutUnit::zero() {
            return top <= self.y && self.y < bottom;
        }
        self.y < bottom && top < self.max_y()
    }

    pub fn contains_point(&self, point: LayoutPoint) -> bool {
        self.x <= point.x && point.x < self.max_x() && self.y <= point.y && point.y < self.max_y()
    }

    #[inline]
    #[must_use]
    pub fn translate(&self, offset: LayoutPoint) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Grow every edge outward by `amount`.
    #[must_use]
    pub fn inflate(&self, amount: LayoutUnit) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2,
            self.height + amount * 2,
        )
    }

    /// Smallest rectangle containing both. Empty inputs are ignored.
    #[must_use]
    pub fn unite(&self, other: &Self) -> Self {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        let right = self.max_x().max(other.max_x());
        let bottom = self.max_y().max(other.max_y());
        Self::new(left, top, right - left, bottom - top)
    }
}
