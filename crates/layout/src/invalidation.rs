//! Dirty tracking between layout passes.

use core::ops::BitOr;
use serde::Serialize;

/// Kinds of dirtiness that can affect inline layout and paint.
/// Multiple flags can be combined.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DirtyKind(u32);

impl DirtyKind {
    /// No dirtiness.
    pub const NONE: Self = Self(0);
    /// Structural changes: insertion/removal of inline boxes.
    pub const STRUCTURE: Self = Self(1 << 0);
    /// Style changes affecting measurement or line geometry.
    pub const STYLE: Self = Self(1 << 1);
    /// Text content changes.
    pub const TEXT: Self = Self(1 << 2);
    /// Constraint or float changes: same items, different lines.
    pub const GEOMETRY: Self = Self(1 << 3);
    /// Paint-only changes: color/decoration changes that do not affect layout.
    pub const PAINT: Self = Self(1 << 4);

    /// Changes that invalidate the measured inline items.
    pub const CONTENT: Self = Self(Self::STRUCTURE.0 | Self::STYLE.0 | Self::TEXT.0);

    /// Combine two dirty kinds.
    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check if all flags in `other` are present.
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any flag in `other` is present.
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for DirtyKind {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

/// What changed since the previous layout pass, as told by the host.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct InvalidationState {
    pub dirty: DirtyKind,
}

impl InvalidationState {
    pub const fn new(dirty: DirtyKind) -> Self {
        Self { dirty }
    }

    /// Everything changed; rebuild from scratch.
    pub const fn full() -> Self {
        Self::new(DirtyKind::CONTENT.or(DirtyKind::GEOMETRY))
    }

    /// Same content, new constraints or floats.
    pub const fn geometry_only() -> Self {
        Self::new(DirtyKind::GEOMETRY)
    }
}

/// Lifecycle of a formatting context's display content.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub enum FormattingState {
    /// Never laid out, or laid out with no in-flow content.
    #[default]
    Empty,
    /// The display content reflects the current box tree.
    LaidOut,
    /// The box tree or styles changed since the last layout.
    Stale,
}
