//! Constraints handed down by the block container.

use inline_layout_geometry::LayoutUnit;

/// Inline-axis placement of the content box.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HorizontalConstraints {
    /// Content-box inline start.
    pub logical_left: LayoutUnit,
    /// Available width.
    pub logical_width: LayoutUnit,
}

/// Block-axis placement of the content box.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct VerticalConstraints {
    /// Content-box block start.
    pub logical_top: LayoutUnit,
    /// Available height, if definite.
    pub logical_height: Option<LayoutUnit>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstraintsForInFlowContent {
    pub horizontal: HorizontalConstraints,
    pub vertical: VerticalConstraints,
}

impl ConstraintsForInFlowContent {
    /// Content box at the origin with the given width and no height limit.
    pub const fn with_width(width: LayoutUnit) -> Self {
        Self {
            horizontal: HorizontalConstraints {
                logical_left: LayoutUnit::zero(),
                logical_width: width,
            },
            vertical: VerticalConstraints {
                logical_top: LayoutUnit::zero(),
                logical_height: None,
            },
        }
    }
}
