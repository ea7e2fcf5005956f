//! Floating state for one inline formatting context.
//!
//! Floats are laid out by the surrounding block layout. Once per layout pass
//! the host hands us their resolved margin boxes; lines then ask which part of
//! their vertical band the floats leave free.
//!
//! Unlike a full exclusion space there is no incremental tracking: the state
//! is cleared and refilled on every pass.

use inline_layout_box_tree::NodeKey;
use inline_layout_geometry::{LayoutRect, LayoutUnit};
use log::trace;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum FloatSide {
    Left,
    Right,
}

/// A positioned float, in the content-box coordinate space of the formatting
/// context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FloatItem {
    /// Margin box of the float.
    pub rect: LayoutRect,
    pub side: FloatSide,
    /// Render-tree node of the float, when the host tracks it.
    pub node: Option<NodeKey>,
}

impl FloatItem {
    pub const fn new(rect: LayoutRect, side: FloatSide) -> Self {
        Self {
            rect,
            side,
            node: None,
        }
    }

    #[must_use]
    pub const fn with_node(mut self, node: NodeKey) -> Self {
        self.node = Some(node);
        self
    }

    /// Whether the float overlaps the vertical band `[top, bottom)`.
    ///
    /// An empty band (`bottom <= top`) is treated as the single offset `top`.
    pub fn intersects_band(&self, top: LayoutUnit, bottom: LayoutUnit) -> bool {
        if bottom <= top {
            return self.rect.y <= top && top < self.rect.max_y();
        }
        self.rect.y < bottom && top < self.rect.max_y()
    }
}

/// Source of the floats intersecting a formatting context.
pub trait FloatListReader {
    /// Floats with resolved margin boxes, in content-box coordinates.
    fn floats(&self) -> Vec<FloatItem>;
}

impl FloatListReader for [FloatItem] {
    fn floats(&self) -> Vec<FloatItem> {
        self.to_vec()
    }
}

impl FloatListReader for Vec<FloatItem> {
    fn floats(&self) -> Vec<FloatItem> {
        self.clone()
    }
}

/// The floats relevant to the current layout pass.
#[derive(Clone, Debug, Default)]
pub struct FloatingState {
    items: Vec<FloatItem>,
}

impl FloatingState {
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Drop every float. Called at the start of each layout pass.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Add one float.
    ///
    /// Top and bottom edges are floored to whole pixels so float avoidance
    /// matches the block layout that positioned the float. Horizontal edges
    /// keep sub-pixel precision.
    pub fn append(&mut self, item: FloatItem) {
        let top = item.rect.y.floor();
        let bottom = item.rect.max_y().floor();
        let rect = LayoutRect::new(item.rect.x, top, item.rect.width, bottom - top);
        trace!("float {:?} {:?} -> {rect:?}", item.side, item.rect);
        self.items.push(FloatItem { rect, ..item });
    }

    /// `clear()` followed by `append()` for every float the reader reports.
    pub fn prepare(&mut self, reader: &dyn FloatListReader) {
        self.clear();
        for item in reader.floats() {
            self.append(item);
        }
    }

    /// Floats in insertion order.
    pub fn items(&self) -> &[FloatItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether any float overlaps `[top, bottom)`.
    pub fn has_floats_in_band(&self, top: LayoutUnit, bottom: LayoutUnit) -> bool {
        self.items.iter().any(|item| item.intersects_band(top, bottom))
    }

    /// Inline-start edge left free by left floats in `[top, bottom)`.
    pub fn left_intrusion(&self, top: LayoutUnit, bottom: LayoutUnit) -> LayoutUnit {
        self.items
            .iter()
            .filter(|item| item.side == FloatSide::Left && item.intersects_band(top, bottom))
            .map(|item| item.rect.max_x())
            .max()
            .unwrap_or(LayoutUnit::zero())
            .clamp_negative_to_zero()
    }

    /// Inline-end edge left free by right floats in `[top, bottom)`.
    pub fn right_edge(
        &self,
        top: LayoutUnit,
        bottom: LayoutUnit,
        available_width: LayoutUnit,
    ) -> LayoutUnit {
        self.items
            .iter()
            .filter(|item| item.side == FloatSide::Right && item.intersects_band(top, bottom))
            .map(|item| item.rect.x)
            .min()
            .unwrap_or(available_width)
            .min(available_width)
    }

    /// Returns (`inline_offset`, `available_width`) for content in `[top, bottom)`.
    pub fn available_space(
        &self,
        top: LayoutUnit,
        bottom: LayoutUnit,
        available_width: LayoutUnit,
    ) -> (LayoutUnit, LayoutUnit) {
        let left_edge = self.left_intrusion(top, bottom).min(available_width);
        let right_edge = self.right_edge(top, bottom, available_width);
        (left_edge, (right_edge - left_edge).clamp_negative_to_zero())
    }

    /// Lowest float bottom among floats overlapping `[top, bottom)`.
    pub fn lowest_bottom_in_band(&self, top: LayoutUnit, bottom: LayoutUnit) -> Option<LayoutUnit> {
        self.items
            .iter()
            .filter(|item| item.intersects_band(top, bottom))
            .map(|item| item.rect.max_y())
            .max()
    }
}
