//! Lightweight boxes mirroring inline-level render-tree nodes.

use crate::reader::NodeKey;
use crate::style::InlineStyle;
use serde::Serialize;
use std::sync::Arc;

/// Index of a box inside its `BoxTree` arena, tagged with the slot's
/// generation.
///
/// Slots of removed boxes are reused. An id kept across its box's removal
/// never resolves again, even after the slot holds a new box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LayoutBoxId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl LayoutBoxId {
    /// First-generation id for a raw arena index. Only meaningful for the
    /// tree that issued it.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self {
            index,
            generation: 0,
        }
    }

    #[inline]
    pub(crate) const fn with_generation(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutBoxKind {
    /// The block container establishing the formatting context.
    Root,
    Text { content: String },
    LineBreak,
    InlineBox,
}

/// Where a box's style came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleOrigin {
    /// The render-tree node has its own style.
    Own,
    /// Anonymous style inherited from the formatting root; refreshed by
    /// `BoxTree::update_style`.
    Root,
    /// Inherited from an inline box ancestor.
    Parent,
}

#[derive(Clone, Debug)]
pub struct LayoutBox {
    pub(crate) kind: LayoutBoxKind,
    pub(crate) style: Arc<InlineStyle>,
    pub(crate) style_origin: StyleOrigin,
    pub(crate) renderer: NodeKey,
    pub(crate) parent: Option<LayoutBoxId>,
    pub(crate) children: Vec<LayoutBoxId>,
}

impl LayoutBox {
    pub const fn kind(&self) -> &LayoutBoxKind {
        &self.kind
    }

    pub fn style(&self) -> &InlineStyle {
        &self.style
    }

    pub fn style_arc(&self) -> &Arc<InlineStyle> {
        &self.style
    }

    pub const fn style_origin(&self) -> StyleOrigin {
        self.style_origin
    }

    pub const fn parent(&self) -> Option<LayoutBoxId> {
        self.parent
    }

    pub fn children(&self) -> &[LayoutBoxId] {
        &self.children
    }

    /// Text content if this is a text box.
    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            LayoutBoxKind::Text { content } => Some(content),
            _ => None,
        }
    }

    pub const fn is_line_break(&self) -> bool {
        matches!(self.kind, LayoutBoxKind::LineBreak)
    }

    pub const fn is_inline_box(&self) -> bool {
        matches!(self.kind, LayoutBoxKind::InlineBox)
    }

    pub const fn is_root(&self) -> bool {
        matches!(self.kind, LayoutBoxKind::Root)
    }

    /// Leaves produce inline items; containers only group them.
    pub const fn is_leaf(&self) -> bool {
        matches!(
            self.kind,
            LayoutBoxKind::Text { .. } | LayoutBoxKind::LineBreak
        )
    }
}
