//! Box tree adapter for inline layout.
//!
//! Mirrors the inline-level render-tree nodes of one block container as an
//! arena of [`LayoutBox`]es and answers node <-> box lookups in both
//! directions. Boxes refer to render-tree nodes only through [`NodeKey`]
//! handles; callers must re-resolve them after every layout pass.

pub mod layout_box;
pub mod reader;
pub mod style;
pub mod tree;

pub use layout_box::{LayoutBox, LayoutBoxId, LayoutBoxKind, StyleOrigin};
pub use reader::{MemoryRenderTree, NodeKey, RenderNodeKind, RenderTreeReader};
pub use style::{
    FontDescriptor, InlineStyle, LineHeight, PointerEvents, Rgba, TextAlign, TextDecoration,
    TextShadow, Visibility, WhiteSpace,
};
pub use tree::{BoxTree, Leaves};
