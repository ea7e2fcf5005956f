//! Fixed-point layout geometry shared by every inline layout crate.

pub mod layout_unit;
pub mod rect;

pub use layout_unit::LayoutUnit;
pub use rect::{LayoutPoint, LayoutRect};
