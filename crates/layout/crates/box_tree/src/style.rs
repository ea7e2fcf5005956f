//! Read-only style snapshot consulted by inline layout, paint and hit testing.
//!
//! Styles are resolved by the host and shared with the box tree as
//! `Arc<InlineStyle>`; nothing in this workspace mutates them.

use inline_layout_geometry::{LayoutPoint, LayoutUnit};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum WhiteSpace {
    #[default]
    Normal,
    NoWrap,
    Pre,
    PreWrap,
    PreLine,
}

impl WhiteSpace {
    /// Spaces and tabs collapse into a single space.
    pub const fn collapses_spaces(self) -> bool {
        matches!(self, Self::Normal | Self::NoWrap | Self::PreLine)
    }

    /// Newlines are forced breaks rather than collapsible whitespace.
    pub const fn preserves_newlines(self) -> bool {
        matches!(self, Self::Pre | Self::PreWrap | Self::PreLine)
    }

    /// Soft wrap opportunities are honored.
    pub const fn allows_wrap(self) -> bool {
        matches!(self, Self::Normal | Self::PreWrap | Self::PreLine)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum TextAlign {
    #[default]
    Start,
    Left,
    Right,
    Center,
    End,
    Justify,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum PointerEvents {
    #[default]
    Auto,
    None,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum LineHeight {
    /// Use the font's ascent + descent.
    #[default]
    Normal,
    Fixed(LayoutUnit),
}

/// Decoration lines requested by `text-decoration-line`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TextDecoration {
    pub underline: bool,
    pub overline: bool,
    pub line_through: bool,
}

impl TextDecoration {
    pub const fn is_none(self) -> bool {
        !self.underline && !self.overline && !self.line_through
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TextShadow {
    pub offset: LayoutPoint,
    pub blur: LayoutUnit,
    pub color: Rgba,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Rgba {
    pub const BLACK: Self = Self {
        red: 0,
        green: 0,
        blue: 0,
        alpha: 255,
    };
}

/// Font selection handed to the measurement and metrics collaborators.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct FontDescriptor {
    pub family: String,
    pub size: LayoutUnit,
    /// CSS weight (100-900, 400 = normal).
    pub weight: u16,
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self {
            family: String::from("sans-serif"),
            size: LayoutUnit::from_px_i32(16),
            weight: 400,
        }
    }
}

/// Style properties inline layout reads for one box.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InlineStyle {
    pub font: FontDescriptor,
    pub line_height: LineHeight,
    pub white_space: WhiteSpace,
    pub tab_size: u32,
    pub text_align: TextAlign,
    pub visibility: Visibility,
    pub pointer_events: PointerEvents,
    pub text_decoration: TextDecoration,
    pub text_shadow: Option<TextShadow>,
    pub color: Rgba,
}

impl Default for InlineStyle {
    fn default() -> Self {
        Self {
            font: FontDescriptor::default(),
            line_height: LineHeight::Normal,
            white_space: WhiteSpace::Normal,
            tab_size: 8,
            text_align: TextAlign::Start,
            visibility: Visibility::Visible,
            pointer_events: PointerEvents::Auto,
            text_decoration: TextDecoration::default(),
            text_shadow: None,
            color: Rgba::BLACK,
        }
    }
}

impl InlineStyle {
    /// Whether switching from `self` to `other` changes measured widths or
    /// line geometry (as opposed to paint-only properties).
    pub fn differs_in_layout(&self, other: &Self) -> bool {
        self.font != other.font
            || self.line_height != other.line_height
            || self.white_space != other.white_space
            || self.tab_size != other.tab_size
            || self.text_align != other.text_align
            || self.text_shadow != other.text_shadow
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Paint-only changes do not require layout.
    ///
    /// # Panics
    /// Panics if a color change is reported as layout-affecting.
    #[test]
    fn color_change_is_paint_only() {
        let base = InlineStyle::default();
        let recolored = InlineStyle {
            color: Rgba {
                red: 255,
                ..Rgba::BLACK
            },
            ..InlineStyle::default()
        };
        assert!(!base.differs_in_layout(&recolored));
    }

    /// Font size changes require layout.
    ///
    /// # Panics
    /// Panics if a font change is not reported.
    #[test]
    fn font_change_needs_layout() {
        let base = InlineStyle::default();
        let mut bigger = InlineStyle::default();
        bigger.font.size = LayoutUnit::from_px_i32(20);
        assert!(base.differs_in_layout(&bigger));
    }

    /// White-space predicates follow CSS Text 3.
    ///
    /// # Panics
    /// Panics if a mode is misclassified.
    #[test]
    fn white_space_predicates() {
        assert!(WhiteSpace::Normal.collapses_spaces());
        assert!(!WhiteSpace::Normal.preserves_newlines());
        assert!(WhiteSpace::PreLine.collapses_spaces());
        assert!(WhiteSpace::PreLine.preserves_newlines());
        assert!(!WhiteSpace::Pre.allows_wrap());
        assert!(!WhiteSpace::NoWrap.allows_wrap());
        assert!(WhiteSpace::PreWrap.allows_wrap());
    }
}
