//! Advance measurement.

use crate::breaks::{BreakOpportunity, uax14_opportunities};
use anyhow::{Result, bail};
use inline_layout_box_tree::InlineStyle;
use inline_layout_geometry::LayoutUnit;
use std::collections::HashSet;

/// Measures text for the line builder.
///
/// `advance` may fail for text the measurer cannot shape; the line builder
/// then lays the item out with zero width and carries on.
pub trait TextMeasurer {
    /// Horizontal advance of `text` rendered with `style`.
    ///
    /// # Errors
    /// Returns an error if the text cannot be measured.
    fn advance(&self, text: &str, style: &InlineStyle) -> Result<LayoutUnit>;

    /// Where lines may break inside `text`. Defaults to UAX #14.
    fn break_opportunities(&self, text: &str, _style: &InlineStyle) -> Vec<BreakOpportunity> {
        uax14_opportunities(text)
    }
}

/// Every char advances by the same amount, scaled from a 16px font.
///
/// Chars in the unsupported set fail measurement, standing in for glyphs
/// missing from every available font.
#[derive(Clone, Debug)]
pub struct FixedAdvanceMeasurer {
    advance_at_16px: LayoutUnit,
    unsupported: HashSet<char>,
}

impl FixedAdvanceMeasurer {
    const REFERENCE_SIZE: LayoutUnit = LayoutUnit::from_px_i32(16);

    /// Measurer advancing `advance_at_16px` per char for a 16px font.
    pub fn new(advance_at_16px: LayoutUnit) -> Self {
        Self {
            advance_at_16px,
            unsupported: HashSet::new(),
        }
    }

    /// Make measuring any text containing `ch` fail.
    #[must_use]
    pub fn with_unsupported(mut self, ch: char) -> Self {
        self.unsupported.insert(ch);
        self
    }

    fn char_advance(&self, style: &InlineStyle) -> LayoutUnit {
        if style.font.size == Self::REFERENCE_SIZE {
            return self.advance_at_16px;
        }
        let scale = style.font.size.to_px() / Self::REFERENCE_SIZE.to_px();
        self.advance_at_16px * scale
    }
}

impl Default for FixedAdvanceMeasurer {
    fn default() -> Self {
        Self::new(LayoutUnit::from_px_i32(8))
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    fn advance(&self, text: &str, style: &InlineStyle) -> Result<LayoutUnit> {
        if let Some(missing) = text.chars().find(|ch| self.unsupported.contains(ch)) {
            bail!("no glyph for {missing:?}");
        }
        Ok(self.char_advance(style) * text.chars().count() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Width is chars times the per-char advance, scaled by font size.
    ///
    /// # Panics
    /// Panics if the width is wrong.
    #[test]
    fn fixed_advance_scales_with_font() -> Result<()> {
        let measurer = FixedAdvanceMeasurer::new(LayoutUnit::from_px_i32(10));
        let mut style = InlineStyle::default();
        assert_eq!(
            measurer.advance("Hello World", &style)?,
            LayoutUnit::from_px_i32(110)
        );
        style.font.size = LayoutUnit::from_px_i32(32);
        assert_eq!(measurer.advance("ab", &style)?, LayoutUnit::from_px_i32(40));
        Ok(())
    }

    /// Unsupported chars fail the whole measurement.
    ///
    /// # Panics
    /// Panics if measurement succeeds.
    #[test]
    fn unsupported_char_fails() {
        let measurer = FixedAdvanceMeasurer::default().with_unsupported('\u{1F600}');
        let style = InlineStyle::default();
        assert!(measurer.advance("a\u{1F600}b", &style).is_err());
        assert!(measurer.advance("ab", &style).is_ok());
    }
}
