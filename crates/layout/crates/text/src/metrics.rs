//! Font metrics collaborator.

use anyhow::{Result, ensure};
use inline_layout_box_tree::FontDescriptor;
use inline_layout_geometry::LayoutUnit;
use serde::Serialize;

/// Vertical metrics of a font.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FontMetrics {
    pub ascent: LayoutUnit,
    pub descent: LayoutUnit,
}

impl FontMetrics {
    /// Content height (ascent + descent).
    pub fn height(self) -> LayoutUnit {
        self.ascent + self.descent
    }
}

/// Resolves fonts to their vertical metrics.
pub trait FontMetricsProvider {
    /// # Errors
    /// Returns an error if the font cannot be resolved.
    fn metrics(&self, font: &FontDescriptor) -> Result<FontMetrics>;
}

/// Estimates metrics without font data: ascent is 75% and descent 25% of the
/// font size.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProportionalFontMetrics;

impl ProportionalFontMetrics {
    /// Split `height` into ascent and descent in the usual 3:1 ratio.
    pub fn split(height: LayoutUnit) -> FontMetrics {
        let ascent = height * 3 / 4;
        FontMetrics {
            ascent,
            descent: height - ascent,
        }
    }
}

impl FontMetricsProvider for ProportionalFontMetrics {
    fn metrics(&self, font: &FontDescriptor) -> Result<FontMetrics> {
        ensure!(font.size >= LayoutUnit::zero(), "negative font size {:?}", font.size);
        Ok(Self::split(font.size))
    }
}
