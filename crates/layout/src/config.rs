//! Runtime configuration for inline layout.
//!
//! Configuration can be loaded from environment variables or constructed
//! programmatically, and is owned by each formatting context.

use inline_layout_geometry::LayoutUnit;
use std::env;

/// Knobs that change layout or paint output without changing the input tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineLayoutConfig {
    /// Paint every text run with a debug shadow.
    pub debug_text_shadow: bool,
    /// Line height used when the font-metrics collaborator cannot resolve a font.
    pub fallback_line_height: LayoutUnit,
    /// Justify the last line (and lines ending in a forced break) too.
    pub justify_last_line: bool,
}

impl Default for LineLayoutConfig {
    fn default() -> Self {
        Self {
            debug_text_shadow: false,
            fallback_line_height: LayoutUnit::from_px_i32(Self::DEFAULT_FALLBACK_LINE_HEIGHT_PX),
            justify_last_line: false,
        }
    }
}

impl LineLayoutConfig {
    const DEFAULT_FALLBACK_LINE_HEIGHT_PX: i32 = 20;

    /// Construct a config with explicit values. Negative fallback heights are
    /// clamped to zero.
    #[inline]
    #[must_use]
    pub fn new(
        debug_text_shadow: bool,
        fallback_line_height: LayoutUnit,
        justify_last_line: bool,
    ) -> Self {
        Self {
            debug_text_shadow,
            fallback_line_height: fallback_line_height.clamp_negative_to_zero(),
            justify_last_line,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `INLINE_LAYOUT_DEBUG_SHADOW`: Set to "1" to paint runs with a debug shadow
    /// - `INLINE_LAYOUT_FALLBACK_LINE_HEIGHT_PX`: Fallback line height in pixels (default: 20)
    /// - `INLINE_LAYOUT_JUSTIFY_LAST_LINE`: Set to "1" to justify last lines
    #[must_use]
    pub fn from_env() -> Self {
        let debug_text_shadow = env::var("INLINE_LAYOUT_DEBUG_SHADOW").ok().as_deref() == Some("1");
        let fallback_px = env::var("INLINE_LAYOUT_FALLBACK_LINE_HEIGHT_PX")
            .ok()
            .and_then(|val| val.parse::<f32>().ok())
            .filter(|px| px.is_finite())
            .unwrap_or(Self::DEFAULT_FALLBACK_LINE_HEIGHT_PX as f32);
        let justify_last_line =
            env::var("INLINE_LAYOUT_JUSTIFY_LAST_LINE").ok().as_deref() == Some("1");
        Self::new(
            debug_text_shadow,
            LayoutUnit::from_px(fallback_px),
            justify_last_line,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Explicit construction clamps negative heights.
    ///
    /// # Panics
    /// Panics if the fallback height stays negative.
    #[test]
    fn new_clamps_fallback() {
        let config = LineLayoutConfig::new(true, LayoutUnit::from_px_i32(-4), false);
        assert!(config.debug_text_shadow);
        assert_eq!(config.fallback_line_height, LayoutUnit::zero());
    }

    /// Defaults are a 20px fallback with no debug output.
    ///
    /// # Panics
    /// Panics if a default changes.
    #[test]
    fn defaults() {
        let config = LineLayoutConfig::default();
        assert!(!config.debug_text_shadow);
        assert!(!config.justify_last_line);
        assert_eq!(config.fallback_line_height, LayoutUnit::from_px_i32(20));
    }
}
