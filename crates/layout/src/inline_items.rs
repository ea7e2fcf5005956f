//! Flattening the box tree into measured inline items.
//!
//! Items are the unit the line builder places. They are measured once and
//! cached across layout passes until content, structure or style changes.

use crate::config::LineLayoutConfig;
use crate::error::LineLayoutError;
use inline_layout_box_tree::{
    BoxTree, FontDescriptor, InlineStyle, LayoutBoxId, LayoutBoxKind, LineHeight,
};
use inline_layout_geometry::LayoutUnit;
use inline_layout_text::{
    BreakOpportunity, FontMetrics, FontMetricsProvider, ProportionalFontMetrics, SOFT_HYPHEN,
    TextMeasurer,
};
use log::{trace, warn};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InlineItemKind {
    /// A word, word fragment or whitespace sequence; `start..end` are byte
    /// offsets into the box's text.
    Text {
        start: usize,
        end: usize,
        is_whitespace: bool,
        /// Collapsible whitespace is removed at line start and hangs at line end.
        collapsible: bool,
        /// Advance of the hyphen shown when the line breaks after this item.
        hyphen_width: Option<LayoutUnit>,
    },
    /// A preserved tab; its width depends on where it lands on the line.
    Tab { start: usize, interval: LayoutUnit },
    /// `<br>`.
    ForcedBreak,
    /// A preserved newline at `offset`.
    SoftBreak { offset: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InlineItem {
    pub layout_box: LayoutBoxId,
    pub kind: InlineItemKind,
    pub width: LayoutUnit,
    /// Ascent and descent including half-leading.
    pub metrics: FontMetrics,
    /// A soft wrap opportunity follows this item.
    pub can_break_after: bool,
}

impl InlineItem {
    pub const fn is_whitespace(&self) -> bool {
        matches!(
            self.kind,
            InlineItemKind::Text {
                is_whitespace: true,
                ..
            } | InlineItemKind::Tab { .. }
        )
    }

    pub const fn is_collapsible_whitespace(&self) -> bool {
        matches!(
            self.kind,
            InlineItemKind::Text {
                collapsible: true,
                ..
            }
        )
    }

    pub const fn is_line_break(&self) -> bool {
        matches!(
            self.kind,
            InlineItemKind::ForcedBreak | InlineItemKind::SoftBreak { .. }
        )
    }

    /// Byte range in the box's text, for text and tab items.
    pub const fn source_range(&self) -> Option<(usize, usize)> {
        match self.kind {
            InlineItemKind::Text { start, end, .. } => Some((start, end)),
            InlineItemKind::Tab { start, .. } => Some((start, start + 1)),
            InlineItemKind::ForcedBreak | InlineItemKind::SoftBreak { .. } => None,
        }
    }
}

/// Width of a tab starting at `position` from the line start.
pub fn resolve_tab_width(interval: LayoutUnit, position: LayoutUnit) -> LayoutUnit {
    if interval <= LayoutUnit::zero() {
        return LayoutUnit::zero();
    }
    let remainder = position.raw().rem_euclid(interval.raw());
    LayoutUnit::from_raw(interval.raw() - remainder)
}

/// Apply `line-height` to font metrics: fixed heights add half the leading
/// above and the rest below.
pub fn apply_line_height(font: FontMetrics, line_height: LineHeight) -> FontMetrics {
    match line_height {
        LineHeight::Normal => font,
        LineHeight::Fixed(height) => {
            let leading = height - font.height();
            let ascent = font.ascent + leading / 2;
            FontMetrics {
                ascent,
                descent: height - ascent,
            }
        }
    }
}

/// Builds the item list for one layout pass.
pub struct InlineItemsBuilder<'ctx> {
    tree: &'ctx BoxTree,
    measurer: &'ctx dyn TextMeasurer,
    fonts: &'ctx dyn FontMetricsProvider,
    config: &'ctx LineLayoutConfig,
    font_cache: HashMap<FontDescriptor, FontMetrics>,
    items: Vec<InlineItem>,
    /// The previous item is collapsible whitespace (or a line start), so
    /// further collapsible whitespace disappears.
    after_collapsible_space: bool,
}

impl<'ctx> InlineItemsBuilder<'ctx> {
    pub fn new(
        tree: &'ctx BoxTree,
        measurer: &'ctx dyn TextMeasurer,
        fonts: &'ctx dyn FontMetricsProvider,
        config: &'ctx LineLayoutConfig,
    ) -> Self {
        Self {
            tree,
            measurer,
            fonts,
            config,
            font_cache: HashMap::new(),
            items: Vec::new(),
            after_collapsible_space: true,
        }
    }

    /// Walk the leaves in document order and measure them.
    pub fn build(mut self) -> Vec<InlineItem> {
        let tree = self.tree;
        for id in tree.leaves() {
            let Some(layout_box) = tree.get(id) else {
                continue;
            };
            let style = layout_box.style_arc();
            match layout_box.kind() {
                LayoutBoxKind::Text { content } => self.push_text(id, content, style),
                LayoutBoxKind::LineBreak => {
                    let metrics = self.line_metrics(style);
                    self.push(id, InlineItemKind::ForcedBreak, LayoutUnit::zero(), metrics, true);
                    self.after_collapsible_space = true;
                }
                LayoutBoxKind::Root | LayoutBoxKind::InlineBox => {}
            }
        }
        trace!("built {} inline items", self.items.len());
        self.items
    }

    /// Metrics of the root style, used as every line's strut.
    pub fn strut(&mut self, style: &InlineStyle) -> FontMetrics {
        self.line_metrics(style)
    }

    fn push_text(&mut self, id: LayoutBoxId, content: &str, style: &InlineStyle) {
        let white_space = style.white_space;
        let wrap = white_space.allows_wrap();
        let metrics = self.line_metrics(style);
        let opportunities: Vec<BreakOpportunity> = if wrap {
            self.measurer
                .break_opportunities(content, style)
                .into_iter()
                .filter(|opportunity| !opportunity.mandatory)
                .collect()
        } else {
            Vec::new()
        };
        let opportunity_at =
            |offset: usize| opportunities.iter().find(|candidate| candidate.offset == offset);
        let is_collapsible_space = |ch: char| {
            matches!(ch, ' ' | '\t' | '\r') || (ch == '\n' && !white_space.preserves_newlines())
        };

        let mut space_width = None;
        let mut chars = content.char_indices().peekable();
        while let Some(&(start, ch)) = chars.peek() {
            if ch == '\n' && white_space.preserves_newlines() {
                chars.next();
                self.push(id, InlineItemKind::SoftBreak { offset: start }, LayoutUnit::zero(), metrics, true);
                self.after_collapsible_space = true;
                continue;
            }

            if white_space.collapses_spaces() && is_collapsible_space(ch) {
                let mut end = start;
                while let Some(&(offset, next)) = chars.peek() {
                    if !is_collapsible_space(next) {
                        break;
                    }
                    end = offset + next.len_utf8();
                    chars.next();
                }
                if self.after_collapsible_space {
                    continue;
                }
                let width = *space_width.get_or_insert_with(|| self.measure(id, " ", style));
                let kind = InlineItemKind::Text {
                    start,
                    end,
                    is_whitespace: true,
                    collapsible: true,
                    hyphen_width: None,
                };
                self.push(id, kind, width, metrics, wrap);
                self.after_collapsible_space = true;
                continue;
            }

            if ch == '\t' {
                chars.next();
                let space = *space_width.get_or_insert_with(|| self.measure(id, " ", style));
                let interval = space * style.tab_size as i32;
                self.push(id, InlineItemKind::Tab { start, interval }, LayoutUnit::zero(), metrics, wrap);
                self.after_collapsible_space = false;
                continue;
            }

            if ch == ' ' {
                let mut end = start;
                while let Some(&(offset, ' ')) = chars.peek() {
                    end = offset + 1;
                    chars.next();
                }
                let width = content
                    .get(start..end)
                    .map_or(LayoutUnit::zero(), |spaces| self.measure(id, spaces, style));
                let kind = InlineItemKind::Text {
                    start,
                    end,
                    is_whitespace: true,
                    collapsible: false,
                    hyphen_width: None,
                };
                self.push(id, kind, width, metrics, wrap);
                self.after_collapsible_space = false;
                continue;
            }

            // A word, cut at every break opportunity inside it.
            let mut end = start;
            while let Some(&(offset, next)) = chars.peek() {
                let at_space = next == ' ' || next == '\t' || next == '\n' || is_collapsible_space(next);
                if offset > start && (at_space || opportunity_at(offset).is_some()) {
                    break;
                }
                end = offset + next.len_utf8();
                chars.next();
            }
            let word = content.get(start..end).unwrap_or_default();
            let width = if word.contains(SOFT_HYPHEN) {
                let visible: String = word.chars().filter(|ch| *ch != SOFT_HYPHEN).collect();
                self.measure(id, &visible, style)
            } else {
                self.measure(id, word, style)
            };
            let break_after = opportunity_at(end).copied();
            let hyphen_width = break_after
                .filter(|opportunity| opportunity.hyphen)
                .map(|_| self.measure(id, "-", style));
            let kind = InlineItemKind::Text {
                start,
                end,
                is_whitespace: false,
                collapsible: false,
                hyphen_width,
            };
            self.push(id, kind, width, metrics, break_after.is_some());
            self.after_collapsible_space = false;
        }
    }

    fn push(
        &mut self,
        layout_box: LayoutBoxId,
        kind: InlineItemKind,
        width: LayoutUnit,
        metrics: FontMetrics,
        can_break_after: bool,
    ) {
        self.items.push(InlineItem {
            layout_box,
            kind,
            width,
            metrics,
            can_break_after,
        });
    }

    /// Measure `text`, substituting zero width when the measurer fails.
    fn measure(&self, id: LayoutBoxId, text: &str, style: &InlineStyle) -> LayoutUnit {
        match self.measurer.advance(text, style) {
            Ok(width) => width,
            Err(err) => {
                if let Some(node) = self.tree.renderer_for(id) {
                    warn!(
                        "{}",
                        LineLayoutError::UnresolvedMeasurement {
                            node,
                            reason: err.to_string(),
                        }
                    );
                }
                LayoutUnit::zero()
            }
        }
    }

    fn line_metrics(&mut self, style: &InlineStyle) -> FontMetrics {
        let cached = self.font_cache.get(&style.font).copied();
        let font = cached.unwrap_or_else(|| {
            let resolved = self.fonts.metrics(&style.font).unwrap_or_else(|err| {
                warn!("no metrics for {:?}, using fallback: {err}", style.font);
                ProportionalFontMetrics::split(self.config.fallback_line_height)
            });
            self.font_cache.insert(style.font.clone(), resolved);
            resolved
        });
        apply_line_height(font, style.line_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use inline_layout_box_tree::{MemoryRenderTree, WhiteSpace};
    use inline_layout_text::FixedAdvanceMeasurer;
    use std::sync::Arc;

    fn items_for(texts: &[&str], style: InlineStyle) -> Result<Vec<InlineItem>> {
        let mut render = MemoryRenderTree::new(Arc::new(style));
        let root = render.root();
        for text in texts {
            render.append_text(root, text)?;
        }
        let tree = BoxTree::build(&render, root)?;
        let measurer = FixedAdvanceMeasurer::new(LayoutUnit::from_px_i32(10));
        let config = LineLayoutConfig::default();
        Ok(InlineItemsBuilder::new(&tree, &measurer, &ProportionalFontMetrics, &config).build())
    }

    fn ranges(items: &[InlineItem]) -> Vec<(usize, usize)> {
        items.iter().filter_map(InlineItem::source_range).collect()
    }

    /// Words and the space between them become separate items.
    ///
    /// # Panics
    /// Panics if segmentation or widths are wrong.
    #[test]
    fn words_and_spaces() -> Result<()> {
        let items = items_for(&["Hello World"], InlineStyle::default())?;
        assert_eq!(ranges(&items), vec![(0, 5), (5, 6), (6, 11)]);
        assert_eq!(items[0].width, LayoutUnit::from_px_i32(50));
        assert!(!items[0].can_break_after);
        assert!(items[1].is_collapsible_whitespace());
        assert!(items[1].can_break_after);
        assert!(!items[2].can_break_after);
        Ok(())
    }

    /// Whitespace sequences collapse, even across boxes, and leading
    /// whitespace is dropped.
    ///
    /// # Panics
    /// Panics if collapsed whitespace produces extra items.
    #[test]
    fn whitespace_collapses_across_boxes() -> Result<()> {
        let items = items_for(&["  a \t\n ", "  b"], InlineStyle::default())?;
        let whitespace: Vec<_> = items.iter().filter(|item| item.is_whitespace()).collect();
        assert_eq!(whitespace.len(), 1);
        assert_eq!(whitespace[0].width, LayoutUnit::from_px_i32(10));
        assert_eq!(items.len(), 3);
        Ok(())
    }

    /// Preserved newlines become soft breaks; `nowrap` forbids soft wrapping.
    ///
    /// # Panics
    /// Panics if newline or wrap handling is wrong.
    #[test]
    fn white_space_modes() -> Result<()> {
        let pre = InlineStyle {
            white_space: WhiteSpace::Pre,
            ..InlineStyle::default()
        };
        let items = items_for(&["a  b\nc"], pre)?;
        assert!(items.iter().any(|item| item.kind == InlineItemKind::SoftBreak { offset: 4 }));
        let spaces = items.iter().find(|item| item.is_whitespace());
        assert_eq!(spaces.map(|item| item.width), Some(LayoutUnit::from_px_i32(20)));
        assert!(items.iter().filter(|item| !item.is_line_break()).all(|item| !item.can_break_after));

        let nowrap = InlineStyle {
            white_space: WhiteSpace::NoWrap,
            ..InlineStyle::default()
        };
        let items = items_for(&["a b"], nowrap)?;
        assert!(items.iter().all(|item| !item.can_break_after));
        Ok(())
    }

    /// Soft hyphens split words, have no advance and offer a hyphenated break.
    ///
    /// # Panics
    /// Panics if the soft hyphen is measured or the hyphen width is missing.
    #[test]
    fn soft_hyphen_items() -> Result<()> {
        let items = items_for(&["hy\u{ad}phen"], InlineStyle::default())?;
        assert_eq!(ranges(&items), vec![(0, 4), (4, 8)]);
        assert_eq!(items[0].width, LayoutUnit::from_px_i32(20));
        assert!(items[0].can_break_after);
        assert!(matches!(
            items[0].kind,
            InlineItemKind::Text {
                hyphen_width: Some(_),
                ..
            }
        ));
        Ok(())
    }

    /// Unmeasurable text yields a zero-width item instead of failing.
    ///
    /// # Panics
    /// Panics if the bad item is dropped or has a width.
    #[test]
    fn unmeasurable_text_is_zero_width() -> Result<()> {
        let mut render = MemoryRenderTree::new(Arc::new(InlineStyle::default()));
        let root = render.root();
        render.append_text(root, "ok \u{FFFF} ok")?;
        let tree = BoxTree::build(&render, root)?;
        let measurer = FixedAdvanceMeasurer::new(LayoutUnit::from_px_i32(10)).with_unsupported('\u{FFFF}');
        let config = LineLayoutConfig::default();
        let items = InlineItemsBuilder::new(&tree, &measurer, &ProportionalFontMetrics, &config).build();
        assert_eq!(items.len(), 5);
        assert_eq!(items[2].width, LayoutUnit::zero());
        assert_eq!(items[4].width, LayoutUnit::from_px_i32(20));
        Ok(())
    }

    /// Tabs advance to the next multiple of the interval.
    ///
    /// # Panics
    /// Panics if a tab stop is wrong.
    #[test]
    fn tab_stops() {
        let interval = LayoutUnit::from_px_i32(80);
        assert_eq!(resolve_tab_width(interval, LayoutUnit::from_px_i32(30)), LayoutUnit::from_px_i32(50));
        assert_eq!(resolve_tab_width(interval, LayoutUnit::from_px_i32(80)), interval);
        assert_eq!(resolve_tab_width(LayoutUnit::zero(), LayoutUnit::from_px_i32(5)), LayoutUnit::zero());
    }

    /// Fixed line heights split leading evenly above and below.
    ///
    /// # Panics
    /// Panics if the half-leading is wrong.
    #[test]
    fn half_leading() {
        let font = ProportionalFontMetrics::split(LayoutUnit::from_px_i32(16));
        let metrics = apply_line_height(font, LineHeight::Fixed(LayoutUnit::from_px_i32(24)));
        assert_eq!(metrics.ascent, LayoutUnit::from_px_i32(16));
        assert_eq!(metrics.descent, LayoutUnit::from_px_i32(8));
    }
}
