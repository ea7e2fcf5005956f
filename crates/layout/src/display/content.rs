//! Line and run storage.

use crate::justify::Expansion;
use inline_layout_box_tree::LayoutBoxId;
use inline_layout_geometry::{LayoutRect, LayoutUnit};
use once_cell::unsync::OnceCell;
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RunKind {
    /// `length` bytes of the box's text starting at `start`.
    Text {
        start: usize,
        length: usize,
        /// The line breaks after this run at a soft hyphen; a hyphen is shown.
        has_hyphen: bool,
    },
    /// A `<br>`.
    ForcedLineBreak,
    /// A preserved newline at `offset` in the box's text.
    SoftLineBreak { offset: usize },
}

/// One laid out fragment of a single box on a single line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Run {
    pub kind: RunKind,
    /// Owning box. Only valid for the box tree this content was built from.
    pub layout_box: LayoutBoxId,
    pub line_index: usize,
    /// Horizontal position relative to the line's content start.
    pub offset_in_line: LayoutUnit,
    /// Border box in formatting-context coordinates; width includes expansion.
    pub rect: LayoutRect,
    /// Distance from `rect.y` to the baseline.
    pub ascent: LayoutUnit,
    pub expansion: Expansion,
    pub ink_overflow: LayoutRect,
}

impl Run {
    pub const fn is_text(&self) -> bool {
        matches!(self.kind, RunKind::Text { .. })
    }

    /// Byte range of the box's text this run covers, for text runs.
    pub const fn text_range(&self) -> Option<Range<usize>> {
        match self.kind {
            RunKind::Text { start, length, .. } => Some(start..start + length),
            RunKind::ForcedLineBreak | RunKind::SoftLineBreak { .. } => None,
        }
    }
}

/// One visual line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LineBox {
    pub top: LayoutUnit,
    pub bottom: LayoutUnit,
    /// Baseline offset from `top`.
    pub baseline: LayoutUnit,
    /// Left edge after float intrusion.
    pub left: LayoutUnit,
    /// Width available to content after float intrusion.
    pub width: LayoutUnit,
    /// Left edge of the first run after alignment.
    pub content_left: LayoutUnit,
    pub content_width: LayoutUnit,
    pub scrollable_overflow: LayoutRect,
    pub ink_overflow: LayoutRect,
    pub first_run: usize,
    pub run_count: usize,
    pub ends_with_forced_break: bool,
}

impl LineBox {
    pub fn height(&self) -> LayoutUnit {
        self.bottom - self.top
    }

    pub const fn run_range(&self) -> Range<usize> {
        self.first_run..self.first_run + self.run_count
    }
}

/// The part of an inline box (`<span>`) that lies on one line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct InlineBoxFragment {
    pub layout_box: LayoutBoxId,
    pub line_index: usize,
    pub rect: LayoutRect,
}

/// Output of one layout pass.
///
/// Replaced wholesale by the next pass; an empty value is both "never laid
/// out" and "laid out with nothing to show".
#[derive(Clone, Debug, Default, Serialize)]
pub struct DisplayInlineContent {
    pub(crate) lines: Vec<LineBox>,
    pub(crate) runs: Vec<Run>,
    pub(crate) inline_boxes: Vec<InlineBoxFragment>,
    pub(crate) scrollable_overflow: LayoutRect,
    pub(crate) ink_overflow: LayoutRect,
    /// Box -> contiguous run range, built on first lookup.
    #[serde(skip)]
    run_index: OnceCell<HashMap<LayoutBoxId, Range<usize>>>,
}

impl DisplayInlineContent {
    pub(crate) fn new(
        lines: Vec<LineBox>,
        runs: Vec<Run>,
        inline_boxes: Vec<InlineBoxFragment>,
    ) -> Self {
        let scrollable_overflow = lines
            .iter()
            .fold(LayoutRect::default(), |acc, line| acc.unite(&line.scrollable_overflow));
        let ink_overflow = lines
            .iter()
            .fold(scrollable_overflow, |acc, line| acc.unite(&line.ink_overflow));
        Self {
            lines,
            runs,
            inline_boxes,
            scrollable_overflow,
            ink_overflow,
            run_index: OnceCell::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[LineBox] {
        &self.lines
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn inline_boxes(&self) -> &[InlineBoxFragment] {
        &self.inline_boxes
    }

    pub const fn scrollable_overflow(&self) -> LayoutRect {
        self.scrollable_overflow
    }

    pub const fn ink_overflow(&self) -> LayoutRect {
        self.ink_overflow
    }

    /// Runs of line `index`, empty if there is no such line.
    pub fn runs_for_line(&self, index: usize) -> &[Run] {
        self.lines
            .get(index)
            .and_then(|line| self.runs.get(line.run_range()))
            .unwrap_or_default()
    }

    /// Last line bottom minus first line top.
    pub fn content_logical_height(&self) -> Option<LayoutUnit> {
        let first = self.lines.first()?;
        let last = self.lines.last()?;
        Some(last.bottom - first.top)
    }

    /// Absolute baseline position of the first line.
    pub fn first_line_baseline(&self) -> Option<LayoutUnit> {
        self.lines.first().map(|line| line.top + line.baseline)
    }

    /// Absolute baseline position of the last line.
    pub fn last_line_baseline(&self) -> Option<LayoutUnit> {
        self.lines.last().map(|line| line.top + line.baseline)
    }

    /// Runs owned by `layout_box`, contiguous in layout order.
    pub fn runs_for_box(&self, layout_box: LayoutBoxId) -> &[Run] {
        let index = self.run_index.get_or_init(|| build_run_index(&self.runs));
        index
            .get(&layout_box)
            .and_then(|range| self.runs.get(range.clone()))
            .unwrap_or_default()
    }

    /// Fragments of `layout_box` on every line it spans.
    pub fn fragments_for_box(
        &self,
        layout_box: LayoutBoxId,
    ) -> impl Iterator<Item = &InlineBoxFragment> + '_ {
        self.inline_boxes
            .iter()
            .filter(move |fragment| fragment.layout_box == layout_box)
    }

    /// Drop the lazily built run lookup index.
    pub fn clear_run_index(&mut self) {
        self.run_index.take();
    }

    pub fn has_run_index(&self) -> bool {
        self.run_index.get().is_some()
    }
}

fn build_run_index(runs: &[Run]) -> HashMap<LayoutBoxId, Range<usize>> {
    let mut index: HashMap<LayoutBoxId, Range<usize>> = HashMap::new();
    for (position, run) in runs.iter().enumerate() {
        let range = index
            .entry(run.layout_box)
            .or_insert(position..position);
        debug_assert_eq!(range.end, position, "runs of {:?} are not contiguous", run.layout_box);
        range.end = position + 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(layout_box: u32, line_index: usize, x: i32) -> Run {
        let rect = LayoutRect::from_px_i32(x, line_index as i32 * 10, 10, 10);
        Run {
            kind: RunKind::Text {
                start: 0,
                length: 1,
                has_hyphen: false,
            },
            layout_box: LayoutBoxId::new(layout_box),
            line_index,
            offset_in_line: LayoutUnit::from_px_i32(x),
            rect,
            ascent: LayoutUnit::from_px_i32(8),
            expansion: Expansion::default(),
            ink_overflow: rect,
        }
    }

    fn line(index: usize, first_run: usize, run_count: usize) -> LineBox {
        let top = LayoutUnit::from_px_i32(index as i32 * 10);
        let rect = LayoutRect::from_px_i32(0, index as i32 * 10, 100, 10);
        LineBox {
            top,
            bottom: top + LayoutUnit::from_px_i32(10),
            baseline: LayoutUnit::from_px_i32(8),
            left: LayoutUnit::zero(),
            width: LayoutUnit::from_px_i32(100),
            content_left: LayoutUnit::zero(),
            content_width: LayoutUnit::from_px_i32(20),
            scrollable_overflow: rect,
            ink_overflow: rect,
            first_run,
            run_count,
            ends_with_forced_break: false,
        }
    }

    /// Geometry queries are `None` on empty content.
    ///
    /// # Panics
    /// Panics if empty content reports geometry.
    #[test]
    fn empty_content_has_no_geometry() {
        let content = DisplayInlineContent::default();
        assert!(content.is_empty());
        assert_eq!(content.content_logical_height(), None);
        assert_eq!(content.first_line_baseline(), None);
        assert!(content.runs_for_box(LayoutBoxId::new(1)).is_empty());
        assert!(content.runs_for_line(0).is_empty());
    }

    /// The run index finds each box's contiguous range and can be dropped.
    ///
    /// # Panics
    /// Panics if a lookup returns the wrong runs.
    #[test]
    fn run_index_lookup() {
        let runs = vec![run(1, 0, 0), run(1, 1, 0), run(2, 1, 10)];
        let mut content = DisplayInlineContent::new(vec![line(0, 0, 1), line(1, 1, 2)], runs, Vec::new());
        assert!(!content.has_run_index());
        assert_eq!(content.runs_for_box(LayoutBoxId::new(1)).len(), 2);
        assert_eq!(content.runs_for_box(LayoutBoxId::new(2))[0].line_index, 1);
        assert!(content.has_run_index());
        content.clear_run_index();
        assert!(!content.has_run_index());
        assert_eq!(content.content_logical_height(), Some(LayoutUnit::from_px_i32(20)));
        assert_eq!(content.last_line_baseline(), Some(LayoutUnit::from_px_i32(18)));
        assert_eq!(content.scrollable_overflow(), LayoutRect::from_px_i32(0, 0, 100, 20));
    }
}
