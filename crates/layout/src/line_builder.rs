//! Greedy line breaking and line geometry.
//!
//! Items are added to the current line while they fit. When one does not,
//! the line is cut at the last soft wrap opportunity; without one the item
//! overflows and the line ends at the next opportunity instead.

use crate::constraints::ConstraintsForInFlowContent;
use crate::display::{DisplayInlineContent, InlineBoxFragment, LineBox, Run, RunKind};
use crate::inline_items::{InlineItem, InlineItemKind, resolve_tab_width};
use crate::justify::{Expansion, ExpansionBehavior, ExpansionStrategy};
use inline_layout_box_tree::{BoxTree, LayoutBoxId, TextAlign};
use inline_layout_float::FloatingState;
use inline_layout_geometry::{LayoutRect, LayoutUnit};
use inline_layout_text::FontMetrics;
use log::trace;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug)]
struct PlacedItem {
    index: usize,
    /// Resolved width; differs from the item's for tabs.
    width: LayoutUnit,
}

/// Items chosen for one line, before geometry.
#[derive(Debug)]
struct LineCandidate {
    placed: SmallVec<[PlacedItem; 16]>,
    /// First item of the next line.
    next: usize,
    ends_with_forced_break: bool,
    /// Set when the line ends at a soft hyphen.
    hyphen_width: Option<LayoutUnit>,
}

#[derive(Clone, Copy, Debug)]
struct RunDraft {
    layout_box: LayoutBoxId,
    kind: RunKind,
    width: LayoutUnit,
    metrics: FontMetrics,
    opportunities: u32,
    expansion: LayoutUnit,
}

/// Produces the display content for one layout pass.
pub struct LineBuilder<'ctx> {
    items: &'ctx [InlineItem],
    tree: &'ctx BoxTree,
    floats: &'ctx FloatingState,
    constraints: ConstraintsForInFlowContent,
    strut: FontMetrics,
    text_align: TextAlign,
    expansion: &'ctx dyn ExpansionStrategy,
    justify_last_line: bool,
    lines: Vec<LineBox>,
    runs: Vec<Run>,
    inline_boxes: Vec<InlineBoxFragment>,
}

impl<'ctx> LineBuilder<'ctx> {
    pub fn new(
        items: &'ctx [InlineItem],
        tree: &'ctx BoxTree,
        floats: &'ctx FloatingState,
        constraints: ConstraintsForInFlowContent,
        strut: FontMetrics,
        expansion: &'ctx dyn ExpansionStrategy,
        justify_last_line: bool,
    ) -> Self {
        let text_align = tree
            .root_style()
            .map_or(TextAlign::Start, |style| style.text_align);
        Self {
            items,
            tree,
            floats,
            constraints,
            strut,
            text_align,
            expansion,
            justify_last_line,
            lines: Vec::new(),
            runs: Vec::new(),
            inline_boxes: Vec::new(),
        }
    }

    pub fn build(mut self) -> DisplayInlineContent {
        let mut index = 0;
        let mut top = self.constraints.vertical.logical_top;
        loop {
            index = self.skip_collapsible_whitespace(index);
            if index >= self.items.len() {
                break;
            }
            let (candidate, line_top, float_offset, available) = self.fit_line(index, top);
            index = candidate.next;
            top = self.emit_line(&candidate, line_top, float_offset, available);
        }
        trace!(
            "built {} lines with {} runs",
            self.lines.len(),
            self.runs.len()
        );
        DisplayInlineContent::new(self.lines, self.runs, self.inline_boxes)
    }

    fn skip_collapsible_whitespace(&self, mut index: usize) -> usize {
        while self
            .items
            .get(index)
            .is_some_and(InlineItem::is_collapsible_whitespace)
        {
            index += 1;
        }
        index
    }

    /// Place the line starting at item `start` no higher than `top`.
    ///
    /// The float band starts one strut tall. Once the items are chosen the
    /// band grows to the line's real height; if floats in the taller band
    /// take more room the line is placed again, until the band stops growing.
    fn fit_line(
        &self,
        start: usize,
        top: LayoutUnit,
    ) -> (LineCandidate, LayoutUnit, LayoutUnit, LayoutUnit) {
        let origin = self.constraints.vertical.logical_top;
        let mut band_top = top - origin;
        let mut band_height = self.strut.height();
        loop {
            let (line_top, offset, available) = self.line_position(band_top, band_height);
            let candidate = self.place_line(start, available);
            let (ascent, descent) = self.line_extent(&candidate);
            let height = ascent + descent;
            if height <= band_height {
                return (candidate, origin + line_top, offset, available);
            }
            let width = self.constraints.horizontal.logical_width;
            let taller = self.floats.available_space(line_top, line_top + height, width);
            if taller == (offset, available) {
                return (candidate, origin + line_top, offset, available);
            }
            trace!("line at {line_top:?} is {height:?} tall, refitting beside floats");
            band_top = line_top;
            band_height = height;
        }
    }

    /// Top, float offset and available width for a band of `height` starting
    /// at `band_top`, relative to the content box.
    ///
    /// Floats are only avoided by moving down when they leave no room at all.
    fn line_position(
        &self,
        mut band_top: LayoutUnit,
        height: LayoutUnit,
    ) -> (LayoutUnit, LayoutUnit, LayoutUnit) {
        let width = self.constraints.horizontal.logical_width;
        loop {
            let band_bottom = band_top + height;
            let (offset, available) = self.floats.available_space(band_top, band_bottom, width);
            if available > LayoutUnit::zero() || !self.floats.has_floats_in_band(band_top, band_bottom) {
                return (band_top, offset, available);
            }
            match self.floats.lowest_bottom_in_band(band_top, band_bottom) {
                Some(bottom) if bottom > band_top => {
                    trace!("no room beside floats at {band_top:?}, moving to {bottom:?}");
                    band_top = bottom;
                }
                _ => return (band_top, offset, available),
            }
        }
    }

    /// Ascent and descent of a line holding `candidate`, strut included.
    fn line_extent(&self, candidate: &LineCandidate) -> (LayoutUnit, LayoutUnit) {
        candidate
            .placed
            .iter()
            .filter_map(|placed| self.items.get(placed.index))
            .fold((self.strut.ascent, self.strut.descent), |(ascent, descent), item| {
                (ascent.max(item.metrics.ascent), descent.max(item.metrics.descent))
            })
    }

    fn place_line(&self, start: usize, available: LayoutUnit) -> LineCandidate {
        let mut placed: SmallVec<[PlacedItem; 16]> = SmallVec::new();
        let mut used = LayoutUnit::zero();
        let mut last_break: Option<usize> = None;
        let mut has_content = false;
        let mut overflowing = false;
        let mut index = start;

        while let Some(item) = self.items.get(index) {
            if item.is_line_break() {
                placed.push(PlacedItem {
                    index,
                    width: LayoutUnit::zero(),
                });
                return self.finish_candidate(placed, index + 1, true);
            }
            let width = match item.kind {
                InlineItemKind::Tab { interval, .. } => resolve_tab_width(interval, used),
                InlineItemKind::Text { .. }
                | InlineItemKind::ForcedBreak
                | InlineItemKind::SoftBreak { .. } => item.width,
            };
            // Whitespace hangs; it never pushes content to the next line.
            if !item.is_whitespace() && used + width > available {
                if has_content
                    && !overflowing
                    && let Some(count) = last_break
                {
                    placed.truncate(count);
                    let next = placed.last().map_or(index, |last| last.index + 1);
                    return self.finish_candidate(placed, next, false);
                }
                overflowing = true;
            }
            placed.push(PlacedItem { index, width });
            used += width;
            has_content |= !item.is_whitespace();
            index += 1;
            if item.can_break_after {
                if overflowing {
                    break;
                }
                last_break = Some(placed.len());
            }
        }
        self.finish_candidate(placed, index, false)
    }

    fn finish_candidate(
        &self,
        mut placed: SmallVec<[PlacedItem; 16]>,
        next: usize,
        forced: bool,
    ) -> LineCandidate {
        let break_item = if forced { placed.pop() } else { None };
        while placed
            .last()
            .and_then(|last| self.items.get(last.index))
            .is_some_and(InlineItem::is_collapsible_whitespace)
        {
            placed.pop();
        }
        let wrapped = !forced && self.skip_collapsible_whitespace(next) < self.items.len();
        let hyphen_width = placed
            .last()
            .and_then(|last| self.items.get(last.index))
            .and_then(|item| match item.kind {
                InlineItemKind::Text { hyphen_width, .. } if wrapped => hyphen_width,
                _ => None,
            });
        placed.extend(break_item);
        LineCandidate {
            placed,
            next,
            ends_with_forced_break: forced,
            hyphen_width,
        }
    }

    fn drafts_for(&self, candidate: &LineCandidate) -> SmallVec<[RunDraft; 8]> {
        let mut drafts: SmallVec<[RunDraft; 8]> = SmallVec::new();
        for placed in &candidate.placed {
            let Some(item) = self.items.get(placed.index) else {
                continue;
            };
            let kind = match item.kind {
                InlineItemKind::ForcedBreak => RunKind::ForcedLineBreak,
                InlineItemKind::SoftBreak { offset } => RunKind::SoftLineBreak { offset },
                InlineItemKind::Text { .. } | InlineItemKind::Tab { .. } => {
                    let Some((start, end)) = item.source_range() else {
                        continue;
                    };
                    let opportunities = u32::from(item.is_whitespace());
                    if let Some(last) = drafts.last_mut()
                        && last.layout_box == item.layout_box
                        && let RunKind::Text {
                            start: run_start,
                            length,
                            ..
                        } = &mut last.kind
                        && *run_start + *length == start
                    {
                        *length = end - *run_start;
                        last.width += placed.width;
                        last.opportunities += opportunities;
                        continue;
                    }
                    drafts.push(RunDraft {
                        layout_box: item.layout_box,
                        kind: RunKind::Text {
                            start,
                            length: end - start,
                            has_hyphen: false,
                        },
                        width: placed.width,
                        metrics: item.metrics,
                        opportunities,
                        expansion: LayoutUnit::zero(),
                    });
                    continue;
                }
            };
            drafts.push(RunDraft {
                layout_box: item.layout_box,
                kind,
                width: LayoutUnit::zero(),
                metrics: item.metrics,
                opportunities: 0,
                expansion: LayoutUnit::zero(),
            });
        }

        if let Some(hyphen_width) = candidate.hyphen_width
            && let Some(last) = drafts.last_mut()
            && let RunKind::Text { has_hyphen, .. } = &mut last.kind
        {
            *has_hyphen = true;
            last.width += hyphen_width;
        }
        drafts
    }

    /// Horizontal offset of the content inside the line, distributing
    /// justification into `drafts` when it applies.
    fn align(
        &self,
        drafts: &mut [RunDraft],
        candidate: &LineCandidate,
        available: LayoutUnit,
    ) -> LayoutUnit {
        let content_width: LayoutUnit = drafts.iter().map(|draft| draft.width).sum();
        let free = available - content_width;
        if free <= LayoutUnit::zero() {
            return LayoutUnit::zero();
        }
        match self.text_align {
            TextAlign::Start | TextAlign::Left => LayoutUnit::zero(),
            TextAlign::Right | TextAlign::End => free,
            TextAlign::Center => free / 2,
            TextAlign::Justify => {
                let is_last_line = self.skip_collapsible_whitespace(candidate.next) >= self.items.len();
                let justify = self.justify_last_line
                    || (!is_last_line && !candidate.ends_with_forced_break);
                if justify {
                    let counts: SmallVec<[u32; 8]> =
                        drafts.iter().map(|draft| draft.opportunities).collect();
                    let amounts = self.expansion.distribute(free, &counts);
                    for (draft, amount) in drafts.iter_mut().zip(amounts) {
                        draft.expansion = amount;
                    }
                }
                LayoutUnit::zero()
            }
        }
    }

    fn ink_overflow_for(&self, layout_box: LayoutBoxId, kind: RunKind, rect: LayoutRect) -> LayoutRect {
        if !matches!(kind, RunKind::Text { .. }) {
            return rect;
        }
        match self
            .tree
            .get(layout_box)
            .and_then(|layout_box| layout_box.style().text_shadow)
        {
            Some(shadow) => rect.unite(&rect.translate(shadow.offset).inflate(shadow.blur)),
            None => rect,
        }
    }

    /// Turn a candidate into a line box and runs. Returns the line bottom.
    fn emit_line(
        &mut self,
        candidate: &LineCandidate,
        line_top: LayoutUnit,
        float_offset: LayoutUnit,
        available: LayoutUnit,
    ) -> LayoutUnit {
        let line_index = self.lines.len();
        let first_run = self.runs.len();
        let mut drafts = self.drafts_for(candidate);
        let align_offset = self.align(&mut drafts, candidate, available);

        let (ascent, descent) = self.line_extent(candidate);
        let height = ascent + descent;
        let bottom = line_top + height;

        let line_left = self.constraints.horizontal.logical_left + float_offset;
        let content_left = line_left + align_offset;
        let last_position = drafts.len().saturating_sub(1);
        let mut offset = LayoutUnit::zero();
        for (position, draft) in drafts.iter().enumerate() {
            let width = draft.width + draft.expansion;
            let rect = LayoutRect::new(
                content_left + offset,
                line_top + ascent - draft.metrics.ascent,
                width,
                draft.metrics.height(),
            );
            let ink_overflow = self.ink_overflow_for(draft.layout_box, draft.kind, rect);
            self.runs.push(Run {
                kind: draft.kind,
                layout_box: draft.layout_box,
                line_index,
                offset_in_line: offset,
                rect,
                ascent: draft.metrics.ascent,
                expansion: Expansion {
                    amount: draft.expansion,
                    opportunities: draft.opportunities,
                    behavior: ExpansionBehavior {
                        forbid_leading: position == 0,
                        forbid_trailing: position == last_position,
                    },
                },
                ink_overflow,
            });
            offset += width;
        }

        let line_runs = self.runs.get(first_run..).unwrap_or_default();
        let mut fragments: SmallVec<[InlineBoxFragment; 4]> = SmallVec::new();
        for run in line_runs {
            for ancestor in self.tree.inline_ancestors(run.layout_box) {
                if let Some(fragment) = fragments
                    .iter_mut()
                    .find(|fragment| fragment.layout_box == ancestor)
                {
                    fragment.rect = fragment.rect.unite(&run.rect);
                } else {
                    fragments.push(InlineBoxFragment {
                        layout_box: ancestor,
                        line_index,
                        rect: run.rect,
                    });
                }
            }
        }
        let line_rect = LayoutRect::new(line_left, line_top, available, height);
        let content_rect = LayoutRect::new(content_left, line_top, offset, height);
        let scrollable_overflow = line_rect.unite(&content_rect);
        let ink_overflow = line_runs
            .iter()
            .fold(scrollable_overflow, |acc, run| acc.unite(&run.ink_overflow));
        self.inline_boxes.extend(fragments);

        trace!(
            "line {line_index}: top {line_top:?}, {} runs, width {offset:?} of {available:?}",
            drafts.len()
        );
        self.lines.push(LineBox {
            top: line_top,
            bottom,
            baseline: ascent,
            left: line_left,
            width: available,
            content_left,
            content_width: offset,
            scrollable_overflow,
            ink_overflow,
            first_run,
            run_count: drafts.len(),
            ends_with_forced_break: candidate.ends_with_forced_break,
        });
        bottom
    }
}
