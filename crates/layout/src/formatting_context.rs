//! The inline formatting context: owns the box tree, floating state and
//! display content of one block container and drives layout passes.

use crate::config::LineLayoutConfig;
use crate::constraints::ConstraintsForInFlowContent;
use crate::display::{DisplayInlineContent, Run, RunsForRect};
use crate::error::LineLayoutError;
use crate::inline_items::{InlineItem, InlineItemsBuilder};
use crate::invalidation::{DirtyKind, FormattingState, InvalidationState};
use crate::justify::{ExpansionStrategy, InterWordExpansion};
use crate::line_builder::LineBuilder;
use anyhow::Result;
use inline_layout_box_tree::{BoxTree, InlineStyle, NodeKey, RenderTreeReader};
use inline_layout_float::{FloatListReader, FloatingState};
use inline_layout_geometry::{LayoutRect, LayoutUnit};
use inline_layout_text::{FontMetrics, FontMetricsProvider, TextMeasurer};
use log::{debug, trace};
use std::sync::Arc;
use tracing::info_span;

/// Measured items kept between passes.
#[derive(Clone, Debug)]
struct ItemCache {
    items: Vec<InlineItem>,
    strut: FontMetrics,
}

/// Inline layout for one block container.
///
/// Single-threaded: layout and queries must not run concurrently on the same
/// instance. Runs and boxes refer to each other by id; ids from a previous
/// pass must be re-resolved through the queries after every layout.
pub struct InlineFormattingContext {
    box_tree: BoxTree,
    floating_state: FloatingState,
    display_content: DisplayInlineContent,
    item_cache: Option<ItemCache>,
    state: FormattingState,
    /// Invalidations recorded by our own mutation methods since the last pass.
    pending: DirtyKind,
    constraints: ConstraintsForInFlowContent,
    config: LineLayoutConfig,
    measurer: Box<dyn TextMeasurer>,
    font_metrics: Box<dyn FontMetricsProvider>,
    expansion: Box<dyn ExpansionStrategy>,
}

impl InlineFormattingContext {
    pub fn new(
        box_tree: BoxTree,
        measurer: Box<dyn TextMeasurer>,
        font_metrics: Box<dyn FontMetricsProvider>,
        config: LineLayoutConfig,
    ) -> Self {
        Self {
            box_tree,
            floating_state: FloatingState::new(),
            display_content: DisplayInlineContent::default(),
            item_cache: None,
            state: FormattingState::Empty,
            pending: DirtyKind::CONTENT,
            constraints: ConstraintsForInFlowContent::default(),
            config,
            measurer,
            font_metrics,
            expansion: Box::new(InterWordExpansion),
        }
    }

    /// Mirror `container` from `reader` and wrap it in a formatting context.
    ///
    /// # Errors
    /// Returns an error if the reader does not know `container`.
    pub fn build(
        reader: &dyn RenderTreeReader,
        container: NodeKey,
        measurer: Box<dyn TextMeasurer>,
        font_metrics: Box<dyn FontMetricsProvider>,
        config: LineLayoutConfig,
    ) -> Result<Self> {
        let box_tree = BoxTree::build(reader, container)?;
        Ok(Self::new(box_tree, measurer, font_metrics, config))
    }

    /// Replace the justification strategy.
    #[must_use]
    pub fn with_expansion_strategy(mut self, expansion: Box<dyn ExpansionStrategy>) -> Self {
        self.expansion = expansion;
        self.pending = self.pending.or(DirtyKind::GEOMETRY);
        self
    }

    pub const fn box_tree(&self) -> &BoxTree {
        &self.box_tree
    }

    pub const fn floating_state(&self) -> &FloatingState {
        &self.floating_state
    }

    /// Direct access for hosts that append floats one by one; call
    /// `clear()` first on every pass.
    pub fn floating_state_mut(&mut self) -> &mut FloatingState {
        &mut self.floating_state
    }

    /// Refill the floating state from the host's float list.
    pub fn prepare_floating_state(&mut self, reader: &dyn FloatListReader) {
        self.floating_state.prepare(reader);
    }

    pub const fn config(&self) -> &LineLayoutConfig {
        &self.config
    }

    pub const fn state(&self) -> FormattingState {
        self.state
    }

    pub const fn display_content(&self) -> &DisplayInlineContent {
        &self.display_content
    }

    /// Lay out the in-flow content and replace the display content.
    ///
    /// Lines are always rebuilt. Measured items are reused unless content,
    /// structure or style changed (per `invalidation` or our own records).
    pub fn layout_in_flow_content(
        &mut self,
        invalidation: &InvalidationState,
        constraints: &ConstraintsForInFlowContent,
    ) {
        let _span = info_span!("inline.layout_in_flow_content").entered();
        let dirty = invalidation.dirty.or(self.pending);
        if self.item_cache.is_none() || dirty.intersects(DirtyKind::CONTENT) {
            self.item_cache = Some(self.measure_items());
        }
        self.constraints = *constraints;

        let content = match &self.item_cache {
            Some(cache) => LineBuilder::new(
                &cache.items,
                &self.box_tree,
                &self.floating_state,
                *constraints,
                cache.strut,
                self.expansion.as_ref(),
                self.config.justify_last_line,
            )
            .build(),
            None => DisplayInlineContent::default(),
        };
        self.display_content = content;
        self.pending = DirtyKind::NONE;
        self.state = if self.display_content.is_empty() {
            FormattingState::Empty
        } else {
            FormattingState::LaidOut
        };
        debug!(
            "laid out {} lines, {} runs",
            self.display_content.line_count(),
            self.display_content.runs().len()
        );
    }

    fn measure_items(&self) -> ItemCache {
        let mut builder = InlineItemsBuilder::new(
            &self.box_tree,
            self.measurer.as_ref(),
            self.font_metrics.as_ref(),
            &self.config,
        );
        let strut = self
            .box_tree
            .root_style()
            .map_or_else(FontMetrics::default, |style| builder.strut(style));
        ItemCache {
            items: builder.build(),
            strut,
        }
    }

    fn invalidate(&mut self, dirty: DirtyKind) {
        self.pending = self.pending.or(dirty);
        if dirty.intersects(DirtyKind::CONTENT) {
            self.state = FormattingState::Stale;
        }
    }

    /// Install a new style for the block container.
    ///
    /// Returns whether layout is needed. Paint-only changes keep the current
    /// display content valid.
    pub fn update_style(&mut self, root_style: Arc<InlineStyle>) -> bool {
        let needs_layout = self.box_tree.update_style(root_style);
        self.invalidate(if needs_layout {
            DirtyKind::STYLE
        } else {
            DirtyKind::PAINT
        });
        needs_layout
    }

    /// Mirror a node the host inserted under `parent`.
    ///
    /// # Errors
    /// Returns an error if `parent` is not part of this formatting context or
    /// `node` already is.
    pub fn insert_node(
        &mut self,
        reader: &dyn RenderTreeReader,
        parent: NodeKey,
        node: NodeKey,
    ) -> Result<()> {
        self.box_tree.insert_child(reader, parent, node)?;
        self.invalidate(DirtyKind::STRUCTURE);
        Ok(())
    }

    /// Forget a node the host removed. Returns false if it was not mirrored.
    pub fn remove_node(&mut self, node: NodeKey) -> bool {
        let removed = self.box_tree.remove_subtree(node);
        if removed {
            self.invalidate(DirtyKind::STRUCTURE);
        }
        removed
    }

    /// Update the content of a text node. Returns whether anything changed.
    pub fn set_text(&mut self, node: NodeKey, text: &str) -> bool {
        let changed = self.box_tree.set_text(node, text);
        if changed {
            self.invalidate(DirtyKind::TEXT);
        }
        changed
    }

    pub fn line_count(&self) -> usize {
        self.display_content.line_count()
    }

    /// # Errors
    /// Returns `NotLaidOut` if there are no lines.
    pub fn try_content_logical_height(&self) -> Result<LayoutUnit, LineLayoutError> {
        self.display_content
            .content_logical_height()
            .ok_or(LineLayoutError::NotLaidOut)
    }

    /// Height from the first line's top to the last line's bottom. Zero (and a
    /// debug assertion) without lines.
    pub fn content_logical_height(&self) -> LayoutUnit {
        self.assert_laid_out();
        self.try_content_logical_height().unwrap_or_default()
    }

    /// # Errors
    /// Returns `NotLaidOut` if there are no lines.
    pub fn try_first_line_baseline(&self) -> Result<LayoutUnit, LineLayoutError> {
        self.display_content
            .first_line_baseline()
            .ok_or(LineLayoutError::NotLaidOut)
    }

    pub fn first_line_baseline(&self) -> LayoutUnit {
        self.assert_laid_out();
        self.try_first_line_baseline().unwrap_or_default()
    }

    /// # Errors
    /// Returns `NotLaidOut` if there are no lines.
    pub fn try_last_line_baseline(&self) -> Result<LayoutUnit, LineLayoutError> {
        self.display_content
            .last_line_baseline()
            .ok_or(LineLayoutError::NotLaidOut)
    }

    pub fn last_line_baseline(&self) -> LayoutUnit {
        self.assert_laid_out();
        self.try_last_line_baseline().unwrap_or_default()
    }

    fn assert_laid_out(&self) {
        debug_assert!(
            self.line_count() > 0,
            "{}",
            LineLayoutError::NotLaidOut
        );
    }

    /// Runs overlapping the vertical band of `rect`, in layout order.
    pub fn runs_for_rect(&self, rect: &LayoutRect) -> RunsForRect<'_> {
        self.display_content.runs_for_rect(rect)
    }

    /// # Errors
    /// Returns `UnmappedNode` if `node` is outside this formatting context.
    pub fn try_text_runs_for(&self, node: NodeKey) -> Result<&[Run], LineLayoutError> {
        let layout_box = self
            .box_tree
            .layout_box_for(node)
            .ok_or(LineLayoutError::UnmappedNode(node))?;
        Ok(self.display_content.runs_for_box(layout_box))
    }

    /// Runs of a text node; empty for unknown nodes or text with no runs.
    pub fn text_runs_for(&self, node: NodeKey) -> &[Run] {
        self.try_text_runs_for(node).unwrap_or_default()
    }

    /// Union of an inline box's fragments over all lines.
    pub fn element_box_for(&self, node: NodeKey) -> Option<LayoutRect> {
        let layout_box = self.box_tree.layout_box_for(node)?;
        if !self.box_tree.get(layout_box)?.is_inline_box() {
            return None;
        }
        self.display_content
            .fragments_for_box(layout_box)
            .map(|fragment| fragment.rect)
            .reduce(|acc, rect| acc.unite(&rect))
    }

    /// Drop the measured item cache and run index; displayed geometry stays.
    pub fn release_run_cache(&mut self) {
        trace!("releasing inline item cache");
        self.item_cache = None;
        self.display_content.clear_run_index();
    }

    /// Whether measured items are cached for the next pass.
    pub const fn has_item_cache(&self) -> bool {
        self.item_cache.is_some()
    }

    /// Whether the content is taller than the definite available height.
    pub fn has_vertical_overflow(&self) -> bool {
        match (
            self.constraints.vertical.logical_height,
            self.display_content.content_logical_height(),
        ) {
            (Some(available), Some(height)) => height > available,
            _ => false,
        }
    }
}
