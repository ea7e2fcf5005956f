//! Painting: forwards visible runs to the host's paint collaborator.

use crate::display::{Run, RunKind};
use crate::error::LineLayoutError;
use crate::formatting_context::InlineFormattingContext;
use crate::justify::Expansion;
use inline_layout_box_tree::{LayoutBox, NodeKey, Rgba, TextDecoration, TextShadow};
use inline_layout_geometry::{LayoutPoint, LayoutRect, LayoutUnit};
use inline_layout_text::SOFT_HYPHEN;
use log::debug;
use serde::Serialize;
use tracing::info_span;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PaintPhase {
    Foreground,
    /// Collect the areas that receive input events instead of painting.
    EventRegion,
    Selection,
    Outline,
    Mask,
}

/// Shadow drawn under every run when `debug_text_shadow` is enabled.
const DEBUG_TEXT_SHADOW: TextShadow = TextShadow {
    offset: LayoutPoint::from_px_i32(1, 1),
    blur: LayoutUnit::zero(),
    color: Rgba {
        red: 255,
        green: 0,
        blue: 255,
        alpha: 160,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TextPaintStyle {
    Fill { color: Rgba },
    FillWithShadow { color: Rgba, shadow: TextShadow },
}

/// One text run ready for the text painter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextPaintCommand {
    pub node: NodeKey,
    /// Text as displayed: collapsed whitespace, no soft hyphens, a trailing
    /// `-` when the line breaks at a hyphenation point.
    pub text: String,
    /// Left end of the baseline, in paint coordinates.
    pub origin: LayoutPoint,
    pub width: LayoutUnit,
    pub expansion: Expansion,
    pub style: TextPaintStyle,
    pub decoration: TextDecoration,
}

/// Receiver of paint output.
pub trait PaintContext {
    fn draw_text(&mut self, command: &TextPaintCommand);
    fn unite_event_region(&mut self, rect: LayoutRect);
}

/// A `PaintContext` that records everything it receives.
#[derive(Clone, Debug, Default)]
pub struct PaintRecording {
    pub commands: Vec<TextPaintCommand>,
    pub event_region: Option<LayoutRect>,
}

impl PaintContext for PaintRecording {
    fn draw_text(&mut self, command: &TextPaintCommand) {
        self.commands.push(command.clone());
    }

    fn unite_event_region(&mut self, rect: LayoutRect) {
        self.event_region = Some(
            self.event_region
                .map_or(rect, |region| region.unite(&rect)),
        );
    }
}

/// Text as it appears on screen for a run's source slice.
fn displayed_text(source: &str, collapse_spaces: bool, has_hyphen: bool) -> String {
    let mut text = String::with_capacity(source.len() + 1);
    let mut after_space = false;
    for ch in source.chars().filter(|ch| *ch != SOFT_HYPHEN) {
        if collapse_spaces && matches!(ch, ' ' | '\t' | '\n') {
            if !after_space {
                text.push(' ');
            }
            after_space = true;
            continue;
        }
        after_space = false;
        text.push(ch);
    }
    if has_hyphen {
        text.push('-');
    }
    text
}

impl InlineFormattingContext {
    /// Paint the runs overlapping `paint_rect`, in layout order.
    ///
    /// `paint_rect` is in paint coordinates; `paint_offset` maps
    /// formatting-context coordinates into them.
    pub fn paint(
        &self,
        phase: PaintPhase,
        paint_rect: &LayoutRect,
        paint_offset: LayoutPoint,
        context: &mut dyn PaintContext,
    ) {
        if !matches!(phase, PaintPhase::Foreground | PaintPhase::EventRegion) {
            debug!(
                "{}",
                LineLayoutError::InvalidState(format!("paint phase {phase:?} is not handled"))
            );
            return;
        }
        let _span = info_span!("inline.paint").entered();
        let mut damage = paint_rect.translate(LayoutPoint::new(-paint_offset.x, -paint_offset.y));
        if self.config().debug_text_shadow {
            // Runs just outside the damage may still cast their shadow into it.
            let offset = DEBUG_TEXT_SHADOW.offset;
            damage = damage.unite(&damage.translate(LayoutPoint::new(-offset.x, -offset.y)));
        }
        for run in self.runs_for_rect(&damage) {
            let Some(layout_box) = self.box_tree().get(run.layout_box) else {
                continue;
            };
            if !layout_box.style().is_visible() || !run.ink_overflow.intersects(&damage) {
                continue;
            }
            if phase == PaintPhase::EventRegion {
                context.unite_event_region(run.ink_overflow.translate(paint_offset));
            } else if let Some(command) = self.text_paint_command(run, layout_box, paint_offset) {
                context.draw_text(&command);
            }
        }
    }

    fn text_paint_command(
        &self,
        run: &Run,
        layout_box: &LayoutBox,
        paint_offset: LayoutPoint,
    ) -> Option<TextPaintCommand> {
        let RunKind::Text { has_hyphen, .. } = run.kind else {
            return None;
        };
        let node = self.box_tree().renderer_for(run.layout_box)?;
        let source = layout_box.as_text()?.get(run.text_range()?)?;
        let style = layout_box.style();
        let shadow = if self.config().debug_text_shadow {
            Some(DEBUG_TEXT_SHADOW)
        } else {
            style.text_shadow
        };
        let paint_style = match shadow {
            Some(shadow) => TextPaintStyle::FillWithShadow {
                color: style.color,
                shadow,
            },
            None => TextPaintStyle::Fill { color: style.color },
        };
        Some(TextPaintCommand {
            node,
            text: displayed_text(source, style.white_space.collapses_spaces(), has_hyphen),
            origin: LayoutPoint::new(
                run.rect.x + paint_offset.x,
                run.rect.y + run.ascent + paint_offset.y,
            ),
            width: run.rect.width,
            expansion: run.expansion,
            style: paint_style,
            decoration: style.text_decoration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Displayed text collapses spaces, drops soft hyphens and shows the hyphen.
    ///
    /// # Panics
    /// Panics if the rendered text differs.
    #[test]
    fn displayed_text_rules() {
        assert_eq!(displayed_text("a \t b", true, false), "a b");
        assert_eq!(displayed_text("a \t b", false, false), "a \t b");
        assert_eq!(displayed_text("hy\u{AD}", true, true), "hy-");
    }

    /// The recording context unites event regions.
    ///
    /// # Panics
    /// Panics if the region is not the union of both rectangles.
    #[test]
    fn recording_unites_regions() {
        let mut recording = PaintRecording::default();
        recording.unite_event_region(LayoutRect::from_px_i32(0, 0, 10, 10));
        recording.unite_event_region(LayoutRect::from_px_i32(20, 5, 10, 10));
        assert_eq!(
            recording.event_region,
            Some(LayoutRect::from_px_i32(0, 0, 30, 15))
        );
    }
}
