//! Inline layout for one block container.
//!
//! The crate mirrors the container's inline children into a box tree, breaks
//! them into lines around the floats of the current pass, and keeps the
//! result as display content for paint, hit testing and geometry queries.
//! Text shaping and font loading are collaborators supplied by the host.

pub mod config;
pub mod constraints;
/// Laid out lines and runs and the queries over them
pub mod display;
pub mod error;
pub mod formatting_context;
pub mod inline_items;
pub mod invalidation;
pub mod justify;
/// Greedy line breaking
mod line_builder;
/// Paint output for laid out runs
pub mod paint;

pub use config::LineLayoutConfig;
pub use constraints::{ConstraintsForInFlowContent, HorizontalConstraints, VerticalConstraints};
pub use display::{DisplayInlineContent, InlineBoxFragment, LineBox, Run, RunKind, RunsForRect};
pub use error::LineLayoutError;
pub use formatting_context::InlineFormattingContext;
pub use hit_test::{HitTestAction, HitTestLocation, HitTestProgress, HitTestResultSink};
pub use invalidation::{DirtyKind, FormattingState, InvalidationState};
pub use justify::{Expansion, ExpansionBehavior, ExpansionStrategy, InterWordExpansion, NoExpansion};
pub use paint::{PaintContext, PaintPhase, PaintRecording, TextPaintCommand, TextPaintStyle};
