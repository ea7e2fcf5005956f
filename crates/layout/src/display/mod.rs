//! The display inline content cache: laid out lines, runs and inline box
//! fragments of one formatting context, plus the queries over them.

pub mod content;
pub mod query;
pub mod serialization;

pub use content::{DisplayInlineContent, InlineBoxFragment, LineBox, Run, RunKind};
pub use query::RunsForRect;
