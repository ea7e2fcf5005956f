//! Text collaborators consumed by inline layout.
//!
//! Shaping is outside this workspace: the line builder only asks a
//! [`TextMeasurer`] for advances and break opportunities and a
//! [`FontMetricsProvider`] for ascent/descent. The reference implementations
//! here are deterministic, which is what tests and benches need.

pub mod breaks;
pub mod measure;
pub mod metrics;

pub use breaks::{BreakOpportunity, SOFT_HYPHEN, uax14_opportunities};
pub use measure::{FixedAdvanceMeasurer, TextMeasurer};
pub use metrics::{FontMetrics, FontMetricsProvider, ProportionalFontMetrics};
