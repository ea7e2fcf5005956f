//! Criterion benchmarks for line breaking.
//!
//! A single formatting context holds `n` text nodes of a few words each, then
//! we measure:
//! - A full pass that re-measures every item.
//! - A geometry-only pass that reuses the measured items and only re-breaks
//!   lines for a new width.

use anyhow::Result;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use inline_layout::{
    ConstraintsForInFlowContent, InlineFormattingContext, InvalidationState, LineLayoutConfig,
};
use inline_layout_box_tree::{InlineStyle, MemoryRenderTree};
use inline_layout_geometry::LayoutUnit;
use inline_layout_text::{FixedAdvanceMeasurer, ProportionalFontMetrics};
use std::hint::black_box;
use std::sync::Arc;

fn build_context(count: usize) -> Result<InlineFormattingContext> {
    let mut render = MemoryRenderTree::new(Arc::new(InlineStyle::default()));
    let root = render.root();
    for index in 0..count {
        if index % 7 == 6 {
            render.append_line_break(root)?;
        }
        render.append_text(root, &format!("hello {index} wrapped world "))?;
    }
    InlineFormattingContext::build(
        &render,
        root,
        Box::new(FixedAdvanceMeasurer::default()),
        Box::new(ProportionalFontMetrics),
        LineLayoutConfig::default(),
    )
}

fn bench_line_breaking(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("line_breaking");
    for &count in &[100_usize, 1_000, 5_000] {
        let Ok(mut context) = build_context(count) else {
            continue;
        };
        let narrow = ConstraintsForInFlowContent::with_width(LayoutUnit::from_px_i32(240));
        let wide = ConstraintsForInFlowContent::with_width(LayoutUnit::from_px_i32(800));

        group.bench_with_input(BenchmarkId::new("full", count), &count, |bencher, _| {
            bencher.iter(|| {
                context.layout_in_flow_content(&InvalidationState::full(), &narrow);
                black_box(context.line_count());
            });
        });

        let mut use_wide = false;
        group.bench_with_input(BenchmarkId::new("geometry_only", count), &count, |bencher, _| {
            bencher.iter(|| {
                use_wide = !use_wide;
                let constraints = if use_wide { &wide } else { &narrow };
                context.layout_in_flow_content(&InvalidationState::geometry_only(), constraints);
                black_box(context.line_count());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_line_breaking);
criterion_main!(benches);
