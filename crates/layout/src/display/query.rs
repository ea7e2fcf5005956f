//! Vertical band queries over laid out runs.

use crate::display::content::{DisplayInlineContent, Run};
use inline_layout_geometry::{LayoutRect, LayoutUnit};

/// Runs whose rect overlaps a vertical band, in layout order.
///
/// Lines are sorted top to bottom, so the first candidate line is found by
/// binary search and iteration stops at the first line below the band.
/// Cloning restarts from the clone point.
#[derive(Clone, Debug)]
pub struct RunsForRect<'content> {
    content: &'content DisplayInlineContent,
    top: LayoutUnit,
    bottom: LayoutUnit,
    line: usize,
    run: usize,
}

impl<'content> RunsForRect<'content> {
    pub(crate) fn new(content: &'content DisplayInlineContent, rect: &LayoutRect) -> Self {
        let top = rect.y;
        let bottom = rect.max_y();
        let line = content.lines.partition_point(|candidate| candidate.bottom <= top);
        let run = content.lines.get(line).map_or(0, |first| first.first_run);
        Self {
            content,
            top,
            bottom,
            line,
            run,
        }
    }
}

impl<'content> Iterator for RunsForRect<'content> {
    type Item = &'content Run;

    fn next(&mut self) -> Option<&'content Run> {
        let content = self.content;
        while let Some(line) = content.lines.get(self.line) {
            if line.top >= self.bottom {
                return None;
            }
            let end = line.first_run + line.run_count;
            while self.run < end {
                let candidate = content.runs.get(self.run)?;
                self.run += 1;
                if candidate.rect.intersects_vertical_band(self.top, self.bottom) {
                    return Some(candidate);
                }
            }
            self.line += 1;
        }
        None
    }
}

impl DisplayInlineContent {
    /// Runs overlapping the vertical band of `rect`.
    pub fn runs_for_rect(&self, rect: &LayoutRect) -> RunsForRect<'_> {
        RunsForRect::new(self, rect)
    }
}
