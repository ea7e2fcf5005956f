//! Justification: how a line's free space is split across its runs.
//!
//! Distribution is a strategy so hosts following different justification
//! rules can swap it without touching the line builder.

use core::fmt::Debug;
use inline_layout_geometry::LayoutUnit;
use serde::Serialize;

/// Which edges of a run may receive expansion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ExpansionBehavior {
    /// The run starts the line; no space may be added before it.
    pub forbid_leading: bool,
    /// The run ends the line; no space may be added after it.
    pub forbid_trailing: bool,
}

/// Extra width given to a run by justification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Expansion {
    pub amount: LayoutUnit,
    /// Expansion opportunities (inter-word spaces) inside the run.
    pub opportunities: u32,
    pub behavior: ExpansionBehavior,
}

/// Splits a line's free space across its runs.
pub trait ExpansionStrategy: Debug {
    /// Distribute `extra` over runs with the given opportunity counts.
    ///
    /// Returns exactly one amount per entry of `opportunities`; the amounts
    /// never sum to more than `extra`.
    fn distribute(&self, extra: LayoutUnit, opportunities: &[u32]) -> Vec<LayoutUnit>;
}

/// Splits free space evenly across inter-word opportunities.
///
/// Leftover 1/64px units go one per opportunity to the earliest runs, so the
/// total handed out is exactly `extra`.
#[derive(Clone, Copy, Debug, Default)]
pub struct InterWordExpansion;

impl ExpansionStrategy for InterWordExpansion {
    fn distribute(&self, extra: LayoutUnit, opportunities: &[u32]) -> Vec<LayoutUnit> {
        let total: u32 = opportunities.iter().sum();
        if total == 0 || extra <= LayoutUnit::zero() {
            return vec![LayoutUnit::zero(); opportunities.len()];
        }
        let total = total as i32;
        let per_opportunity = extra.raw() / total;
        let mut remainder = extra.raw() % total;
        opportunities
            .iter()
            .map(|&count| {
                let count = count as i32;
                let bonus = remainder.min(count);
                remainder -= bonus;
                LayoutUnit::from_raw(per_opportunity * count + bonus)
            })
            .collect()
    }
}

/// Never expands; justified lines are laid out as start-aligned.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoExpansion;

impl ExpansionStrategy for NoExpansion {
    fn distribute(&self, _extra: LayoutUnit, opportunities: &[u32]) -> Vec<LayoutUnit> {
        vec![LayoutUnit::zero(); opportunities.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Space is split per opportunity and the remainder goes to early runs.
    ///
    /// # Panics
    /// Panics if amounts are not proportional or do not add up.
    #[test]
    fn inter_word_distribution() {
        let extra = LayoutUnit::from_raw(100);
        let amounts = InterWordExpansion.distribute(extra, &[1, 0, 2]);
        // 100 / 3 = 33 rem 1; the first run takes the spare unit.
        assert_eq!(
            amounts,
            vec![
                LayoutUnit::from_raw(34),
                LayoutUnit::zero(),
                LayoutUnit::from_raw(66)
            ]
        );
        assert_eq!(amounts.into_iter().sum::<LayoutUnit>(), extra);
    }

    /// Without opportunities or free space nothing is distributed.
    ///
    /// # Panics
    /// Panics if any amount is non-zero.
    #[test]
    fn nothing_to_distribute() {
        let zeros = vec![LayoutUnit::zero(); 2];
        assert_eq!(InterWordExpansion.distribute(LayoutUnit::from_px_i32(5), &[0, 0]), zeros);
        assert_eq!(InterWordExpansion.distribute(LayoutUnit::from_px_i32(-5), &[1, 1]), zeros);
        assert_eq!(NoExpansion.distribute(LayoutUnit::from_px_i32(5), &[3, 1]), zeros);
    }
}
