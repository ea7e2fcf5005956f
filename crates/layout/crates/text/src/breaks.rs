//! UAX #14 line break opportunities.

use unicode_linebreak::{BreakOpportunity as Uax14Break, linebreaks};

/// U+00AD SOFT HYPHEN: invisible unless a line breaks right after it.
pub const SOFT_HYPHEN: char = '\u{ad}';

/// A position where a line may (or must) end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BreakOpportunity {
    /// Byte offset in the measured text; the break falls before this byte.
    pub offset: usize,
    /// Hard break (e.g. after a newline).
    pub mandatory: bool,
    /// Breaking here shows a hyphen (the preceding char is a soft hyphen).
    pub hyphen: bool,
}

/// Break opportunities of `text` per UAX #14, in offset order.
///
/// The end of the text is never reported: whether a line may end there
/// depends on what follows in the next box.
pub fn uax14_opportunities(text: &str) -> Vec<BreakOpportunity> {
    linebreaks(text)
        .filter(|(offset, _)| *offset < text.len())
        .map(|(offset, kind)| BreakOpportunity {
            offset,
            mandatory: matches!(kind, Uax14Break::Mandatory),
            hyphen: text
                .get(..offset)
                .is_some_and(|prefix| prefix.ends_with(SOFT_HYPHEN)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Spaces allow a break after them, not before.
    ///
    /// # Panics
    /// Panics if the opportunity is not right after the space.
    #[test]
    fn break_after_space() {
        let found = uax14_opportunities("Hello World");
        assert_eq!(
            found,
            vec![BreakOpportunity {
                offset: 6,
                mandatory: false,
                hyphen: false,
            }]
        );
    }

    /// Soft hyphens are break opportunities that show a hyphen.
    ///
    /// # Panics
    /// Panics if the soft hyphen break is missing or unflagged.
    #[test]
    fn soft_hyphen_flags_break() {
        let text = "hy\u{ad}phen";
        let found = uax14_opportunities(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].offset, 4);
        assert!(found[0].hyphen);
    }

    /// Newlines produce mandatory breaks; text end is not reported.
    ///
    /// # Panics
    /// Panics if the newline break is not mandatory.
    #[test]
    fn newline_is_mandatory() {
        let found = uax14_opportunities("one\ntwo\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].offset, 4);
        assert!(found[0].mandatory);
    }

    /// Empty text has no opportunities.
    ///
    /// # Panics
    /// Panics if anything is reported.
    #[test]
    fn empty_text() {
        assert!(uax14_opportunities("").is_empty());
    }
}
