//! JSON dumps of display content, for debugging and comparing passes.

use crate::display::content::DisplayInlineContent;
use anyhow::{Context as _, Result};

impl DisplayInlineContent {
    /// Pretty-printed JSON of every line, run and fragment.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize display inline content")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Empty content serializes with empty sequences.
    ///
    /// # Panics
    /// Panics if the dump is missing a field.
    #[test]
    fn empty_dump() -> Result<()> {
        let json = DisplayInlineContent::default().to_json()?;
        let value: serde_json::Value = serde_json::from_str(&json)?;
        assert_eq!(value["lines"], serde_json::json!([]));
        assert_eq!(value["runs"], serde_json::json!([]));
        assert!(value.get("run_index").is_none());
        Ok(())
    }
}
