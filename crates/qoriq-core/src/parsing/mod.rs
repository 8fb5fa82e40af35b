//! Per-value parsers with an explicit conservative fallback.
//!
//! Parsers never raise and never silently produce a missing value: they
//! return [`ParseOutcome::Unparsed`] carrying the original text, and the
//! caller decides what to keep.

mod dates;
mod patterns;

pub use dates::{format_iso_date, parse_date, parse_date_strict};
pub use patterns::{contains_at_sign, is_ssn, is_valid_email, looks_like_phone};

use serde::{Deserialize, Serialize};

/// Result of parsing one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseOutcome<T> {
    Parsed(T),
    Unparsed(String),
}

impl<T> ParseOutcome<T> {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }

    pub fn parsed(&self) -> Option<&T> {
        match self {
            Self::Parsed(v) => Some(v),
            Self::Unparsed(_) => None,
        }
    }

    /// Render as text: parsed values through `render`, unparsed values as
    /// their original text.
    pub fn into_text(self, render: impl FnOnce(T) -> String) -> String {
        match self {
            Self::Parsed(v) => render(v),
            Self::Unparsed(original) => original,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparsed_keeps_original_text() {
        let outcome: ParseOutcome<i32> = ParseOutcome::Unparsed("unclear_date".to_string());
        assert!(!outcome.is_parsed());
        assert_eq!(outcome.parsed(), None);
        assert_eq!(outcome.into_text(|v| v.to_string()), "unclear_date");
    }

    #[test]
    fn test_parsed_renders() {
        let outcome = ParseOutcome::Parsed(7);
        assert_eq!(outcome.parsed(), Some(&7));
        assert_eq!(outcome.into_text(|v| format!("#{v}")), "#7");
    }
}
