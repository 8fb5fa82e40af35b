//! Date parsing with a day-first fallback.

use super::ParseOutcome;
use crate::utils::coerce_numeric;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Date-only layouts tried on the first (month-first) pass.
const DATE_FORMATS: [&str; 12] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Date-time layouts tried on the first pass; the time part is dropped.
const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DAY_FIRST_DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

const DAY_FIRST_DATETIME_FORMATS: [&str; 2] = ["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"];

fn try_formats(text: &str, dates: &[&str], datetimes: &[&str]) -> Option<NaiveDate> {
    dates
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            datetimes
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn first_pass(text: &str) -> Option<NaiveDate> {
    try_formats(text, &DATE_FORMATS, &DATETIME_FORMATS).or_else(|| {
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| dt.date_naive())
    })
}

/// Parse with month-first and ISO layouts only.
///
/// Bare numbers (`"20230115"`, `"42"`, `"3.5"`) are never dates.
pub fn parse_date_strict(text: &str) -> ParseOutcome<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() || coerce_numeric(trimmed).is_some() {
        return ParseOutcome::Unparsed(text.to_string());
    }
    match first_pass(trimmed) {
        Some(date) => ParseOutcome::Parsed(date),
        None => ParseOutcome::Unparsed(text.to_string()),
    }
}

/// Parse strictly, then retry values that failed with day-first layouts.
pub fn parse_date(text: &str) -> ParseOutcome<NaiveDate> {
    match parse_date_strict(text) {
        ParseOutcome::Unparsed(original) => {
            let trimmed = original.trim();
            if trimmed.is_empty() || coerce_numeric(trimmed).is_some() {
                return ParseOutcome::Unparsed(original);
            }
            match try_formats(trimmed, &DAY_FIRST_DATE_FORMATS, &DAY_FIRST_DATETIME_FORMATS) {
                Some(date) => ParseOutcome::Parsed(date),
                None => ParseOutcome::Unparsed(original),
            }
        }
        parsed => parsed,
    }
}

/// Render as `YYYY-MM-DD`.
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iso(text: &str) -> Option<String> {
        parse_date(text).parsed().map(|d| format_iso_date(*d))
    }

    #[test]
    fn test_iso_dates_parse() {
        assert_eq!(iso("2023-01-15").as_deref(), Some("2023-01-15"));
        assert_eq!(iso(" 2023/03/10 ").as_deref(), Some("2023-03-10"));
    }

    #[test]
    fn test_month_first_wins_when_ambiguous() {
        assert_eq!(iso("03/04/2023").as_deref(), Some("2023-03-04"));
    }

    #[test]
    fn test_day_first_fallback() {
        assert!(!parse_date_strict("15/03/2023").is_parsed());
        assert_eq!(iso("15/03/2023").as_deref(), Some("2023-03-15"));
        assert_eq!(iso("31.12.2022").as_deref(), Some("2022-12-31"));
    }

    #[test]
    fn test_datetimes_drop_time() {
        assert_eq!(iso("2023-01-15 10:30:00").as_deref(), Some("2023-01-15"));
        assert_eq!(iso("2023-01-15T10:30:00Z").as_deref(), Some("2023-01-15"));
        assert_eq!(iso("2023-01-15T10:30:00.250").as_deref(), Some("2023-01-15"));
    }

    #[test]
    fn test_named_months() {
        assert_eq!(iso("15 Mar 2023").as_deref(), Some("2023-03-15"));
        assert_eq!(iso("March 15, 2023").as_deref(), Some("2023-03-15"));
    }

    #[test]
    fn test_unparseable_keeps_original() {
        assert_eq!(
            parse_date("unclear_date"),
            ParseOutcome::Unparsed("unclear_date".to_string())
        );
        assert_eq!(
            parse_date("invalid-date"),
            ParseOutcome::Unparsed("invalid-date".to_string())
        );
        assert_eq!(parse_date(""), ParseOutcome::Unparsed(String::new()));
    }

    #[test]
    fn test_numbers_are_not_dates() {
        assert!(!parse_date("20230115").is_parsed());
        assert!(!parse_date("42").is_parsed());
        assert!(!parse_date("3.5").is_parsed());
    }

    #[test]
    fn test_impossible_dates_fail_both_passes() {
        assert!(!parse_date("2023-02-30").is_parsed());
        assert!(!parse_date("32/13/2023").is_parsed());
    }
}
