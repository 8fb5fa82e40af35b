//! Column classification by name, dtype and content.
//!
//! Every name/content rule used by the detector, scorer and fixer lives
//! here so the rules can be tested in isolation.

use crate::parsing::contains_at_sign;
use crate::types::ColumnKind;
use crate::utils::{cell_reprs, is_numeric_dtype, is_text_dtype};
use polars::prelude::*;

/// Substrings marking a column as date-like for scoring.
const DATE_NAME_HINTS: [&str; 3] = ["date", "time", "timestamp"];

/// The fixer's wider date-name net (e.g. `expected_close`).
const FIXER_DATE_NAME_HINTS: [&str; 5] = ["date", "time", "timestamp", "close", "expected_close"];

/// Substrings marking a column as a join-key candidate.
const KEY_NAME_HINTS: [&str; 5] = ["id", "uid", "user_id", "order_id", "uuid"];

/// Exact names checked for duplicate identifiers.
const EXACT_ID_NAMES: [&str; 3] = ["id", "user_id", "userid"];

/// Column that is always date-standardized when present.
pub const EXPECTED_CLOSE_COLUMN: &str = "expected_close";

fn name_contains_any(name: &str, hints: &[&str]) -> bool {
    let lower = name.to_lowercase();
    hints.iter().any(|h| lower.contains(h))
}

pub fn name_suggests_email(name: &str) -> bool {
    name.to_lowercase().contains("email")
}

pub fn name_suggests_date(name: &str) -> bool {
    name_contains_any(name, &DATE_NAME_HINTS)
}

pub fn fixer_date_hint(name: &str) -> bool {
    name_contains_any(name, &FIXER_DATE_NAME_HINTS)
}

/// "age" anywhere in the name (so `average_age` and `page` match too), or
/// exactly "years".
pub fn name_suggests_age(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("age") || lower == "years"
}

pub fn is_key_candidate_name(name: &str) -> bool {
    name_contains_any(name, &KEY_NAME_HINTS)
}

pub fn is_exact_identifier_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    EXACT_ID_NAMES.iter().any(|n| lower == *n)
}

/// Whether any non-missing value of a text column contains '@'.
pub fn has_at_sign_values(series: &Series) -> PolarsResult<bool> {
    if !is_text_dtype(series.dtype()) {
        return Ok(false);
    }
    Ok(cell_reprs(series)?
        .iter()
        .flatten()
        .any(|v| contains_at_sign(v)))
}

/// Classify a column. Rules are evaluated in order and the first match wins:
/// email, date-like, age, identifier, numeric, generic.
pub fn classify_column(name: &str, series: &Series) -> PolarsResult<ColumnKind> {
    if name_suggests_email(name) || has_at_sign_values(series)? {
        return Ok(ColumnKind::Email);
    }
    if name_suggests_date(name) {
        return Ok(ColumnKind::DateLike);
    }
    if name_suggests_age(name) {
        return Ok(ColumnKind::Age);
    }
    if is_key_candidate_name(name) {
        return Ok(ColumnKind::Identifier);
    }
    if is_numeric_dtype(series.dtype()) {
        return Ok(ColumnKind::Numeric);
    }
    Ok(ColumnKind::Generic)
}

/// Classify every column of a table, in column order.
pub fn classify_table(df: &DataFrame) -> PolarsResult<Vec<(String, ColumnKind)>> {
    df.get_columns()
        .iter()
        .map(|col| {
            let series = col.as_materialized_series();
            let name = series.name().to_string();
            let kind = classify_column(&name, series)?;
            Ok((name, kind))
        })
        .collect()
}
