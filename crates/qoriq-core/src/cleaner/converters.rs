//! Type conversion functions for data cleaning.

use super::sanitizers::is_null_marker;
use crate::error::{QoriqError, Result};
use crate::parsing::{format_iso_date, parse_date, parse_date_strict};
use crate::utils::{coerce_numeric, is_text_dtype};
use polars::prelude::*;

/// Minimum share of rows that must coerce before a column is converted.
const NUMERIC_COERCION_RATIO: f64 = 0.8;

/// Number of non-missing values sampled when sniffing for dates.
const DATE_SNIFF_SAMPLE: usize = 1000;

/// Convert a text column to `Float64` if at least 80% of its rows coerce.
///
/// Values that do not coerce become null. Returns `None` (leave the column
/// as-is) for non-text columns and for columns below the ratio.
pub(crate) fn coerce_mostly_numeric(series: &Series) -> Result<Option<Series>> {
    if !is_text_dtype(series.dtype()) || series.is_empty() {
        return Ok(None);
    }

    let coerced: Vec<Option<f64>> = series
        .str()?
        .into_iter()
        .map(|v| v.and_then(coerce_numeric))
        .collect();
    let ok = coerced.iter().filter(|v| v.is_some()).count();

    if (ok as f64 / series.len() as f64) < NUMERIC_COERCION_RATIO {
        return Ok(None);
    }
    Ok(Some(Series::new(series.name().clone(), coerced)))
}

/// Rewrite parseable dates as ISO `YYYY-MM-DD`.
///
/// Explicit null markers become missing. Values failing both the strict and
/// the day-first parse keep their original text; values that were already
/// missing stay missing. Only text columns can be standardized.
pub(crate) fn standardize_dates(series: &Series) -> Result<Series> {
    if !is_text_dtype(series.dtype()) {
        return Err(QoriqError::TypeConversionFailed {
            column: series.name().to_string(),
            target_type: "ISO date text".to_string(),
            reason: format!("expected a text column, found {}", series.dtype()),
        });
    }

    let standardized: Vec<Option<String>> = series
        .str()?
        .into_iter()
        .map(|opt_val| match opt_val {
            None => None,
            Some(val) if is_null_marker(val) => None,
            Some(val) => Some(parse_date(val).into_text(format_iso_date)),
        })
        .collect();

    Ok(Series::new(series.name().clone(), standardized))
}

/// Fraction of the first 1000 non-missing values that strictly parse as
/// dates. Non-text and all-missing columns return 0.
pub(crate) fn date_parse_ratio(series: &Series) -> Result<f64> {
    if !is_text_dtype(series.dtype()) {
        return Ok(0.0);
    }
    let sample: Vec<&str> = series
        .str()?
        .into_iter()
        .flatten()
        .take(DATE_SNIFF_SAMPLE)
        .collect();
    if sample.is_empty() {
        return Ok(0.0);
    }
    let parsed = sample
        .iter()
        .filter(|v| parse_date_strict(v).is_parsed())
        .count();
    Ok(parsed as f64 / sample.len() as f64)
}
