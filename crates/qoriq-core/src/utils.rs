//! Shared utilities for profiling, scoring and fixing.
//!
//! The core reads every column through a small set of missing-aware views
//! (string representations, numeric values, JSON cells) so the heuristics
//! never have to care which polars dtype backs a column.

use polars::prelude::*;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    is_integer_dtype(dtype) || matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType holds text.
#[inline]
pub fn is_text_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String)
}

// =============================================================================
// Column Views
// =============================================================================

/// Numeric values of a column; missing and NaN become `None`.
///
/// Non-numeric columns are cast, so unparseable text also becomes `None`.
/// Use [`crate::utils::coerce_numeric`] for strict text coercion instead.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let floats = series.cast(&DataType::Float64)?;
    let ca = floats.f64()?;
    Ok(ca
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Missing-aware string representation of every cell.
///
/// Integers render without a fractional part and floats use the shortest
/// round-trip form, so `30` and `30.0` both render as `"30"`. Text is
/// returned unchanged.
pub fn cell_reprs(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let dtype = series.dtype();
    if is_integer_dtype(dtype) {
        let ints = series.cast(&DataType::Int64)?;
        let ca = ints.i64()?;
        return Ok(ca.into_iter().map(|v| v.map(|i| i.to_string())).collect());
    }
    if is_numeric_dtype(dtype) {
        return Ok(numeric_values(series)?
            .into_iter()
            .map(|v| v.map(|f| f.to_string()))
            .collect());
    }
    let strings = series.cast(&DataType::String)?;
    let ca = strings.str()?;
    Ok(ca.into_iter().map(|v| v.map(str::to_string)).collect())
}

/// JSON rendering of every cell: numbers stay numbers, text stays text,
/// missing becomes `null`.
pub fn cell_json_values(series: &Series) -> PolarsResult<Vec<Value>> {
    let dtype = series.dtype();
    if is_integer_dtype(dtype) {
        let ints = series.cast(&DataType::Int64)?;
        let ca = ints.i64()?;
        return Ok(ca
            .into_iter()
            .map(|v| v.map(Value::from).unwrap_or(Value::Null))
            .collect());
    }
    if is_numeric_dtype(dtype) {
        return Ok(numeric_values(series)?
            .into_iter()
            .map(|v| {
                v.and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            })
            .collect());
    }
    Ok(cell_reprs(series)?
        .into_iter()
        .map(|v| v.map(Value::String).unwrap_or(Value::Null))
        .collect())
}

/// Number of distinct non-missing values.
pub fn distinct_count(reprs: &[Option<String>]) -> usize {
    reprs
        .iter()
        .flatten()
        .map(String::as_str)
        .collect::<HashSet<_>>()
        .len()
}

/// Whether a text value is empty or whitespace-only.
#[inline]
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

// =============================================================================
// Numeric Coercion
// =============================================================================

/// Strictly coerce text to a finite number.
///
/// Surrounding whitespace is ignored, but formatting such as currency
/// symbols or thousands separators is not stripped: `"$1,200"` does not
/// coerce.
pub fn coerce_numeric(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

// =============================================================================
// Statistics
// =============================================================================

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (n - 1). `None` with fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0);
    Some(variance.sqrt())
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// =============================================================================
// CSV Loading
// =============================================================================

/// Read a CSV file with a header row, inferring column types from the
/// whole file. Empty fields become missing values.
pub fn load_csv(path: impl AsRef<Path>) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_infer_schema_length(None)
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
        .finish()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_cell_reprs_unify_int_and_float() {
        let ints = Series::new("a".into(), &[Some(30i64), None]);
        let floats = Series::new("a".into(), &[Some(30.0f64), None]);
        assert_eq!(cell_reprs(&ints).unwrap(), vec![Some("30".to_string()), None]);
        assert_eq!(cell_reprs(&floats).unwrap(), cell_reprs(&ints).unwrap());
    }

    #[test]
    fn test_cell_reprs_text_unchanged() {
        let s = Series::new("a".into(), &[Some(" x "), None, Some("")]);
        assert_eq!(
            cell_reprs(&s).unwrap(),
            vec![Some(" x ".to_string()), None, Some(String::new())]
        );
    }

    #[test]
    fn test_cell_json_values() {
        let ints = Series::new("a".into(), &[Some(1i64), None]);
        assert_eq!(
            cell_json_values(&ints).unwrap(),
            vec![serde_json::json!(1), Value::Null]
        );
        let text = Series::new("b".into(), &[Some("x"), None]);
        assert_eq!(
            cell_json_values(&text).unwrap(),
            vec![serde_json::json!("x"), Value::Null]
        );
    }

    #[test]
    fn test_coerce_numeric_is_strict() {
        assert_eq!(coerce_numeric("42"), Some(42.0));
        assert_eq!(coerce_numeric(" -1.5 "), Some(-1.5));
        assert_eq!(coerce_numeric("1e3"), Some(1000.0));
        assert_eq!(coerce_numeric("$1,200"), None);
        assert_eq!(coerce_numeric(""), None);
        assert_eq!(coerce_numeric("NaN"), None);
        assert_eq!(coerce_numeric("inf"), None);
    }

    #[test]
    fn test_sample_std() {
        let std = sample_std(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((std - 2.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(sample_std(&[5.0]), None);
        assert_eq!(sample_std(&[]), None);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(66.66666, 2), 66.67);
    }

    #[test]
    fn test_distinct_count_ignores_missing() {
        let reprs = vec![Some("a".to_string()), None, Some("a".to_string()), Some("b".to_string())];
        assert_eq!(distinct_count(&reprs), 2);
    }
}
