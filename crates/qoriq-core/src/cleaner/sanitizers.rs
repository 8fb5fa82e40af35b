//! Value-level sanitization for text columns.

use crate::error::Result;
use crate::parsing::{contains_at_sign, is_valid_email};
use crate::utils::is_text_dtype;
use polars::prelude::*;

/// Explicit missing markers normalized to null in date columns.
pub(crate) const NULL_MARKERS: [&str; 4] = ["NA", "N/A", "null", "None"];

#[inline]
pub(crate) fn is_null_marker(value: &str) -> bool {
    NULL_MARKERS.contains(&value)
}

/// Replace invalid email values with the empty string.
///
/// With `mask_all_invalid`, every non-missing value failing the strict
/// pattern is masked; otherwise only values containing '@' are considered,
/// so free text is never mistaken for an address. Non-text columns are
/// returned unchanged.
pub(crate) fn mask_invalid_emails(series: &Series, mask_all_invalid: bool) -> Result<Series> {
    if !is_text_dtype(series.dtype()) {
        return Ok(series.clone());
    }

    let masked: Vec<Option<&str>> = series
        .str()?
        .into_iter()
        .map(|opt_val| {
            opt_val.map(|val| {
                let candidate = mask_all_invalid || contains_at_sign(val);
                if candidate && !is_valid_email(val) {
                    ""
                } else {
                    val
                }
            })
        })
        .collect();

    Ok(Series::new(series.name().clone(), masked))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(series: &Series) -> Vec<Option<String>> {
        series
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn test_null_markers_are_exact() {
        assert!(is_null_marker("NA"));
        assert!(is_null_marker("None"));
        assert!(!is_null_marker("na"));
        assert!(!is_null_marker(" NA"));
    }

    #[test]
    fn test_mask_only_values_with_at_sign() {
        let series = Series::new(
            "contact".into(),
            &[Some("a@b.com"), Some("broken@"), Some("call me"), None],
        );
        let masked = mask_invalid_emails(&series, false).unwrap();
        assert_eq!(
            values(&masked),
            vec![
                Some("a@b.com".to_string()),
                Some(String::new()),
                Some("call me".to_string()),
                None
            ]
        );
    }

    #[test]
    fn test_mask_all_invalid() {
        let series = Series::new("email".into(), &["a@b.com", "not-an-email", "c@d.org"]);
        let masked = mask_invalid_emails(&series, true).unwrap();
        assert_eq!(
            values(&masked),
            vec![
                Some("a@b.com".to_string()),
                Some(String::new()),
                Some("c@d.org".to_string())
            ]
        );
    }

    #[test]
    fn test_mask_skips_non_text() {
        let series = Series::new("email".into(), &[1i64, 2]);
        let masked = mask_invalid_emails(&series, true).unwrap();
        assert_eq!(masked.dtype(), &DataType::Int64);
    }
}
