//! Keep-first deduplication over a column subset.

use crate::error::Result;
use crate::utils::cell_reprs;
use polars::prelude::*;
use std::collections::HashSet;

/// Keep-mask marking the first occurrence of each key over `subset`.
///
/// Keys compare through the missing-aware string representation, so two
/// missing cells are equal.
pub(crate) fn keep_first_mask(df: &DataFrame, subset: &[String]) -> Result<Vec<bool>> {
    let mut key_columns = Vec::with_capacity(subset.len());
    for name in subset {
        key_columns.push(cell_reprs(df.column(name)?.as_materialized_series())?);
    }

    let mut seen: HashSet<Vec<Option<&str>>> = HashSet::with_capacity(df.height());
    Ok((0..df.height())
        .map(|row| {
            let key: Vec<Option<&str>> = key_columns.iter().map(|c| c[row].as_deref()).collect();
            seen.insert(key)
        })
        .collect())
}

/// Split `cleaned` into retained rows and return the rows of `original`
/// dropped by the same mask.
pub(crate) fn drop_duplicates(
    cleaned: &DataFrame,
    original: &DataFrame,
    subset: &[String],
) -> Result<(DataFrame, DataFrame)> {
    let keep = keep_first_mask(cleaned, subset)?;
    let removed: Vec<bool> = keep.iter().map(|k| !k).collect();

    let keep = BooleanChunked::from_slice("keep".into(), &keep);
    let removed = BooleanChunked::from_slice("removed".into(), &removed);

    Ok((cleaned.filter(&keep)?, original.filter(&removed)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keep_first_mask_single_column() {
        let df = df!["id" => [Some(1i64), Some(2), Some(1), None, None]].unwrap();
        let mask = keep_first_mask(&df, &["id".to_string()]).unwrap();
        assert_eq!(mask, vec![true, true, false, true, false]);
    }

    #[test]
    fn test_keep_first_mask_multi_column() {
        let df = df![
            "id" => [1i64, 1, 1],
            "user_id" => ["a", "b", "a"],
        ]
        .unwrap();
        let mask = keep_first_mask(&df, &["id".to_string(), "user_id".to_string()]).unwrap();
        assert_eq!(mask, vec![true, true, false]);
    }

    #[test]
    fn test_drop_duplicates_returns_original_rows() {
        let original = df![
            "id" => [1i64, 1, 2],
            "name" => [Some("a"), None, Some("c")],
        ]
        .unwrap();
        let cleaned = df![
            "id" => [1i64, 1, 2],
            "name" => ["a", "", "c"],
        ]
        .unwrap();

        let (kept, removed) = drop_duplicates(&cleaned, &original, &["id".to_string()]).unwrap();
        assert_eq!(kept.height(), 2);
        assert_eq!(removed.height(), 1);
        assert_eq!(removed.column("name").unwrap().null_count(), 1);
    }
}
