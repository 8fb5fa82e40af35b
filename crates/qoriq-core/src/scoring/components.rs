//! The five quality components. Each returns its score in [0, 1] together
//! with a detail payload for display.

use crate::parsing::{is_ssn, is_valid_email, looks_like_phone, parse_date};
use crate::profiler::is_key_candidate_name;
use crate::types::ColumnKind;
use crate::utils::coerce_numeric;
use serde_json::{Map, Value, json};
use std::collections::HashMap;

const NUMERIC_COERCION_RATIO: f64 = 0.8;
const AGE_RANGE: (f64, f64) = (0.0, 120.0);

/// A normalized column as seen by the scoring components.
pub(crate) struct ScoredColumn {
    pub name: String,
    pub kind: ColumnKind,
    pub is_text: bool,
    pub reprs: Vec<Option<String>>,
}

impl ScoredColumn {
    fn non_missing(&self) -> impl Iterator<Item = &str> {
        self.reprs.iter().flatten().map(String::as_str)
    }

    fn non_missing_count(&self) -> usize {
        self.reprs.iter().filter(|v| v.is_some()).count()
    }
}

fn mean_or_one(values: &[f64]) -> f64 {
    if values.is_empty() {
        1.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn fraction(count: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        count as f64 / total as f64
    }
}

pub(crate) fn completeness(columns: &[ScoredColumn], n_rows: usize) -> (f64, Value) {
    let mut per_column = Map::new();
    let mut scores = Vec::with_capacity(columns.len());
    for col in columns {
        let score = fraction(col.non_missing_count(), n_rows);
        per_column.insert(col.name.clone(), json!(score));
        scores.push(score);
    }
    (
        mean_or_one(&scores),
        json!({ "per_column": per_column, "n_columns": columns.len() }),
    )
}

pub(crate) fn consistency(columns: &[ScoredColumn]) -> (f64, Value) {
    let mut per_column = Map::new();
    let mut scores = Vec::with_capacity(columns.len());
    for col in columns {
        let score = column_consistency(col);
        per_column.insert(col.name.clone(), json!(score));
        scores.push(score);
    }
    (mean_or_one(&scores), json!({ "per_column": per_column }))
}

/// A column is consistent if it behaves as a single numeric type or is
/// dominated by one recurring value.
fn column_consistency(col: &ScoredColumn) -> f64 {
    let non_missing = col.non_missing_count();
    if non_missing == 0 || !col.is_text {
        return 1.0;
    }

    let numeric = col
        .non_missing()
        .filter(|v| coerce_numeric(v).is_some())
        .count();
    let numeric_ratio = numeric as f64 / non_missing as f64;
    if numeric_ratio >= NUMERIC_COERCION_RATIO {
        return numeric_ratio;
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in col.non_missing() {
        *counts.entry(value).or_insert(0) += 1;
    }
    let modal = counts.values().copied().max().unwrap_or(0);
    modal as f64 / non_missing as f64
}

pub(crate) fn semantic(columns: &[ScoredColumn]) -> (f64, Value) {
    let mut per_column = Map::new();
    let mut rules = Map::new();
    let mut scores = Vec::with_capacity(columns.len());
    for col in columns {
        let (rule, score) = column_semantic(col);
        per_column.insert(col.name.clone(), json!(score));
        rules.insert(col.name.clone(), json!(rule));
        scores.push(score);
    }
    (
        mean_or_one(&scores),
        json!({ "per_column": per_column, "rules": rules }),
    )
}

fn column_semantic(col: &ScoredColumn) -> (&'static str, f64) {
    let total = col.non_missing_count();
    let (rule, valid) = match col.kind {
        ColumnKind::Email => (
            "email",
            col.non_missing().filter(|v| is_valid_email(v)).count(),
        ),
        ColumnKind::DateLike => (
            "date",
            col.non_missing().filter(|v| parse_date(v).is_parsed()).count(),
        ),
        ColumnKind::Age => (
            "age",
            col.non_missing()
                .filter_map(coerce_numeric)
                .filter(|v| (AGE_RANGE.0..=AGE_RANGE.1).contains(v))
                .count(),
        ),
        _ => ("none", total),
    };
    (rule, fraction(valid, total))
}

pub(crate) fn joinability(columns: &[ScoredColumn], n_rows: usize) -> (f64, Value) {
    let candidates: Vec<&ScoredColumn> = columns
        .iter()
        .filter(|c| is_key_candidate_name(&c.name))
        .collect();
    let examined: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();

    if n_rows == 0 {
        return (
            0.0,
            json!({ "best_key": null, "best_score": 0.0, "candidates_examined": examined }),
        );
    }

    let mut best_score = 0.0;
    let mut best_key: Option<&str> = None;
    for col in &candidates {
        let non_missing = col.non_missing_count();
        if non_missing == 0 {
            continue;
        }
        let unique = crate::utils::distinct_count(&col.reprs);
        let score = unique as f64 / non_missing as f64;
        if score > best_score {
            best_score = score;
            best_key = Some(col.name.as_str());
        }
    }

    (
        best_score,
        json!({ "best_key": best_key, "best_score": best_score, "candidates_examined": examined }),
    )
}

/// A cell counts once per matching pattern, so a value that is both an
/// email and phone-like contributes twice. The score is clamped at 0.
/// Phone-shaped text that does not parse as a date. ISO dates such as
/// `2023-03-15` match the phone pattern.
fn is_phone_number(value: &str) -> bool {
    looks_like_phone(value) && !parse_date(value).is_parsed()
}

pub(crate) fn safety(columns: &[ScoredColumn]) -> (f64, Value) {
    let mut per_column = Map::new();
    let mut total_cells = 0usize;
    let mut total_pii = 0usize;

    for col in columns {
        let non_null = col.non_missing_count();
        let pii_count: usize = col
            .non_missing()
            .map(|v| {
                usize::from(is_valid_email(v)) + usize::from(is_phone_number(v)) + usize::from(is_ssn(v))
            })
            .sum();
        total_cells += non_null;
        total_pii += pii_count;
        per_column.insert(
            col.name.clone(),
            json!({ "pii_count": pii_count, "non_null": non_null }),
        );
    }

    let score = if total_cells == 0 {
        1.0
    } else {
        (1.0 - total_pii as f64 / total_cells as f64).max(0.0)
    };
    (
        score,
        json!({ "per_column": per_column, "total_pii": total_pii, "total_cells": total_cells }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(name: &str, kind: ColumnKind, values: &[Option<&str>]) -> ScoredColumn {
        ScoredColumn {
            name: name.to_string(),
            kind,
            is_text: true,
            reprs: values.iter().map(|v| v.map(str::to_string)).collect(),
        }
    }

    #[test]
    fn test_consistency_numeric_like_text() {
        let col = text(
            "price",
            ColumnKind::Generic,
            &[Some("1"), Some("2"), Some("3"), Some("4"), Some("x")],
        );
        assert!((column_consistency(&col) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_consistency_modal_fraction() {
        let col = text(
            "city",
            ColumnKind::Generic,
            &[Some("a"), Some("a"), Some("b"), None],
        );
        assert!((column_consistency(&col) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_consistency_non_text_is_one() {
        let col = ScoredColumn {
            name: "n".to_string(),
            kind: ColumnKind::Numeric,
            is_text: false,
            reprs: vec![Some("1".to_string()), Some("2".to_string())],
        };
        assert_eq!(column_consistency(&col), 1.0);
    }

    #[test]
    fn test_semantic_rules() {
        let email = text("email", ColumnKind::Email, &[Some("a@b.com"), Some("bad")]);
        assert_eq!(column_semantic(&email), ("email", 0.5));

        let date = text(
            "signup_date",
            ColumnKind::DateLike,
            &[Some("2023-01-01"), Some("15/03/2023"), Some("soon"), None],
        );
        let (rule, score) = column_semantic(&date);
        assert_eq!(rule, "date");
        assert!((score - 2.0 / 3.0).abs() < 1e-12);

        let age = text("age", ColumnKind::Age, &[Some("30"), Some("150"), Some("-1"), Some("x")]);
        assert_eq!(column_semantic(&age), ("age", 0.25));

        let empty = text("email", ColumnKind::Email, &[None, None]);
        assert_eq!(column_semantic(&empty), ("email", 1.0));

        let other = text("city", ColumnKind::Generic, &[Some("x")]);
        assert_eq!(column_semantic(&other), ("none", 1.0));
    }

    #[test]
    fn test_joinability_best_key() {
        let cols = vec![
            text("id", ColumnKind::Identifier, &[Some("1"), Some("1"), Some("2")]),
            text("uuid", ColumnKind::Identifier, &[Some("a"), Some("b"), None]),
            text("city", ColumnKind::Generic, &[Some("a"), Some("b"), Some("c")]),
        ];
        let (score, detail) = joinability(&cols, 3);
        assert_eq!(score, 1.0);
        assert_eq!(detail["best_key"], json!("uuid"));
        assert_eq!(detail["candidates_examined"], json!(["id", "uuid"]));
    }

    #[test]
    fn test_joinability_without_candidates() {
        let cols = vec![text("city", ColumnKind::Generic, &[Some("a")])];
        let (score, detail) = joinability(&cols, 1);
        assert_eq!(score, 0.0);
        assert_eq!(detail["best_key"], Value::Null);
    }

    #[test]
    fn test_safety_counts_each_pattern() {
        let cols = vec![text(
            "contact",
            ColumnKind::Email,
            &[Some("a@b.com"), Some("123-45-6789"), Some("hello"), Some("plain")],
        )];
        let (score, detail) = safety(&cols);
        // The SSN also looks like a phone number.
        assert_eq!(detail["total_pii"], json!(3));
        assert!((score - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_safety_ignores_dates() {
        let cols = vec![text(
            "signup_date",
            ColumnKind::DateLike,
            &[Some("2023-03-15"), Some("2023-03-04 10:30:00"), Some("+1 555-123-4567")],
        )];
        let (score, detail) = safety(&cols);
        assert_eq!(detail["total_pii"], json!(1));
        assert!((score - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_safety_no_cells() {
        let cols = vec![text("x", ColumnKind::Generic, &[None])];
        assert_eq!(safety(&cols).0, 1.0);
    }
}
