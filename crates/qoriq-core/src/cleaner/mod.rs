//! Bulk fixing of detected data quality issues.
//!
//! This module provides functionality for:
//! - Filling high-missingness columns (median or empty string)
//! - Masking invalid email addresses
//! - Coercing mostly-numeric text columns
//! - Standardizing date-like columns to ISO text
//! - Removing duplicate rows over identifier columns
//!
//! Transforms are selected only by issue type and columns. Every changed
//! cell is accounted for before deduplication.

mod changes;
mod converters;
mod dedup;
mod sanitizers;

use crate::error::Result;
use crate::imputers::StatisticalImputer;
use crate::profiler::{EXPECTED_CLOSE_COLUMN, fixer_date_hint, name_suggests_email};
use crate::types::{CleanOutcome, FixSummary, Issue, IssueType};
use changes::ChangeAccounting;
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Minimum share of strictly parseable values for a text column to be
/// treated as date-like.
const DATE_SNIFF_RATIO: f64 = 0.05;

/// Columns selected for each transform, in table column order.
#[derive(Debug, Default)]
struct FixPlan {
    missing_high: Vec<String>,
    invalid_email: Vec<String>,
    dtype_mismatch: Vec<String>,
    partial_dates: Vec<String>,
    duplicate_keys: Vec<String>,
}

impl FixPlan {
    /// Aggregate issue columns by type. Columns absent from the table are
    /// skipped.
    fn from_issues(df: &DataFrame, issues: &[Issue]) -> Self {
        let columns_of = |issue_type: IssueType| -> Vec<String> {
            let wanted: HashSet<&str> = issues
                .iter()
                .filter(|i| i.issue_type == issue_type)
                .flat_map(|i| i.columns.iter().map(String::as_str))
                .collect();
            df.get_column_names()
                .into_iter()
                .filter(|name| wanted.contains(name.as_str()))
                .map(|name| name.to_string())
                .collect()
        };

        Self {
            missing_high: columns_of(IssueType::MissingHigh),
            invalid_email: columns_of(IssueType::InvalidEmail),
            dtype_mismatch: columns_of(IssueType::DtypeMismatch),
            partial_dates: columns_of(IssueType::DatePartialParse),
            duplicate_keys: columns_of(IssueType::DuplicateRows),
        }
    }
}

/// Data cleaner applying naive fixes for detected issues.
pub struct DataCleaner;

impl DataCleaner {
    /// Apply every fix implied by `issues` and report what changed.
    ///
    /// Order: missing fill, email masking, numeric coercion, date
    /// standardization, change accounting, deduplication. A date column
    /// that cannot be standardized is logged and left unchanged.
    pub fn clean(df: &DataFrame, issues: &[Issue], preview_limit: usize) -> Result<CleanOutcome> {
        if df.height() == 0 {
            debug!("Empty table, nothing to clean");
            return Ok(CleanOutcome {
                cleaned: df.clone(),
                summary: FixSummary::empty(preview_limit),
                preview: Vec::new(),
                removed_rows: df.head(Some(0)),
            });
        }

        info!("Applying bulk fixes for {} issues...", issues.len());
        let plan = FixPlan::from_issues(df, issues);
        let mut cleaned = df.clone();

        // 1. Fill high-missingness columns
        for col in &plan.missing_high {
            StatisticalImputer::fill_missing(&mut cleaned, col)?;
        }

        // 2. Mask invalid emails
        for col in &plan.invalid_email {
            let series = cleaned.column(col)?.as_materialized_series();
            let masked = sanitizers::mask_invalid_emails(series, name_suggests_email(col))?;
            cleaned.replace(col, masked)?;
        }

        // 3. Coerce mostly-numeric text
        for col in &plan.dtype_mismatch {
            let series = cleaned.column(col)?.as_materialized_series();
            if let Some(coerced) = converters::coerce_mostly_numeric(series)? {
                cleaned.replace(col, coerced)?;
                debug!("Coerced '{}' to numeric", col);
            }
        }

        // 4. Standardize date-like columns
        let mut date_columns_standardized = Vec::new();
        for col in Self::date_like_columns(df, &plan)? {
            let series = cleaned.column(&col)?.as_materialized_series();
            match converters::standardize_dates(series) {
                Ok(standardized) => {
                    cleaned.replace(&col, standardized)?;
                    date_columns_standardized.push(col);
                }
                Err(e) => warn!("Leaving '{}' unchanged: {}", col, e),
            }
        }

        // 5. Account for value changes before any row is removed
        let accounting = ChangeAccounting::compute(df, &cleaned)?;
        let preview = accounting.preview(df, &cleaned, preview_limit)?;

        // 6. Deduplicate over the union of identifier columns
        let (cleaned, removed_rows) = if plan.duplicate_keys.is_empty() {
            (cleaned, df.head(Some(0)))
        } else {
            dedup::drop_duplicates(&cleaned, df, &plan.duplicate_keys)?
        };

        let rows_removed = removed_rows.height();
        let summary = FixSummary {
            rows_changed_total: accounting.changed_rows.len() + rows_removed,
            per_column_changed: accounting.per_column_changed,
            rows_removed,
            preview_changed_rows_returned: preview.len(),
            preview_changed_limit: preview_limit,
            date_columns_standardized,
        };

        info!(
            "Bulk fix complete: {} rows changed, {} removed",
            summary.rows_changed_total, summary.rows_removed
        );

        Ok(CleanOutcome {
            cleaned,
            summary,
            preview,
            removed_rows,
        })
    }

    /// Union of date-hinted names, partially parseable columns, sniffed
    /// columns and `expected_close`, in table column order. Sniffing reads
    /// the original table.
    fn date_like_columns(df: &DataFrame, plan: &FixPlan) -> Result<Vec<String>> {
        let mut selected = Vec::new();
        for col in df.get_columns() {
            let name = col.name().as_str();
            let include = fixer_date_hint(name)
                || name == EXPECTED_CLOSE_COLUMN
                || plan.partial_dates.iter().any(|c| c == name)
                || converters::date_parse_ratio(col.as_materialized_series())? >= DATE_SNIFF_RATIO;
            if include {
                selected.push(name.to_string());
            }
        }
        Ok(selected)
    }
}
