//! Data quality issue detection.
//!
//! This module runs a fixed battery of independent heuristics (missingness,
//! duplicate identifiers, dtype mismatch, invalid emails, partially
//! parseable dates, constant columns, numeric outliers) and returns a
//! deduplicated list of typed issues.

mod analyzer;

pub use analyzer::DataQualityAnalyzer;

use crate::error::Result;
use crate::types::Issue;
use polars::prelude::DataFrame;

/// Detect issues with the given missing-fraction threshold.
pub fn detect_issues(df: &DataFrame, missing_threshold: f64) -> Result<Vec<Issue>> {
    DataQualityAnalyzer::identify_issues(df, missing_threshold)
}
