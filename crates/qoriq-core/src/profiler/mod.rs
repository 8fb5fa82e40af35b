//! Data profiling module.
//!
//! This module provides per-column statistics (missingness, dtype, numeric
//! summary, top values) and the column classification shared by the
//! detector and the scorer.

mod role_inference;
mod statistics;

pub use role_inference::{
    EXPECTED_CLOSE_COLUMN, classify_column, classify_table, fixer_date_hint, has_at_sign_values,
    is_exact_identifier_name, is_key_candidate_name, name_suggests_age, name_suggests_date,
    name_suggests_email,
};

use crate::error::{QoriqError, Result};
use crate::types::{ColumnProfile, DatasetProfile};
use crate::utils::{cell_reprs, distinct_count, is_numeric_dtype, numeric_values};
use polars::prelude::*;
use statistics::{numeric_stats, top_values};
use tracing::debug;

/// Data profiler for analyzing dataset structure.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile every column of a dataset.
    ///
    /// Atypical data yields degenerate statistics rather than an error: an
    /// all-missing column has zero unique values and absent numeric stats.
    pub fn profile_dataset(df: &DataFrame, top_k: usize) -> Result<DatasetProfile> {
        let row_count = df.height();
        let mut columns = Vec::with_capacity(df.width());

        for col in df.get_columns() {
            let series = col.as_materialized_series();
            let profile = Self::profile_column(series, row_count, top_k).map_err(|e| {
                QoriqError::ProfilingFailed {
                    column: series.name().to_string(),
                    reason: e.to_string(),
                }
            })?;
            columns.push(profile);
        }

        debug!(
            "Profiled {} columns over {} rows",
            columns.len(),
            row_count
        );

        Ok(DatasetProfile {
            row_count,
            column_count: df.width(),
            columns,
        })
    }

    fn profile_column(series: &Series, row_count: usize, top_k: usize) -> PolarsResult<ColumnProfile> {
        let name = series.name().to_string();
        let reprs = cell_reprs(series)?;
        let missing_count = reprs.iter().filter(|v| v.is_none()).count();
        let missing_fraction = if row_count > 0 {
            missing_count as f64 / row_count as f64
        } else {
            0.0
        };
        let kind = classify_column(&name, series)?;

        let (numeric, top) = if is_numeric_dtype(series.dtype()) {
            let values: Vec<f64> = numeric_values(series)?.into_iter().flatten().collect();
            (Some(numeric_stats(&values)), None)
        } else {
            (None, Some(top_values(&reprs, top_k)))
        };

        Ok(ColumnProfile {
            name,
            dtype: format!("{:?}", series.dtype()),
            kind,
            missing_count,
            missing_fraction,
            unique_count: distinct_count(&reprs),
            numeric_stats: numeric,
            top_values: top,
        })
    }
}
