//! Statistical imputation methods.

use crate::error::Result;
use crate::utils::{is_numeric_dtype, median, numeric_values};
use polars::prelude::*;
use tracing::debug;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill missing values of a numeric column with its median, computed
    /// ignoring missing values. The column becomes `Float64`.
    ///
    /// Returns the median used, or `None` when the column is absent or has
    /// no values to take a median of (the column is then left untouched).
    pub fn apply_numeric_median(df: &mut DataFrame, col_name: &str) -> Result<Option<f64>> {
        let Ok(column) = df.column(col_name) else {
            return Ok(None);
        };
        let values = numeric_values(column.as_materialized_series())?;
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let Some(median_val) = median(&present) else {
            return Ok(None);
        };

        let filled: Vec<f64> = values.into_iter().map(|v| v.unwrap_or(median_val)).collect();
        df.replace(col_name, Series::new(col_name.into(), filled))?;

        debug!("Filled '{}' with median: {:.2}", col_name, median_val);
        Ok(Some(median_val))
    }

    /// Fill missing values with the empty string. Non-text columns are
    /// stringified first. Returns the number of cells filled.
    pub fn apply_empty_string(df: &mut DataFrame, col_name: &str) -> Result<usize> {
        let Ok(column) = df.column(col_name) else {
            return Ok(0);
        };
        let series = column.as_materialized_series();
        let null_count = series.null_count();
        if null_count == 0 {
            return Ok(0);
        }

        let as_text = series.cast(&DataType::String)?;
        let filled: Vec<&str> = as_text.str()?.into_iter().map(|v| v.unwrap_or("")).collect();
        let filled = Series::new(col_name.into(), filled);
        df.replace(col_name, filled)?;

        debug!("Filled {} missing values in '{}' with empty string", null_count, col_name);
        Ok(null_count)
    }

    /// Fill a column by its dtype: median for numeric columns, empty
    /// string for everything else.
    pub fn fill_missing(df: &mut DataFrame, col_name: &str) -> Result<()> {
        let Ok(column) = df.column(col_name) else {
            return Ok(());
        };
        if is_numeric_dtype(column.dtype()) {
            Self::apply_numeric_median(df, col_name)?;
        } else {
            Self::apply_empty_string(df, col_name)?;
        }
        Ok(())
    }
}
