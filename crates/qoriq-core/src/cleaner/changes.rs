//! Before/after change accounting and the preview diff.

use crate::error::Result;
use crate::types::{CellChange, ChangeRecord};
use crate::utils::{cell_json_values, cell_reprs};
use polars::prelude::*;
use std::collections::BTreeMap;

/// Cell-level differences between two row-aligned tables.
pub(crate) struct ChangeAccounting {
    pub per_column_changed: BTreeMap<String, usize>,
    /// Indices of rows with at least one changed cell, ascending.
    pub changed_rows: Vec<usize>,
    /// Differing columns, in table column order.
    diffs: Vec<ColumnDiff>,
}

struct ColumnDiff {
    name: String,
    differs: Vec<bool>,
}

impl ChangeAccounting {
    /// Compare `before` and `after` cell by cell through their missing-aware
    /// string representation. Both tables must have the same height and
    /// `after` must contain every column of `before`.
    pub fn compute(before: &DataFrame, after: &DataFrame) -> Result<Self> {
        let n_rows = before.height();
        let mut row_changed = vec![false; n_rows];
        let mut per_column_changed = BTreeMap::new();
        let mut diffs = Vec::new();

        for col in before.get_columns() {
            let name = col.name().to_string();
            let before_reprs = cell_reprs(col.as_materialized_series())?;
            let after_reprs = cell_reprs(after.column(&name)?.as_materialized_series())?;

            let differs: Vec<bool> = before_reprs
                .iter()
                .zip(after_reprs.iter())
                .map(|(b, a)| b != a)
                .collect();
            let changed = differs.iter().filter(|d| **d).count();
            if changed == 0 {
                continue;
            }

            for (flag, differ) in row_changed.iter_mut().zip(differs.iter()) {
                *flag |= *differ;
            }
            per_column_changed.insert(name.clone(), changed);
            diffs.push(ColumnDiff { name, differs });
        }

        let changed_rows = row_changed
            .iter()
            .enumerate()
            .filter_map(|(i, changed)| changed.then_some(i))
            .collect();

        Ok(Self {
            per_column_changed,
            changed_rows,
            diffs,
        })
    }

    /// Build the preview: changed rows in original order, capped at
    /// `limit`, each listing only its differing columns.
    pub fn preview(
        &self,
        before: &DataFrame,
        after: &DataFrame,
        limit: usize,
    ) -> Result<Vec<ChangeRecord>> {
        let rows: Vec<usize> = self.changed_rows.iter().take(limit).copied().collect();
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut columns = Vec::with_capacity(self.diffs.len());
        for diff in &self.diffs {
            let before_values = cell_json_values(before.column(&diff.name)?.as_materialized_series())?;
            let after_values = cell_json_values(after.column(&diff.name)?.as_materialized_series())?;
            columns.push((diff, before_values, after_values));
        }

        Ok(rows
            .into_iter()
            .map(|row_index| ChangeRecord {
                row_index,
                changes: columns
                    .iter()
                    .filter(|(diff, _, _)| diff.differs[row_index])
                    .map(|(diff, b, a)| CellChange {
                        column: diff.name.clone(),
                        before: b[row_index].clone(),
                        after: a[row_index].clone(),
                    })
                    .collect(),
            })
            .collect())
    }
}
