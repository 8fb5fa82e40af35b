//! Quality scoring.
//!
//! Computes five independent components in [0, 1] (completeness,
//! consistency, semantic, joinability, safety) and aggregates them into an
//! overall score under explicit [`ScoringWeights`].
//!
//! Before scoring, blank text cells are reinterpreted as missing so that
//! `""` and a true null are scored identically.

mod components;

use crate::config::ScoringWeights;
use crate::error::{Result, ResultExt};
use crate::profiler::classify_column;
use crate::types::{
    ComponentScore, DatasetProfile, Issue, QualityComponent, QualityReport, ScoringContext,
};
use crate::utils::{cell_reprs, is_blank, is_text_dtype};
use components::ScoredColumn;
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Score a table with equal component weights.
pub fn score(df: &DataFrame) -> Result<QualityReport> {
    QualityScorer::default().score(df)
}

/// Replace blank or whitespace-only text cells with missing values.
pub fn normalize_missing(df: &DataFrame) -> PolarsResult<DataFrame> {
    let mut normalized = df.clone();
    let text_columns: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|c| is_text_dtype(c.dtype()))
        .map(|c| c.name().to_string())
        .collect();

    for name in text_columns {
        let series = df.column(&name)?.as_materialized_series();
        let values: Vec<Option<&str>> = series
            .str()?
            .into_iter()
            .map(|v| v.filter(|s| !is_blank(s)))
            .collect();
        normalized.replace(&name, Series::new(name.as_str().into(), values))?;
    }
    Ok(normalized)
}

/// Scores tables under a fixed set of component weights.
#[derive(Debug, Clone, Default)]
pub struct QualityScorer {
    weights: ScoringWeights,
}

impl QualityScorer {
    /// Create a scorer, rejecting negative, non-finite or all-zero weights.
    pub fn new(weights: ScoringWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self { weights })
    }

    /// Create a scorer from weights already checked by
    /// [`crate::config::QoriqConfig::validate`].
    pub(crate) fn with_validated_weights(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn score(&self, df: &DataFrame) -> Result<QualityReport> {
        self.score_with_context(df, None, None)
    }

    /// Score a table. A precomputed profile or issue list is only echoed
    /// into the report's `context`; it never changes the numbers.
    pub fn score_with_context(
        &self,
        df: &DataFrame,
        profile: Option<&DatasetProfile>,
        issues: Option<&[Issue]>,
    ) -> Result<QualityReport> {
        let weights = self.weights.normalized()?;
        let normalized = normalize_missing(df).context("normalizing missing values")?;
        let columns = Self::scored_columns(&normalized)?;
        let n_rows = normalized.height();

        let mut components = BTreeMap::new();
        for component in QualityComponent::ALL {
            let (raw, detail) = match component {
                QualityComponent::Completeness => components::completeness(&columns, n_rows),
                QualityComponent::Consistency => components::consistency(&columns),
                QualityComponent::Semantic => components::semantic(&columns),
                QualityComponent::Joinability => components::joinability(&columns, n_rows),
                QualityComponent::Safety => components::safety(&columns),
            };
            components.insert(
                component,
                ComponentScore {
                    score: crate::utils::round_to(raw, 4),
                    detail,
                },
            );
        }

        let overall = if n_rows == 0 {
            1.0
        } else {
            components
                .iter()
                .map(|(c, s)| weights.weight(*c) * s.score)
                .sum::<f64>()
        };
        let overall_score = crate::utils::round_to(overall, 4);

        let context = (profile.is_some() || issues.is_some()).then(|| ScoringContext {
            profiled_columns: profile.map(|p| p.column_count),
            issue_count: issues.map(<[Issue]>::len),
        });

        debug!(
            "Scored {} rows x {} columns: overall {:.4}",
            n_rows,
            columns.len(),
            overall_score
        );

        Ok(QualityReport {
            components,
            overall_score,
            overall_percent: crate::utils::round_to(overall * 100.0, 2),
            context,
        })
    }

    fn scored_columns(df: &DataFrame) -> Result<Vec<ScoredColumn>> {
        let mut columns = Vec::with_capacity(df.width());
        for col in df.get_columns() {
            let series = col.as_materialized_series();
            let name = series.name().to_string();
            columns.push(ScoredColumn {
                kind: classify_column(&name, series)?,
                is_text: is_text_dtype(series.dtype()),
                reprs: cell_reprs(series)?,
                name,
            });
        }
        Ok(columns)
    }
}
