//! Data model shared by the profiler, detector, scorer and fixer.
//!
//! Everything returned to collaborators derives `Serialize` so it can be
//! embedded in a JSON manifest as-is. Missing values are carried as
//! `Option::None` / `serde_json::Value::Null`, never as sentinel strings.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Column classification
// ============================================================================

/// Semantic class of a column, derived from its name, dtype and content.
///
/// Computed once per column and shared by the detector and the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Name mentions "email" or at least one value contains '@'.
    Email,
    /// Name mentions "date", "time" or "timestamp".
    DateLike,
    /// Name mentions "age" or is exactly "years".
    Age,
    /// Name contains an identifier-like token.
    Identifier,
    /// Integer or float column with no stronger semantic hint.
    Numeric,
    /// No rule applies.
    Generic,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::DateLike => "date_like",
            Self::Age => "age",
            Self::Identifier => "identifier",
            Self::Numeric => "numeric",
            Self::Generic => "generic",
        }
    }
}

// ============================================================================
// Profiling
// ============================================================================

/// Frequency of one distinct value in a text column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopValue {
    pub value: String,
    pub count: usize,
}

/// Summary statistics of a numeric column. Every field is `None` for an
/// all-missing column; `std` is also `None` with fewer than two values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: String,
    pub kind: ColumnKind,
    pub missing_count: usize,
    pub missing_fraction: f64,
    pub unique_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_stats: Option<NumericStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_values: Option<Vec<TopValue>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub row_count: usize,
    pub column_count: usize,
    /// One profile per column, in table column order. Serialized as an
    /// object keyed by column name.
    #[serde(with = "columns_by_name")]
    pub columns: Vec<ColumnProfile>,
}

impl DatasetProfile {
    /// Look up a column profile by name.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }
}

mod columns_by_name {
    use super::ColumnProfile;
    use serde::de::{Deserializer, MapAccess, Visitor};
    use serde::ser::{SerializeMap, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(
        columns: &[ColumnProfile],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(columns.len()))?;
        for col in columns {
            map.serialize_entry(&col.name, col)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<ColumnProfile>, D::Error> {
        struct ColumnsVisitor;

        impl<'de> Visitor<'de> for ColumnsVisitor {
            type Value = Vec<ColumnProfile>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of column name to column profile")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut columns = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, mut profile)) = access.next_entry::<String, ColumnProfile>()? {
                    profile.name = name;
                    columns.push(profile);
                }
                Ok(columns)
            }
        }

        deserializer.deserialize_map(ColumnsVisitor)
    }
}

// ============================================================================
// Issues
// ============================================================================

/// Kind of data-quality problem. The fixer keys its transforms on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    MissingHigh,
    DuplicateRows,
    DtypeMismatch,
    InvalidEmail,
    DatePartialParse,
    ConstantColumn,
    Outliers,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingHigh => "missing_high",
            Self::DuplicateRows => "duplicate_rows",
            Self::DtypeMismatch => "dtype_mismatch",
            Self::InvalidEmail => "invalid_email",
            Self::DatePartialParse => "date_partial_parse",
            Self::ConstantColumn => "constant_column",
            Self::Outliers => "outliers",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub title: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub columns: Vec<String>,
    pub description: String,
    pub suggested_fix: String,
    /// Counts embedded in the description, for display only.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub detection_details: BTreeMap<String, serde_json::Value>,
}

// ============================================================================
// Quality scoring
// ============================================================================

/// One of the five independently computed quality components.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum QualityComponent {
    Completeness,
    Consistency,
    Semantic,
    Joinability,
    Safety,
}

impl QualityComponent {
    pub const ALL: [QualityComponent; 5] = [
        Self::Completeness,
        Self::Consistency,
        Self::Semantic,
        Self::Joinability,
        Self::Safety,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completeness => "completeness",
            Self::Consistency => "consistency",
            Self::Semantic => "semantic",
            Self::Joinability => "joinability",
            Self::Safety => "safety",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentScore {
    /// Score in [0, 1], rounded to 4 decimals.
    pub score: f64,
    /// Explanation payload; never read back by the scoring math.
    pub detail: serde_json::Value,
}

/// Counts echoed from an optional precomputed profile / issue list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiled_columns: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub components: BTreeMap<QualityComponent, ComponentScore>,
    pub overall_score: f64,
    pub overall_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ScoringContext>,
}

impl QualityReport {
    /// Score of a single component (0.0 if absent).
    pub fn component(&self, component: QualityComponent) -> f64 {
        self.components
            .get(&component)
            .map(|c| c.score)
            .unwrap_or(0.0)
    }
}

// ============================================================================
// Bulk fixing
// ============================================================================

/// Machine-readable account of what the bulk fixer changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixSummary {
    /// Changed cells per column across the whole table (columns with no
    /// change are omitted).
    pub per_column_changed: BTreeMap<String, usize>,
    pub rows_removed: usize,
    /// Rows with at least one changed value plus removed rows.
    pub rows_changed_total: usize,
    pub preview_changed_rows_returned: usize,
    pub preview_changed_limit: usize,
    pub date_columns_standardized: Vec<String>,
}

impl FixSummary {
    /// Zero-valued summary for a table that needed no work.
    pub fn empty(preview_limit: usize) -> Self {
        Self {
            preview_changed_limit: preview_limit,
            ..Self::default()
        }
    }
}

/// Before/after pair of one differing cell. Missing renders as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellChange {
    pub column: String,
    pub before: serde_json::Value,
    pub after: serde_json::Value,
}

/// One row of the preview diff, listing only the columns that differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub row_index: usize,
    pub changes: Vec<CellChange>,
}

impl ChangeRecord {
    pub fn change_for(&self, column: &str) -> Option<&CellChange> {
        self.changes.iter().find(|c| c.column == column)
    }
}

/// Everything the bulk fixer returns.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub cleaned: DataFrame,
    pub summary: FixSummary,
    pub preview: Vec<ChangeRecord>,
    /// Rows dropped by deduplication, exactly as they were in the input.
    pub removed_rows: DataFrame,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_type_serializes_snake_case() {
        let json = serde_json::to_string(&IssueType::DatePartialParse).unwrap();
        assert_eq!(json, "\"date_partial_parse\"");
        assert_eq!(IssueType::DatePartialParse.as_str(), "date_partial_parse");
    }

    #[test]
    fn test_issue_uses_type_key() {
        let issue = Issue {
            title: "t".to_string(),
            issue_type: IssueType::MissingHigh,
            severity: Severity::High,
            columns: vec!["a".to_string()],
            description: "d".to_string(),
            suggested_fix: "f".to_string(),
            detection_details: BTreeMap::new(),
        };
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["type"], "missing_high");
        assert_eq!(value["severity"], "high");
        assert!(value.get("detection_details").is_none());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_quality_components_serialize_as_map_keys() {
        let mut components = BTreeMap::new();
        components.insert(
            QualityComponent::Safety,
            ComponentScore {
                score: 1.0,
                detail: serde_json::json!({}),
            },
        );
        let report = QualityReport {
            components,
            overall_score: 1.0,
            overall_percent: 100.0,
            context: None,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["components"]["safety"]["score"], 1.0);
        assert_eq!(report.component(QualityComponent::Safety), 1.0);
        assert_eq!(report.component(QualityComponent::Semantic), 0.0);
    }

    #[test]
    fn test_empty_fix_summary() {
        let summary = FixSummary::empty(200);
        assert_eq!(summary.preview_changed_limit, 200);
        assert_eq!(summary.rows_changed_total, 0);
        assert!(summary.per_column_changed.is_empty());
    }
}
