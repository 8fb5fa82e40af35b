use crate::error::Result;
use crate::parsing::{contains_at_sign, is_valid_email, parse_date_strict};
use crate::profiler::{classify_column, is_exact_identifier_name};
use crate::types::{ColumnKind, Issue, IssueType, Severity};
use crate::utils::{
    cell_reprs, coerce_numeric, distinct_count, is_numeric_dtype, is_text_dtype, mean,
    numeric_values, sample_std,
};
use polars::prelude::*;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Number of non-missing values sampled for the partial-date check.
const DATE_SAMPLE_SIZE: usize = 200;

/// Share of values that must coerce before a text column counts as numeric.
const NUMERIC_COERCION_RATIO: f64 = 0.8;

const OUTLIER_MIN_VALUES: usize = 5;
const OUTLIER_Z_THRESHOLD: f64 = 4.0;

/// One column, read once and shared by every heuristic.
struct ColumnView<'a> {
    name: String,
    series: &'a Series,
    kind: ColumnKind,
    reprs: Vec<Option<String>>,
}

impl ColumnView<'_> {
    fn non_missing(&self) -> impl Iterator<Item = &str> {
        self.reprs.iter().flatten().map(String::as_str)
    }

    fn is_text(&self) -> bool {
        is_text_dtype(self.series.dtype())
    }
}

pub struct DataQualityAnalyzer;

impl DataQualityAnalyzer {
    /// Run every heuristic in its fixed order and drop issues repeating an
    /// earlier (title, columns) pair.
    pub fn identify_issues(df: &DataFrame, missing_threshold: f64) -> Result<Vec<Issue>> {
        if df.height() == 0 {
            debug!("Empty table, skipping issue detection");
            return Ok(Vec::new());
        }

        let views = Self::column_views(df)?;
        let n_rows = df.height();

        let mut issues = Vec::new();
        issues.extend(Self::analyze_missing(&views, n_rows, missing_threshold));
        issues.extend(Self::analyze_duplicate_ids(&views));
        issues.extend(Self::analyze_dtype_mismatch(&views, n_rows));
        issues.extend(Self::analyze_invalid_emails(&views));
        issues.extend(Self::analyze_partial_dates(&views));
        issues.extend(Self::analyze_constant_columns(&views));
        issues.extend(Self::analyze_outliers(&views)?);

        let issues = Self::dedup(issues);
        debug!("Detected {} issues", issues.len());
        Ok(issues)
    }

    fn column_views(df: &DataFrame) -> Result<Vec<ColumnView<'_>>> {
        let mut views = Vec::with_capacity(df.width());
        for col in df.get_columns() {
            let series = col.as_materialized_series();
            let name = series.name().to_string();
            let kind = classify_column(&name, series)?;
            let reprs = cell_reprs(series)?;
            views.push(ColumnView {
                name,
                series,
                kind,
                reprs,
            });
        }
        Ok(views)
    }

    fn dedup(issues: Vec<Issue>) -> Vec<Issue> {
        let mut seen: HashSet<(String, Vec<String>)> = HashSet::new();
        issues
            .into_iter()
            .filter(|issue| seen.insert((issue.title.clone(), issue.columns.clone())))
            .collect()
    }

    fn analyze_missing(views: &[ColumnView<'_>], n_rows: usize, threshold: f64) -> Vec<Issue> {
        let mut issues = Vec::new();
        for view in views {
            let missing = view.reprs.iter().filter(|v| v.is_none()).count();
            let pct = missing as f64 / n_rows as f64;
            if pct >= threshold && pct > 0.0 {
                issues.push(new_issue(
                    format!("High missing rate in column '{}'", view.name),
                    IssueType::MissingHigh,
                    if pct >= 0.5 { Severity::High } else { Severity::Medium },
                    &view.name,
                    format!(
                        "Column '{}' has {:.2}% missing values ({} missing).",
                        view.name,
                        pct * 100.0,
                        missing
                    ),
                    "Consider filling missing values, dropping rows, or imputing (median for numeric / empty or mode for categorical).",
                    [("missing_count", json!(missing)), ("missing_fraction", json!(pct))],
                ));
            }
        }
        issues
    }

    fn analyze_duplicate_ids(views: &[ColumnView<'_>]) -> Vec<Issue> {
        let mut issues = Vec::new();
        for view in views.iter().filter(|v| is_exact_identifier_name(&v.name)) {
            let mut seen: HashSet<Option<&str>> = HashSet::new();
            let duplicates = view
                .reprs
                .iter()
                .filter(|v| !seen.insert(v.as_deref()))
                .count();
            if duplicates > 0 {
                issues.push(new_issue(
                    format!("Duplicate values in id column '{}'", view.name),
                    IssueType::DuplicateRows,
                    Severity::High,
                    &view.name,
                    format!("Column '{}' has {} duplicate rows.", view.name, duplicates),
                    "Investigate duplicates; consider deduplicating by keeping the most recent or aggregated record.",
                    [("duplicate_count", json!(duplicates))],
                ));
            }
        }
        issues
    }

    fn analyze_dtype_mismatch(views: &[ColumnView<'_>], n_rows: usize) -> Vec<Issue> {
        let mut issues = Vec::new();
        for view in views.iter().filter(|v| v.is_text()) {
            let numeric = view
                .non_missing()
                .filter(|v| coerce_numeric(v).is_some())
                .count();
            let ratio = numeric as f64 / n_rows as f64;
            if ratio >= NUMERIC_COERCION_RATIO && numeric < n_rows {
                issues.push(new_issue(
                    format!("Possible numeric column stored as text '{}'", view.name),
                    IssueType::DtypeMismatch,
                    Severity::Medium,
                    &view.name,
                    format!(
                        "Column '{}' looks mostly numeric ({}/{} values) but contains non-numeric entries.",
                        view.name, numeric, n_rows
                    ),
                    "Coerce column to numeric and inspect non-numeric rows; fix formatting (commas, currency symbols) or missing markers.",
                    [("numeric_count", json!(numeric)), ("row_count", json!(n_rows))],
                ));
            }
        }
        issues
    }

    fn analyze_invalid_emails(views: &[ColumnView<'_>]) -> Vec<Issue> {
        let mut issues = Vec::new();
        for view in views
            .iter()
            .filter(|v| v.kind == ColumnKind::Email && v.is_text())
        {
            if !view.non_missing().any(contains_at_sign) {
                continue;
            }
            let total = view.non_missing().count();
            let valid = view.non_missing().filter(|v| is_valid_email(v)).count();
            let invalid = total - valid;
            if invalid == 0 {
                continue;
            }
            let fraction = invalid as f64 / total as f64;
            issues.push(new_issue(
                format!("Invalid email addresses in '{}'", view.name),
                IssueType::InvalidEmail,
                if fraction < 0.2 { Severity::Medium } else { Severity::High },
                &view.name,
                format!(
                    "Column '{}' has {}/{} invalid-looking email values.",
                    view.name, invalid, total
                ),
                "Validate emails, remove or correct invalid addresses, or mask them if PII-sensitive.",
                [("invalid_count", json!(invalid)), ("non_missing", json!(total))],
            ));
        }
        issues
    }

    fn analyze_partial_dates(views: &[ColumnView<'_>]) -> Vec<Issue> {
        let mut issues = Vec::new();
        for view in views.iter().filter(|v| v.is_text()) {
            let sample: Vec<&str> = view.non_missing().take(DATE_SAMPLE_SIZE).collect();
            if sample.is_empty() {
                continue;
            }
            let parsed = sample
                .iter()
                .filter(|v| parse_date_strict(v).is_parsed())
                .count();
            if parsed > 0 && parsed < sample.len() {
                issues.push(new_issue(
                    format!("Column '{}' contains partially parseable dates", view.name),
                    IssueType::DatePartialParse,
                    Severity::Medium,
                    &view.name,
                    format!(
                        "Column '{}' had {}/{} sample values parseable as dates.",
                        view.name,
                        parsed,
                        sample.len()
                    ),
                    "Standardize date formats or provide parsing rules when importing.",
                    [("parsed", json!(parsed)), ("sampled", json!(sample.len()))],
                ));
            }
        }
        issues
    }

    fn analyze_constant_columns(views: &[ColumnView<'_>]) -> Vec<Issue> {
        let mut issues = Vec::new();
        for view in views {
            let unique = distinct_count(&view.reprs);
            if unique <= 1 {
                issues.push(new_issue(
                    format!("Constant or near-constant column '{}'", view.name),
                    IssueType::ConstantColumn,
                    Severity::Low,
                    &view.name,
                    format!("Column '{}' has {} unique values.", view.name, unique),
                    "Drop this column if it provides no signal for modeling.",
                    [("unique_count", json!(unique))],
                ));
            }
        }
        issues
    }

    fn analyze_outliers(views: &[ColumnView<'_>]) -> Result<Vec<Issue>> {
        let mut issues = Vec::new();
        for view in views.iter().filter(|v| is_numeric_dtype(v.series.dtype())) {
            let values: Vec<f64> = numeric_values(view.series)?.into_iter().flatten().collect();
            if values.len() < OUTLIER_MIN_VALUES {
                continue;
            }
            let (Some(m), Some(std)) = (mean(&values), sample_std(&values)) else {
                continue;
            };
            if std == 0.0 {
                continue;
            }
            let outliers = values
                .iter()
                .filter(|v| ((*v - m).abs() / std) > OUTLIER_Z_THRESHOLD)
                .count();
            if outliers > 0 {
                issues.push(new_issue(
                    format!("Extreme outliers in '{}'", view.name),
                    IssueType::Outliers,
                    Severity::Medium,
                    &view.name,
                    format!(
                        "Column '{}' has {} values with |z| > {}.",
                        view.name, outliers, OUTLIER_Z_THRESHOLD
                    ),
                    "Inspect outliers; consider winsorizing, clipping, or imputing if they are erroneous.",
                    [("outlier_count", json!(outliers))],
                ));
            }
        }
        Ok(issues)
    }
}

fn new_issue<const N: usize>(
    title: String,
    issue_type: IssueType,
    severity: Severity,
    column: &str,
    description: String,
    suggested_fix: &str,
    details: [(&str, serde_json::Value); N],
) -> Issue {
    Issue {
        title,
        issue_type,
        severity,
        columns: vec![column.to_string()],
        description,
        suggested_fix: suggested_fix.to_string(),
        detection_details: details
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<BTreeMap<_, _>>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types_for(issues: &[Issue], column: &str) -> Vec<IssueType> {
        issues
            .iter()
            .filter(|i| i.columns == vec![column.to_string()])
            .map(|i| i.issue_type)
            .collect()
    }

    #[test]
    fn test_empty_table_has_no_issues() {
        let df = df!["a" => Vec::<i64>::new()].unwrap();
        assert!(DataQualityAnalyzer::identify_issues(&df, 0.2).unwrap().is_empty());
    }

    #[test]
    fn test_high_missing_severity() {
        let df = df![
            "half" => [Some(1i64), None, Some(3), None],
            "quarter" => [Some("a"), Some("b"), Some("c"), None],
            "full" => [Some(1i64), Some(2), Some(3), Some(4)],
        ]
        .unwrap();
        let issues = DataQualityAnalyzer::identify_issues(&df, 0.2).unwrap();

        let half = issues
            .iter()
            .find(|i| i.issue_type == IssueType::MissingHigh && i.columns[0] == "half")
            .unwrap();
        assert_eq!(half.severity, Severity::High);
        let quarter = issues
            .iter()
            .find(|i| i.issue_type == IssueType::MissingHigh && i.columns[0] == "quarter")
            .unwrap();
        assert_eq!(quarter.severity, Severity::Medium);
        assert!(!types_for(&issues, "full").contains(&IssueType::MissingHigh));
    }

    #[test]
    fn test_missing_threshold_zero_ignores_complete_columns() {
        let df = df!["a" => [1i64, 2, 3]].unwrap();
        let issues = DataQualityAnalyzer::identify_issues(&df, 0.0).unwrap();
        assert!(!types_for(&issues, "a").contains(&IssueType::MissingHigh));
    }

    #[test]
    fn test_duplicate_ids_only_for_identifier_names() {
        let df = df![
            "ID" => [1i64, 1, 2],
            "order_id" => [5i64, 5, 6],
        ]
        .unwrap();
        let issues = DataQualityAnalyzer::identify_issues(&df, 0.2).unwrap();
        let dup = issues
            .iter()
            .find(|i| i.issue_type == IssueType::DuplicateRows)
            .unwrap();
        assert_eq!(dup.columns, vec!["ID".to_string()]);
        assert_eq!(dup.severity, Severity::High);
        assert!(!types_for(&issues, "order_id").contains(&IssueType::DuplicateRows));
    }

    #[test]
    fn test_dtype_mismatch() {
        let df = df![
            "price" => ["10", "20", "30", "40", "$50"],
            "clean" => ["1", "2", "3", "4", "5"],
            "words" => ["a", "b", "1", "c", "d"],
        ]
        .unwrap();
        let issues = DataQualityAnalyzer::identify_issues(&df, 0.2).unwrap();
        assert!(types_for(&issues, "price").contains(&IssueType::DtypeMismatch));
        assert!(!types_for(&issues, "clean").contains(&IssueType::DtypeMismatch));
        assert!(!types_for(&issues, "words").contains(&IssueType::DtypeMismatch));
    }

    #[test]
    fn test_invalid_email_severity() {
        let df = df!["email" => ["a@b.com", "not-an-email", "c@d.org"]].unwrap();
        let issues = DataQualityAnalyzer::identify_issues(&df, 0.2).unwrap();
        let issue = issues
            .iter()
            .find(|i| i.issue_type == IssueType::InvalidEmail)
            .unwrap();
        assert_eq!(issue.severity, Severity::High);
        assert_eq!(issue.detection_details["invalid_count"], json!(1));
    }

    #[test]
    fn test_detection_details_serialize_in_key_order() {
        let df = df!["price" => ["10", "20", "30", "40", "$50"]].unwrap();
        let issues = DataQualityAnalyzer::identify_issues(&df, 0.2).unwrap();
        let issue = issues
            .iter()
            .find(|i| i.issue_type == IssueType::DtypeMismatch)
            .unwrap();
        assert_eq!(
            serde_json::to_string(&issue.detection_details).unwrap(),
            r#"{"numeric_count":4,"row_count":5}"#
        );
    }

    #[test]
    fn test_invalid_email_medium_below_fifth() {
        let mut values: Vec<String> = (0..9).map(|i| format!("user{i}@example.com")).collect();
        values.push("broken@".to_string());
        let df = df!["contact" => values].unwrap();
        let issues = DataQualityAnalyzer::identify_issues(&df, 0.2).unwrap();
        let issue = issues
            .iter()
            .find(|i| i.issue_type == IssueType::InvalidEmail)
            .unwrap();
        assert_eq!(issue.severity, Severity::Medium);
    }

    #[test]
    fn test_email_named_column_without_at_sign_not_flagged() {
        let df = df!["email" => ["x", "y"]].unwrap();
        let issues = DataQualityAnalyzer::identify_issues(&df, 0.2).unwrap();
        assert!(!issues.iter().any(|i| i.issue_type == IssueType::InvalidEmail));
    }

    #[test]
    fn test_partial_dates_flagged() {
        let df = df![
            "id" => [1i64, 2, 3],
            "expected_close" => ["2023-01-15", "invalid-date", "2023-03-10"],
        ]
        .unwrap();
        let issues = DataQualityAnalyzer::identify_issues(&df, 0.2).unwrap();
        assert!(types_for(&issues, "expected_close").contains(&IssueType::DatePartialParse));
        assert!(!types_for(&issues, "id").contains(&IssueType::DatePartialParse));
    }

    #[test]
    fn test_fully_parseable_dates_not_flagged() {
        let df = df!["d" => ["2023-01-15", "2023-01-16"]].unwrap();
        let issues = DataQualityAnalyzer::identify_issues(&df, 0.2).unwrap();
        assert!(!issues.iter().any(|i| i.issue_type == IssueType::DatePartialParse));
    }

    #[test]
    fn test_constant_column() {
        let df = df![
            "flag" => [Some("y"), Some("y"), None],
            "varied" => [Some("a"), Some("b"), Some("c")],
        ]
        .unwrap();
        let issues = DataQualityAnalyzer::identify_issues(&df, 0.9).unwrap();
        let constant = issues
            .iter()
            .find(|i| i.issue_type == IssueType::ConstantColumn)
            .unwrap();
        assert_eq!(constant.columns, vec!["flag".to_string()]);
        assert_eq!(constant.severity, Severity::Low);
    }

    #[test]
    fn test_outliers_need_extreme_z() {
        let mut values = vec![10.0f64; 30];
        values.push(1000.0);
        let df = df!["amount" => values].unwrap();
        let issues = DataQualityAnalyzer::identify_issues(&df, 0.2).unwrap();
        let outlier = issues
            .iter()
            .find(|i| i.issue_type == IssueType::Outliers)
            .unwrap();
        assert_eq!(outlier.detection_details["outlier_count"], json!(1));
    }

    #[test]
    fn test_outliers_skip_short_columns() {
        let df = df!["amount" => [1.0f64, 2.0, 1000.0, 3.0]].unwrap();
        let issues = DataQualityAnalyzer::identify_issues(&df, 0.2).unwrap();
        assert!(!issues.iter().any(|i| i.issue_type == IssueType::Outliers));
    }

    #[test]
    fn test_dedup_by_title_and_columns() {
        let issue = new_issue(
            "same".to_string(),
            IssueType::ConstantColumn,
            Severity::Low,
            "a",
            "d".to_string(),
            "f",
            [("unique_count", json!(1))],
        );
        let deduped = DataQualityAnalyzer::dedup(vec![issue.clone(), issue]);
        assert_eq!(deduped.len(), 1);
    }

    #[test]
    fn test_no_duplicate_title_column_pairs() {
        let df = df![
            "id" => [Some(1i64), Some(1), None, Some(2)],
            "email" => [Some("a@b.com"), Some("bad@"), None, Some("bad@")],
            "when" => [Some("2023-01-01"), Some("later"), None, Some("soon")],
        ]
        .unwrap();
        let issues = DataQualityAnalyzer::identify_issues(&df, 0.1).unwrap();
        let mut keys = HashSet::new();
        for issue in &issues {
            assert!(keys.insert((issue.title.clone(), issue.columns.clone())));
        }
    }
}
