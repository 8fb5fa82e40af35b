//! Statistical summaries for column profiling.

use crate::types::{NumericStats, TopValue};
use crate::utils::{mean, sample_std};
use std::collections::HashMap;

/// Min / max / mean / sample std of the non-missing values.
pub(crate) fn numeric_stats(values: &[f64]) -> NumericStats {
    if values.is_empty() {
        return NumericStats::default();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    NumericStats {
        min: Some(min),
        max: Some(max),
        mean: mean(values),
        std: sample_std(values),
    }
}

/// The `k` most frequent non-missing values, most frequent first. Ties keep
/// first-appearance order.
pub(crate) fn top_values(reprs: &[Option<String>], k: usize) -> Vec<TopValue> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (idx, value) in reprs.iter().enumerate() {
        if let Some(v) = value {
            counts.entry(v.as_str()).or_insert((0, idx)).0 += 1;
        }
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(value, (count, first))| (value, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(k)
        .map(|(value, count, _)| TopValue {
            value: value.to_string(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reprs(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_numeric_stats_basic() {
        let stats = numeric_stats(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.max, Some(5.0));
        assert_eq!(stats.mean, Some(3.0));
        assert!((stats.std.unwrap() - 1.5811).abs() < 1e-3);
    }

    #[test]
    fn test_numeric_stats_single_value_has_no_std() {
        let stats = numeric_stats(&[5.0]);
        assert_eq!(stats.mean, Some(5.0));
        assert_eq!(stats.std, None);
    }

    #[test]
    fn test_numeric_stats_empty() {
        assert_eq!(numeric_stats(&[]), NumericStats::default());
    }

    #[test]
    fn test_top_values_order_and_limit() {
        let values = reprs(&[Some("b"), Some("a"), None, Some("a"), Some("c"), Some("b"), Some("a")]);
        let top = top_values(&values, 2);
        assert_eq!(
            top,
            vec![
                TopValue { value: "a".to_string(), count: 3 },
                TopValue { value: "b".to_string(), count: 2 },
            ]
        );
    }

    #[test]
    fn test_top_values_ties_keep_first_appearance() {
        let values = reprs(&[Some("y"), Some("x")]);
        let top = top_values(&values, 10);
        assert_eq!(top[0].value, "y");
        assert_eq!(top[1].value, "x");
    }
}
