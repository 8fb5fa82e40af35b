use crate::types::{QualityComponent, QualityReport};
use crate::utils::round_to;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Before/after value of one score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreDelta {
    pub before: f64,
    pub after: f64,
    /// `after - before`, rounded to 4 decimals.
    pub delta: f64,
}

impl ScoreDelta {
    fn new(before: f64, after: f64) -> Self {
        Self {
            before,
            after,
            delta: round_to(after - before, 4),
        }
    }
}

/// Component-by-component comparison of two quality reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityComparison {
    pub overall: ScoreDelta,
    pub components: BTreeMap<QualityComponent, ScoreDelta>,
}

impl QualityComparison {
    pub fn between(before: &QualityReport, after: &QualityReport) -> Self {
        let components = QualityComponent::ALL
            .iter()
            .map(|c| (*c, ScoreDelta::new(before.component(*c), after.component(*c))))
            .collect();
        Self {
            overall: ScoreDelta::new(before.overall_score, after.overall_score),
            components,
        }
    }

    /// Scores guarded against regression: overall, completeness and safety.
    pub fn regressions(&self, tolerance: f64) -> Vec<&'static str> {
        let mut regressed = Vec::new();
        if self.overall.delta < -tolerance {
            regressed.push("overall");
        }
        for component in [QualityComponent::Completeness, QualityComponent::Safety] {
            if self
                .components
                .get(&component)
                .is_some_and(|d| d.delta < -tolerance)
            {
                regressed.push(component.as_str());
            }
        }
        regressed
    }

    pub fn is_regression(&self, tolerance: f64) -> bool {
        !self.regressions(tolerance).is_empty()
    }
}

impl fmt::Display for QualityComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Quality Score Comparison")?;
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(
            f,
            "Before: {:.4} ({:.2}%)",
            self.overall.before,
            self.overall.before * 100.0
        )?;
        writeln!(
            f,
            "After:  {:.4} ({:.2}%)",
            self.overall.after,
            self.overall.after * 100.0
        )?;
        writeln!(f, "Change: {:+.4}", self.overall.delta)?;
        writeln!(f)?;
        writeln!(f, "Component Breakdown:")?;
        writeln!(f, "{}", "-".repeat(60))?;
        for (component, d) in &self.components {
            writeln!(
                f,
                "{:15}: {:.4} -> {:.4} ({:+.4})",
                component.as_str(),
                d.before,
                d.after,
                d.delta
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ComponentScore;
    use serde_json::Value;

    fn report(scores: [f64; 5]) -> QualityReport {
        let components = QualityComponent::ALL
            .iter()
            .zip(scores)
            .map(|(c, score)| {
                (
                    *c,
                    ComponentScore {
                        score,
                        detail: Value::Null,
                    },
                )
            })
            .collect();
        let overall = scores.iter().sum::<f64>() / 5.0;
        QualityReport {
            components,
            overall_score: round_to(overall, 4),
            overall_percent: round_to(overall * 100.0, 2),
            context: None,
        }
    }

    #[test]
    fn test_between_computes_deltas() {
        let before = report([0.5, 1.0, 1.0, 0.0, 1.0]);
        let after = report([1.0, 1.0, 1.0, 0.0, 1.0]);
        let cmp = QualityComparison::between(&before, &after);

        assert_eq!(cmp.components[&QualityComponent::Completeness].delta, 0.5);
        assert_eq!(cmp.overall.delta, 0.1);
        assert!(!cmp.is_regression(0.0));
    }

    #[test]
    fn test_guarded_component_regression() {
        let before = report([1.0, 0.5, 1.0, 0.0, 1.0]);
        let after = report([1.0, 1.0, 1.0, 0.0, 0.9]);
        let cmp = QualityComparison::between(&before, &after);

        // Overall improves but safety drops.
        assert!(cmp.overall.delta > 0.0);
        assert_eq!(cmp.regressions(0.0), vec!["safety"]);
        assert!(!cmp.is_regression(0.2));
    }

    #[test]
    fn test_consistency_drop_is_not_guarded() {
        let before = report([1.0, 1.0, 1.0, 1.0, 1.0]);
        let after = report([1.0, 0.99, 1.0, 1.0, 1.0]);
        let cmp = QualityComparison::between(&before, &after);
        assert_eq!(cmp.regressions(0.01), Vec::<&str>::new());
    }

    #[test]
    fn test_display_lists_components() {
        let before = report([1.0; 5]);
        let text = QualityComparison::between(&before, &before).to_string();
        assert!(text.contains("completeness"));
        assert!(text.contains("Change: +0.0000"));
    }
}
