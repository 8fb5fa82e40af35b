//! Configuration types for the data readiness core.
//!
//! This module provides configuration options using the builder pattern.
//! Scoring weights are an explicit value handed to the scorer; there is no
//! process-wide weight state.

use crate::types::QualityComponent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Default missing-fraction threshold for the high-missingness heuristic.
pub const DEFAULT_MISSING_THRESHOLD: f64 = 0.2;

/// Default cap on the number of changed rows returned in the fix preview.
pub const DEFAULT_PREVIEW_LIMIT: usize = 200;

/// Default number of most frequent values reported per text column.
pub const DEFAULT_TOP_K: usize = 10;

/// Default directory for the cleaned CSV and the manifest.
pub const DEFAULT_OUTPUT_DIR: &str = "qoriq_output";

/// Relative weights of the five quality components in the overall score.
///
/// Weights must be finite and non-negative with a positive sum. They are
/// normalized to sum to 1 before use, so `ScoringWeights::default()`
/// (all equal) makes the overall score the arithmetic mean of the components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub completeness: f64,
    pub consistency: f64,
    pub semantic: f64,
    pub joinability: f64,
    pub safety: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            completeness: 1.0,
            consistency: 1.0,
            semantic: 1.0,
            joinability: 1.0,
            safety: 1.0,
        }
    }
}

impl ScoringWeights {
    /// Build weights from a component mapping. Components that are not
    /// mentioned get weight 0.
    pub fn from_map(weights: &HashMap<QualityComponent, f64>) -> Self {
        let get = |c: QualityComponent| weights.get(&c).copied().unwrap_or(0.0);
        Self {
            completeness: get(QualityComponent::Completeness),
            consistency: get(QualityComponent::Consistency),
            semantic: get(QualityComponent::Semantic),
            joinability: get(QualityComponent::Joinability),
            safety: get(QualityComponent::Safety),
        }
    }

    /// Raw (unnormalized) weight of a component.
    pub fn weight(&self, component: QualityComponent) -> f64 {
        match component {
            QualityComponent::Completeness => self.completeness,
            QualityComponent::Consistency => self.consistency,
            QualityComponent::Semantic => self.semantic,
            QualityComponent::Joinability => self.joinability,
            QualityComponent::Safety => self.safety,
        }
    }

    /// Check that every weight is finite and non-negative and that they do
    /// not all vanish.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let mut total = 0.0;
        for component in QualityComponent::ALL {
            let w = self.weight(component);
            if !w.is_finite() || w < 0.0 {
                return Err(ConfigValidationError::InvalidWeight {
                    component: component.as_str().to_string(),
                    value: w,
                });
            }
            total += w;
        }
        if total <= 0.0 {
            return Err(ConfigValidationError::ZeroWeightSum);
        }
        Ok(())
    }

    /// Validate and rescale so the weights sum to 1.
    pub fn normalized(&self) -> Result<Self, ConfigValidationError> {
        self.validate()?;
        let total: f64 = QualityComponent::ALL.iter().map(|c| self.weight(*c)).sum();
        Ok(Self {
            completeness: self.completeness / total,
            consistency: self.consistency / total,
            semantic: self.semantic / total,
            joinability: self.joinability / total,
            safety: self.safety / total,
        })
    }
}

/// Configuration for a profiling / scoring / fixing run.
///
/// Use [`QoriqConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use qoriq_core::config::QoriqConfig;
///
/// let config = QoriqConfig::builder()
///     .missing_threshold(0.3)
///     .preview_limit(50)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QoriqConfig {
    /// Columns whose missing fraction is at or above this value are flagged.
    /// Default: 0.2
    pub missing_threshold: f64,

    /// Maximum number of changed rows returned in the fix preview.
    /// Default: 200
    pub preview_limit: usize,

    /// Number of most frequent values reported for text columns.
    /// Default: 10
    pub top_k: usize,

    /// Component weights for the overall quality score.
    /// Default: equal weights
    pub weights: ScoringWeights,

    /// Output directory for the cleaned CSV and manifest.
    /// Default: "qoriq_output"
    pub output_dir: PathBuf,

    /// Base name for written artifacts (without extension).
    /// If None, collaborators derive it from the input file name.
    pub output_name: Option<String>,
}

impl Default for QoriqConfig {
    fn default() -> Self {
        Self {
            missing_threshold: DEFAULT_MISSING_THRESHOLD,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
            top_k: DEFAULT_TOP_K,
            weights: ScoringWeights::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            output_name: None,
        }
    }
}

impl QoriqConfig {
    /// Create a new configuration builder.
    pub fn builder() -> QoriqConfigBuilder {
        QoriqConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&self.missing_threshold) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "missing_threshold".to_string(),
                value: self.missing_threshold,
            });
        }

        if self.preview_limit == 0 {
            return Err(ConfigValidationError::InvalidPreviewLimit(
                self.preview_limit,
            ));
        }

        if self.top_k == 0 {
            return Err(ConfigValidationError::InvalidTopK(self.top_k));
        }

        self.weights.validate()
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid preview limit: {0} (must be at least 1)")]
    InvalidPreviewLimit(usize),

    #[error("Invalid top-k: {0} (must be at least 1)")]
    InvalidTopK(usize),

    #[error("Invalid weight for '{component}': {value} (must be finite and non-negative)")]
    InvalidWeight { component: String, value: f64 },

    #[error("Scoring weights must not all be zero")]
    ZeroWeightSum,
}

/// Builder for [`QoriqConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct QoriqConfigBuilder {
    missing_threshold: Option<f64>,
    preview_limit: Option<usize>,
    top_k: Option<usize>,
    weights: Option<ScoringWeights>,
    output_dir: Option<PathBuf>,
    output_name: Option<String>,
}

impl QoriqConfigBuilder {
    /// Set the missing-fraction threshold for flagging columns.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.2 = 20%)
    pub fn missing_threshold(mut self, threshold: f64) -> Self {
        self.missing_threshold = Some(threshold);
        self
    }

    /// Set the maximum number of changed rows in the fix preview.
    pub fn preview_limit(mut self, limit: usize) -> Self {
        self.preview_limit = Some(limit);
        self
    }

    /// Set how many frequent values the profiler reports per text column.
    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    /// Set the component weights of the overall score.
    pub fn weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Set the output directory for written artifacts.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set a custom artifact base name (without extension).
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `QoriqConfig` or an error if validation fails.
    pub fn build(self) -> Result<QoriqConfig, ConfigValidationError> {
        let config = QoriqConfig {
            missing_threshold: self.missing_threshold.unwrap_or(DEFAULT_MISSING_THRESHOLD),
            preview_limit: self.preview_limit.unwrap_or(DEFAULT_PREVIEW_LIMIT),
            top_k: self.top_k.unwrap_or(DEFAULT_TOP_K),
            weights: self.weights.unwrap_or_default(),
            output_dir: self
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            output_name: self.output_name,
        };

        config.validate()?;
        Ok(config)
    }
}
