use crate::cleaner::DataCleaner;
use crate::config::{ConfigValidationError, QoriqConfig};
use crate::error::Result;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::profiler::DataProfiler;
use crate::quality::DataQualityAnalyzer;
use crate::reporting::QualityComparison;
use crate::scoring::QualityScorer;
use crate::types::{CleanOutcome, DatasetProfile, Issue, QualityReport};
use polars::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Profile, issues and score of a single table.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub profile: DatasetProfile,
    pub issues: Vec<Issue>,
    pub quality: QualityReport,
}

/// Everything produced by one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub original_profile: DatasetProfile,
    pub original_issues: Vec<Issue>,
    pub original_quality: QualityReport,
    pub clean: CleanOutcome,
    pub cleaned_profile: DatasetProfile,
    pub cleaned_issues: Vec<Issue>,
    pub cleaned_quality: QualityReport,
    pub comparison: QualityComparison,
}

/// The profile / detect / score / fix pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use qoriq_core::{Pipeline, QoriqConfig};
///
/// let outcome = Pipeline::new(QoriqConfig::default())?.run(&df)?;
/// println!("{}", outcome.comparison);
/// ```
pub struct Pipeline {
    config: QoriqConfig,
    scorer: QualityScorer,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl Pipeline {
    pub fn new(config: QoriqConfig) -> Result<Self> {
        Ok(Self::builder().config(config).build()?)
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &QoriqConfig {
        &self.config
    }

    /// Profile, detect issues in and score a table without changing it.
    pub fn diagnose(&self, df: &DataFrame) -> Result<Diagnosis> {
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Profiling,
            0.0,
            "Profiling dataset...",
        ));
        let profile = DataProfiler::profile_dataset(df, self.config.top_k)?;

        self.report_progress(ProgressUpdate::new(
            PipelineStage::QualityAnalysis,
            0.0,
            "Detecting issues...",
        ));
        let issues = DataQualityAnalyzer::identify_issues(df, self.config.missing_threshold)?;

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Scoring,
            0.0,
            "Scoring quality...",
        ));
        let quality = self
            .scorer
            .score_with_context(df, Some(&profile), Some(&issues))?;

        Ok(Diagnosis {
            profile,
            issues,
            quality,
        })
    }

    /// Run the full pipeline on a table.
    pub fn run(&self, df: &DataFrame) -> Result<PipelineOutcome> {
        match self.run_internal(df) {
            Ok(outcome) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(outcome)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    fn run_internal(&self, df: &DataFrame) -> Result<PipelineOutcome> {
        let start_time = Instant::now();
        info!(
            "Starting pipeline on {} rows x {} columns",
            df.height(),
            df.width()
        );

        let before = self.diagnose(df)?;
        info!(
            "Found {} issues, quality {:.2}%",
            before.issues.len(),
            before.quality.overall_percent
        );

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Cleaning,
            0.0,
            "Applying bulk fixes...",
        ));
        let clean = DataCleaner::clean(df, &before.issues, self.config.preview_limit)?;

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Rescoring,
            0.0,
            "Rescoring cleaned data...",
        ));
        let cleaned_profile = DataProfiler::profile_dataset(&clean.cleaned, self.config.top_k)?;
        let cleaned_issues =
            DataQualityAnalyzer::identify_issues(&clean.cleaned, self.config.missing_threshold)?;
        let cleaned_quality = self.scorer.score_with_context(
            &clean.cleaned,
            Some(&cleaned_profile),
            Some(&cleaned_issues),
        )?;

        let comparison = QualityComparison::between(&before.quality, &cleaned_quality);
        info!(
            "Pipeline finished in {} ms: quality {:.2}% -> {:.2}%",
            start_time.elapsed().as_millis(),
            before.quality.overall_percent,
            cleaned_quality.overall_percent
        );

        Ok(PipelineOutcome {
            original_profile: before.profile,
            original_issues: before.issues,
            original_quality: before.quality,
            clean,
            cleaned_profile,
            cleaned_issues,
            cleaned_quality,
            comparison,
        })
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<QoriqConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl PipelineBuilder {
    pub fn config(mut self, config: QoriqConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            scorer: QualityScorer::with_validated_weights(config.weights),
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.config().missing_threshold, 0.2);
    }

    #[test]
    fn test_pipeline_rejects_invalid_config() {
        let config = QoriqConfig {
            missing_threshold: 1.5,
            ..QoriqConfig::default()
        };
        assert!(Pipeline::new(config).is_err());
    }

    #[test]
    fn test_run_reports_stages_in_order() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = stages.clone();
        let pipeline = Pipeline::builder()
            .on_progress(move |update| sink.lock().unwrap().push(update.stage))
            .build()
            .unwrap();

        let df = df!["id" => [1i64, 2, 2], "email" => ["a@b.com", "bad@", "c@d.org"]].unwrap();
        let outcome = pipeline.run(&df).unwrap();
        assert_eq!(outcome.clean.cleaned.height(), 2);

        let stages = stages.lock().unwrap();
        assert_eq!(stages.first(), Some(&PipelineStage::Profiling));
        assert_eq!(stages.last(), Some(&PipelineStage::Complete));
        assert!(stages.contains(&PipelineStage::Cleaning));
    }

    #[test]
    fn test_run_outcome_is_consistent() {
        let df = df![
            "id" => [1i64, 2, 3],
            "expected_close" => ["2023-01-15", "invalid-date", "2023-03-10"],
        ]
        .unwrap();
        let outcome = Pipeline::new(QoriqConfig::default()).unwrap().run(&df).unwrap();

        assert_eq!(outcome.original_profile.row_count, 3);
        assert_eq!(outcome.cleaned_profile.row_count, 3);
        assert_eq!(
            outcome.comparison.overall.after,
            outcome.cleaned_quality.overall_score
        );
        assert!(outcome.cleaned_quality.overall_score >= outcome.original_quality.overall_score);
    }

    #[test]
    fn test_diagnose_echoes_context() {
        let df = df!["a" => [1i64, 2]].unwrap();
        let diagnosis = Pipeline::builder().build().unwrap().diagnose(&df).unwrap();
        let context = diagnosis.quality.context.unwrap();
        assert_eq!(context.profiled_columns, Some(1));
        assert_eq!(context.issue_count, Some(diagnosis.issues.len()));
    }
}
