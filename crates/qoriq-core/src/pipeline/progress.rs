//! Progress reporting for the pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use qoriq_core::Pipeline;
//!
//! let outcome = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run(&df)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Profiling the input table
    Profiling,
    /// Detecting issues in the input table
    QualityAnalysis,
    /// Scoring the input table
    Scoring,
    /// Applying bulk fixes
    Cleaning,
    /// Profiling, detecting and scoring the cleaned table
    Rescoring,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl PipelineStage {
    /// Stages that do work, in execution order.
    pub const WORKING: [PipelineStage; 5] = [
        Self::Profiling,
        Self::QualityAnalysis,
        Self::Scoring,
        Self::Cleaning,
        Self::Rescoring,
    ];

    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Profiling => "Profiling Dataset",
            Self::QualityAnalysis => "Detecting Issues",
            Self::Scoring => "Scoring Quality",
            Self::Cleaning => "Applying Fixes",
            Self::Rescoring => "Rescoring Cleaned Data",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the whole run spent in this stage. The working stages sum
    /// to 1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Profiling => 0.15,
            Self::QualityAnalysis => 0.15,
            Self::Scoring => 0.15,
            Self::Cleaning => 0.30,
            Self::Rescoring => 0.25,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Complete => 1.0,
            Self::Failed => 0.0,
            stage => Self::WORKING
                .iter()
                .take_while(|s| *s != stage)
                .map(PipelineStage::weight)
                .sum(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,
    /// Overall progress (0.0 - 1.0)
    pub progress: f32,
    pub message: String,
}

impl ProgressUpdate {
    /// Progress update at `stage_progress` (0.0 - 1.0) through a stage.
    pub fn new(stage: PipelineStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + stage.weight() * stage_progress.clamp(0.0, 1.0);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Complete,
            progress: 1.0,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Failed,
            progress: 0.0,
            message: message.into(),
        }
    }
}

/// Receives progress updates from a pipeline run.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}
