//! Data Readiness Core
//!
//! Profiling, issue detection, explainable quality scoring and a conservative
//! bulk fixer for small-to-medium tabular datasets, built on Polars.
//!
//! # Overview
//!
//! - **Profiling**: per-column dtype, missingness, cardinality, numeric
//!   summaries and most frequent values
//! - **Issue Detection**: missing values, duplicate ids, mixed types, invalid
//!   emails, partial dates, constant columns and outliers
//! - **Quality Scoring**: completeness, consistency, semantic validity,
//!   joinability and PII safety, each in `[0, 1]` with an explanation
//! - **Bulk Fixing**: imputation, email masking, numeric coercion, ISO date
//!   standardization and de-duplication, with full change accounting
//!
//! Dirty data never panics or errors: a value that cannot be parsed keeps
//! its original form.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use qoriq_core::{Pipeline, QoriqConfig, load_csv};
//!
//! let df = load_csv("leads.csv")?;
//!
//! let config = QoriqConfig::builder()
//!     .missing_threshold(0.2)
//!     .preview_limit(50)
//!     .build()?;
//!
//! let outcome = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run(&df)?;
//!
//! println!("{}", outcome.comparison);
//! println!("Rows changed: {}", outcome.clean.summary.rows_changed_total);
//! ```
//!
//! # Individual Stages
//!
//! Each stage is usable on its own:
//!
//! ```rust,ignore
//! use qoriq_core::{DataCleaner, DataProfiler, detect_issues, score};
//!
//! let profile = DataProfiler::profile_dataset(&df, 10)?;
//! let issues = detect_issues(&df, 0.2)?;
//! let report = score(&df)?;
//! let outcome = DataCleaner::clean(&df, &issues, 200)?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod parsing;
pub mod pipeline;
pub mod profiler;
pub mod quality;
pub mod reporting;
pub mod scoring;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::DataCleaner;
pub use config::{ConfigValidationError, QoriqConfig, QoriqConfigBuilder, ScoringWeights};
pub use error::{QoriqError, Result, ResultExt};
pub use imputers::StatisticalImputer;
pub use parsing::ParseOutcome;
pub use pipeline::{
    ClosureProgressReporter, Diagnosis, Pipeline, PipelineBuilder, PipelineOutcome,
    PipelineStage, ProgressReporter, ProgressUpdate,
};
pub use profiler::DataProfiler;
pub use quality::{DataQualityAnalyzer, detect_issues};
pub use reporting::{Manifest, QualityComparison, ReportGenerator};
pub use scoring::{QualityScorer, score};
pub use types::{
    CellChange, ChangeRecord, CleanOutcome, ColumnKind, ColumnProfile, ComponentScore,
    DatasetProfile, FixSummary, Issue, IssueType, NumericStats, QualityComponent, QualityReport,
    ScoringContext, Severity, TopValue,
};
pub use utils::load_csv;
