//! Pipeline module.
//!
//! Runs profile, detect and score on the input, applies the bulk fixes,
//! then profiles, detects and scores the cleaned table. Every step stays
//! callable on its own.

mod builder;
pub mod progress;

pub use builder::{Diagnosis, Pipeline, PipelineBuilder, PipelineOutcome};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
