//! Report generation module.
//!
//! This module assembles the JSON manifest of a run, compares quality
//! reports before and after fixing, and writes the cleaned dataset.
//!
//! # Example
//!
//! ```rust,ignore
//! use qoriq_core::reporting::{Manifest, ReportGenerator};
//!
//! let outcome = Pipeline::new(config)?.run(&df)?;
//! let manifest = Manifest::from_outcome("data/leads.csv", &outcome);
//!
//! let generator = ReportGenerator::new(PathBuf::from("qoriq_output"), None);
//! let artifacts = generator.write_artifacts("data/leads.csv", &outcome)?;
//! println!("{}", artifacts.manifest.display());
//! ```

mod comparison;
mod generator;

pub use comparison::{QualityComparison, ScoreDelta};
pub use generator::{ArtifactPaths, Manifest, ReportGenerator};
