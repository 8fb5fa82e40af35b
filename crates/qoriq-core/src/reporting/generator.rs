use crate::error::{QoriqError, Result, ResultExt};
use crate::pipeline::PipelineOutcome;
use crate::types::{DatasetProfile, FixSummary, Issue, QualityReport};
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// JSON manifest of one profile / detect / score / fix run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Timestamp when the manifest was generated
    pub generated_at: String,
    /// Path to the input file
    pub input_file: String,
    pub original_profile: DatasetProfile,
    pub original_issues: Vec<Issue>,
    pub original_quality: QualityReport,
    pub cleaned_profile: DatasetProfile,
    pub cleaned_issues: Vec<Issue>,
    pub cleaned_quality: QualityReport,
    pub change_summary: FixSummary,
}

impl Manifest {
    pub fn from_outcome(input_file: &str, outcome: &PipelineOutcome) -> Self {
        Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.to_string(),
            original_profile: outcome.original_profile.clone(),
            original_issues: outcome.original_issues.clone(),
            original_quality: outcome.original_quality.clone(),
            cleaned_profile: outcome.cleaned_profile.clone(),
            cleaned_issues: outcome.cleaned_issues.clone(),
            cleaned_quality: outcome.cleaned_quality.clone(),
            change_summary: outcome.clean.summary.clone(),
        }
    }
}

/// Paths of the files written for one run.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub cleaned_csv: PathBuf,
    pub manifest: PathBuf,
}

pub struct ReportGenerator {
    output_dir: PathBuf,
    output_name: Option<String>,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(crate::config::DEFAULT_OUTPUT_DIR),
            output_name: None,
        }
    }
}

impl ReportGenerator {
    /// Create a new ReportGenerator with custom output settings.
    pub fn new(output_dir: PathBuf, output_name: Option<String>) -> Self {
        Self {
            output_dir,
            output_name,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Base name for artifacts: the configured name, else the input file
    /// stem, else `dataset`.
    pub fn base_name(&self, input_file: &str) -> String {
        self.output_name.clone().unwrap_or_else(|| {
            Path::new(input_file)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "dataset".to_string())
        })
    }

    /// Write `<base>_cleaned.csv` with a header row and `"` quoting.
    pub fn save_cleaned_csv(&self, df: &DataFrame, base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let output_path = self.output_dir.join(format!("{}_cleaned.csv", base_name));
        let mut file = File::create(&output_path)?;

        let mut df = df.clone();
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(&mut df)
            .context(format!("writing {}", output_path.display()))?;

        info!("Cleaned dataset saved: {}", output_path.display());
        Ok(output_path)
    }

    /// Write `<base>_manifest.json`, pretty-printed.
    pub fn write_manifest(&self, manifest: &Manifest, base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let manifest_path = self.output_dir.join(format!("{}_manifest.json", base_name));
        let mut file = File::create(&manifest_path)?;
        file.write_all(serde_json::to_string_pretty(manifest)?.as_bytes())?;

        info!("Manifest saved: {}", manifest_path.display());
        Ok(manifest_path)
    }

    /// Write the cleaned CSV and the manifest of a pipeline run.
    pub fn write_artifacts(&self, input_file: &str, outcome: &PipelineOutcome) -> Result<ArtifactPaths> {
        let base_name = self.base_name(input_file);
        let manifest = Manifest::from_outcome(input_file, outcome);

        let cleaned_csv = self
            .save_cleaned_csv(&outcome.clean.cleaned, &base_name)
            .map_err(|e| QoriqError::ReportGenerationFailed(e.to_string()))?;
        let manifest = self
            .write_manifest(&manifest, &base_name)
            .map_err(|e| QoriqError::ReportGenerationFailed(e.to_string()))?;

        Ok(ArtifactPaths {
            cleaned_csv,
            manifest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_from_input() {
        let generator = ReportGenerator::new(PathBuf::from("out"), None);
        assert_eq!(generator.base_name("data/leads.csv"), "leads");
        assert_eq!(generator.base_name(""), "dataset");

        let named = ReportGenerator::new(PathBuf::from("out"), Some("custom".to_string()));
        assert_eq!(named.base_name("data/leads.csv"), "custom");
    }

    #[test]
    fn test_save_cleaned_csv_round_trip() {
        let dir = std::env::temp_dir().join(format!("qoriq_report_{}", std::process::id()));
        let generator = ReportGenerator::new(dir.clone(), None);
        let df = df![
            "id" => [1i64, 2],
            "note" => [Some("a, b"), None],
        ]
        .unwrap();

        let path = generator.save_cleaned_csv(&df, "sample").unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("id,note"));
        assert_eq!(lines.next(), Some("1,\"a, b\""));
        assert_eq!(lines.next(), Some("2,"));

        fs::remove_dir_all(dir).ok();
    }
}
