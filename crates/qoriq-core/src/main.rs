use anyhow::{Context, Result, anyhow};
use clap::Parser;
use qoriq_core::reporting::{Manifest, QualityComparison, ReportGenerator};
use qoriq_core::{Pipeline, QoriqConfig, QualityScorer, load_csv};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Data readiness diagnostics: profile, detect issues, score and fix tabular data",
    long_about = "Profiles a CSV file, detects data quality issues, scores readiness on five \
                  components and applies conservative bulk fixes.\n\n\
                  EXAMPLES:\n  \
                  # Fix a file and write <name>_cleaned.csv + <name>_manifest.json\n  \
                  qoriq -i leads.csv -o out/\n\n  \
                  # Preview profile, issues and score without writing anything\n  \
                  qoriq -i leads.csv --dry-run\n\n  \
                  # Compare the quality of two files (exits 1 on regression)\n  \
                  qoriq -i before.csv --compare after.csv"
)]
struct Args {
    /// Path to the CSV file to process
    #[arg(short, long)]
    input: String,

    /// Output directory for the cleaned CSV and the manifest
    #[arg(short, long, default_value = qoriq_core::config::DEFAULT_OUTPUT_DIR)]
    output: String,

    /// Custom base name for output files (defaults to the input file stem)
    #[arg(long)]
    output_name: Option<String>,

    /// Missing fraction at which a column is flagged (0.0 - 1.0)
    #[arg(long, default_value_t = qoriq_core::config::DEFAULT_MISSING_THRESHOLD)]
    missing_threshold: f64,

    /// Maximum number of changed rows in the fix preview
    #[arg(long, default_value_t = qoriq_core::config::DEFAULT_PREVIEW_LIMIT)]
    preview_limit: usize,

    /// Number of most frequent values reported per text column
    #[arg(long, default_value_t = qoriq_core::config::DEFAULT_TOP_K)]
    top_k: usize,

    /// Show profile, issues and score without fixing or writing files
    #[arg(long)]
    dry_run: bool,

    /// Score this file against the input and print the comparison
    #[arg(long, value_name = "AFTER_CSV")]
    compare: Option<String>,

    /// Tolerance for regression checks in --compare mode
    #[arg(long, default_value_t = 0.0)]
    tolerance: f64,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logging so stdout only contains JSON.
    #[arg(long)]
    json: bool,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    if let Some(after) = args.compare.as_deref() {
        return run_compare(&args, after);
    }

    let mut builder = QoriqConfig::builder()
        .missing_threshold(args.missing_threshold)
        .preview_limit(args.preview_limit)
        .top_k(args.top_k)
        .output_dir(&args.output);
    if let Some(name) = &args.output_name {
        builder = builder.output_name(name);
    }
    let config = builder.build()?;

    info!("Loading dataset from: {}", args.input);
    let data = load_csv(&args.input).with_context(|| format!("reading {}", args.input))?;
    info!("Dataset loaded successfully: {:?}", data.shape());

    let pipeline = Pipeline::builder()
        .config(config)
        .on_progress(|update| {
            debug!(
                "[{:>3.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        })
        .build()?;

    if args.dry_run {
        let diagnosis = pipeline.diagnose(&data)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&diagnosis)?);
        } else {
            print_diagnosis(&args.input, &diagnosis);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = pipeline.run(&data)?;
    let generator = ReportGenerator::new(
        pipeline.config().output_dir.clone(),
        pipeline.config().output_name.clone(),
    );
    let artifacts = generator.write_artifacts(&args.input, &outcome)?;

    if args.json {
        let manifest = Manifest::from_outcome(&args.input, &outcome);
        println!("{}", serde_json::to_string_pretty(&manifest)?);
    } else {
        let summary = &outcome.clean.summary;
        println!();
        println!("{}", "=".repeat(60));
        println!("FIX COMPLETE");
        println!("{}", "=".repeat(60));
        println!("Input:    {}", args.input);
        println!("Cleaned:  {}", artifacts.cleaned_csv.display());
        println!("Manifest: {}", artifacts.manifest.display());
        println!();
        println!(
            "Issues: {} before, {} after",
            outcome.original_issues.len(),
            outcome.cleaned_issues.len()
        );
        println!(
            "Rows changed: {} ({} removed)",
            summary.rows_changed_total, summary.rows_removed
        );
        for (column, count) in &summary.per_column_changed {
            println!("  {:20} {} cells", column, count);
        }
        if !summary.date_columns_standardized.is_empty() {
            println!(
                "Dates standardized: {}",
                summary.date_columns_standardized.join(", ")
            );
        }
        println!();
        print!("{}", outcome.comparison);
    }

    Ok(ExitCode::SUCCESS)
}

/// Score two files and report whether the second regresses.
fn run_compare(args: &Args, after_path: &str) -> Result<ExitCode> {
    let before = load_csv(&args.input).with_context(|| format!("reading {}", args.input))?;
    let after = load_csv(after_path).with_context(|| format!("reading {}", after_path))?;

    let scorer = QualityScorer::default();
    let comparison = QualityComparison::between(&scorer.score(&before)?, &scorer.score(&after)?);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else {
        print!("{}", comparison);
    }

    let regressions = comparison.regressions(args.tolerance);
    if regressions.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("Quality regressed: {}", regressions.join(", "));
        Ok(ExitCode::FAILURE)
    }
}

fn print_diagnosis(input: &str, diagnosis: &qoriq_core::pipeline::Diagnosis) {
    let profile = &diagnosis.profile;

    println!("\n{}", "=".repeat(60));
    println!("DRY RUN - {}", input);
    println!("{}\n", "=".repeat(60));
    println!("Rows: {}  Columns: {}", profile.row_count, profile.column_count);
    println!();

    println!("COLUMNS");
    println!("{}", "-".repeat(40));
    for col in &profile.columns {
        println!(
            "  {:20} {:10} {:10} missing {:>5.1}%  unique {}",
            col.name,
            col.dtype,
            col.kind.as_str(),
            col.missing_fraction * 100.0,
            col.unique_count
        );
    }
    println!();

    println!("ISSUES ({})", diagnosis.issues.len());
    println!("{}", "-".repeat(40));
    for issue in &diagnosis.issues {
        println!("  [{:?}] {}", issue.severity, issue.title);
        println!("      {}", issue.description);
    }
    println!();

    println!(
        "QUALITY: {:.4} ({:.2}%)",
        diagnosis.quality.overall_score, diagnosis.quality.overall_percent
    );
    for (component, score) in &diagnosis.quality.components {
        println!("  {:15}: {:.4}", component.as_str(), score.score);
    }
}
