//! laureate-stats - descriptive statistics over the Nobel laureate dataset
//!
//! A CLI tool that loads the laureate CSV, runs the aggregation pipeline
//! and writes the derived tables as a Markdown or JSON report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, config, unreadable dataset, etc.)

use anyhow::{Context, Result};
use chrono::Utc;
use laureate_stats::analysis::{self, AnalysisOptions};
use laureate_stats::cli::{Args, OutputFormat};
use laureate_stats::config::{Config, CONFIG_FILE};
use laureate_stats::dataset::{self, Dataset, LoadOptions};
use laureate_stats::models::{Report, ReportMetadata};
use laureate_stats::report;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config is loaded before logging so `general.verbose` can set the level
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(config.log_level(&args));

    info!("laureate-stats v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Config: {:?}", config);

    match run_stats(args, config) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .laureate-stats.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the dataset path, tracked country and report sections.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete statistics workflow. Returns the exit code.
fn run_stats(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    // Step 1: Load the dataset
    let data_path = PathBuf::from(&config.dataset.path);
    let mut load_options = LoadOptions::try_from(&config.dataset)?;
    load_options.show_progress = !args.quiet;

    if !args.quiet {
        println!("📥 Loading dataset: {}", data_path.display());
    }
    let dataset = dataset::load_dataset(&data_path, &load_options)?;

    if args.dry_run {
        return handle_dry_run(&dataset);
    }

    // Step 2: Run the pipeline
    let options = AnalysisOptions::from(&config.analysis);
    if !args.quiet {
        println!("🔬 Analyzing {} award records...", dataset.len());
    }
    if dataset.is_empty() {
        warn!("Dataset has no records; every section will be empty");
    }
    let insights = analysis::compute_insights(dataset.records(), &options);

    // Step 3: Build and write the report
    let report = Report {
        metadata: ReportMetadata {
            dataset: dataset.source().to_string(),
            analysis_date: Utc::now(),
            records: dataset.len(),
            duplicates_collapsed: dataset.duplicates_collapsed(),
            country: options.country.clone(),
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        insights,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report, &config.report),
    };

    let output_path = output_path(&args, &config);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;
    info!("Report written to {}", output_path.display());

    if !args.quiet {
        print_summary(&report);
        println!("\n✅ Report saved to: {}", output_path.display());
    }

    Ok(0)
}

/// Resolve the report path. JSON output defaults to a `.json` extension.
fn output_path(args: &Args, config: &Config) -> PathBuf {
    let mut path = PathBuf::from(&config.general.output);
    if args.output.is_none() && args.format == OutputFormat::Json {
        path.set_extension("json");
    }
    path
}

/// Print the headline numbers to stdout.
fn print_summary(report: &Report) {
    let insights = &report.insights;

    println!("\n📊 Summary:");
    println!("   Records: {}", report.metadata.records);
    if let Ok(ref most) = insights.most_awarded {
        println!(
            "   Most awarded: {} ({}), {} ({})",
            most.sex, most.sex_count, most.birth_country, most.country_count
        );
    }
    if let Ok(ref best) = insights.max_female_proportion {
        println!(
            "   Highest female share: {} ({:.1}%)",
            best.key,
            best.ratio * 100.0
        );
    }
    if let Ok(ref best) = insights.max_country_proportion {
        println!(
            "   Highest {} share: {} ({:.1}%)",
            report.metadata.country,
            best.key,
            best.ratio * 100.0
        );
    }
    println!("   Repeat winners: {}", insights.repeat_winners.len());
}

/// Handle --dry-run: report what was loaded, exit.
fn handle_dry_run(dataset: &Dataset) -> Result<i32> {
    println!("\n🔍 Dry run: dataset loaded, no report written.\n");
    println!("   Award records: {}", dataset.len());
    println!(
        "   Duplicate rows collapsed: {}",
        dataset.duplicates_collapsed()
    );

    let years = dataset.records().iter().map(|r| r.year);
    if let (Some(first), Some(last)) = (years.clone().min(), years.max()) {
        println!("   Years: {}-{}", first, last);
    }

    println!("\n✅ Dry run complete.");
    Ok(0)
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is initialized, so problems go to stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Failed to load {}: {:#}. Using defaults.", CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}
