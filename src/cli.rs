//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// laureate-stats - descriptive statistics over the Nobel laureate dataset
///
/// Computes gender ratios, country trends and repeat winners from a
/// laureate CSV and writes them as a Markdown or JSON report.
///
/// Examples:
///   laureate-stats --data nobel.csv
///   laureate-stats --data nobel.csv --format json --output stats.json
///   laureate-stats --data nobel.csv --country Germany --top-n 5
///   laureate-stats --data nobel.csv --dry-run
///   laureate-stats --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Laureate CSV file to analyze
    ///
    /// Falls back to `dataset.path` from the config file, then `nobel.csv`.
    #[arg(short, long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .laureate-stats.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Birth country tracked in the per-decade proportion
    #[arg(long, value_name = "COUNTRY", env = "LAUREATE_STATS_COUNTRY")]
    pub country: Option<String>,

    /// Number of rows in the frequency tables
    #[arg(long, value_name = "COUNT")]
    pub top_n: Option<usize>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: load and validate the dataset without writing a report
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .laureate-stats.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.top_n == Some(0) {
            return Err("Top-N must be at least 1".to_string());
        }

        if let Some(ref country) = self.country {
            if country.trim().is_empty() {
                return Err("Country must not be empty".to_string());
            }
        }

        // Validate dataset path if provided
        if let Some(ref data) = self.data {
            if !data.exists() {
                return Err(format!("Dataset does not exist: {}", data.display()));
            }
            if !data.is_file() {
                return Err(format!("Dataset is not a file: {}", data.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is `general.verbose` from the config file; `--quiet`
    /// overrides it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            data: None,
            output: None,
            format: OutputFormat::Markdown,
            config: None,
            country: None,
            top_n: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "laureate-stats",
            "--format",
            "json",
            "--top-n",
            "5",
            "--country",
            "Germany",
        ])
        .unwrap();
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.top_n, Some(5));
        assert_eq!(args.country.as_deref(), Some("Germany"));
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_top_n() {
        let mut args = make_args();
        args.top_n = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_dataset() {
        let mut args = make_args();
        args.data = Some(PathBuf::from("/nonexistent/nobel.csv"));
        let err = args.validate().unwrap_err();
        assert!(err.contains("does not exist"));
    }

    #[test]
    fn test_validation_skipped_for_init_config() {
        let mut args = make_args();
        args.init_config = true;
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_log_level_from_config_verbose() {
        let mut args = make_args();
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }
}
