//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.laureate-stats.toml` files.

use crate::analysis::AnalysisOptions;
use crate::dataset::FIRST_AWARD_YEAR;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".laureate-stats.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset settings.
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "laureate_report.md".to_string()
}

/// Dataset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Path to the laureate CSV.
    #[serde(default = "default_dataset_path")]
    pub path: String,

    /// CSV field delimiter.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Earliest accepted award year.
    #[serde(default = "default_first_year")]
    pub first_year: i32,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            delimiter: default_delimiter(),
            first_year: default_first_year(),
        }
    }
}

fn default_dataset_path() -> String {
    "nobel.csv".to_string()
}

fn default_delimiter() -> char {
    ','
}

fn default_first_year() -> i32 {
    FIRST_AWARD_YEAR
}

/// Analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Birth country tracked per decade.
    #[serde(default = "default_country")]
    pub country: String,

    /// Number of rows in the frequency tables.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let options = AnalysisOptions::default();
        Self {
            country: options.country,
            top_n: options.top_n,
        }
    }
}

fn default_country() -> String {
    AnalysisOptions::default().country
}

fn default_top_n() -> usize {
    AnalysisOptions::default().top_n
}

impl From<&AnalysisConfig> for AnalysisOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            country: config.country.clone(),
            top_n: config.top_n,
        }
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the sex and birth-country frequency tables.
    #[serde(default = "default_true")]
    pub include_value_counts: bool,

    /// Include the gender trend table.
    #[serde(default = "default_true")]
    pub include_trend: bool,

    /// Cap on repeat winners listed. All are listed when unset.
    #[serde(default)]
    pub max_repeat_winners: Option<usize>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_value_counts: true,
            include_trend: true,
            max_repeat_winners: None,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.dataset.path = data.display().to_string();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(ref country) = args.country {
            self.analysis.country = country.clone();
        }
        if let Some(top_n) = args.top_n {
            self.analysis.top_n = top_n;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
        if args.quiet {
            self.general.verbose = false;
        }
    }

    /// Log level for this run after merging with CLI flags.
    pub fn log_level(&self, args: &crate::cli::Args) -> tracing::Level {
        args.log_level(self.general.verbose)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
