//! CSV loader for the laureate table.
//!
//! The source file lists a laureate once per affiliation, so the same
//! (laureate, category, year) award can appear on several rows. The loader
//! keeps the first of those rows and counts the rest.

use crate::models::{Category, LaureateRecord, Sex};
use anyhow::{bail, Context, Result};
use chrono::{Datelike, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// First year the prizes were awarded.
pub const FIRST_AWARD_YEAR: i32 = 1901;

/// Options for reading a dataset.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field delimiter.
    pub delimiter: u8,
    /// Earliest accepted award year.
    pub first_year: i32,
    /// Latest accepted award year.
    pub last_year: i32,
    /// Whether to show a progress spinner.
    pub show_progress: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            first_year: FIRST_AWARD_YEAR,
            last_year: Utc::now().year(),
            show_progress: false,
        }
    }
}

impl TryFrom<&crate::config::DatasetConfig> for LoadOptions {
    type Error = anyhow::Error;

    fn try_from(config: &crate::config::DatasetConfig) -> Result<Self> {
        let delimiter = u8::try_from(config.delimiter).with_context(|| {
            format!("Delimiter must be a single-byte character: {:?}", config.delimiter)
        })?;

        Ok(Self {
            delimiter,
            first_year: config.first_year,
            ..Self::default()
        })
    }
}

/// One CSV row as it appears in the file. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct RawRow {
    year: i32,
    category: String,
    laureate_id: u32,
    full_name: String,
    sex: Option<String>,
    birth_country: Option<String>,
    organization_name: Option<String>,
}

impl RawRow {
    fn into_record(self, options: &LoadOptions) -> Result<LaureateRecord> {
        if !(options.first_year..=options.last_year).contains(&self.year) {
            bail!(
                "year {} outside the award range {}..={}",
                self.year,
                options.first_year,
                options.last_year
            );
        }

        let category: Category = self.category.parse()?;
        let sex = match self.sex.as_deref() {
            Some(value) => Some(value.parse::<Sex>()?),
            None => None,
        };

        Ok(LaureateRecord {
            year: self.year,
            category,
            laureate_id: self.laureate_id,
            full_name: self.full_name,
            sex,
            birth_country: self.birth_country,
            organization_name: self.organization_name,
        })
    }
}

/// The immutable laureate table.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: String,
    records: Vec<LaureateRecord>,
    duplicates_collapsed: usize,
}

impl Dataset {
    /// Build a dataset from already-typed records.
    ///
    /// Repeated (laureate, category, year) records are collapsed to the first.
    pub fn from_records(source: impl Into<String>, records: Vec<LaureateRecord>) -> Self {
        let mut seen = HashSet::new();
        let total = records.len();
        let records: Vec<LaureateRecord> = records
            .into_iter()
            .filter(|r| seen.insert((r.laureate_id, r.category, r.year)))
            .collect();

        Self {
            source: source.into(),
            duplicates_collapsed: total - records.len(),
            records,
        }
    }

    /// Where the records were read from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn records(&self) -> &[LaureateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of duplicate award rows dropped while loading.
    pub fn duplicates_collapsed(&self) -> usize {
        self.duplicates_collapsed
    }
}

/// Load the dataset from a CSV file.
pub fn load_dataset(path: &Path, options: &LoadOptions) -> Result<Dataset> {
    info!("Loading dataset: {}", path.display());

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open dataset: {}", path.display()))?;

    read_dataset(file, &path.display().to_string(), options)
        .with_context(|| format!("Failed to load dataset: {}", path.display()))
}

/// Read a dataset from any CSV source with a header row.
pub fn read_dataset<R: Read>(reader: R, source: &str, options: &LoadOptions) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let progress = if options.show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} rows {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut records = Vec::new();
    for (index, row) in csv_reader.deserialize::<RawRow>().enumerate() {
        // Line 1 is the header
        let line = index + 2;
        let row = row.with_context(|| format!("Malformed row at line {}", line))?;
        let record = row
            .into_record(options)
            .with_context(|| format!("Invalid row at line {}", line))?;
        records.push(record);
        progress.inc(1);
    }
    progress.finish_and_clear();

    let dataset = Dataset::from_records(source, records);
    if dataset.duplicates_collapsed() > 0 {
        warn!(
            "Collapsed {} duplicate award rows (one row per affiliation)",
            dataset.duplicates_collapsed()
        );
    }
    debug!("Loaded {} award records from {}", dataset.len(), source);

    Ok(dataset)
}
