//! Data models for the laureate statistics.
//!
//! This module contains the fixed-schema laureate record, the grouping keys
//! derived from it, and the result types produced by the analysis pipeline.

use crate::error::{AnalysisError, AnalysisResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Award category. Declaration order is the canonical order used for
/// tie-breaking and table layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    Physics,
    Chemistry,
    Medicine,
    Literature,
    Peace,
    Economics,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Physics => write!(f, "Physics"),
            Category::Chemistry => write!(f, "Chemistry"),
            Category::Medicine => write!(f, "Medicine"),
            Category::Literature => write!(f, "Literature"),
            Category::Peace => write!(f, "Peace"),
            Category::Economics => write!(f, "Economics"),
        }
    }
}

/// A categorical cell held a value outside its fixed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for Category {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "physics" => Ok(Category::Physics),
            "chemistry" => Ok(Category::Chemistry),
            "medicine" | "physiology or medicine" => Ok(Category::Medicine),
            "literature" => Ok(Category::Literature),
            "peace" => Ok(Category::Peace),
            "economics" | "economic sciences" => Ok(Category::Economics),
            _ => Err(UnknownValue {
                kind: "category",
                value: s.to_string(),
            }),
        }
    }
}

/// Sex of a person laureate. Organizations have none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Sex {
    Male,
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "Male"),
            Sex::Female => write!(f, "Female"),
        }
    }
}

impl FromStr for Sex {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            _ => Err(UnknownValue {
                kind: "sex",
                value: s.to_string(),
            }),
        }
    }
}

/// Decade bucket: a year truncated to its decade (2023 -> 2020).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Decade(pub i32);

impl Decade {
    pub fn from_year(year: i32) -> Self {
        Decade(year.div_euclid(10) * 10)
    }
}

impl fmt::Display for Decade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// One award instance: a (laureate, year, category) triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaureateRecord {
    /// Award year.
    pub year: i32,
    /// Award category.
    pub category: Category,
    /// Identifier of the person or organization. Repeats for repeat winners.
    pub laureate_id: u32,
    /// Full name of the laureate.
    pub full_name: String,
    /// Sex; `None` for organizations.
    pub sex: Option<Sex>,
    /// Birth country; `None` for organizations and missing data.
    pub birth_country: Option<String>,
    /// Affiliated organization, if any.
    pub organization_name: Option<String>,
}

impl LaureateRecord {
    /// Decade bucket of the award year.
    pub fn decade(&self) -> Decade {
        Decade::from_year(self.year)
    }

    /// Whether the record belongs to a female laureate.
    pub fn is_female(&self) -> bool {
        self.sex == Some(Sex::Female)
    }
}

/// Grouping key for the per-decade, per-category tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DecadeCategory {
    pub decade: Decade,
    pub category: Category,
}

impl fmt::Display for DecadeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.decade, self.category)
    }
}

/// A subset count over a group total, with the derived ratio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionResult<K> {
    /// Group key.
    pub key: K,
    /// Number of records in the denominator.
    pub total: usize,
    /// Number of records in the numerator.
    pub subset: usize,
    /// `subset / total`, always within `[0, 1]`.
    pub ratio: f64,
}

impl<K: fmt::Display> ProportionResult<K> {
    /// Build a proportion, refusing a zero denominator.
    pub fn new(key: K, subset: usize, total: usize) -> AnalysisResult<Self> {
        if total == 0 {
            return Err(AnalysisError::empty_group(key.to_string()));
        }
        Ok(Self {
            key,
            total,
            subset,
            ratio: subset as f64 / total as f64,
        })
    }
}

/// A bucket that could not produce a proportion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedBucket<K> {
    pub key: K,
    pub reason: AnalysisError,
}

/// Per-bucket proportions, in ascending key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionTable<K> {
    /// Buckets with a defined ratio.
    pub buckets: Vec<ProportionResult<K>>,
    /// Buckets whose ratio was undefined.
    pub skipped: Vec<SkippedBucket<K>>,
}

impl<K> Default for ProportionTable<K> {
    fn default() -> Self {
        Self {
            buckets: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<K: Clone + fmt::Display> ProportionTable<K> {
    /// Bucket with the highest ratio. Earlier buckets win ties.
    pub fn max_ratio(&self) -> AnalysisResult<ProportionResult<K>> {
        let mut best: Option<&ProportionResult<K>> = None;
        for bucket in &self.buckets {
            match best {
                Some(current) if bucket.ratio <= current.ratio => {}
                _ => best = Some(bucket),
            }
        }
        best.cloned()
            .ok_or_else(|| AnalysisError::empty_group("no bucket with a defined ratio"))
    }
}

/// Most frequent sex and birth country, each with its record count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MostAwarded {
    pub sex: Sex,
    pub sex_count: usize,
    pub birth_country: String,
    pub country_count: usize,
}

/// A laureate with two or more award records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepeatWinner {
    pub laureate_id: u32,
    pub full_name: String,
    pub win_count: usize,
    /// Distinct categories won, in order of first occurrence.
    pub categories: Vec<Category>,
}

/// Male and female record counts for one decade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenderTrendPoint {
    pub decade: Decade,
    pub male_count: usize,
    pub female_count: usize,
}

/// The earliest female laureate in the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirstLaureate {
    pub full_name: String,
    pub category: Category,
    pub year: i32,
}

/// A value with its record count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount<T> {
    pub value: T,
    pub count: usize,
}

/// Every derived table of one run. Each section fails independently.
#[derive(Debug, Clone, Serialize)]
pub struct Insights {
    pub most_awarded: AnalysisResult<MostAwarded>,
    /// Every sex tied at the highest count.
    pub sex_leaders: Vec<ValueCount<Sex>>,
    /// Every birth country tied at the highest count.
    pub country_leaders: Vec<ValueCount<String>>,
    pub top_sexes: Vec<ValueCount<Sex>>,
    pub top_countries: Vec<ValueCount<String>>,
    pub female_proportions: ProportionTable<DecadeCategory>,
    pub max_female_proportion: AnalysisResult<ProportionResult<DecadeCategory>>,
    pub country_proportions: ProportionTable<Decade>,
    pub max_country_proportion: AnalysisResult<ProportionResult<Decade>>,
    pub repeat_winners: Vec<RepeatWinner>,
    pub gender_trend: Vec<GenderTrendPoint>,
    pub first_female: AnalysisResult<FirstLaureate>,
    pub female_by_category: Vec<ValueCount<Category>>,
}

/// Metadata about the statistics report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Path of the dataset that was analyzed.
    pub dataset: String,
    /// Date and time of the analysis.
    pub analysis_date: DateTime<Utc>,
    /// Number of award records analyzed.
    pub records: usize,
    /// Duplicate affiliation rows collapsed by the loader.
    pub duplicates_collapsed: usize,
    /// Country used for the birth-country proportion.
    pub country: String,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

/// The complete statistics report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub insights: Insights,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_canonical_order() {
        assert!(Category::Physics < Category::Chemistry);
        assert!(Category::Medicine < Category::Literature);
        assert!(Category::Peace < Category::Economics);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("physics".parse::<Category>(), Ok(Category::Physics));
        assert_eq!("Medicine".parse::<Category>(), Ok(Category::Medicine));
        assert_eq!(
            "Economic Sciences".parse::<Category>(),
            Ok(Category::Economics)
        );
        assert!("Mathematics".parse::<Category>().is_err());
    }

    #[test]
    fn test_sex_from_str() {
        assert_eq!("Female".parse::<Sex>(), Ok(Sex::Female));
        assert_eq!(" male ".parse::<Sex>(), Ok(Sex::Male));
        let err = "org".parse::<Sex>().unwrap_err();
        assert_eq!(err.to_string(), "unknown sex `org`");
    }

    #[test]
    fn test_decade_from_year() {
        assert_eq!(Decade::from_year(2023), Decade(2020));
        assert_eq!(Decade::from_year(1901), Decade(1900));
        assert_eq!(Decade::from_year(1910), Decade(1910));
        assert_eq!(Decade(1930).to_string(), "1930s");
    }

    #[test]
    fn test_proportion_rejects_zero_total() {
        let err = ProportionResult::new(Decade(1900), 0, 0).unwrap_err();
        assert_eq!(err, AnalysisError::empty_group("1900s"));

        let ok = ProportionResult::new(Decade(1900), 1, 4).unwrap();
        assert_eq!(ok.ratio, 0.25);
    }

    #[test]
    fn test_max_ratio_prefers_earlier_bucket() {
        let table = ProportionTable {
            buckets: vec![
                ProportionResult::new(Decade(1900), 1, 2).unwrap(),
                ProportionResult::new(Decade(1910), 2, 4).unwrap(),
                ProportionResult::new(Decade(1920), 1, 4).unwrap(),
            ],
            skipped: Vec::new(),
        };
        assert_eq!(table.max_ratio().unwrap().key, Decade(1900));

        let empty: ProportionTable<Decade> = ProportionTable::default();
        assert!(matches!(
            empty.max_ratio(),
            Err(AnalysisError::EmptyGroup { .. })
        ));
    }
}
