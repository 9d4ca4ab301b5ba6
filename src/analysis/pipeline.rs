//! Aggregation pipeline over the laureate table.
//!
//! Every operation is a pure function of `&[LaureateRecord]` built on the
//! combinators in [`super::aggregator`]. None of them mutate the table, so
//! calling one twice yields identical results.

use super::aggregator::{count_by, group_fold, ValueCounts};
use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{
    Category, Decade, DecadeCategory, FirstLaureate, GenderTrendPoint, Insights, LaureateRecord,
    MostAwarded, ProportionResult, ProportionTable, RepeatWinner, Sex, SkippedBucket, ValueCount,
};
use tracing::debug;

/// Birth country tracked by [`usa_proportion_by_decade`].
pub const USA: &str = "United States of America";

/// Tunables for a full pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Birth country whose share is tracked per decade.
    pub country: String,
    /// Length of the top-N frequency tables.
    pub top_n: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            country: USA.to_string(),
            top_n: 10,
        }
    }
}

/// Record counts per sex, organizations excluded.
pub fn sex_counts(records: &[LaureateRecord]) -> ValueCounts<Sex> {
    ValueCounts::tally(records, |r| r.sex)
}

/// Record counts per birth country, missing countries excluded.
pub fn country_counts(records: &[LaureateRecord]) -> ValueCounts<String> {
    ValueCounts::tally(records, |r| r.birth_country.clone())
}

/// Most frequent sex and most frequent birth country, tallied independently.
///
/// Ties go to the value seen first in row order.
pub fn most_awarded_gender_and_country(
    records: &[LaureateRecord],
) -> AnalysisResult<MostAwarded> {
    let sexes = sex_counts(records);
    let sex = sexes
        .leader()
        .ok_or_else(|| AnalysisError::missing_field("sex", "no record has a sex"))?;

    let countries = country_counts(records);
    let country = countries.leader().ok_or_else(|| {
        AnalysisError::missing_field("birth_country", "no record has a birth country")
    })?;

    Ok(MostAwarded {
        sex: sex.value,
        sex_count: sex.count,
        birth_country: country.value.clone(),
        country_count: country.count,
    })
}

/// Share of female records per (decade, category), in key order.
///
/// The denominator is every record of the group, organizations included.
pub fn female_proportion_table(records: &[LaureateRecord]) -> ProportionTable<DecadeCategory> {
    let groups = group_fold(
        records,
        |r| {
            Some(DecadeCategory {
                decade: r.decade(),
                category: r.category,
            })
        },
        || (0usize, 0usize),
        |(female, total): &mut (usize, usize), r| {
            *total += 1;
            if r.is_female() {
                *female += 1;
            }
        },
    );

    build_table(groups)
}

/// The (decade, category) with the highest female share.
///
/// Ties go to the earliest decade, then the first category in canonical order.
pub fn female_proportion_by_decade_and_category(
    records: &[LaureateRecord],
) -> AnalysisResult<ProportionResult<DecadeCategory>> {
    female_proportion_table(records).max_ratio()
}

/// Share of records born in `country` per decade, in decade order.
///
/// Only records with a birth country count toward the denominator. A decade
/// where none have one is reported as skipped.
pub fn country_proportion_table(
    records: &[LaureateRecord],
    country: &str,
) -> ProportionTable<Decade> {
    let groups = group_fold(
        records,
        |r| Some(r.decade()),
        || (0usize, 0usize),
        |(matching, known): &mut (usize, usize), r| {
            if let Some(ref born) = r.birth_country {
                *known += 1;
                if born == country {
                    *matching += 1;
                }
            }
        },
    );

    build_table(groups)
}

/// The decade with the highest share of US-born laureates. Earliest wins ties.
pub fn usa_proportion_by_decade(
    records: &[LaureateRecord],
) -> AnalysisResult<ProportionResult<Decade>> {
    country_proportion_table(records, USA).max_ratio()
}

/// Turn `(key, (subset, total))` groups into a key-ordered table.
fn build_table<K>(mut groups: Vec<(K, (usize, usize))>) -> ProportionTable<K>
where
    K: Ord + Clone + std::fmt::Display,
{
    groups.sort_by(|a, b| a.0.cmp(&b.0));

    let mut table = ProportionTable::default();
    for (key, (subset, total)) in groups {
        match ProportionResult::new(key.clone(), subset, total) {
            Ok(bucket) => table.buckets.push(bucket),
            Err(reason) => {
                debug!("Skipping bucket {}: {}", key, reason);
                table.skipped.push(SkippedBucket { key, reason });
            }
        }
    }
    table
}

#[derive(Default)]
struct WinTally {
    full_name: String,
    win_count: usize,
    categories: Vec<Category>,
}

/// Laureates with two or more records.
///
/// Sorted by win count descending, then laureate id ascending.
pub fn repeat_winners(records: &[LaureateRecord]) -> Vec<RepeatWinner> {
    let groups = group_fold(
        records,
        |r| Some(r.laureate_id),
        WinTally::default,
        |tally: &mut WinTally, r| {
            if tally.win_count == 0 {
                tally.full_name = r.full_name.clone();
            }
            tally.win_count += 1;
            if !tally.categories.contains(&r.category) {
                tally.categories.push(r.category);
            }
        },
    );

    let mut winners: Vec<RepeatWinner> = groups
        .into_iter()
        .filter(|(_, tally)| tally.win_count >= 2)
        .map(|(laureate_id, tally)| RepeatWinner {
            laureate_id,
            full_name: tally.full_name,
            win_count: tally.win_count,
            categories: tally.categories,
        })
        .collect();

    winners.sort_by(|a, b| {
        b.win_count
            .cmp(&a.win_count)
            .then_with(|| a.laureate_id.cmp(&b.laureate_id))
    });
    winners
}

/// Male and female counts for every decade present in the data, ascending.
pub fn gender_trend_by_decade(records: &[LaureateRecord]) -> Vec<GenderTrendPoint> {
    let mut points: Vec<GenderTrendPoint> = group_fold(
        records,
        |r| Some(r.decade()),
        || (0usize, 0usize),
        |(male, female): &mut (usize, usize), r| match r.sex {
            Some(Sex::Male) => *male += 1,
            Some(Sex::Female) => *female += 1,
            None => {}
        },
    )
    .into_iter()
    .map(|(decade, (male_count, female_count))| GenderTrendPoint {
        decade,
        male_count,
        female_count,
    })
    .collect();

    points.sort_by_key(|p| p.decade);
    points
}

/// The earliest female laureate. Ties go to the first row.
pub fn first_female_laureate(records: &[LaureateRecord]) -> AnalysisResult<FirstLaureate> {
    records
        .iter()
        .filter(|r| r.is_female())
        .min_by_key(|r| r.year)
        .map(|r| FirstLaureate {
            full_name: r.full_name.clone(),
            category: r.category,
            year: r.year,
        })
        .ok_or_else(|| AnalysisError::empty_group("female laureates"))
}

/// Female record counts per category, most frequent first.
pub fn female_counts_by_category(records: &[LaureateRecord]) -> Vec<ValueCount<Category>> {
    let mut counts: Vec<ValueCount<Category>> =
        count_by(records, |r| r.is_female().then_some(r.category))
            .into_iter()
            .map(|(value, count)| ValueCount { value, count })
            .collect();

    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    counts
}

/// Run every analysis over the table.
pub fn compute_insights(records: &[LaureateRecord], options: &AnalysisOptions) -> Insights {
    debug!("Computing insights over {} records", records.len());

    let female_proportions = female_proportion_table(records);
    let max_female_proportion = female_proportions.max_ratio();

    let country_proportions = country_proportion_table(records, &options.country);
    let max_country_proportion = country_proportions.max_ratio();
    if !country_proportions.skipped.is_empty() {
        debug!(
            "{} decade(s) without birth-country data",
            country_proportions.skipped.len()
        );
    }

    let repeat_winners = repeat_winners(records);
    debug!("Found {} repeat winners", repeat_winners.len());

    let sexes = sex_counts(records);
    let countries = country_counts(records);

    Insights {
        most_awarded: most_awarded_gender_and_country(records),
        sex_leaders: sexes.leaders(),
        country_leaders: countries.leaders(),
        top_sexes: sexes.top(options.top_n),
        top_countries: countries.top(options.top_n),
        female_proportions,
        max_female_proportion,
        country_proportions,
        max_country_proportion,
        repeat_winners,
        gender_trend: gender_trend_by_decade(records),
        first_female: first_female_laureate(records),
        female_by_category: female_counts_by_category(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        year: i32,
        category: Category,
        laureate_id: u32,
        name: &str,
        sex: Option<Sex>,
        country: Option<&str>,
    ) -> LaureateRecord {
        LaureateRecord {
            year,
            category,
            laureate_id,
            full_name: name.to_string(),
            sex,
            birth_country: country.map(String::from),
            organization_name: None,
        }
    }

    fn sample() -> Vec<LaureateRecord> {
        let male = Some(Sex::Male);
        let female = Some(Sex::Female);
        vec![
            record(1901, Category::Physics, 1, "Wilhelm Röntgen", male, Some("Germany")),
            record(1903, Category::Physics, 6, "Marie Curie", female, Some("Poland")),
            record(1911, Category::Chemistry, 6, "Marie Curie", female, Some("Poland")),
            record(1917, Category::Peace, 482, "ICRC", None, None),
            record(1944, Category::Peace, 482, "ICRC", None, None),
            record(1954, Category::Chemistry, 217, "Linus Pauling", male, Some(USA)),
            record(1962, Category::Peace, 217, "Linus Pauling", male, Some(USA)),
            record(1963, Category::Peace, 482, "ICRC", None, None),
            record(1964, Category::Physics, 300, "Charles Townes", male, Some(USA)),
            record(1965, Category::Medicine, 301, "François Jacob", male, Some("France")),
        ]
    }

    #[test]
    fn test_most_awarded_counts_are_maximal() {
        let records = sample();
        let most = most_awarded_gender_and_country(&records).unwrap();

        assert_eq!(most.sex, Sex::Male);
        assert_eq!(most.sex_count, 5);
        assert_eq!(most.birth_country, USA);
        assert_eq!(most.country_count, 3);

        for vc in sex_counts(&records).as_slice() {
            assert!(most.sex_count >= vc.count);
        }
        for vc in country_counts(&records).as_slice() {
            assert!(most.country_count >= vc.count);
        }
    }

    #[test]
    fn test_most_awarded_tie_goes_to_first_row() {
        let records = vec![
            record(2000, Category::Physics, 1, "A", Some(Sex::Female), Some("Sweden")),
            record(2000, Category::Physics, 2, "B", Some(Sex::Male), Some("Norway")),
        ];
        let most = most_awarded_gender_and_country(&records).unwrap();
        assert_eq!(most.sex, Sex::Female);
        assert_eq!(most.birth_country, "Sweden");
    }

    #[test]
    fn test_compute_insights_reports_tied_leaders() {
        let records = vec![
            record(2000, Category::Physics, 1, "A", Some(Sex::Male), Some("A")),
            record(2001, Category::Physics, 2, "B", Some(Sex::Female), Some("B")),
        ];
        let insights = compute_insights(&records, &AnalysisOptions::default());

        let most = insights.most_awarded.unwrap();
        assert_eq!(most.sex, Sex::Male);
        assert_eq!(most.birth_country, "A");

        let sexes: Vec<_> = insights.sex_leaders.iter().map(|vc| vc.value).collect();
        assert_eq!(sexes, vec![Sex::Male, Sex::Female]);
        let countries: Vec<_> = insights
            .country_leaders
            .iter()
            .map(|vc| vc.value.as_str())
            .collect();
        assert_eq!(countries, vec!["A", "B"]);
        assert!(insights.sex_leaders.iter().all(|vc| vc.count == 1));
    }

    #[test]
    fn test_most_awarded_requires_sex() {
        let records = vec![record(2000, Category::Peace, 1, "Org", None, Some("Sweden"))];
        let err = most_awarded_gender_and_country(&records).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingField { field: "sex", .. }));
    }

    #[test]
    fn test_female_proportion_half() {
        let records = vec![
            record(2020, Category::Literature, 1, "A", Some(Sex::Female), None),
            record(2020, Category::Literature, 2, "B", Some(Sex::Male), None),
        ];
        let best = female_proportion_by_decade_and_category(&records).unwrap();
        assert_eq!(
            best.key,
            DecadeCategory {
                decade: Decade(2020),
                category: Category::Literature
            }
        );
        assert_eq!(best.ratio, 0.5);
        assert_eq!(best.total, 2);
    }

    #[test]
    fn test_female_proportion_tie_break() {
        let records = vec![
            record(2015, Category::Peace, 1, "A", Some(Sex::Female), None),
            record(2005, Category::Literature, 2, "B", Some(Sex::Female), None),
            record(2004, Category::Chemistry, 3, "C", Some(Sex::Female), None),
        ];
        let best = female_proportion_by_decade_and_category(&records).unwrap();
        assert_eq!(best.key.decade, Decade(2000));
        assert_eq!(best.key.category, Category::Chemistry);
    }

    #[test]
    fn test_female_ratios_within_bounds() {
        let table = female_proportion_table(&sample());
        assert!(table.skipped.is_empty());
        for bucket in &table.buckets {
            assert!(bucket.total > 0);
            assert!((0.0..=1.0).contains(&bucket.ratio));
        }
        let keys: Vec<_> = table.buckets.iter().map(|b| b.key).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_country_proportion_skips_decade_without_countries() {
        let table = country_proportion_table(&sample(), USA);

        let skipped: Vec<_> = table.skipped.iter().map(|s| s.key).collect();
        assert_eq!(skipped, vec![Decade(1940)]);
        assert_eq!(table.skipped[0].reason, AnalysisError::empty_group("1940s"));

        let sixties = table
            .buckets
            .iter()
            .find(|b| b.key == Decade(1960))
            .unwrap();
        // ICRC has no birth country and stays out of the denominator
        assert_eq!(sixties.total, 3);
        assert_eq!(sixties.subset, 2);
    }

    #[test]
    fn test_usa_proportion_max_decade() {
        let best = usa_proportion_by_decade(&sample()).unwrap();
        assert_eq!(best.key, Decade(1950));
        assert_eq!(best.ratio, 1.0);
    }

    #[test]
    fn test_usa_proportion_all_empty() {
        let records = vec![record(1917, Category::Peace, 482, "ICRC", None, None)];
        let err = usa_proportion_by_decade(&records).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyGroup { .. }));
    }

    #[test]
    fn test_repeat_winners_collapses_categories() {
        let records = vec![
            record(1917, Category::Peace, 7, "X", None, None),
            record(1944, Category::Peace, 7, "X", None, None),
        ];
        let winners = repeat_winners(&records);
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].win_count, 2);
        assert_eq!(winners[0].categories, vec![Category::Peace]);
    }

    #[test]
    fn test_repeat_winners_ordering() {
        let winners = repeat_winners(&sample());
        let ids: Vec<_> = winners.iter().map(|w| w.laureate_id).collect();
        assert_eq!(ids, vec![482, 6, 217]);

        assert_eq!(winners[1].full_name, "Marie Curie");
        assert_eq!(
            winners[1].categories,
            vec![Category::Physics, Category::Chemistry]
        );
        assert!(winners.iter().all(|w| w.win_count >= 2));
    }

    #[test]
    fn test_gender_trend_sums_match() {
        let records = sample();
        let trend = gender_trend_by_decade(&records);

        let decades: Vec<_> = trend.iter().map(|p| p.decade).collect();
        assert_eq!(
            decades,
            vec![
                Decade(1900),
                Decade(1910),
                Decade(1940),
                Decade(1950),
                Decade(1960)
            ]
        );

        for point in &trend {
            let expected = records
                .iter()
                .filter(|r| r.decade() == point.decade && r.sex.is_some())
                .count();
            assert_eq!(point.male_count + point.female_count, expected);
        }

        let forties = trend.iter().find(|p| p.decade == Decade(1940)).unwrap();
        assert_eq!((forties.male_count, forties.female_count), (0, 0));
    }

    #[test]
    fn test_first_female_laureate() {
        let first = first_female_laureate(&sample()).unwrap();
        assert_eq!(first.full_name, "Marie Curie");
        assert_eq!(first.category, Category::Physics);
        assert_eq!(first.year, 1903);

        let none = vec![record(1901, Category::Physics, 1, "A", Some(Sex::Male), None)];
        assert!(first_female_laureate(&none).is_err());
    }

    #[test]
    fn test_female_counts_by_category() {
        let counts = female_counts_by_category(&sample());
        assert_eq!(
            counts,
            vec![
                ValueCount {
                    value: Category::Physics,
                    count: 1
                },
                ValueCount {
                    value: Category::Chemistry,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_operations_are_idempotent() {
        let records = sample();
        assert_eq!(repeat_winners(&records), repeat_winners(&records));
        assert_eq!(
            gender_trend_by_decade(&records),
            gender_trend_by_decade(&records)
        );
        assert_eq!(
            female_proportion_table(&records),
            female_proportion_table(&records)
        );
        assert_eq!(
            most_awarded_gender_and_country(&records),
            most_awarded_gender_and_country(&records)
        );
        assert_eq!(
            country_proportion_table(&records, USA),
            country_proportion_table(&records, USA)
        );
        assert_eq!(
            usa_proportion_by_decade(&records),
            usa_proportion_by_decade(&records)
        );
    }

    #[test]
    fn test_compute_insights_empty_table() {
        let insights = compute_insights(&[], &AnalysisOptions::default());
        assert!(insights.most_awarded.is_err());
        assert!(insights.max_female_proportion.is_err());
        assert!(insights.max_country_proportion.is_err());
        assert!(insights.repeat_winners.is_empty());
        assert!(insights.gender_trend.is_empty());
    }

    #[test]
    fn test_compute_insights_respects_options() {
        let options = AnalysisOptions {
            country: "Poland".to_string(),
            top_n: 1,
        };
        let insights = compute_insights(&sample(), &options);
        assert_eq!(insights.top_countries.len(), 1);
        assert_eq!(insights.top_sexes.len(), 1);
        // 1900s: 1 of 2, 1910s: 1 of 1
        assert_eq!(
            insights.max_country_proportion.unwrap().key,
            Decade(1910)
        );
    }
}
