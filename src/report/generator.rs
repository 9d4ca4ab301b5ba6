//! Markdown and JSON report generation.
//!
//! This module renders the derived tables of a run. Charting tools consume
//! the JSON form; the Markdown form is for reading.

use crate::config::ReportConfig;
use crate::error::AnalysisResult;
use crate::models::{
    Category, Decade, DecadeCategory, GenderTrendPoint, Insights, ProportionTable, RepeatWinner,
    Report, ReportMetadata, ValueCount,
};
use anyhow::Result;
use std::fmt::Display;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, config: &ReportConfig) -> String {
    let mut output = String::new();

    output.push_str("# Laureate Statistics Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents(config));
    output.push_str(&generate_summary_section(&report.insights, &report.metadata));

    if config.include_value_counts {
        output.push_str(&generate_value_counts_section(&report.insights));
    }

    output.push_str(&generate_female_proportion_section(
        &report.insights.female_proportions,
    ));
    output.push_str(&generate_country_proportion_section(
        &report.insights.country_proportions,
        &report.metadata.country,
    ));
    output.push_str(&generate_repeat_winners_section(
        &report.insights.repeat_winners,
        config.max_repeat_winners,
    ));

    if config.include_trend {
        output.push_str(&generate_trend_section(&report.insights.gender_trend));
    }

    output.push_str(&generate_female_categories_section(&report.insights));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Dataset:** `{}`\n", metadata.dataset));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Award Records:** {}\n", metadata.records));
    if metadata.duplicates_collapsed > 0 {
        section.push_str(&format!(
            "- **Duplicate Rows Collapsed:** {}\n",
            metadata.duplicates_collapsed
        ));
    }
    section.push_str(&format!("- **Tracked Country:** {}\n", metadata.country));
    section.push_str(&format!(
        "- **Analysis Duration:** {:.3}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(config: &ReportConfig) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    toc.push_str("- [Summary](#summary)\n");
    if config.include_value_counts {
        toc.push_str("- [Most Frequent Values](#most-frequent-values)\n");
    }
    toc.push_str("- [Female Share by Decade and Category](#female-share-by-decade-and-category)\n");
    toc.push_str("- [Birth Country Share by Decade](#birth-country-share-by-decade)\n");
    toc.push_str("- [Repeat Winners](#repeat-winners)\n");
    if config.include_trend {
        toc.push_str("- [Gender Trend by Decade](#gender-trend-by-decade)\n");
    }
    toc.push_str("- [Female Laureates by Category](#female-laureates-by-category)\n");
    toc.push('\n');

    toc
}

/// Render a section result, or the reason it is unavailable.
fn render_outcome<T>(result: &AnalysisResult<T>, render: impl Fn(&T) -> String) -> String {
    match result {
        Ok(value) => render(value),
        Err(e) => format!("_unavailable ({})_", e),
    }
}

fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// Escape a value for use inside a Markdown table cell.
fn cell(value: impl Display) -> String {
    value.to_string().replace('|', "\\|")
}

/// Values tied with the leader, rendered as a suffix.
fn tied_with<T: Display + PartialEq>(leaders: &[ValueCount<T>], leader: &T) -> String {
    let others: Vec<String> = leaders
        .iter()
        .filter(|vc| &vc.value != leader)
        .map(|vc| cell(&vc.value))
        .collect();

    if others.is_empty() {
        String::new()
    } else {
        format!(", tied with {}", others.join(", "))
    }
}

/// Generate the summary section.
fn generate_summary_section(insights: &Insights, metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Insight | Result |\n");
    section.push_str("|:---|:---|\n");

    section.push_str(&format!(
        "| Most awarded sex | {} |\n",
        render_outcome(&insights.most_awarded, |m| format!(
            "{} ({} records{})",
            m.sex,
            m.sex_count,
            tied_with(&insights.sex_leaders, &m.sex)
        ))
    ));
    section.push_str(&format!(
        "| Most awarded birth country | {} |\n",
        render_outcome(&insights.most_awarded, |m| format!(
            "{} ({} records{})",
            cell(&m.birth_country),
            m.country_count,
            tied_with(&insights.country_leaders, &m.birth_country)
        ))
    ));
    section.push_str(&format!(
        "| Highest female share | {} |\n",
        render_outcome(&insights.max_female_proportion, |p| format!(
            "{} ({}, {} of {})",
            p.key,
            percent(p.ratio),
            p.subset,
            p.total
        ))
    ));
    section.push_str(&format!(
        "| Highest {} share | {} |\n",
        cell(&metadata.country),
        render_outcome(&insights.max_country_proportion, |p| format!(
            "{} ({}, {} of {})",
            p.key,
            percent(p.ratio),
            p.subset,
            p.total
        ))
    ));
    section.push_str(&format!(
        "| First female laureate | {} |\n",
        render_outcome(&insights.first_female, |f| format!(
            "{} ({}, {})",
            cell(&f.full_name),
            f.category,
            f.year
        ))
    ));
    section.push_str(&format!(
        "| Repeat winners | {} |\n\n",
        insights.repeat_winners.len()
    ));

    section
}

fn value_count_table<T: Display>(header: &str, counts: &[ValueCount<T>]) -> String {
    let mut table = String::new();

    table.push_str(&format!("| {} | Records |\n", header));
    table.push_str("|:---|:---:|\n");
    for vc in counts {
        table.push_str(&format!("| {} | {} |\n", cell(&vc.value), vc.count));
    }
    table.push('\n');

    table
}

/// Generate the frequency tables for sex and birth country.
fn generate_value_counts_section(insights: &Insights) -> String {
    let mut section = String::new();

    section.push_str("## Most Frequent Values\n\n");
    section.push_str("### Sex\n\n");
    section.push_str(&value_count_table("Sex", &insights.top_sexes));
    section.push_str("### Birth Country\n\n");
    section.push_str(&value_count_table("Birth Country", &insights.top_countries));

    section
}

fn skipped_list<K: Display>(table: &ProportionTable<K>) -> String {
    if table.skipped.is_empty() {
        return String::new();
    }

    let mut list = String::from("Skipped buckets:\n\n");
    for skipped in &table.skipped {
        list.push_str(&format!("- {}: {}\n", skipped.key, skipped.reason));
    }
    list.push('\n');
    list
}

/// Generate the per (decade, category) female share table.
fn generate_female_proportion_section(table: &ProportionTable<DecadeCategory>) -> String {
    let mut section = String::new();

    section.push_str("## Female Share by Decade and Category\n\n");
    if table.buckets.is_empty() && table.skipped.is_empty() {
        section.push_str("No records.\n\n");
        return section;
    }

    section.push_str("| Decade | Category | Female | Total | Share |\n");
    section.push_str("|:---|:---|:---:|:---:|:---:|\n");
    for bucket in &table.buckets {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            bucket.key.decade,
            bucket.key.category,
            bucket.subset,
            bucket.total,
            percent(bucket.ratio)
        ));
    }
    section.push('\n');
    section.push_str(&skipped_list(table));

    section
}

/// Generate the per-decade birth country share table.
fn generate_country_proportion_section(
    table: &ProportionTable<Decade>,
    country: &str,
) -> String {
    let mut section = String::new();

    section.push_str("## Birth Country Share by Decade\n\n");
    section.push_str(&format!(
        "Share of laureates born in **{}** among laureates with a known birth country.\n\n",
        country
    ));

    if !table.buckets.is_empty() {
        section.push_str("| Decade | Born There | Known Country | Share |\n");
        section.push_str("|:---|:---:|:---:|:---:|\n");
        for bucket in &table.buckets {
            section.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                bucket.key,
                bucket.subset,
                bucket.total,
                percent(bucket.ratio)
            ));
        }
        section.push('\n');
    }
    section.push_str(&skipped_list(table));

    section
}

/// Generate the repeat winners table.
fn generate_repeat_winners_section(winners: &[RepeatWinner], limit: Option<usize>) -> String {
    let mut section = String::new();

    section.push_str("## Repeat Winners\n\n");
    if winners.is_empty() {
        section.push_str("No laureate won more than once.\n\n");
        return section;
    }

    section.push_str("| Laureate | ID | Wins | Categories |\n");
    section.push_str("|:---|:---:|:---:|:---|\n");

    let shown = limit.unwrap_or(winners.len()).min(winners.len());
    for winner in &winners[..shown] {
        let categories: Vec<String> = winner.categories.iter().map(|c| c.to_string()).collect();
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            cell(&winner.full_name),
            winner.laureate_id,
            winner.win_count,
            categories.join(", ")
        ));
    }
    section.push('\n');

    if shown < winners.len() {
        section.push_str(&format!("_{} more not shown._\n\n", winners.len() - shown));
    }

    section
}

/// Generate the gender trend table.
fn generate_trend_section(trend: &[GenderTrendPoint]) -> String {
    let mut section = String::new();

    section.push_str("## Gender Trend by Decade\n\n");
    if trend.is_empty() {
        section.push_str("No records.\n\n");
        return section;
    }

    section.push_str("| Decade | Male | Female |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for point in trend {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            point.decade, point.male_count, point.female_count
        ));
    }
    section.push('\n');

    section
}

/// Generate the female-laureates-per-category table, marking the category
/// of the first female laureate.
fn generate_female_categories_section(insights: &Insights) -> String {
    let mut section = String::new();

    section.push_str("## Female Laureates by Category\n\n");
    if insights.female_by_category.is_empty() {
        section.push_str("No female laureates.\n\n");
        return section;
    }

    let first_category: Option<Category> =
        insights.first_female.as_ref().ok().map(|f| f.category);

    section.push_str("| Category | Female Laureates |\n");
    section.push_str("|:---|:---:|\n");
    for vc in &insights.female_by_category {
        let marker = if Some(vc.value) == first_category {
            " ⭐"
        } else {
            ""
        };
        section.push_str(&format!("| {}{} | {} |\n", vc.value, marker, vc.count));
    }
    section.push('\n');

    if first_category.is_some() {
        section.push_str("⭐ Category of the first female laureate.\n\n");
    }

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by laureate-stats*\n");

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
