//! Text and JSON summary generation.
//!
//! The summary carries the table-wide totals and the head of each
//! operator ranking.

use crate::analysis::{Analysis, OperatorSurvival, Ranked};
use anyhow::Result;
use serde::Serialize;

/// Serializable summary printed at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary<'a> {
    pub total_crashes: usize,
    pub total_fatalities: i64,
    pub total_survivors: i64,
    pub top_by_crashes: &'a [Ranked<usize>],
    pub top_by_fatalities: &'a [Ranked<f64>],
    pub top_by_survival_rate: Vec<SurvivalEntry<'a>>,
}

/// One entry of the survival ranking as shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct SurvivalEntry<'a> {
    pub operator: &'a str,
    pub aboard: f64,
    pub survival_rate: Option<f64>,
}

impl<'a> From<&'a OperatorSurvival> for SurvivalEntry<'a> {
    fn from(s: &'a OperatorSurvival) -> Self {
        Self {
            operator: &s.operator,
            aboard: s.aboard,
            survival_rate: s.survival_rate(),
        }
    }
}

impl<'a> Summary<'a> {
    /// Build a summary keeping the first `preview` entries of each ranking.
    pub fn new(analysis: &'a Analysis, preview: usize) -> Self {
        let head = |len: usize| len.min(preview);

        Self {
            total_crashes: analysis.totals.records,
            total_fatalities: analysis.totals.fatalities_truncated(),
            total_survivors: analysis.totals.survivors_truncated(),
            top_by_crashes: &analysis.top_by_crashes[..head(analysis.top_by_crashes.len())],
            top_by_fatalities: &analysis.top_by_fatalities
                [..head(analysis.top_by_fatalities.len())],
            top_by_survival_rate: analysis
                .top_by_aboard
                .iter()
                .take(preview)
                .map(SurvivalEntry::from)
                .collect(),
        }
    }
}

/// Generate the plain-text summary.
pub fn generate_text_summary(summary: &Summary<'_>) -> String {
    let mut output = String::new();

    output.push_str(&format!("Total Crashes Recorded: {}\n", summary.total_crashes));
    output.push_str(&format!("Total Fatalities: {}\n", summary.total_fatalities));
    output.push_str(&format!("Total Survivors: {}\n", summary.total_survivors));

    output.push_str(&generate_ranking_section(
        "Top Airlines by Crashes",
        summary
            .top_by_crashes
            .iter()
            .map(|r| (r.operator.as_str(), r.value.to_string())),
    ));

    output.push_str(&generate_ranking_section(
        "Top Airlines by Fatalities",
        summary
            .top_by_fatalities
            .iter()
            .map(|r| (r.operator.as_str(), format!("{:.1}", r.value))),
    ));

    output.push_str(&generate_ranking_section(
        "Top Airlines by Survival Rate",
        summary
            .top_by_survival_rate
            .iter()
            .map(|s| (s.operator, format_rate(s.survival_rate))),
    ));

    output
}

/// Format one ranking as an aligned two-column block.
fn generate_ranking_section<'a>(
    title: &str,
    entries: impl Iterator<Item = (&'a str, String)>,
) -> String {
    let entries: Vec<(&str, String)> = entries.collect();
    let mut section = format!("\n{}:\n", title);

    if entries.is_empty() {
        section.push_str("  (none)\n");
        return section;
    }

    let width = entries
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0);

    for (name, value) in entries {
        section.push_str(&format!("  {:<width$}  {}\n", name, value, width = width));
    }

    section
}

fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(r) => format!("{:.2}%", r),
        None => "n/a".to_string(),
    }
}

/// Generate a JSON summary.
pub fn generate_json_summary(summary: &Summary<'_>) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(Into::into)
}
