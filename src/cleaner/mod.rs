//! Cell cleaning: annotated counts and free-text dates.
//!
//! Nothing in here fails. A value that cannot be understood becomes
//! `None` and the record is kept.

use crate::models::{CrashRecord, CrashTable, RawRecord, RawTable};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

/// Placeholder the source uses for an unknown count.
const PLACEHOLDER: &str = "?";

/// Non-greedy: each `(` is closed by the first `)` after it.
static ANNOTATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*?\)").expect("regex is valid"));

/// Date formats tried when no configuration overrides them.
pub fn default_date_formats() -> Vec<String> {
    vec!["%B %d, %Y", "%m/%d/%Y", "%Y-%m-%d", "%d %B %Y", "%b %d, %Y"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Strip parenthesised annotations and surrounding whitespace.
pub fn strip_annotations(raw: &str) -> String {
    ANNOTATION.replace_all(raw, "").trim().to_string()
}

/// Parse an annotated count such as `"139 (passengers:130 crew:9)"`.
///
/// Returns `None` for the `?` placeholder, empty cells and anything
/// that is not a finite number once annotations are removed.
pub fn clean_numeric(raw: &str) -> Option<f64> {
    let text = strip_annotations(raw);
    if text.is_empty() || text == PLACEHOLDER {
        return None;
    }

    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a date using the first format that matches.
///
/// Falls back to the leading `YYYY-MM-DD` of timestamp-like values.
pub fn parse_date(raw: &str, formats: &[String]) -> Option<NaiveDate> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            text.get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })
}

/// Clean one raw row.
///
/// Operator names are trimmed, so `"Aeroflot "` and `"Aeroflot"` group
/// together downstream.
pub fn clean_record(raw: &RawRecord, date_formats: &[String]) -> CrashRecord {
    let operator = raw.operator.trim();

    CrashRecord {
        date: parse_date(&raw.date, date_formats),
        operator: (!operator.is_empty()).then(|| operator.to_string()),
        aboard: clean_numeric(&raw.aboard),
        fatalities: clean_numeric(&raw.fatalities),
    }
}

/// Clean the whole table, consuming the raw text.
pub fn clean_table(raw: RawTable, date_formats: &[String]) -> CrashTable {
    let records: Vec<CrashRecord> = raw
        .rows
        .iter()
        .map(|row| clean_record(row, date_formats))
        .collect();

    let stats = CleaningStats::from_records(&records);
    info!(
        "Cleaned {} records ({} without date, {} without aboard, {} without fatalities)",
        records.len(),
        stats.missing_date,
        stats.missing_aboard,
        stats.missing_fatalities
    );
    debug!(
        "Records without operator: {}, without survival rate: {}",
        stats.missing_operator, stats.missing_survival_rate
    );

    CrashTable::new(records)
}

/// Counts of values that were missing or unparseable after cleaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleaningStats {
    pub missing_date: usize,
    pub missing_operator: usize,
    pub missing_aboard: usize,
    pub missing_fatalities: usize,
    /// Records whose survival rate is undefined, including zero aboard.
    pub missing_survival_rate: usize,
}

impl CleaningStats {
    pub fn from_records(records: &[CrashRecord]) -> Self {
        let mut stats = Self::default();
        for r in records {
            stats.missing_date += usize::from(r.date.is_none());
            stats.missing_operator += usize::from(r.operator.is_none());
            stats.missing_aboard += usize::from(r.aboard.is_none());
            stats.missing_fatalities += usize::from(r.fatalities.is_none());
            stats.missing_survival_rate += usize::from(r.survival_rate().is_none());
        }
        stats
    }
}
