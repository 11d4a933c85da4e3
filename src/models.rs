//! Data models for the crash statistics pipeline.
//!
//! This module contains the record types that flow between the loader,
//! cleaner and aggregator. Derived quantities are methods rather than
//! fields so they can never drift from the cleaned values they come from.

use chrono::{Datelike, NaiveDate};

/// One data row as read from the source file, before any cleaning.
///
/// Only the columns used downstream are kept. Every value is the raw cell
/// text; an empty cell stays an empty string here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// Free-text date, e.g. `September 17, 1908`.
    pub date: String,
    /// Operator name (airline, air force, private owner...).
    pub operator: String,
    /// Persons on board, possibly annotated: `"4 (passengers:2 crew:2)"`.
    pub aboard: String,
    /// Persons killed, same annotation convention as `aboard`.
    pub fatalities: String,
}

/// The raw table produced by the loader.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Column names in file order, after the descriptive column was dropped.
    pub columns: Vec<String>,
    /// Rows in file order.
    pub rows: Vec<RawRecord>,
}

impl RawTable {
    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    #[allow(dead_code)] // Pairs with len()
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A crash record after cleaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrashRecord {
    /// Parsed date, `None` if the source text was empty or unparseable.
    pub date: Option<NaiveDate>,
    /// Operator name, `None` if the cell was empty.
    pub operator: Option<String>,
    /// Persons on board.
    pub aboard: Option<f64>,
    /// Persons killed.
    pub fatalities: Option<f64>,
}

impl CrashRecord {
    /// `aboard - fatalities`, only when both are present.
    pub fn survivors(&self) -> Option<f64> {
        match (self.aboard, self.fatalities) {
            (Some(aboard), Some(fatalities)) => Some(aboard - fatalities),
            _ => None,
        }
    }

    /// Percentage of people on board who survived.
    ///
    /// `None` when either input is missing or when nobody was on board,
    /// since the ratio is not finite in that case.
    pub fn survival_rate(&self) -> Option<f64> {
        let aboard = self.aboard?;
        let rate = self.survivors()? / aboard * 100.0;
        rate.is_finite().then_some(rate)
    }

    /// Calendar year of the accident.
    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }
}

/// The cleaned table threaded from the cleaner into the aggregator.
#[derive(Debug, Clone, Default)]
pub struct CrashTable {
    pub records: Vec<CrashRecord>,
}

impl CrashTable {
    pub fn new(records: Vec<CrashRecord>) -> Self {
        Self { records }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over the records in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, CrashRecord> {
        self.records.iter()
    }
}
