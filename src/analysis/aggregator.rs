//! Crash aggregation and ranking.
//!
//! Yearly views are keyed by calendar year and come back in ascending
//! order. Operator views come back ranked, largest first, truncated to
//! the requested size. Missing values never contribute to a sum: a
//! group whose values are all missing sums to `0.0`.

use crate::models::{CrashRecord, CrashTable};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A ranked `(operator, value)` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked<T> {
    pub operator: String,
    pub value: T,
}

/// Per-operator totals used for the survival ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OperatorSurvival {
    pub operator: String,
    pub aboard: f64,
    pub fatalities: f64,
    pub survivors: f64,
}

impl OperatorSurvival {
    /// Survivors as a share of everyone aboard, in percent.
    ///
    /// Computed from the summed quantities, not averaged per record.
    pub fn survival_rate(&self) -> Option<f64> {
        let rate = self.survivors / self.aboard * 100.0;
        rate.is_finite().then_some(rate)
    }
}

/// Table-wide totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub records: usize,
    pub fatalities: f64,
    pub survivors: f64,
}

impl Totals {
    /// Fatality sum truncated toward zero.
    pub fn fatalities_truncated(&self) -> i64 {
        self.fatalities.trunc() as i64
    }

    /// Survivor sum truncated toward zero.
    pub fn survivors_truncated(&self) -> i64 {
        self.survivors.trunc() as i64
    }
}

/// Sum present values, skipping missing ones.
fn sum_present(values: impl Iterator<Item = Option<f64>>) -> f64 {
    values.flatten().sum()
}

/// Group records with a known year by that year.
fn group_by_year(table: &CrashTable) -> BTreeMap<i32, Vec<&CrashRecord>> {
    let mut grouped: BTreeMap<i32, Vec<&CrashRecord>> = BTreeMap::new();

    for record in table.iter() {
        if let Some(year) = record.year() {
            grouped.entry(year).or_default().push(record);
        }
    }

    grouped
}

/// Group records with a known operator by operator name.
///
/// Keys are ordered lexically, which is also the tie-break order of
/// every ranking built on top of this.
fn group_by_operator(table: &CrashTable) -> BTreeMap<&str, Vec<&CrashRecord>> {
    let mut grouped: BTreeMap<&str, Vec<&CrashRecord>> = BTreeMap::new();

    for record in table.iter() {
        if let Some(ref operator) = record.operator {
            grouped.entry(operator.as_str()).or_default().push(record);
        }
    }

    grouped
}

/// Number of crashes per year.
pub fn yearly_crash_counts(table: &CrashTable) -> BTreeMap<i32, usize> {
    group_by_year(table)
        .into_iter()
        .map(|(year, records)| (year, records.len()))
        .collect()
}

/// Sum of fatalities per year.
pub fn yearly_fatality_sums(table: &CrashTable) -> BTreeMap<i32, f64> {
    group_by_year(table)
        .into_iter()
        .map(|(year, records)| (year, sum_present(records.iter().map(|r| r.fatalities))))
        .collect()
}

/// Stable descending sort on `value`, then keep the first `n`.
fn rank_desc<T, F>(mut entries: Vec<T>, n: usize, value: F) -> Vec<T>
where
    F: Fn(&T) -> f64,
{
    entries.sort_by(|a, b| value(b).partial_cmp(&value(a)).unwrap_or(Ordering::Equal));
    entries.truncate(n);
    entries
}

/// The `n` operators with the most crashes.
pub fn top_operators_by_crashes(table: &CrashTable, n: usize) -> Vec<Ranked<usize>> {
    let counts: Vec<Ranked<usize>> = group_by_operator(table)
        .into_iter()
        .map(|(operator, records)| Ranked {
            operator: operator.to_string(),
            value: records.len(),
        })
        .collect();

    rank_desc(counts, n, |r| r.value as f64)
}

/// The `n` operators with the most fatalities.
pub fn top_operators_by_fatalities(table: &CrashTable, n: usize) -> Vec<Ranked<f64>> {
    let sums: Vec<Ranked<f64>> = group_by_operator(table)
        .into_iter()
        .map(|(operator, records)| Ranked {
            operator: operator.to_string(),
            value: sum_present(records.iter().map(|r| r.fatalities)),
        })
        .collect();

    rank_desc(sums, n, |r| r.value)
}

/// Survival totals for the `n` operators that carried the most people.
pub fn top_operators_by_aboard(table: &CrashTable, n: usize) -> Vec<OperatorSurvival> {
    let totals: Vec<OperatorSurvival> = group_by_operator(table)
        .into_iter()
        .map(|(operator, records)| OperatorSurvival {
            operator: operator.to_string(),
            aboard: sum_present(records.iter().map(|r| r.aboard)),
            fatalities: sum_present(records.iter().map(|r| r.fatalities)),
            survivors: sum_present(records.iter().map(|r| r.survivors())),
        })
        .collect();

    rank_desc(totals, n, |s| s.aboard)
}

/// Record count plus fatality and survivor sums over the whole table.
pub fn totals(table: &CrashTable) -> Totals {
    Totals {
        records: table.len(),
        fatalities: sum_present(table.iter().map(|r| r.fatalities)),
        survivors: sum_present(table.iter().map(|r| r.survivors())),
    }
}

/// Every aggregate view the reporter consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analysis {
    pub totals: Totals,
    pub yearly_crashes: BTreeMap<i32, usize>,
    pub yearly_fatalities: BTreeMap<i32, f64>,
    pub top_by_crashes: Vec<Ranked<usize>>,
    pub top_by_fatalities: Vec<Ranked<f64>>,
    pub top_by_aboard: Vec<OperatorSurvival>,
}

impl Analysis {
    /// Compute all views over `table`, keeping `top_n` operators per ranking.
    pub fn compute(table: &CrashTable, top_n: usize) -> Self {
        Self {
            totals: totals(table),
            yearly_crashes: yearly_crash_counts(table),
            yearly_fatalities: yearly_fatality_sums(table),
            top_by_crashes: top_operators_by_crashes(table, top_n),
            top_by_fatalities: top_operators_by_fatalities(table, top_n),
            top_by_aboard: top_operators_by_aboard(table, top_n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn create_test_record(
        year: Option<i32>,
        operator: Option<&str>,
        aboard: Option<f64>,
        fatalities: Option<f64>,
    ) -> CrashRecord {
        CrashRecord {
            date: year.and_then(|y| NaiveDate::from_ymd_opt(y, 6, 1)),
            operator: operator.map(String::from),
            aboard,
            fatalities,
        }
    }

    fn crashes(operator: &str, count: usize) -> Vec<CrashRecord> {
        (0..count)
            .map(|_| create_test_record(Some(1990), Some(operator), Some(10.0), Some(1.0)))
            .collect()
    }

    #[test]
    fn test_yearly_crash_counts() {
        let table = CrashTable::new(vec![
            create_test_record(Some(1985), Some("A"), Some(1.0), Some(1.0)),
            create_test_record(Some(1985), Some("B"), Some(1.0), Some(1.0)),
            create_test_record(Some(1986), Some("A"), Some(1.0), Some(1.0)),
        ]);

        let counts = yearly_crash_counts(&table);
        let expected: BTreeMap<i32, usize> = [(1985, 2), (1986, 1)].into_iter().collect();
        assert_eq!(counts, expected);
    }

    #[test]
    fn test_undated_records_excluded_from_yearly_views() {
        let table = CrashTable::new(vec![
            create_test_record(None, Some("A"), Some(5.0), Some(5.0)),
            create_test_record(Some(2001), Some("A"), Some(5.0), Some(3.0)),
        ]);

        assert_eq!(yearly_crash_counts(&table).len(), 1);
        assert_eq!(yearly_fatality_sums(&table).get(&2001), Some(&3.0));
    }

    #[test]
    fn test_yearly_fatality_sums_skip_missing() {
        let table = CrashTable::new(vec![
            create_test_record(Some(1972), Some("A"), Some(10.0), Some(4.0)),
            create_test_record(Some(1972), Some("B"), Some(10.0), None),
            create_test_record(Some(1973), Some("B"), Some(10.0), None),
        ]);

        let sums = yearly_fatality_sums(&table);
        assert_eq!(sums.get(&1972), Some(&4.0));
        assert_eq!(sums.get(&1973), Some(&0.0));
    }

    #[test]
    fn test_yearly_views_ascend() {
        let table = CrashTable::new(vec![
            create_test_record(Some(2000), Some("A"), None, Some(1.0)),
            create_test_record(Some(1920), Some("A"), None, Some(2.0)),
            create_test_record(Some(1950), Some("A"), None, Some(3.0)),
        ]);

        let years: Vec<i32> = yearly_fatality_sums(&table).into_keys().collect();
        assert_eq!(years, vec![1920, 1950, 2000]);
    }

    #[test]
    fn test_top_by_crashes_caps_at_n() {
        let mut records = Vec::new();
        for i in 0..15 {
            records.extend(crashes(&format!("Operator {:02}", i), i + 1));
        }
        let table = CrashTable::new(records);

        let top = top_operators_by_crashes(&table, 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].operator, "Operator 14");
        assert_eq!(top[0].value, 15);
        assert!(top.windows(2).all(|w| w[0].value >= w[1].value));
    }

    #[test]
    fn test_count_ranking_respects_frequency() {
        let mut records = crashes("Small Air", 3);
        records.extend(crashes("Big Air", 20));
        let table = CrashTable::new(records);

        let top = top_operators_by_crashes(&table, 10);
        assert_eq!(top[0].operator, "Big Air");
        assert_eq!(top[1].operator, "Small Air");
    }

    #[test]
    fn test_ties_keep_lexical_order() {
        let mut records = crashes("Zeta", 2);
        records.extend(crashes("Alpha", 2));
        records.extend(crashes("Mike", 2));
        let table = CrashTable::new(records);

        let names: Vec<String> = top_operators_by_crashes(&table, 10)
            .into_iter()
            .map(|r| r.operator)
            .collect();
        assert_eq!(names, vec!["Alpha", "Mike", "Zeta"]);
    }

    #[test]
    fn test_operatorless_records_not_ranked() {
        let table = CrashTable::new(vec![
            create_test_record(Some(1990), None, Some(100.0), Some(100.0)),
            create_test_record(Some(1990), Some("A"), Some(3.0), Some(1.0)),
        ]);

        let top = top_operators_by_fatalities(&table, 10);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].operator, "A");
        assert_eq!(top[0].value, 1.0);
    }

    #[test]
    fn test_top_by_fatalities() {
        let table = CrashTable::new(vec![
            create_test_record(Some(1990), Some("A"), Some(10.0), Some(10.0)),
            create_test_record(Some(1991), Some("A"), Some(10.0), Some(5.0)),
            create_test_record(Some(1990), Some("B"), Some(50.0), Some(40.0)),
            create_test_record(Some(1990), Some("C"), Some(10.0), None),
        ]);

        let top = top_operators_by_fatalities(&table, 2);
        assert_eq!(
            top,
            vec![
                Ranked { operator: "B".to_string(), value: 40.0 },
                Ranked { operator: "A".to_string(), value: 15.0 },
            ]
        );
    }

    #[test]
    fn test_operator_survival_uses_sums() {
        let table = CrashTable::new(vec![
            create_test_record(Some(1990), Some("A"), Some(100.0), Some(50.0)),
            create_test_record(Some(1991), Some("A"), Some(10.0), Some(10.0)),
        ]);

        let top = top_operators_by_aboard(&table, 10);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].aboard, 110.0);
        assert_eq!(top[0].survivors, 50.0);

        // Pooled 50/110, not the mean of 50% and 0%.
        let rate = top[0].survival_rate().unwrap();
        assert!((rate - 45.4545).abs() < 1e-3);
    }

    #[test]
    fn test_survival_ranked_by_aboard() {
        let table = CrashTable::new(vec![
            create_test_record(Some(1990), Some("Few"), Some(5.0), Some(0.0)),
            create_test_record(Some(1990), Some("Many"), Some(500.0), Some(400.0)),
            create_test_record(Some(1990), Some("Mid"), Some(50.0), Some(50.0)),
        ]);

        let names: Vec<String> = top_operators_by_aboard(&table, 2)
            .into_iter()
            .map(|s| s.operator)
            .collect();
        assert_eq!(names, vec!["Many", "Mid"]);
    }

    #[test]
    fn test_operator_with_nobody_aboard_has_no_rate() {
        let table = CrashTable::new(vec![create_test_record(
            Some(1990),
            Some("Ghost"),
            None,
            Some(2.0),
        )]);

        let top = top_operators_by_aboard(&table, 10);
        assert_eq!(top[0].aboard, 0.0);
        assert_eq!(top[0].survival_rate(), None);
    }

    #[test]
    fn test_totals_truncate() {
        let table = CrashTable::new(vec![
            create_test_record(Some(1990), Some("A"), Some(10.5), Some(2.25)),
            create_test_record(Some(1990), Some("A"), None, Some(1.5)),
        ]);

        let t = totals(&table);
        assert_eq!(t.records, 2);
        assert_eq!(t.fatalities_truncated(), 3);
        assert_eq!(t.survivors_truncated(), 8);
    }

    #[test]
    fn test_empty_table_yields_empty_views() {
        let analysis = Analysis::compute(&CrashTable::default(), 10);

        assert!(analysis.yearly_crashes.is_empty());
        assert!(analysis.yearly_fatalities.is_empty());
        assert!(analysis.top_by_crashes.is_empty());
        assert!(analysis.top_by_fatalities.is_empty());
        assert!(analysis.top_by_aboard.is_empty());
        assert_eq!(analysis.totals, Totals::default());
        assert_eq!(analysis.totals.fatalities_truncated(), 0);
    }

    #[test]
    fn test_compute_is_repeatable() {
        let mut records = crashes("A", 4);
        records.extend(crashes("B", 2));
        let table = CrashTable::new(records);

        assert_eq!(Analysis::compute(&table, 10), Analysis::compute(&table, 10));
    }
}
