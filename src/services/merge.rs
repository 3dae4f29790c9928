//! Date-keyed merge of freshly fetched records into an existing archive.
//!
//! The trading date is the primary key. Fetched rows overlay archived ones,
//! so a re-fetched window refreshes corrected values instead of duplicating
//! days, and re-running any sync over the same data is a no-op.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::models::DailyRecord;

/// Merge `incoming` rows into `existing` history.
///
/// Returns the merged history, sorted ascending by date with exactly one
/// record per date, plus the number of dates that were not present before.
/// On a date collision the incoming record wins; within `incoming` itself,
/// the later row wins. The inserted count is for reporting only.
pub fn merge(existing: &[DailyRecord], incoming: &[DailyRecord]) -> (Vec<DailyRecord>, usize) {
    let mut by_date: BTreeMap<NaiveDate, DailyRecord> = existing
        .iter()
        .map(|record| (record.date, record.clone()))
        .collect();
    let archived_dates: BTreeSet<NaiveDate> = by_date.keys().copied().collect();

    for record in incoming {
        by_date.insert(record.date, record.clone());
    }

    let inserted = by_date
        .keys()
        .filter(|date| !archived_dates.contains(date))
        .count();

    (by_date.into_values().collect(), inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, price: f64) -> DailyRecord {
        DailyRecord {
            date: date.parse().unwrap(),
            last_transaction_price: price,
            max_price: Some(price),
            min_price: Some(price),
            average_price: price,
            percent_change: None,
            quantity: 100,
            turnover_best_mkd: price * 100.0,
            total_turnover_mkd: price * 100.0,
        }
    }

    #[test]
    fn inserts_new_dates_and_reports_the_count() {
        let existing = vec![record("2024-01-03", 100.0)];
        let incoming = vec![record("2024-01-04", 101.0), record("2024-01-05", 102.0)];

        let (merged, inserted) = merge(&existing, &incoming);
        assert_eq!(merged.len(), 3);
        assert_eq!(inserted, 2);
    }

    #[test]
    fn incoming_records_replace_archived_ones() {
        let existing = vec![record("2024-01-03", 100.0)];
        let incoming = vec![record("2024-01-03", 99.5)];

        let (merged, inserted) = merge(&existing, &incoming);
        assert_eq!(merged.len(), 1);
        assert_eq!(inserted, 0);
        assert_eq!(merged[0].last_transaction_price, 99.5);
    }

    #[test]
    fn output_is_sorted_and_unique_by_date() {
        let existing = vec![record("2024-02-01", 3.0), record("2024-01-01", 1.0)];
        let incoming = vec![record("2024-01-15", 2.0), record("2024-01-01", 1.5)];

        let (merged, _) = merge(&existing, &incoming);
        let dates: Vec<_> = merged.iter().map(|r| r.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(dates, sorted);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn merging_the_same_batch_twice_changes_nothing() {
        let existing = vec![record("2024-01-03", 100.0)];
        let incoming = vec![record("2024-01-04", 101.0), record("2024-01-03", 100.5)];

        let (first, _) = merge(&existing, &incoming);
        let (second, inserted) = merge(&first, &incoming);
        assert_eq!(second, first);
        assert_eq!(inserted, 0);
    }

    #[test]
    fn later_duplicate_within_a_batch_wins() {
        let incoming = vec![record("2024-01-03", 100.0), record("2024-01-03", 100.7)];

        let (merged, inserted) = merge(&[], &incoming);
        assert_eq!(merged.len(), 1);
        assert_eq!(inserted, 1);
        assert_eq!(merged[0].last_transaction_price, 100.7);
    }

    #[test]
    fn empty_inputs_are_no_ops() {
        let existing = vec![record("2024-01-03", 100.0)];

        let (merged, inserted) = merge(&existing, &[]);
        assert_eq!(merged, existing);
        assert_eq!(inserted, 0);

        let (merged, inserted) = merge(&[], &[]);
        assert!(merged.is_empty());
        assert_eq!(inserted, 0);
    }
}
