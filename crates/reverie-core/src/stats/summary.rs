//! Calendar aggregates over merged entries
//!
//! Derived on demand from a merged entry list; nothing here is persisted.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::Entry;

/// One calendar day and how many entries it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivityDay {
    /// Local calendar day
    pub day: NaiveDate,
    /// Entries captured on that day across both backends
    pub entry_count: usize,
}

/// Aggregate view of one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    /// Calendar year
    pub year: i32,
    /// Calendar month (1-12)
    pub month: u32,
    /// Days in the month with at least one entry
    pub active_days: usize,
    /// Total entries captured in the month
    pub total_entries: usize,
}

/// Group merged entries into per-day activity counts, most recent day first.
#[must_use]
pub fn activity_days(entries: &[Entry]) -> Vec<ActivityDay> {
    let mut by_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for entry in entries {
        *by_day.entry(entry.day()).or_insert(0) += 1;
    }

    by_day
        .into_iter()
        .rev()
        .map(|(day, entry_count)| ActivityDay { day, entry_count })
        .collect()
}

/// Summarize one calendar month of merged entries.
#[must_use]
pub fn month_summary(entries: &[Entry], year: i32, month: u32) -> MonthSummary {
    let mut active_days = std::collections::BTreeSet::new();
    let mut total_entries = 0;

    for entry in entries {
        let day = entry.day();
        if day.year() == year && day.month() == month {
            active_days.insert(day);
            total_entries += 1;
        }
    }

    MonthSummary {
        year,
        month,
        active_days: active_days.len(),
        total_entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryCategory;
    use crate::util;
    use pretty_assertions::assert_eq;

    fn entry_on(day: NaiveDate, hour_ms: i64) -> Entry {
        let mut entry = Entry::new("p", EntryCategory::Daily);
        entry.created_at = util::local_midnight_ms(day) + hour_ms;
        entry
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn activity_days_groups_and_orders_recent_first() {
        let d1 = date(2026, 8, 4);
        let d2 = date(2026, 8, 6);
        let entries = vec![
            entry_on(d1, 1_000),
            entry_on(d2, 2_000),
            entry_on(d1, 3_000),
        ];

        let days = activity_days(&entries);
        assert_eq!(
            days,
            vec![
                ActivityDay { day: d2, entry_count: 1 },
                ActivityDay { day: d1, entry_count: 2 },
            ]
        );
    }

    #[test]
    fn month_summary_ignores_other_months() {
        let entries = vec![
            entry_on(date(2026, 8, 1), 1_000),
            entry_on(date(2026, 8, 1), 2_000),
            entry_on(date(2026, 8, 15), 1_000),
            entry_on(date(2026, 7, 31), 1_000),
        ];

        let summary = month_summary(&entries, 2026, 8);
        assert_eq!(summary.active_days, 2);
        assert_eq!(summary.total_entries, 3);
    }

    #[test]
    fn month_summary_of_empty_month_is_zero() {
        let summary = month_summary(&[], 2026, 2);
        assert_eq!(summary.active_days, 0);
        assert_eq!(summary.total_entries, 0);
    }
}
