//! Activity streaks over the merged calendar-day set
//!
//! Streaks are always computed over the union of days from both backends,
//! never per-store: a day backed up remotely and a day captured locally
//! belong to the same run.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use serde::Serialize;

/// How far back the day-by-day walk goes.
///
/// Bounding the walk caps the cost of the computation; runs that extend past
/// the bound are reported at the bound, so `current` and `longest` are
/// approximate for histories longer than a year. `distinct_days` is exact.
pub const WALK_LIMIT_DAYS: u32 = 365;

/// Derived activity-streak statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct Streak {
    /// Consecutive active days ending today (or yesterday, when today has
    /// no entry yet)
    pub current: u32,
    /// Longest run of consecutive active days inside the walked window
    pub longest: u32,
    /// Total distinct calendar days with at least one entry
    pub distinct_days: usize,
}

/// Compute streak statistics from a merged day set.
///
/// `today` counts toward the current streak when active; an inactive today
/// does not break a run that was alive through yesterday.
#[must_use]
pub fn compute(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> Streak {
    Streak {
        current: current_streak(days, today),
        longest: longest_streak(days, today),
        distinct_days: days.len(),
    }
}

fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let anchor = if days.contains(&today) {
        Some(today)
    } else {
        today
            .checked_sub_days(Days::new(1))
            .filter(|yesterday| days.contains(yesterday))
    };
    let Some(start) = anchor else {
        return 0;
    };

    let mut streak = 0;
    let mut day = start;
    while days.contains(&day) && streak < WALK_LIMIT_DAYS {
        streak += 1;
        match day.checked_sub_days(Days::new(1)) {
            Some(previous) => day = previous,
            None => break,
        }
    }
    streak
}

fn longest_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut longest = 0;
    let mut run = 0;

    for offset in 0..WALK_LIMIT_DAYS {
        let Some(day) = today.checked_sub_days(Days::new(u64::from(offset))) else {
            break;
        };
        if days.contains(&day) {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn day_set(today: NaiveDate, offsets: &[u64]) -> BTreeSet<NaiveDate> {
        offsets
            .iter()
            .map(|offset| today.checked_sub_days(Days::new(*offset)).unwrap())
            .collect()
    }

    #[test]
    fn empty_history_has_no_streak() {
        let streak = compute(&BTreeSet::new(), date(2026, 8, 6));
        assert_eq!(streak, Streak::default());
    }

    #[test]
    fn today_counts_and_first_gap_ends_the_run() {
        let today = date(2026, 8, 6);
        // Active on D, D-1, D-2; gap at D-3; more activity beyond the gap
        let days = day_set(today, &[0, 1, 2, 4, 5]);

        let streak = compute(&days, today);
        assert_eq!(streak.current, 3);
        assert_eq!(streak.distinct_days, 5);
    }

    #[test]
    fn inactive_today_anchors_at_yesterday() {
        let today = date(2026, 8, 6);
        let days = day_set(today, &[1, 2, 3]);

        let streak = compute(&days, today);
        assert_eq!(streak.current, 3);
    }

    #[test]
    fn two_day_gap_resets_current() {
        let today = date(2026, 8, 6);
        let days = day_set(today, &[2, 3, 4]);

        let streak = compute(&days, today);
        assert_eq!(streak.current, 0);
        assert_eq!(streak.longest, 3);
    }

    #[test]
    fn longest_finds_runs_beyond_the_trailing_one() {
        let today = date(2026, 8, 6);
        // Trailing run of 2, older run of 4
        let days = day_set(today, &[0, 1, 10, 11, 12, 13]);

        let streak = compute(&days, today);
        assert_eq!(streak.current, 2);
        assert_eq!(streak.longest, 4);
    }

    #[test]
    fn walk_is_bounded() {
        let today = date(2026, 8, 6);
        let days: BTreeSet<NaiveDate> = (0..1_000)
            .map(|offset| today.checked_sub_days(Days::new(offset)).unwrap())
            .collect();

        let streak = compute(&days, today);
        assert_eq!(streak.current, WALK_LIMIT_DAYS);
        assert_eq!(streak.longest, WALK_LIMIT_DAYS);
        assert_eq!(streak.distinct_days, 1_000);
    }
}
