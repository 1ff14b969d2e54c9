//! Validated query windows over entry timestamps

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::util;

/// Half-open `[start_ms, end_ms)` window over entry creation timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start_ms: i64,
    end_ms: i64,
}

impl DateRange {
    /// Build a range from raw Unix-ms bounds; inverted bounds are rejected.
    pub fn new(start_ms: i64, end_ms: i64) -> Result<Self> {
        if start_ms > end_ms {
            return Err(Error::DateRange(format!(
                "start {start_ms} is after end {end_ms}"
            )));
        }
        Ok(Self { start_ms, end_ms })
    }

    /// Range covering exactly one local calendar day.
    #[must_use]
    pub fn for_day(day: NaiveDate) -> Self {
        let (start_ms, end_ms) = util::day_bounds_ms(day);
        Self { start_ms, end_ms }
    }

    /// Range reaching from `max_days_ago` back to `min_days_ago` before `now`.
    ///
    /// `max_days_ago = None` means unbounded history (back to the epoch).
    pub fn days_ago(now_ms: i64, min_days_ago: u32, max_days_ago: Option<u32>) -> Result<Self> {
        if let Some(max) = max_days_ago {
            if max < min_days_ago {
                return Err(Error::DateRange(format!(
                    "window [{min_days_ago}, {max}] days ago is inverted"
                )));
            }
        }
        let end_ms = now_ms - i64::from(min_days_ago) * util::DAY_MS;
        let start_ms = max_days_ago.map_or(0, |max| (now_ms - i64::from(max) * util::DAY_MS).max(0));
        Self::new(start_ms, end_ms)
    }

    /// Inclusive lower bound (Unix ms).
    #[must_use]
    pub const fn start_ms(&self) -> i64 {
        self.start_ms
    }

    /// Exclusive upper bound (Unix ms).
    #[must_use]
    pub const fn end_ms(&self) -> i64 {
        self.end_ms
    }

    /// Whether the timestamp falls inside the window.
    #[must_use]
    pub const fn contains(&self, ts_ms: i64) -> bool {
        ts_ms >= self.start_ms && ts_ms < self.end_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_inverted_bounds() {
        assert!(DateRange::new(10, 5).is_err());
        assert!(DateRange::new(5, 5).is_ok());
    }

    #[test]
    fn for_day_contains_only_that_day() {
        let day = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let range = DateRange::for_day(day);
        assert!(range.contains(range.start_ms()));
        assert!(!range.contains(range.end_ms()));
        assert_eq!(range.end_ms() - range.start_ms(), util::DAY_MS);
    }

    #[test]
    fn days_ago_unbounded_reaches_epoch() {
        let now = 100 * util::DAY_MS;
        let range = DateRange::days_ago(now, 30, None).unwrap();
        assert_eq!(range.start_ms(), 0);
        assert_eq!(range.end_ms(), now - 30 * util::DAY_MS);
    }

    #[test]
    fn days_ago_rejects_inverted_window() {
        let now = 100 * util::DAY_MS;
        assert!(DateRange::days_ago(now, 90, Some(30)).is_err());
        assert!(DateRange::days_ago(now, 30, Some(90)).is_ok());
    }
}
