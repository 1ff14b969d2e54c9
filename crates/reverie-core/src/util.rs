//! Shared calendar and text helpers used across multiple modules.
//!
//! Entries are timestamped in Unix milliseconds; user-facing grouping (days,
//! streaks, anniversaries) happens on local-time calendar days. These helpers
//! are the single place where that conversion lives.

use chrono::{DateTime, Datelike, Days, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};

/// Milliseconds in one calendar day.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Local-time calendar day containing the given Unix-ms timestamp.
pub fn timestamp_day(ts_ms: i64) -> NaiveDate {
    DateTime::<Utc>::from_timestamp_millis(ts_ms)
        .map_or_else(NaiveDate::default, |dt| dt.with_timezone(&Local).date_naive())
}

/// Half-open `[start, end)` Unix-ms bounds of a local calendar day.
pub fn day_bounds_ms(day: NaiveDate) -> (i64, i64) {
    let next = day.checked_add_days(Days::new(1)).unwrap_or(day);
    (local_midnight_ms(day), local_midnight_ms(next))
}

/// Unix-ms instant of local midnight on the given day.
///
/// DST transitions can make midnight ambiguous or skipped; the earliest
/// matching instant wins, falling back to UTC midnight for skipped times.
pub fn local_midnight_ms(day: NaiveDate) -> i64 {
    let midnight = day.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&midnight) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.timestamp_millis(),
        LocalResult::None => Utc.from_utc_datetime(&midnight).timestamp_millis(),
    }
}

/// Whole calendar months elapsed from `from` to `to`.
///
/// A month only counts once the day-of-month has been reached, so
/// `2024-01-31 -> 2024-02-28` is 0 months and `2024-01-15 -> 2024-04-15`
/// is exactly 3.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let mut months = (i64::from(to.year()) - i64::from(from.year())) * 12
        + (i64::from(to.month()) - i64::from(from.month()));
    if to.day() < from.day() {
        months -= 1;
    }
    months
}

/// Whole days elapsed between two Unix-ms timestamps (negative-safe, floors).
pub fn days_between_ms(from_ms: i64, to_ms: i64) -> i64 {
    (to_ms - from_ms).div_euclid(DAY_MS)
}

/// Current Unix timestamp in milliseconds.
pub fn unix_ms_now() -> i64 {
    Utc::now().timestamp_millis()
}

/// Normalize optional text by trimming whitespace and removing empties.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string starts with `http://` or `https://`.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}
