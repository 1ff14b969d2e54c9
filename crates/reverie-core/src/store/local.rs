//! On-device entry store backed by libSQL

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use libsql::{params, Value};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{DateRange, Entry, EntryCategory, EntryId};
use crate::util;

use super::EntryStore;

const ENTRY_COLUMNS: &str = "id, prompt_text, category, transcript, media_reference, \
     created_at, last_retrieved, is_daily_entry, is_follow_up, is_success_entry, \
     is_unguided, is_deleted";

/// The always-available on-device backend.
///
/// Every failure here is an operational error and propagates to the caller;
/// there is no graceful degradation for the local store.
pub struct LocalStore {
    db: Database,
}

impl LocalStore {
    /// Open the local store at the given database path
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            db: Database::open(path).await?,
        })
    }

    /// Open an in-memory local store (useful for testing)
    pub async fn open_in_memory() -> Result<Self> {
        Ok(Self {
            db: Database::open_in_memory().await?,
        })
    }

    /// Fetch a single entry by id
    pub async fn fetch_entry(&self, id: &EntryId) -> Result<Option<Entry>> {
        let mut rows = self
            .db
            .connection()
            .query(
                &format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ? AND is_deleted = 0"),
                params![id.as_str()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(parse_entry(&row)?)),
            None => Ok(None),
        }
    }

    async fn created_at_scan(&self, before_ms: i64) -> Result<libsql::Rows> {
        let rows = self
            .db
            .connection()
            .query(
                "SELECT created_at FROM entries
                 WHERE is_deleted = 0 AND created_at < ?
                 ORDER BY created_at DESC",
                params![before_ms],
            )
            .await?;
        Ok(rows)
    }
}

impl EntryStore for LocalStore {
    async fn fetch_entries_for_day(&self, day: NaiveDate) -> Result<Vec<Entry>> {
        self.fetch_entries_in_range(&DateRange::for_day(day)).await
    }

    async fn fetch_entries_in_range(&self, range: &DateRange) -> Result<Vec<Entry>> {
        let mut rows = self
            .db
            .connection()
            .query(
                &format!(
                    "SELECT {ENTRY_COLUMNS} FROM entries
                     WHERE is_deleted = 0 AND created_at >= ? AND created_at < ?
                     ORDER BY created_at DESC"
                ),
                params![range.start_ms(), range.end_ms()],
            )
            .await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(parse_entry(&row)?);
        }
        Ok(entries)
    }

    async fn fetch_recent_active_days(
        &self,
        before: Option<NaiveDate>,
        limit: usize,
    ) -> Result<Vec<NaiveDate>> {
        let before_ms = before.map_or(i64::MAX, util::local_midnight_ms);
        let mut rows = self.created_at_scan(before_ms).await?;

        // Timestamps come back newest-first, so distinct days appear in
        // order; stop reading once enough days are collected.
        let mut days: Vec<NaiveDate> = Vec::new();
        while let Some(row) = rows.next().await? {
            let created_at: i64 = row.get(0)?;
            let day = util::timestamp_day(created_at);
            if days.last() != Some(&day) {
                if days.len() == limit {
                    break;
                }
                days.push(day);
            }
        }
        Ok(days)
    }

    async fn distinct_active_day_count(&self) -> Result<usize> {
        let mut rows = self.created_at_scan(i64::MAX).await?;

        let mut days: HashSet<NaiveDate> = HashSet::new();
        while let Some(row) = rows.next().await? {
            let created_at: i64 = row.get(0)?;
            days.insert(util::timestamp_day(created_at));
        }
        Ok(days.len())
    }

    async fn update_transcript(&self, id: &EntryId, text: &str) -> Result<bool> {
        let rows = self
            .db
            .connection()
            .execute(
                "UPDATE entries SET transcript = ? WHERE id = ? AND is_deleted = 0",
                params![text, id.as_str()],
            )
            .await?;
        Ok(rows > 0)
    }

    async fn delete_entry(&self, id: &EntryId) -> Result<()> {
        let rows = self
            .db
            .connection()
            .execute(
                "UPDATE entries SET is_deleted = 1 WHERE id = ? AND is_deleted = 0",
                params![id.as_str()],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn insert_entry(&self, entry: &Entry) -> Result<()> {
        self.db
            .connection()
            .execute(
                "INSERT INTO entries (id, prompt_text, category, transcript, media_reference,
                     created_at, last_retrieved, is_daily_entry, is_follow_up,
                     is_success_entry, is_unguided, is_deleted)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    entry.id.as_str(),
                    entry.prompt_text.clone(),
                    entry.category.as_str(),
                    opt_text_value(entry.transcript.clone()),
                    opt_text_value(entry.media_reference.clone()),
                    entry.created_at,
                    opt_ms_value(entry.last_retrieved),
                    i32::from(entry.is_daily_entry),
                    i32::from(entry.is_follow_up),
                    i32::from(entry.is_success_entry),
                    i32::from(entry.is_unguided),
                    i32::from(entry.is_deleted)
                ],
            )
            .await?;
        Ok(())
    }

    async fn mark_retrieved(&self, id: &EntryId, at_ms: i64) -> Result<bool> {
        let rows = self
            .db
            .connection()
            .execute(
                "UPDATE entries SET last_retrieved = ? WHERE id = ? AND is_deleted = 0",
                params![at_ms, id.as_str()],
            )
            .await?;
        Ok(rows > 0)
    }
}

fn opt_text_value(value: Option<String>) -> Value {
    value.map_or(Value::Null, Value::Text)
}

fn opt_ms_value(value: Option<i64>) -> Value {
    value.map_or(Value::Null, Value::Integer)
}

/// Parse an entry from a database row
fn parse_entry(row: &libsql::Row) -> Result<Entry> {
    let id: String = row.get(0)?;
    let category: String = row.get(2)?;

    Ok(Entry {
        id: id.parse().unwrap_or_default(),
        prompt_text: row.get(1)?,
        category: category.parse::<EntryCategory>().unwrap_or_default(),
        transcript: opt_text(row, 3)?,
        media_reference: opt_text(row, 4)?,
        created_at: row.get(5)?,
        last_retrieved: opt_ms(row, 6)?,
        is_daily_entry: row.get::<i32>(7)? != 0,
        is_follow_up: row.get::<i32>(8)? != 0,
        is_success_entry: row.get::<i32>(9)? != 0,
        is_unguided: row.get::<i32>(10)? != 0,
        is_deleted: row.get::<i32>(11)? != 0,
    })
}

fn opt_text(row: &libsql::Row, idx: i32) -> Result<Option<String>> {
    match row.get_value(idx)? {
        Value::Text(text) => Ok(Some(text)),
        _ => Ok(None),
    }
}

fn opt_ms(row: &libsql::Row, idx: i32) -> Result<Option<i64>> {
    match row.get_value(idx)? {
        Value::Integer(ms) => Ok(Some(ms)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryCategory;
    use pretty_assertions::assert_eq;

    async fn setup() -> LocalStore {
        LocalStore::open_in_memory().await.unwrap()
    }

    fn entry_at(ts_ms: i64, prompt: &str) -> Entry {
        let mut entry = Entry::new(prompt, EntryCategory::Daily);
        entry.created_at = ts_ms;
        entry
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn insert_and_fetch_roundtrip() {
        let store = setup().await;

        let mut entry = Entry::new("What are you grateful for?", EntryCategory::Gratitude);
        entry.transcript = Some("The morning light".to_string());
        entry.media_reference = Some("audio/abc123".to_string());
        entry.is_success_entry = true;
        store.insert_entry(&entry).await.unwrap();

        let fetched = store.fetch_entry(&entry.id).await.unwrap().unwrap();
        assert_eq!(fetched, entry);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn range_fetch_is_newest_first_and_bounded() {
        let store = setup().await;
        let day = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
        let (start, _) = util::day_bounds_ms(day);

        store.insert_entry(&entry_at(start + 1_000, "early")).await.unwrap();
        store.insert_entry(&entry_at(start + 5_000, "late")).await.unwrap();
        store
            .insert_entry(&entry_at(start - 1_000, "previous day"))
            .await
            .unwrap();

        let entries = store.fetch_entries_for_day(day).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].prompt_text, "late");
        assert_eq!(entries[1].prompt_text, "early");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn recent_active_days_dedupes_and_limits() {
        let store = setup().await;
        let day = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();

        for offset in [0u64, 0, 1, 3] {
            let earlier = day.checked_sub_days(chrono::Days::new(offset)).unwrap();
            let (start, _) = util::day_bounds_ms(earlier);
            store
                .insert_entry(&entry_at(start + 60_000, "note"))
                .await
                .unwrap();
        }

        let days = store.fetch_recent_active_days(None, 10).await.unwrap();
        assert_eq!(
            days,
            vec![
                day,
                day.checked_sub_days(chrono::Days::new(1)).unwrap(),
                day.checked_sub_days(chrono::Days::new(3)).unwrap(),
            ]
        );

        let limited = store.fetch_recent_active_days(None, 2).await.unwrap();
        assert_eq!(limited.len(), 2);

        let before = store
            .fetch_recent_active_days(Some(day), 10)
            .await
            .unwrap();
        assert!(!before.contains(&day));
        assert_eq!(before.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn distinct_day_count_ignores_duplicates() {
        let store = setup().await;
        let day = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
        let (start, _) = util::day_bounds_ms(day);

        store.insert_entry(&entry_at(start + 1_000, "one")).await.unwrap();
        store.insert_entry(&entry_at(start + 2_000, "two")).await.unwrap();

        assert_eq!(store.distinct_active_day_count().await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn update_transcript_reports_presence() {
        let store = setup().await;
        let entry = Entry::new("Prompt", EntryCategory::Reflection);
        store.insert_entry(&entry).await.unwrap();

        assert!(store
            .update_transcript(&entry.id, "edited text")
            .await
            .unwrap());
        let fetched = store.fetch_entry(&entry.id).await.unwrap().unwrap();
        assert_eq!(fetched.transcript.as_deref(), Some("edited text"));

        let missing = EntryId::new();
        assert!(!store.update_transcript(&missing, "nope").await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_is_soft_and_not_found_when_absent() {
        let store = setup().await;
        let entry = Entry::new("Prompt", EntryCategory::Daily);
        store.insert_entry(&entry).await.unwrap();

        store.delete_entry(&entry.id).await.unwrap();
        assert!(store.fetch_entry(&entry.id).await.unwrap().is_none());

        let error = store.delete_entry(&entry.id).await.unwrap_err();
        assert!(matches!(error, Error::NotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn mark_retrieved_sets_timestamp() {
        let store = setup().await;
        let entry = Entry::new("Prompt", EntryCategory::Daily);
        store.insert_entry(&entry).await.unwrap();

        assert!(store.mark_retrieved(&entry.id, 1_234_567).await.unwrap());
        let fetched = store.fetch_entry(&entry.id).await.unwrap().unwrap();
        assert_eq!(fetched.last_retrieved, Some(1_234_567));
    }
}
