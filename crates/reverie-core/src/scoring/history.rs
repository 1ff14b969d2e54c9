//! Persisted resurfacing-history guard
//!
//! A small append-only list of `{entry_id, shown_ms}` records kept so the
//! engine avoids re-showing a memory it surfaced recently. The list only
//! exists to prevent repeats, so a corrupt or missing file decodes as an
//! empty history (fail open, never fail closed).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::EntryId;
use crate::util::DAY_MS;

/// Rolling retention window for history records, in days.
pub const RETENTION_DAYS: i64 = 90;

/// One resurfacing event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResurfaceRecord {
    /// Entry that was shown
    pub entry_id: EntryId,
    /// When it was shown (Unix ms)
    pub shown_ms: i64,
}

/// Append-only record of recently resurfaced memories.
#[derive(Debug, Default)]
pub struct ResurfaceHistory {
    records: Vec<ResurfaceRecord>,
    path: Option<PathBuf>,
}

impl ResurfaceHistory {
    /// History that is never persisted (tests and ephemeral sessions).
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load history from disk.
    ///
    /// A missing file is a fresh history; a corrupt file is logged and
    /// treated as empty.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match std::fs::read_to_string(&path) {
            Ok(payload) => match serde_json::from_str::<Vec<ResurfaceRecord>>(&payload) {
                Ok(records) => records,
                Err(error) => {
                    tracing::warn!(
                        "Corrupt resurfacing history at {}; starting empty: {error}",
                        path.display()
                    );
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        Self {
            records,
            path: Some(path),
        }
    }

    /// Append a resurfacing event, trim to the retention window, persist.
    pub fn record(&mut self, entry_id: EntryId, shown_ms: i64) -> Result<()> {
        self.records.push(ResurfaceRecord { entry_id, shown_ms });
        let cutoff = shown_ms - RETENTION_DAYS * DAY_MS;
        self.records.retain(|record| record.shown_ms >= cutoff);
        self.persist()
    }

    /// Most recent time this entry was shown, if inside the retention window.
    #[must_use]
    pub fn last_shown_ms(&self, id: &EntryId) -> Option<i64> {
        self.records
            .iter()
            .filter(|record| record.entry_id == *id)
            .map(|record| record.shown_ms)
            .max()
    }

    /// Number of retained records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&self.records)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn records_and_reports_latest_show_time() {
        let mut history = ResurfaceHistory::in_memory();
        let id = EntryId::new();

        history.record(id, 1_000).unwrap();
        history.record(id, 5_000).unwrap();
        assert_eq!(history.last_shown_ms(&id), Some(5_000));
        assert_eq!(history.last_shown_ms(&EntryId::new()), None);
    }

    #[test]
    fn trims_records_beyond_retention() {
        let mut history = ResurfaceHistory::in_memory();
        let old = EntryId::new();
        let recent = EntryId::new();
        let now = RETENTION_DAYS * DAY_MS * 2;

        history.record(old, now - (RETENTION_DAYS + 1) * DAY_MS).unwrap();
        history.record(recent, now).unwrap();

        assert_eq!(history.len(), 1);
        assert_eq!(history.last_shown_ms(&old), None);
        assert_eq!(history.last_shown_ms(&recent), Some(now));
    }

    #[test]
    fn roundtrips_through_disk() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("history.json");
        let id = EntryId::new();

        let mut history = ResurfaceHistory::load(&path);
        history.record(id, 42_000).unwrap();

        let reloaded = ResurfaceHistory::load(&path);
        assert_eq!(reloaded.last_shown_ms(&id), Some(42_000));
    }

    #[test]
    fn corrupt_file_fails_open_as_empty() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("history.json");
        std::fs::write(&path, "{definitely not json").unwrap();

        let history = ResurfaceHistory::load(&path);
        assert!(history.is_empty());
    }

    #[test]
    fn missing_file_is_fresh_history() {
        let tmp = tempdir().unwrap();
        let history = ResurfaceHistory::load(tmp.path().join("nope.json"));
        assert!(history.is_empty());
    }
}
