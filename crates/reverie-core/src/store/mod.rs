//! Entry storage backends
//!
//! Two independently-writable backends hold entries: the on-device
//! [`LocalStore`] and the synchronized [`RemoteStore`]. Both implement the
//! same [`EntryStore`] contract but with different failure semantics: local
//! failures are hard errors, remote fetch failures degrade to empty results
//! so a remote outage never takes reads down with it. [`StoreRouter`] is the
//! single place that decides which backend(s) an operation touches.

mod local;
mod remote;
mod router;

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{DateRange, Entry, EntryId};

pub use local::LocalStore;
pub use remote::{RemoteConfig, RemoteStore};
pub use router::{CaptureTarget, StoreRouter};

/// A queryable, mutable collection of entries.
///
/// Implemented by both backends with identical query semantics. Callers that
/// need a merged view go through the fan-out coordinator instead of talking
/// to a store directly.
#[allow(async_fn_in_trait)]
pub trait EntryStore {
    /// Entries captured on the given local calendar day, newest first
    async fn fetch_entries_for_day(&self, day: NaiveDate) -> Result<Vec<Entry>>;

    /// Entries whose creation time falls inside the range, newest first
    async fn fetch_entries_in_range(&self, range: &DateRange) -> Result<Vec<Entry>>;

    /// Distinct calendar days with at least one entry, most recent first
    ///
    /// `before` restricts the scan to days strictly earlier than the given
    /// day; `limit` caps the number of days returned.
    async fn fetch_recent_active_days(
        &self,
        before: Option<NaiveDate>,
        limit: usize,
    ) -> Result<Vec<NaiveDate>>;

    /// Number of distinct calendar days with at least one entry
    async fn distinct_active_day_count(&self) -> Result<usize>;

    /// Replace the transcript text; returns whether this store held the entry
    async fn update_transcript(&self, id: &EntryId, text: &str) -> Result<bool>;

    /// Delete the entry; `NotFound` when absent from this store
    async fn delete_entry(&self, id: &EntryId) -> Result<()>;

    /// Write a freshly captured entry (capture writes go to exactly one store)
    async fn insert_entry(&self, entry: &Entry) -> Result<()>;

    /// Record that the entry was resurfaced; returns whether this store held it
    async fn mark_retrieved(&self, id: &EntryId, at_ms: i64) -> Result<bool>;
}
