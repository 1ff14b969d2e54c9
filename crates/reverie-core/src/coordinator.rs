//! Concurrent fan-out over both backends
//!
//! The coordinator is the only component that talks to both stores for
//! reads: it issues the two queries concurrently, joins on both completing,
//! and feeds the result sets to the reconciler. Scoring and streak callers
//! always consume already-merged entries.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::models::{DateRange, Entry, EntryCategory, EntryId, StructuredInsight};
use crate::reconcile;
use crate::scoring::{
    self, ResurfaceHistory, ScoringContext, ACCEPT_THRESHOLD, ANNIVERSARY_THRESHOLD,
};
use crate::services::{EntitlementService, InsightService, TranscriptionService};
use crate::stats::{streak, summary, ActivityDay, MonthSummary, Streak};
use crate::store::{EntryStore, StoreRouter};
use crate::util;

/// Day-bounded candidate window for memory resurfacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResurfaceWindow {
    /// Nearest candidate age, in days before now
    pub min_days_ago: u32,
    /// Farthest candidate age; `None` means unbounded history
    pub max_days_ago: Option<u32>,
}

impl Default for ResurfaceWindow {
    fn default() -> Self {
        Self {
            min_days_ago: 30,
            max_days_ago: Some(365),
        }
    }
}

impl ResurfaceWindow {
    /// Concrete timestamp range of this window at the given instant.
    pub fn to_range(self, now_ms: i64) -> Result<DateRange> {
        DateRange::days_ago(now_ms, self.min_days_ago, self.max_days_ago)
    }

    /// The same span shifted one step older, the ladder's first fallback.
    ///
    /// Unbounded windows have nowhere older to shift to.
    #[must_use]
    pub fn shifted_older(self) -> Option<Self> {
        self.max_days_ago.map(|max| Self {
            min_days_ago: max,
            max_days_ago: Some(max + (max - self.min_days_ago).max(1)),
        })
    }

    /// The window with its far bound removed, the ladder's last resort.
    #[must_use]
    pub const fn unrestricted(self) -> Self {
        Self {
            min_days_ago: self.min_days_ago,
            max_days_ago: None,
        }
    }
}

/// One resurfacing attempt: the window plus the scoring inputs.
#[derive(Debug)]
pub struct ResurfaceRequest {
    /// Evaluation instant (Unix ms)
    pub now_ms: i64,
    /// Candidate window walked by the fallback ladder
    pub window: ResurfaceWindow,
    /// Prompt texts currently eligible for resurfacing
    pub eligible_prompts: HashSet<String>,
    /// Category -> recent usage frequency in `[0, 1]`
    pub category_weights: HashMap<EntryCategory, f64>,
}

/// Orchestrates concurrent queries against both stores and owns the shared
/// per-day cache.
///
/// The cache is confined to this coordinator: nothing else reads or writes
/// it, so a mutex around the map is the only synchronization needed.
pub struct FanOutCoordinator<L, R> {
    router: StoreRouter<L, R>,
    entitlements: Arc<dyn EntitlementService + Send + Sync>,
    history: Mutex<ResurfaceHistory>,
    day_cache: Mutex<HashMap<NaiveDate, Vec<Entry>>>,
}

impl<L: EntryStore, R: EntryStore> FanOutCoordinator<L, R> {
    /// Build a coordinator over the routed backends.
    pub fn new(
        router: StoreRouter<L, R>,
        entitlements: Arc<dyn EntitlementService + Send + Sync>,
        history: ResurfaceHistory,
    ) -> Self {
        Self {
            router,
            entitlements,
            history: Mutex::new(history),
            day_cache: Mutex::new(HashMap::new()),
        }
    }

    /// The router deciding which backends mutations touch.
    pub const fn router(&self) -> &StoreRouter<L, R> {
        &self.router
    }

    /// Query both backends concurrently and return both raw result sets.
    ///
    /// The join is the barrier: the caller resumes only once both queries
    /// completed. A remote failure that escapes the adapter still degrades
    /// to an empty remote set here rather than failing the read.
    async fn fan_out(&self, range: &DateRange) -> Result<(Vec<Entry>, Vec<Entry>)> {
        let Some(remote) = self.router.remote() else {
            let local = self.router.local().fetch_entries_in_range(range).await?;
            return Ok((local, Vec::new()));
        };

        let (local_result, remote_result) = tokio::join!(
            self.router.local().fetch_entries_in_range(range),
            remote.fetch_entries_in_range(range),
        );

        let local = local_result?;
        let remote_entries = remote_result.unwrap_or_else(|error| {
            tracing::warn!("Remote range query failed; continuing with local data: {error}");
            Vec::new()
        });
        Ok((local, remote_entries))
    }

    /// Merged, deduplicated entries inside the range, newest first.
    pub async fn fetch_merged_in_range(&self, range: &DateRange) -> Result<Vec<Entry>> {
        let (local, remote) = self.fan_out(range).await?;
        Ok(reconcile::merge(local, remote))
    }

    /// Merged entries for one local calendar day, served from the cache when
    /// a previous fan-out already materialized it.
    pub async fn fetch_merged_for_day(&self, day: NaiveDate) -> Result<Vec<Entry>> {
        if let Some(cached) = self.day_cache.lock().await.get(&day) {
            return Ok(cached.clone());
        }

        let merged = self
            .fetch_merged_in_range(&DateRange::for_day(day))
            .await?;
        self.day_cache.lock().await.insert(day, merged.clone());
        Ok(merged)
    }

    /// Streak statistics over the merged day set of all entries.
    pub async fn compute_streak(&self, now_ms: i64) -> Result<Streak> {
        let (local, remote) = self.fan_out(&DateRange::new(0, now_ms)?).await?;
        let days = reconcile::merged_day_set(&local, &remote);
        Ok(streak::compute(&days, util::timestamp_day(now_ms)))
    }

    /// Distinct active days across both backends, most recent first.
    pub async fn recent_active_days(
        &self,
        before: Option<NaiveDate>,
        limit: usize,
    ) -> Result<Vec<NaiveDate>> {
        let Some(remote) = self.router.remote() else {
            return self
                .router
                .local()
                .fetch_recent_active_days(before, limit)
                .await;
        };

        let (local_result, remote_result) = tokio::join!(
            self.router.local().fetch_recent_active_days(before, limit),
            remote.fetch_recent_active_days(before, limit),
        );

        let local = local_result?;
        let remote_days = remote_result.unwrap_or_else(|error| {
            tracing::warn!("Remote active-days query failed; continuing with local data: {error}");
            Vec::new()
        });

        let days: BTreeSet<NaiveDate> = local.into_iter().chain(remote_days).collect();
        Ok(days.into_iter().rev().take(limit).collect())
    }

    /// Number of distinct active days across both backends.
    pub async fn distinct_active_day_count(&self, now_ms: i64) -> Result<usize> {
        let (local, remote) = self.fan_out(&DateRange::new(0, now_ms)?).await?;
        Ok(reconcile::merged_day_set(&local, &remote).len())
    }

    /// Aggregate view of one calendar month.
    pub async fn month_summary(&self, year: i32, month: u32) -> Result<MonthSummary> {
        let range = month_range(year, month)?;
        let entries = self.fetch_merged_in_range(&range).await?;
        Ok(summary::month_summary(&entries, year, month))
    }

    /// Per-day activity counts inside the range, most recent day first.
    pub async fn activity_days(&self, range: &DateRange) -> Result<Vec<ActivityDay>> {
        let entries = self.fetch_merged_in_range(range).await?;
        Ok(summary::activity_days(&entries))
    }

    /// Write a freshly captured entry to the preference-chosen backend.
    pub async fn capture_entry(&self, entry: Entry) -> Result<Entry> {
        self.router.capture(&entry).await?;
        self.invalidate_cache().await;
        Ok(entry)
    }

    /// Capture with speech-to-text applied first.
    ///
    /// A transcription failure stores the entry without a transcript rather
    /// than losing the recording.
    pub async fn capture_with_transcription<T: TranscriptionService>(
        &self,
        mut entry: Entry,
        transcriber: &T,
    ) -> Result<Entry> {
        if entry.transcript.is_none() {
            if let Some(media) = entry.media_reference.clone() {
                match transcriber.transcribe(&media).await {
                    Ok(text) => entry.transcript = Some(text),
                    Err(error) => {
                        tracing::warn!(
                            "Transcription failed for {}; storing without transcript: {error}",
                            entry.id
                        );
                    }
                }
            }
        }
        self.capture_entry(entry).await
    }

    /// Replace an entry's transcript wherever it lives.
    pub async fn edit_transcript(&self, id: &EntryId, text: &str) -> Result<()> {
        self.router.edit_transcript(id, text).await?;
        self.invalidate_cache().await;
        Ok(())
    }

    /// Delete an entry from whichever backend holds it.
    pub async fn delete_entry(&self, id: &EntryId) -> Result<()> {
        self.router.delete(id).await?;
        self.invalidate_cache().await;
        Ok(())
    }

    /// Pick a past entry to resurface as a memory, if any candidate clears
    /// the acceptance ladder.
    ///
    /// The ladder runs an anniversary-only pass over the requested window,
    /// then the general pass, then a once-shifted older window, then an
    /// unrestricted window. Accepting a candidate records the retrieval in
    /// every backend holding it and in the history guard, which is exactly
    /// what pushes it down in future rankings.
    pub async fn resurface_memory(&self, request: &ResurfaceRequest) -> Result<Option<Entry>> {
        if !self.entitlements.is_entitled() {
            return Err(Error::EntitlementRequired);
        }

        let now_ms = request.now_ms;
        let mut history = self.history.lock().await;

        let selected = {
            let ctx = ScoringContext {
                now_ms,
                eligible_prompts: &request.eligible_prompts,
                category_weights: &request.category_weights,
                history: &*history,
            };

            let primary = self
                .fetch_merged_in_range(&request.window.to_range(now_ms)?)
                .await?;

            let mut hit =
                scoring::select(primary.clone(), &ctx, ANNIVERSARY_THRESHOLD, true);
            if hit.is_none() {
                hit = scoring::select(primary, &ctx, ACCEPT_THRESHOLD, false);
            }
            if hit.is_none() {
                if let Some(older) = request.window.shifted_older() {
                    let candidates = self
                        .fetch_merged_in_range(&older.to_range(now_ms)?)
                        .await?;
                    hit = scoring::select(candidates, &ctx, ACCEPT_THRESHOLD, false);
                }
            }
            if hit.is_none() && request.window.max_days_ago.is_some() {
                let candidates = self
                    .fetch_merged_in_range(&request.window.unrestricted().to_range(now_ms)?)
                    .await?;
                hit = scoring::select(candidates, &ctx, ACCEPT_THRESHOLD, false);
            }
            hit
        };

        let Some(best) = selected else {
            tracing::info!("No memory candidate cleared the acceptance ladder");
            return Ok(None);
        };

        if !self.router.mark_retrieved(&best.entry.id, now_ms).await? {
            tracing::warn!(
                "Accepted memory {} was not found in any backend while recording retrieval",
                best.entry.id
            );
        }
        if let Err(error) = history.record(best.entry.id, now_ms) {
            tracing::warn!("Failed to persist resurfacing history: {error}");
        }
        drop(history);
        self.invalidate_cache().await;

        let mut entry = best.entry;
        entry.last_retrieved = Some(now_ms);
        Ok(Some(entry))
    }

    /// Run the external analysis collaborator over transcribed exchanges in
    /// the range.
    pub async fn gather_insight<I: InsightService>(
        &self,
        range: &DateRange,
        service: &I,
    ) -> Result<StructuredInsight> {
        let entries = self.fetch_merged_in_range(range).await?;
        let exchanges: Vec<(String, String)> = entries
            .iter()
            .filter_map(|entry| {
                entry
                    .transcript
                    .clone()
                    .map(|answer| (entry.prompt_text.clone(), answer))
            })
            .collect();

        if exchanges.is_empty() {
            return Err(Error::InvalidInput(
                "no transcribed entries in range".to_string(),
            ));
        }

        service
            .analyze(&exchanges)
            .await
            .map_err(|error| Error::Analysis(error.to_string()))
    }

    async fn invalidate_cache(&self) {
        self.day_cache.lock().await.clear();
    }
}

fn month_range(year: i32, month: u32) -> Result<DateRange> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::DateRange(format!("invalid month {year}-{month:02}")))?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| Error::DateRange(format!("invalid month {year}-{month:02}")))?;

    DateRange::new(
        util::local_midnight_ms(first),
        util::local_midnight_ms(next_first),
    )
}
