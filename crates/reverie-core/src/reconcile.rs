//! Dual-source reconciliation
//!
//! Merges query results from the two backends into one consistent view.
//! Both functions are pure over their inputs; the merged result never
//! depends on which store's query finished first.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::models::{Entry, EntryId};

/// Merge result sets from both stores into one deduplicated, ordered view.
///
/// Entries are keyed by `id`; when both stores hold the same id, the copy
/// with the strictly greater `last_retrieved` wins (`None` ranks as the
/// earliest possible time). On a tie — including both copies never having
/// been resurfaced — the LOCAL copy is kept, as the deterministic tie-break.
/// The output is sorted by creation time descending, with id as the final
/// deterministic tie.
#[must_use]
pub fn merge(local: Vec<Entry>, remote: Vec<Entry>) -> Vec<Entry> {
    let mut by_id: HashMap<EntryId, Entry> = HashMap::with_capacity(local.len() + remote.len());

    // Local entries are inserted first; replacement requires a strictly
    // greater retrieval time, which is what makes ties keep the local copy.
    for entry in local.into_iter().chain(remote) {
        let keep = match by_id.get(&entry.id) {
            Some(existing) => supersedes(&entry, existing),
            None => true,
        };
        if keep {
            by_id.insert(entry.id, entry);
        }
    }

    let mut merged: Vec<Entry> = by_id.into_values().collect();
    merged.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    merged
}

/// Union of local calendar days covered by either source.
///
/// Aggregate and day-count use cases deduplicate by day, not by entry id:
/// two copies of the same entry, or two different entries on the same day,
/// both collapse to a single active day.
#[must_use]
pub fn merged_day_set(local: &[Entry], remote: &[Entry]) -> BTreeSet<NaiveDate> {
    local
        .iter()
        .chain(remote)
        .map(Entry::day)
        .collect()
}

fn supersedes(candidate: &Entry, existing: &Entry) -> bool {
    retrieval_rank(candidate) > retrieval_rank(existing)
}

const fn retrieval_rank(entry: &Entry) -> i64 {
    match entry.last_retrieved {
        Some(ms) => ms,
        None => i64::MIN,
    }
}
