//! Resurfacing candidate scoring
//!
//! Ranks merged entries as memory candidates with an additive, clamped
//! multi-factor heuristic: prefer thematically and temporally significant
//! past entries, actively avoid repeating anything shown recently, and let
//! a graceful "nothing found" beat a poor match.

mod history;

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};

use crate::models::{Entry, EntryCategory};
use crate::util;

pub use history::{ResurfaceHistory, ResurfaceRecord, RETENTION_DAYS};

/// Score contributions, combined by sum and clamped to `[0, 1]`.
pub mod weights {
    /// Prompt text is in the eligible set.
    pub const PROMPT_MATCH: f64 = 0.6;
    /// Scale applied to the category's recent usage frequency.
    pub const CATEGORY_AFFINITY: f64 = 0.3;
    /// The generic catch-all bucket is slightly demoted.
    pub const GENERIC_CATEGORY: f64 = -0.1;
    /// Same day-of-month at a milestone month count (3/6/9/12).
    pub const ANNIVERSARY_MILESTONE: f64 = 0.4;
    /// Same day-of-month at any other month count.
    pub const ANNIVERSARY: f64 = 0.2;
    /// Age inside the 3-6 month sweet spot.
    pub const WINDOW_MID: f64 = 0.2;
    /// Age between 1 and 3 months, ramping toward the sweet spot.
    pub const WINDOW_NEAR_MIN: f64 = 0.1;
    /// Upper bound of the 1-3 month ramp.
    pub const WINDOW_NEAR_MAX: f64 = 0.15;
    /// Lower bound of the 6-12 month fade.
    pub const WINDOW_FAR_MIN: f64 = 0.05;
    /// Upper bound of the 6-12 month fade.
    pub const WINDOW_FAR_MAX: f64 = 0.1;
    /// Resurfaced within the last week.
    pub const SHOWN_PAST_WEEK: f64 = -0.8;
    /// Resurfaced 8-14 days ago.
    pub const SHOWN_PAST_FORTNIGHT: f64 = -0.6;
    /// Resurfaced 15-30 days ago.
    pub const SHOWN_PAST_MONTH: f64 = -0.4;
    /// Resurfaced 31-60 days ago.
    pub const SHOWN_PAST_TWO_MONTHS: f64 = -0.2;
}

/// General acceptance threshold: the best candidate must score above this.
pub const ACCEPT_THRESHOLD: f64 = 0.3;

/// Stricter threshold applied to the anniversary-only pass.
pub const ANNIVERSARY_THRESHOLD: f64 = 0.5;

/// Month counts treated as milestone anniversaries.
pub const MILESTONE_MONTHS: [i64; 4] = [3, 6, 9, 12];

const AVG_DAYS_PER_MONTH: f64 = 30.44;

/// Inputs shared by every candidate in one scoring pass.
#[derive(Debug)]
pub struct ScoringContext<'a> {
    /// Evaluation instant (Unix ms)
    pub now_ms: i64,
    /// Prompt texts currently eligible for resurfacing
    pub eligible_prompts: &'a HashSet<String>,
    /// Category -> recent usage frequency in `[0, 1]`
    pub category_weights: &'a HashMap<EntryCategory, f64>,
    /// Recently shown memories, consulted as a penalty input
    pub history: &'a ResurfaceHistory,
}

/// An entry with its computed resurfacing score.
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    /// The candidate
    pub entry: Entry,
    /// Clamped additive score in `[0, 1]`
    pub score: f64,
}

/// Whether the entry falls on the same day-of-month as `today`, at least one
/// whole month back.
#[must_use]
pub fn is_anniversary(entry_day: NaiveDate, today: NaiveDate) -> bool {
    entry_day.day() == today.day() && util::months_between(entry_day, today) >= 1
}

/// Compute the additive score of one candidate, clamped to `[0, 1]`.
///
/// Anniversary and time-window bonuses stack when both apply; the recency
/// penalty uses whichever of `last_retrieved` and the history guard is more
/// recent.
#[must_use]
pub fn score_entry(entry: &Entry, ctx: &ScoringContext<'_>) -> f64 {
    let mut score = 0.0;

    if ctx.eligible_prompts.contains(&entry.prompt_text) {
        score += weights::PROMPT_MATCH;
    }

    if let Some(frequency) = ctx.category_weights.get(&entry.category) {
        score += weights::CATEGORY_AFFINITY * frequency.clamp(0.0, 1.0);
    }
    if entry.category.is_generic() {
        score += weights::GENERIC_CATEGORY;
    }

    let entry_day = util::timestamp_day(entry.created_at);
    let today = util::timestamp_day(ctx.now_ms);
    let months = util::months_between(entry_day, today);

    if is_anniversary(entry_day, today) {
        score += if MILESTONE_MONTHS.contains(&months) {
            weights::ANNIVERSARY_MILESTONE
        } else {
            weights::ANNIVERSARY
        };
    }

    score += time_window_bonus(months, entry.created_at, ctx.now_ms);
    score += recency_penalty(entry, ctx);

    score.clamp(0.0, 1.0)
}

/// Score every candidate and order best-first.
///
/// Ordering is deterministic: score descending, then newest first, then id.
#[must_use]
pub fn rank(candidates: Vec<Entry>, ctx: &ScoringContext<'_>) -> Vec<ScoredEntry> {
    let mut scored: Vec<ScoredEntry> = candidates
        .into_iter()
        .map(|entry| {
            let score = score_entry(&entry, ctx);
            ScoredEntry { entry, score }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.entry.created_at.cmp(&a.entry.created_at))
            .then_with(|| a.entry.id.cmp(&b.entry.id))
    });
    scored
}

/// Pick the best candidate, if any clears the threshold.
///
/// `anniversary_only` restricts the pool to same-day-of-month candidates
/// before scoring; the threshold comparison is strict in both modes.
#[must_use]
pub fn select(
    candidates: Vec<Entry>,
    ctx: &ScoringContext<'_>,
    threshold: f64,
    anniversary_only: bool,
) -> Option<ScoredEntry> {
    let today = util::timestamp_day(ctx.now_ms);
    let pool: Vec<Entry> = if anniversary_only {
        candidates
            .into_iter()
            .filter(|entry| is_anniversary(util::timestamp_day(entry.created_at), today))
            .collect()
    } else {
        candidates
    };

    rank(pool, ctx)
        .into_iter()
        .next()
        .filter(|best| best.score > threshold)
}

fn time_window_bonus(months: i64, created_at: i64, now_ms: i64) -> f64 {
    let months_f = util::days_between_ms(created_at, now_ms) as f64 / AVG_DAYS_PER_MONTH;

    if (3..=6).contains(&months) {
        weights::WINDOW_MID
    } else if (1..3).contains(&months) {
        // Ramp up toward the sweet spot
        let frac = ((months_f - 1.0) / 2.0).clamp(0.0, 1.0);
        weights::WINDOW_NEAR_MIN + frac * (weights::WINDOW_NEAR_MAX - weights::WINDOW_NEAR_MIN)
    } else if (7..=12).contains(&months) {
        // Fade out toward the one-year mark
        let frac = ((months_f - 6.0) / 6.0).clamp(0.0, 1.0);
        weights::WINDOW_FAR_MAX - frac * (weights::WINDOW_FAR_MAX - weights::WINDOW_FAR_MIN)
    } else {
        0.0
    }
}

fn recency_penalty(entry: &Entry, ctx: &ScoringContext<'_>) -> f64 {
    let last_shown = match (entry.last_retrieved, ctx.history.last_shown_ms(&entry.id)) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    };
    let Some(shown_ms) = last_shown else {
        return 0.0;
    };

    match util::days_between_ms(shown_ms, ctx.now_ms) {
        0..=7 => weights::SHOWN_PAST_WEEK,
        8..=14 => weights::SHOWN_PAST_FORTNIGHT,
        15..=30 => weights::SHOWN_PAST_MONTH,
        31..=60 => weights::SHOWN_PAST_TWO_MONTHS,
        _ => 0.0,
    }
}
