//! Entry model

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::util;

/// A unique identifier for an entry, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Create a new unique entry ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Classification bucket assigned to an entry at capture time.
///
/// `FreeForm` is the generic catch-all for unstructured recordings and is
/// penalized by the resurfacing score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntryCategory {
    /// Daily check-in prompt
    Daily,
    /// Gratitude prompt
    Gratitude,
    /// Milestone or achievement recording
    Milestone,
    /// Guided reflection prompt
    Reflection,
    /// Unstructured free-form recording
    #[default]
    FreeForm,
}

impl EntryCategory {
    /// Stable lowercase name used in persistence and on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Gratitude => "gratitude",
            Self::Milestone => "milestone",
            Self::Reflection => "reflection",
            Self::FreeForm => "freeform",
        }
    }

    /// Whether this is the generic catch-all bucket.
    #[must_use]
    pub const fn is_generic(self) -> bool {
        matches!(self, Self::FreeForm)
    }
}

impl fmt::Display for EntryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "gratitude" => Ok(Self::Gratitude),
            "milestone" => Ok(Self::Milestone),
            "reflection" => Ok(Self::Reflection),
            "freeform" | "free-form" => Ok(Self::FreeForm),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// One journaling submission.
///
/// An entry is created once at capture time and written to exactly one
/// backend; afterwards it is only read through merged queries. `transcript`
/// may be edited later and `last_retrieved` is bumped whenever the entry is
/// chosen as a resurfaced memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique identifier, the merge key across both backends
    pub id: EntryId,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// When this entry was last resurfaced as a memory (Unix ms)
    pub last_retrieved: Option<i64>,
    /// The prompt the user answered
    pub prompt_text: String,
    /// Classification bucket
    pub category: EntryCategory,
    /// Transcribed text, when available
    pub transcript: Option<String>,
    /// Opaque handle to the captured audio/video
    pub media_reference: Option<String>,
    /// Part of the daily check-in flow
    pub is_daily_entry: bool,
    /// Recorded as a follow-up to a previous entry
    pub is_follow_up: bool,
    /// Marks a logged success or win
    pub is_success_entry: bool,
    /// Captured without a guiding prompt
    pub is_unguided: bool,
    /// Soft delete flag
    pub is_deleted: bool,
}

impl Entry {
    /// Create a new entry for the given prompt, timestamped now
    #[must_use]
    pub fn new(prompt_text: impl Into<String>, category: EntryCategory) -> Self {
        Self {
            id: EntryId::new(),
            created_at: util::unix_ms_now(),
            last_retrieved: None,
            prompt_text: prompt_text.into(),
            category,
            transcript: None,
            media_reference: None,
            is_daily_entry: false,
            is_follow_up: false,
            is_success_entry: false,
            is_unguided: false,
            is_deleted: false,
        }
    }

    /// Local calendar day this entry was captured on
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        util::timestamp_day(self.created_at)
    }

    /// First transcript line as a short preview, truncated to `max_len` characters
    #[must_use]
    pub fn preview(&self, max_len: usize) -> String {
        self.transcript
            .as_deref()
            .unwrap_or(&self.prompt_text)
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(max_len)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_id_unique() {
        let id1 = EntryId::new();
        let id2 = EntryId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn entry_id_parse_roundtrip() {
        let id = EntryId::new();
        let parsed: EntryId = id.as_str().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn category_parse_accepts_known_names() {
        assert_eq!("daily".parse::<EntryCategory>(), Ok(EntryCategory::Daily));
        assert_eq!(
            " Free-Form ".parse::<EntryCategory>(),
            Ok(EntryCategory::FreeForm)
        );
        assert!("mystery".parse::<EntryCategory>().is_err());
    }

    #[test]
    fn category_generic_is_only_freeform() {
        assert!(EntryCategory::FreeForm.is_generic());
        assert!(!EntryCategory::Daily.is_generic());
        assert!(!EntryCategory::Milestone.is_generic());
    }

    #[test]
    fn new_entry_has_no_retrieval_or_transcript() {
        let entry = Entry::new("What made you smile today?", EntryCategory::Daily);
        assert!(entry.last_retrieved.is_none());
        assert!(entry.transcript.is_none());
        assert!(!entry.is_deleted);
        assert!(entry.created_at > 0);
    }

    #[test]
    fn preview_prefers_transcript_first_line() {
        let mut entry = Entry::new("Prompt", EntryCategory::Reflection);
        entry.transcript = Some("First line\nSecond line".to_string());
        assert_eq!(entry.preview(40), "First line");
        assert_eq!(entry.preview(5), "First");
    }

    #[test]
    fn preview_falls_back_to_prompt() {
        let entry = Entry::new("A quiet moment", EntryCategory::FreeForm);
        assert_eq!(entry.preview(40), "A quiet moment");
    }
}
