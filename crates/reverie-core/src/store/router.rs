//! Per-operation backend routing
//!
//! All decisions about which backend(s) an operation touches live here, so
//! the cloud/local branching is testable on its own instead of being
//! scattered through call sites.

use std::str::FromStr;

use crate::error::{Error, Result};
use crate::models::{Entry, EntryId};

use super::EntryStore;

/// User-level sync preference: which backend receives capture writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureTarget {
    /// Write new entries to the on-device store
    #[default]
    Local,
    /// Write new entries to the synchronized store
    Remote,
}

impl FromStr for CaptureTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            other => Err(format!("unknown capture target: {other}")),
        }
    }
}

/// Routes each operation to the backend(s) that should see it.
///
/// Reads are not routed here — the fan-out coordinator queries both stores
/// concurrently. Mutations are sequential by design: local first, then the
/// remote store only when sync is enabled and local did not hold the record.
pub struct StoreRouter<L, R> {
    local: L,
    remote: Option<R>,
    capture_target: CaptureTarget,
}

impl<L: EntryStore, R: EntryStore> StoreRouter<L, R> {
    /// Build a router over the two backends.
    ///
    /// A `Remote` capture preference without a configured remote store falls
    /// back to local capture.
    pub fn new(local: L, remote: Option<R>, capture_target: CaptureTarget) -> Self {
        let capture_target = if remote.is_none() && capture_target == CaptureTarget::Remote {
            tracing::debug!("Remote capture requested without a remote store; using local");
            CaptureTarget::Local
        } else {
            capture_target
        };

        Self {
            local,
            remote,
            capture_target,
        }
    }

    /// The always-available on-device backend.
    pub const fn local(&self) -> &L {
        &self.local
    }

    /// The synchronized backend, when sync is enabled.
    pub const fn remote(&self) -> Option<&R> {
        self.remote.as_ref()
    }

    /// Whether remote sync is enabled.
    pub const fn sync_enabled(&self) -> bool {
        self.remote.is_some()
    }

    /// Backend that receives capture writes.
    pub const fn capture_target(&self) -> CaptureTarget {
        self.capture_target
    }

    /// Write a freshly captured entry to exactly one backend.
    pub async fn capture(&self, entry: &Entry) -> Result<()> {
        match (self.capture_target, &self.remote) {
            (CaptureTarget::Remote, Some(remote)) => remote.insert_entry(entry).await,
            _ => self.local.insert_entry(entry).await,
        }
    }

    /// Replace an entry's transcript wherever the entry lives.
    ///
    /// Local first; remote only when local did not hold the record.
    pub async fn edit_transcript(&self, id: &EntryId, text: &str) -> Result<()> {
        if self.local.update_transcript(id, text).await? {
            return Ok(());
        }
        if let Some(remote) = &self.remote {
            if remote.update_transcript(id, text).await? {
                return Ok(());
            }
        }
        Err(Error::NotFound(id.to_string()))
    }

    /// Delete an entry from whichever backend holds it.
    pub async fn delete(&self, id: &EntryId) -> Result<()> {
        match self.local.delete_entry(id).await {
            Ok(()) => Ok(()),
            Err(Error::NotFound(_)) => match &self.remote {
                Some(remote) => remote.delete_entry(id).await,
                None => Err(Error::NotFound(id.to_string())),
            },
            Err(error) => Err(error),
        }
    }

    /// Record a resurfacing timestamp in every backend that holds the entry.
    ///
    /// The remote write is best-effort: an unreachable remote must not undo
    /// an accepted memory, so its failures are logged and swallowed.
    pub async fn mark_retrieved(&self, id: &EntryId, at_ms: i64) -> Result<bool> {
        let mut found = self.local.mark_retrieved(id, at_ms).await?;

        if let Some(remote) = &self.remote {
            match remote.mark_retrieved(id, at_ms).await {
                Ok(remote_found) => found |= remote_found,
                Err(error) => {
                    tracing::warn!("Remote retrieval mark failed for {id}: {error}");
                }
            }
        }

        Ok(found)
    }
}
