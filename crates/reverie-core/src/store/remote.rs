//! Synchronized remote entry store accessed over HTTPS
//!
//! The remote backend is best-effort: fetch failures (network, auth, quota)
//! are caught at this adapter boundary and degrade to empty results so a
//! remote outage reduces the merged view to local-only data instead of
//! failing the read. Mutations do surface failures, as `StoreUnavailable`.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{DateRange, Entry, EntryId};
use crate::util::{is_http_url, normalize_text_option};

use super::EntryStore;

const REMOTE_HTTP_TIMEOUT_SECS: u64 = 10;

/// Connection settings for the remote sync service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    base_url: String,
    auth_token: String,
}

impl RemoteConfig {
    /// Validate and normalize the endpoint and token.
    pub fn new(base_url: impl Into<String>, auth_token: impl Into<String>) -> Result<Self> {
        let base_url = normalize_text_option(Some(base_url.into()))
            .ok_or_else(|| Error::InvalidInput("remote base URL must not be empty".to_string()))?;
        if !is_http_url(&base_url) {
            return Err(Error::InvalidInput(
                "remote base URL must include http:// or https://".to_string(),
            ));
        }
        let auth_token = normalize_text_option(Some(auth_token.into())).ok_or_else(|| {
            Error::InvalidInput("remote auth token must not be empty".to_string())
        })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
        })
    }

    /// Normalized service base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// The best-effort synchronized backend.
pub struct RemoteStore {
    config: RemoteConfig,
    client: reqwest::Client,
}

impl RemoteStore {
    /// Build a remote store with its own HTTP client.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REMOTE_HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|error| Error::StoreUnavailable(error.to_string()))?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    async fn get_body(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.auth_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| Error::StoreUnavailable(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::StoreUnavailable(format!(
                "HTTP {} from {url}",
                status.as_u16()
            )));
        }

        response
            .text()
            .await
            .map_err(|error| Error::StoreUnavailable(error.to_string()))
    }

    async fn try_fetch_range(&self, range: &DateRange) -> Result<Vec<Entry>> {
        let url = self.url(&format!(
            "/v1/entries?start_ms={}&end_ms={}",
            range.start_ms(),
            range.end_ms()
        ));
        parse_entries_payload(&self.get_body(&url).await?)
    }

    async fn try_fetch_active_days(
        &self,
        before: Option<NaiveDate>,
        limit: usize,
    ) -> Result<Vec<NaiveDate>> {
        let mut url = self.url(&format!("/v1/entries/active-days?limit={limit}"));
        if let Some(day) = before {
            url.push_str(&format!("&before={day}"));
        }
        parse_active_days_payload(&self.get_body(&url).await?)
    }

    async fn try_day_count(&self) -> Result<usize> {
        let url = self.url("/v1/entries/active-day-count");
        parse_day_count_payload(&self.get_body(&url).await?)
    }

    /// Map a fetch failure to the documented graceful-empty behavior.
    fn degrade<T: Default>(operation: &str, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(error) => {
                tracing::warn!("Remote {operation} failed; continuing with local data: {error}");
                Ok(T::default())
            }
        }
    }
}

impl EntryStore for RemoteStore {
    async fn fetch_entries_for_day(&self, day: NaiveDate) -> Result<Vec<Entry>> {
        let range = DateRange::for_day(day);
        Self::degrade("day fetch", self.try_fetch_range(&range).await)
    }

    async fn fetch_entries_in_range(&self, range: &DateRange) -> Result<Vec<Entry>> {
        Self::degrade("range fetch", self.try_fetch_range(range).await)
    }

    async fn fetch_recent_active_days(
        &self,
        before: Option<NaiveDate>,
        limit: usize,
    ) -> Result<Vec<NaiveDate>> {
        Self::degrade(
            "active-days fetch",
            self.try_fetch_active_days(before, limit).await,
        )
    }

    async fn distinct_active_day_count(&self) -> Result<usize> {
        Self::degrade("day-count fetch", self.try_day_count().await)
    }

    async fn update_transcript(&self, id: &EntryId, text: &str) -> Result<bool> {
        let url = self.url(&format!("/v1/entries/{id}/transcript"));
        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.config.auth_token)
            .json(&TranscriptPatch { transcript: text })
            .send()
            .await
            .map_err(|error| Error::StoreUnavailable(error.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(Error::StoreUnavailable(format!(
                "HTTP {} from {url}",
                status.as_u16()
            ))),
        }
    }

    async fn delete_entry(&self, id: &EntryId) -> Result<()> {
        let url = self.url(&format!("/v1/entries/{id}"));
        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.config.auth_token)
            .send()
            .await
            .map_err(|error| Error::StoreUnavailable(error.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(Error::NotFound(id.to_string())),
            status => Err(Error::StoreUnavailable(format!(
                "HTTP {} from {url}",
                status.as_u16()
            ))),
        }
    }

    async fn insert_entry(&self, entry: &Entry) -> Result<()> {
        let url = self.url("/v1/entries");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.auth_token)
            .json(entry)
            .send()
            .await
            .map_err(|error| Error::StoreUnavailable(error.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::StoreUnavailable(format!(
                "HTTP {} from {url}",
                status.as_u16()
            )))
        }
    }

    async fn mark_retrieved(&self, id: &EntryId, at_ms: i64) -> Result<bool> {
        let url = self.url(&format!("/v1/entries/{id}/retrieved"));
        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.config.auth_token)
            .json(&RetrievedPatch {
                last_retrieved: at_ms,
            })
            .send()
            .await
            .map_err(|error| Error::StoreUnavailable(error.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(Error::StoreUnavailable(format!(
                "HTTP {} from {url}",
                status.as_u16()
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EntriesPayload {
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct ActiveDaysPayload {
    days: Vec<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct DayCountPayload {
    count: usize,
}

#[derive(Debug, Serialize)]
struct TranscriptPatch<'a> {
    transcript: &'a str,
}

#[derive(Debug, Serialize)]
struct RetrievedPatch {
    last_retrieved: i64,
}

/// Parse an entries response body.
///
/// Public for testability — callers can exercise parsing without network access.
pub fn parse_entries_payload(payload: &str) -> Result<Vec<Entry>> {
    Ok(serde_json::from_str::<EntriesPayload>(payload)?.entries)
}

/// Parse an active-days response body.
pub fn parse_active_days_payload(payload: &str) -> Result<Vec<NaiveDate>> {
    Ok(serde_json::from_str::<ActiveDaysPayload>(payload)?.days)
}

/// Parse a day-count response body.
pub fn parse_day_count_payload(payload: &str) -> Result<usize> {
    Ok(serde_json::from_str::<DayCountPayload>(payload)?.count)
}
