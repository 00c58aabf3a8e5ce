//! Google Calendar events client implementing `RemoteEventSource`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use calsync_core::RemoteEventSource;
use calsync_domain::constants::{PRIMARY_CALENDAR_ID, PROVIDER_PAGE_SIZE};
use calsync_domain::{CalSyncError, CalendarAccount, GoogleConfig, Result, SyncBatch};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};

use super::oauth::GoogleOAuthClient;
use super::types::GoogleEventsResponse;
use crate::errors::conversions::map_http_error;

/// Google Calendar API client for the account's primary calendar
pub struct GoogleCalendarClient {
    http: Client,
    oauth: Arc<GoogleOAuthClient>,
    api_base_url: String,
    sync_window_days: i64,
    /// Instant each in-progress full fetch was started at, by account id
    window_anchors: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl GoogleCalendarClient {
    pub fn new(http: Client, oauth: Arc<GoogleOAuthClient>, config: &GoogleConfig) -> Self {
        Self {
            http,
            oauth,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            sync_window_days: config.sync_window_days,
            window_anchors: Mutex::new(HashMap::new()),
        }
    }

    /// Reference time for a full fetch. Continuation pages reuse the instant
    /// recorded for the first page so every page shares one window.
    fn window_anchor(&self, account_id: &str, page_token: Option<&str>) -> DateTime<Utc> {
        let mut anchors = self.window_anchors.lock();
        match (page_token, anchors.get(account_id)) {
            (Some(_), Some(anchor)) => *anchor,
            _ => {
                let now = Utc::now();
                anchors.insert(account_id.to_string(), now);
                now
            }
        }
    }

    fn release_window_anchor(&self, account_id: &str) {
        self.window_anchors.lock().remove(account_id);
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{PRIMARY_CALENDAR_ID}/events", self.api_base_url)
    }
}

/// Query parameters for one events-list request.
///
/// With a cursor the request is incremental (`syncToken`); without one it is
/// a full fetch from today 00:00 UTC to `now + window_days`. A page token is
/// appended to whichever base query applies. A window that does not fit in a
/// timestamp is a configuration error.
pub fn build_query(
    sync_cursor: Option<&str>,
    page_token: Option<&str>,
    now: DateTime<Utc>,
    window_days: i64,
) -> Result<Vec<(&'static str, String)>> {
    let mut query = vec![
        ("maxResults", PROVIDER_PAGE_SIZE.to_string()),
        ("timeZone", "UTC".to_string()),
        ("singleEvents", "true".to_string()),
    ];

    match sync_cursor {
        Some(cursor) => query.push(("syncToken", cursor.to_string())),
        None => {
            let start_of_day = now.date_naive().and_hms_opt(0, 0, 0).map_or(now, |d| d.and_utc());
            let window_end = Duration::try_days(window_days)
                .and_then(|span| now.checked_add_signed(span))
                .ok_or_else(|| {
                    CalSyncError::Config(format!("sync window of {window_days} days is out of range"))
                })?;
            query.push(("timeMin", start_of_day.to_rfc3339()));
            query.push(("timeMax", window_end.to_rfc3339()));
        }
    }

    if let Some(token) = page_token {
        query.push(("pageToken", token.to_string()));
    }

    Ok(query)
}

#[async_trait]
impl RemoteEventSource for GoogleCalendarClient {
    #[instrument(skip(self, account, sync_cursor, page_token), fields(
        account_id = %account.account_id,
        incremental = sync_cursor.is_some(),
        continuation = page_token.is_some(),
    ))]
    async fn fetch_delta(
        &self,
        account: &CalendarAccount,
        sync_cursor: Option<&str>,
        page_token: Option<&str>,
    ) -> Result<SyncBatch> {
        // Credential problems inside a pass are fetch failures.
        let access_token = self.oauth.access_token(account).await.map_err(|err| match err {
            CalSyncError::Auth(msg) => CalSyncError::RemoteFetch(format!("credential refresh failed: {msg}")),
            other => other,
        })?;

        let full_fetch = sync_cursor.is_none();
        let now = if full_fetch {
            self.window_anchor(&account.account_id, page_token)
        } else {
            Utc::now()
        };
        let query = build_query(sync_cursor, page_token, now, self.sync_window_days)?;
        let response = self
            .http
            .get(self.events_url())
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            if status == StatusCode::GONE {
                warn!(account_id = %account.account_id, "sync token rejected by provider");
                return Err(CalSyncError::SyncCursorInvalidated(format!(
                    "Google API error ({status}): {error_text}"
                )));
            }
            if status == StatusCode::UNAUTHORIZED {
                self.oauth.invalidate(&account.account_id);
            }
            return Err(CalSyncError::RemoteFetch(format!("Google API error ({status}): {error_text}")));
        }

        let body: GoogleEventsResponse = response.json().await.map_err(|e| {
            CalSyncError::RemoteFetch(format!("Failed to parse Google response: {e}"))
        })?;

        let batch = body.into_batch();
        if full_fetch && batch.next_page_token.is_none() {
            self.release_window_anchor(&account.account_id);
        }
        debug!(
            events = batch.events.len(),
            has_next_page = batch.next_page_token.is_some(),
            has_sync_token = batch.next_sync_token.is_some(),
            "fetched events page"
        );
        Ok(batch)
    }
}
