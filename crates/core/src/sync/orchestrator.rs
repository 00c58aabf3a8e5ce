//! Sync orchestrator: one pass from remote delta to stored event set.

use std::sync::Arc;

use calsync_domain::constants::DEFAULT_MAX_PAGES;
use calsync_domain::{CalSyncError, CalendarEvent, Result, SyncSummary};
use tracing::{debug, info, instrument, warn};

use super::merge::merge_events_with_stats;
use super::ports::{AccountStore, LocalEventStore, RemoteEventSource};

/// Options controlling a sync pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Maximum number of pages fetched in one pass; `None` means unbounded
    pub max_pages: Option<u32>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self { max_pages: Some(DEFAULT_MAX_PAGES) }
    }
}

impl SyncOptions {
    pub fn with_max_pages(max_pages: Option<u32>) -> Self {
        Self { max_pages }
    }
}

/// Drives pagination, merges the remote delta and persists the result
pub struct SyncOrchestrator {
    source: Arc<dyn RemoteEventSource>,
    events: Arc<dyn LocalEventStore>,
    accounts: Arc<dyn AccountStore>,
    options: SyncOptions,
}

impl SyncOrchestrator {
    pub fn new(
        source: Arc<dyn RemoteEventSource>,
        events: Arc<dyn LocalEventStore>,
        accounts: Arc<dyn AccountStore>,
    ) -> Self {
        Self::with_options(source, events, accounts, SyncOptions::default())
    }

    pub fn with_options(
        source: Arc<dyn RemoteEventSource>,
        events: Arc<dyn LocalEventStore>,
        accounts: Arc<dyn AccountStore>,
        options: SyncOptions,
    ) -> Self {
        Self { source, events, accounts, options }
    }

    /// Run one synchronization pass for `account_id`.
    ///
    /// Any fetch failure aborts the pass before a write. On success the
    /// merged event set is stored first and the new cursor second.
    #[instrument(skip(self))]
    pub async fn run_sync(&self, account_id: &str) -> Result<SyncSummary> {
        let account = self
            .accounts
            .find(account_id)
            .await?
            .ok_or_else(|| CalSyncError::UnauthorizedAccount(account_id.to_string()))?;

        let existing = self.events.read_all(account_id).await?;
        let cursor = account.sync_token.as_deref();
        let incremental = cursor.is_some();

        let mut delta: Vec<CalendarEvent> = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages_fetched: u32 = 0;

        let next_sync_token = loop {
            if let Some(max_pages) = self.options.max_pages {
                if pages_fetched >= max_pages {
                    warn!(account_id, max_pages, "page limit reached without a sync token");
                    return Err(CalSyncError::RemoteFetch(format!(
                        "no sync token after {max_pages} pages"
                    )));
                }
            }

            let batch = self.source.fetch_delta(&account, cursor, page_token.as_deref()).await?;
            pages_fetched += 1;
            debug!(
                account_id,
                page = pages_fetched,
                events = batch.events.len(),
                "fetched page"
            );
            delta.extend(batch.events);

            match (batch.next_sync_token, batch.next_page_token) {
                (Some(sync_token), _) => break sync_token,
                (None, Some(next_page)) => page_token = Some(next_page),
                (None, None) => {
                    return Err(CalSyncError::RemoteFetch(
                        "page carried neither a page token nor a sync token".to_string(),
                    ));
                }
            }
        };

        let (merged, stats) = merge_events_with_stats(&existing, &delta);

        self.events.replace_all(account_id, &merged).await?;
        self.accounts.update_cursor(account_id, Some(&next_sync_token)).await?;

        info!(
            account_id,
            incremental,
            pages_fetched,
            events_fetched = delta.len(),
            kept = stats.kept,
            replaced = stats.replaced,
            dropped = stats.dropped,
            added = stats.added,
            ignored = stats.ignored,
            "sync pass complete"
        );

        Ok(SyncSummary {
            pages_fetched,
            events_fetched: delta.len(),
            events_stored: merged.len(),
            incremental,
        })
    }
}
