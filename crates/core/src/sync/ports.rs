//! Port interfaces for sync operations

use async_trait::async_trait;
use calsync_domain::{CalendarAccount, CalendarEvent, Result, SyncBatch};
use chrono::{DateTime, Utc};

/// Trait for fetching event deltas from the remote calendar provider
#[async_trait]
pub trait RemoteEventSource: Send + Sync {
    /// Fetch one page of changes.
    ///
    /// A supplied `page_token` continues a paginated pass irrespective of
    /// `sync_cursor`. Without a cursor the source performs a bounded-window
    /// full fetch. A cursor the provider no longer accepts is reported as
    /// `CalSyncError::SyncCursorInvalidated`.
    async fn fetch_delta(
        &self,
        account: &CalendarAccount,
        sync_cursor: Option<&str>,
        page_token: Option<&str>,
    ) -> Result<SyncBatch>;
}

/// Trait for the local authoritative event set of each account
#[async_trait]
pub trait LocalEventStore: Send + Sync {
    /// Read the full event set stored for an account
    async fn read_all(&self, account_id: &str) -> Result<Vec<CalendarEvent>>;

    /// Replace the stored event set of an account with `events`
    async fn replace_all(&self, account_id: &str, events: &[CalendarEvent]) -> Result<()>;
}

/// Trait for persisting accounts and their sync cursors
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Find an account by its external identifier
    async fn find(&self, account_id: &str) -> Result<Option<CalendarAccount>>;

    /// Overwrite the account's sync cursor (`None` clears it)
    async fn update_cursor(&self, account_id: &str, cursor: Option<&str>) -> Result<()>;

    /// Insert or fully update an account record
    async fn upsert(&self, account: &CalendarAccount) -> Result<()>;

    /// List every stored account
    async fn list_all(&self) -> Result<Vec<CalendarAccount>>;

    /// Remove an account record
    async fn remove(&self, account_id: &str) -> Result<()>;

    /// Record when a webhook channel was last registered for the account
    async fn mark_webhook_registered(&self, account_id: &str, at: DateTime<Utc>) -> Result<()>;
}
