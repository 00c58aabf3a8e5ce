//! Transient synchronization types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::CalendarEvent;

/// One page of results from the remote event source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncBatch {
    pub events: Vec<CalendarEvent>,
    /// Present when more pages follow
    pub next_page_token: Option<String>,
    /// Present on the final page; the cursor for the next pass
    pub next_sync_token: Option<String>,
}

/// Outcome of one completed synchronization pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub pages_fetched: u32,
    pub events_fetched: usize,
    pub events_stored: usize,
    /// False when the pass ran as a windowed full fetch
    pub incremental: bool,
}

/// Push-notification channel registered with the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookChannel {
    pub channel_id: String,
    pub address: String,
    pub expires_at: DateTime<Utc>,
}
