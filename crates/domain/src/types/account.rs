//! Calendar account types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One authorized remote-calendar principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarAccount {
    /// Stable external identifier (Google subject id)
    pub account_id: String,
    pub primary_email: String,
    /// Opaque to the sync engine; only the provider adapters read it
    #[serde(skip_serializing, default)]
    pub refresh_token: String,
    /// `None` means there is no incremental baseline yet
    pub sync_token: Option<String>,
    pub webhook_registered_at: Option<DateTime<Utc>>,
}

impl CalendarAccount {
    /// Create a freshly authorized account without a sync baseline.
    pub fn new(
        account_id: impl Into<String>,
        primary_email: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            primary_email: primary_email.into(),
            refresh_token: refresh_token.into(),
            sync_token: None,
            webhook_registered_at: None,
        }
    }
}
