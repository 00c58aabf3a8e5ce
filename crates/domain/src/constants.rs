//! Application constants
//!
//! Centralized location for domain-level constants shared by the core and
//! the provider adapters.

/// Provider status marking an event as deleted or transferred to another owner.
pub const CANCELLED_EVENT_STATUS: &str = "cancelled";

/// Placeholder stored for textual event fields the provider leaves empty.
pub const MISSING_FIELD_PLACEHOLDER: &str = "-";

/// Only the account's primary calendar is synchronized.
pub const PRIMARY_CALENDAR_ID: &str = "primary";

// Provider query defaults
pub const PROVIDER_PAGE_SIZE: u32 = 100;
pub const DEFAULT_SYNC_WINDOW_DAYS: i64 = 30;
pub const MAX_SYNC_WINDOW_DAYS: i64 = 3650;
pub const WEBHOOK_CHANNEL_LIFETIME_DAYS: i64 = 30; // provider maximum
pub const DEFAULT_MAX_PAGES: u32 = 1000;

// Token handling
pub const ACCESS_TOKEN_REFRESH_THRESHOLD_SECS: i64 = 300;
