//! Domain types and models

pub mod account;
pub mod event;
pub mod sync;

pub use account::CalendarAccount;
pub use event::{CalendarEvent, EventAttendee};
pub use sync::{SyncBatch, SyncSummary, WebhookChannel};
