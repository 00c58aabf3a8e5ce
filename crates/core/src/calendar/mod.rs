//! Calendar use cases

pub mod service;

pub use service::{BatchSyncReport, CalendarService};
