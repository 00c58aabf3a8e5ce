//! Shared test helpers for `calsync-core` integration tests.
//!
//! In-memory doubles for every core port plus event/account fixtures, so the
//! orchestrator and service tests can focus on behaviour instead of
//! boilerplate.

#![allow(dead_code)]

pub mod calendar;
pub mod repositories;

use calsync_domain::{CalendarAccount, CalendarEvent, SyncBatch};
use chrono::{TimeZone, Utc};

/// Build an event with fixed payload and the given id/status.
pub fn event(id: &str, status: &str) -> CalendarEvent {
    event_with_summary(id, status, &format!("summary {id}"))
}

pub fn event_with_summary(id: &str, status: &str, summary: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: summary.to_string(),
        description: "-".to_string(),
        attendees: Vec::new(),
        creator: "owner@example.com".to_string(),
        organizer: "owner@example.com".to_string(),
        location: "-".to_string(),
        start: Utc.with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap(),
        recurring_event_id: None,
        event_type: "default".to_string(),
        status: status.to_string(),
    }
}

pub fn account(account_id: &str, sync_token: Option<&str>) -> CalendarAccount {
    let mut account = CalendarAccount::new(account_id, format!("{account_id}@example.com"), "refresh");
    account.sync_token = sync_token.map(str::to_string);
    account
}

/// Final page of a pass.
pub fn last_page(events: Vec<CalendarEvent>, sync_token: &str) -> SyncBatch {
    SyncBatch { events, next_page_token: None, next_sync_token: Some(sync_token.to_string()) }
}

/// Intermediate page of a pass.
pub fn page(events: Vec<CalendarEvent>, page_token: &str) -> SyncBatch {
    SyncBatch { events, next_page_token: Some(page_token.to_string()), next_sync_token: None }
}
