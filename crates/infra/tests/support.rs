#![allow(dead_code)]

use std::sync::Arc;

use calsync_domain::{CalendarAccount, CalendarEvent, EventAttendee, GoogleConfig};
use calsync_infra::database::{DbManager, SqliteAccountStore, SqliteEventStore};
use chrono::{TimeZone, Utc};
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new temporary database with the schema applied.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("schema should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    pub fn event_store(&self) -> SqliteEventStore {
        SqliteEventStore::new(self.manager.pool().clone())
    }

    pub fn account_store(&self) -> SqliteAccountStore {
        SqliteAccountStore::new(self.manager.pool().clone())
    }
}

pub fn sample_event(id: &str, status: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: format!("Meeting {id}"),
        description: "-".to_string(),
        attendees: vec![EventAttendee {
            id: None,
            email: "guest@example.com".to_string(),
            optional: true,
            organizer: false,
            response_status: "needsAction".to_string(),
        }],
        creator: "owner@example.com".to_string(),
        organizer: "owner@example.com".to_string(),
        location: "Room 1".to_string(),
        start: Utc.with_ymd_and_hms(2026, 10, 20, 8, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2026, 10, 20, 9, 0, 0).unwrap(),
        recurring_event_id: Some("series".to_string()),
        event_type: "default".to_string(),
        status: status.to_string(),
    }
}

pub fn sample_account(account_id: &str) -> CalendarAccount {
    CalendarAccount::new(account_id, format!("{account_id}@example.com"), "refresh-token")
}

/// Google settings pointing every endpoint at a mock server.
pub fn google_config(server_uri: &str) -> GoogleConfig {
    let mut config = GoogleConfig::new("client-id", "client-secret", "https://calsync.test");
    config.api_base_url = server_uri.to_string();
    config.token_url = format!("{server_uri}/token");
    config
}
