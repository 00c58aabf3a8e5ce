//! SQLite implementation of the `LocalEventStore` port.
//!
//! Events are stored one row per `(account_id, event_id)` with a `position`
//! column preserving the order of the authoritative set. Attendees are kept
//! as a JSON array; start and end as epoch milliseconds.

use std::sync::Arc;

use async_trait::async_trait;
use calsync_core::LocalEventStore;
use calsync_domain::{CalSyncError, CalendarEvent, EventAttendee, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use tokio::task;
use tracing::{debug, instrument};

use super::pool::SqlitePool;
use crate::errors::conversions::{map_join_error, map_pool_error, map_sql_error};
use crate::errors::InfraError;

/// SQLite implementation of `LocalEventStore`
pub struct SqliteEventStore {
    pool: Arc<SqlitePool>,
}

impl SqliteEventStore {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

/// Raw column values before JSON and timestamp decoding
struct EventRecord {
    event_id: String,
    summary: String,
    description: String,
    attendees: String,
    creator: String,
    organizer: String,
    location: String,
    start_ms: i64,
    end_ms: i64,
    recurring_event_id: Option<String>,
    event_type: String,
    status: String,
}

impl EventRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            event_id: row.get(0)?,
            summary: row.get(1)?,
            description: row.get(2)?,
            attendees: row.get(3)?,
            creator: row.get(4)?,
            organizer: row.get(5)?,
            location: row.get(6)?,
            start_ms: row.get(7)?,
            end_ms: row.get(8)?,
            recurring_event_id: row.get(9)?,
            event_type: row.get(10)?,
            status: row.get(11)?,
        })
    }

    fn into_event(self) -> Result<CalendarEvent> {
        let attendees: Vec<EventAttendee> =
            serde_json::from_str(&self.attendees).map_err(InfraError::from)?;
        Ok(CalendarEvent {
            start: millis_to_utc(self.start_ms)?,
            end: millis_to_utc(self.end_ms)?,
            id: self.event_id,
            summary: self.summary,
            description: self.description,
            attendees,
            creator: self.creator,
            organizer: self.organizer,
            location: self.location,
            recurring_event_id: self.recurring_event_id,
            event_type: self.event_type,
            status: self.status,
        })
    }
}

pub(crate) fn timestamp_to_utc(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| CalSyncError::Store(format!("timestamp out of range: {secs}")))
}

fn millis_to_utc(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| CalSyncError::Store(format!("timestamp out of range: {millis}ms")))
}

fn query_events(conn: &Connection, account_id: &str) -> Result<Vec<CalendarEvent>> {
    let mut stmt = conn
        .prepare(
            "SELECT event_id, summary, description, attendees, creator, organizer,
                    location, start_ms, end_ms, recurring_event_id, event_type, status
             FROM calendar_event
             WHERE account_id = ?1
             ORDER BY position ASC",
        )
        .map_err(map_sql_error)?;

    let records = stmt
        .query_map(params![account_id], EventRecord::from_row)
        .map_err(map_sql_error)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(map_sql_error)?;

    records.into_iter().map(EventRecord::into_event).collect()
}

fn replace_events(conn: &mut Connection, account_id: &str, events: &[CalendarEvent]) -> Result<()> {
    let tx = conn.transaction().map_err(map_sql_error)?;

    tx.execute("DELETE FROM calendar_event WHERE account_id = ?1", params![account_id])
        .map_err(map_sql_error)?;

    {
        let mut insert = tx
            .prepare(
                "INSERT INTO calendar_event (
                    account_id, event_id, position, summary, description, attendees,
                    creator, organizer, location, start_ms, end_ms, recurring_event_id,
                    event_type, status
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            )
            .map_err(map_sql_error)?;

        for (position, event) in events.iter().enumerate() {
            let attendees = serde_json::to_string(&event.attendees).map_err(InfraError::from)?;
            insert
                .execute(params![
                    account_id,
                    event.id,
                    i64::try_from(position).unwrap_or(i64::MAX),
                    event.summary,
                    event.description,
                    attendees,
                    event.creator,
                    event.organizer,
                    event.location,
                    event.start.timestamp_millis(),
                    event.end.timestamp_millis(),
                    event.recurring_event_id,
                    event.event_type,
                    event.status,
                ])
                .map_err(map_sql_error)?;
        }
    }

    tx.commit().map_err(map_sql_error)
}

#[async_trait]
impl LocalEventStore for SqliteEventStore {
    #[instrument(skip(self))]
    async fn read_all(&self, account_id: &str) -> Result<Vec<CalendarEvent>> {
        let pool = Arc::clone(&self.pool);
        let owned_id = account_id.to_string();

        let events = task::spawn_blocking(move || -> Result<Vec<CalendarEvent>> {
            let conn = pool.get().map_err(map_pool_error)?;
            query_events(&conn, &owned_id)
        })
        .await
        .map_err(map_join_error)??;

        debug!(account_id, count = events.len(), "loaded stored events");
        Ok(events)
    }

    #[instrument(skip(self, events), fields(count = events.len()))]
    async fn replace_all(&self, account_id: &str, events: &[CalendarEvent]) -> Result<()> {
        let pool = Arc::clone(&self.pool);
        let owned_id = account_id.to_string();
        let owned_events = events.to_vec();

        task::spawn_blocking(move || -> Result<()> {
            let mut conn = pool.get().map_err(map_pool_error)?;
            replace_events(&mut conn, &owned_id, &owned_events)
        })
        .await
        .map_err(map_join_error)??;

        debug!(account_id, count = events.len(), "replaced stored events");
        Ok(())
    }
}
