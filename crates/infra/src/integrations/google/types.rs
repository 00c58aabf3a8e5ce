//! Google Calendar API wire types and their conversion into domain events.

use calsync_domain::constants::MISSING_FIELD_PLACEHOLDER;
use calsync_domain::{CalendarEvent, EventAttendee, SyncBatch};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Response of `GET /calendars/{id}/events`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEventsResponse {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
    pub next_page_token: Option<String>,
    pub next_sync_token: Option<String>,
}

impl GoogleEventsResponse {
    pub fn into_batch(self) -> SyncBatch {
        SyncBatch {
            events: self.items.into_iter().map(GoogleEvent::into_event).collect(),
            next_page_token: self.next_page_token,
            next_sync_token: self.next_sync_token,
        }
    }
}

/// Google event resource; incremental responses may only carry `id` and
/// `status` for cancelled events, so everything else is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEvent {
    pub id: String,
    pub status: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub attendees: Option<Vec<GoogleAttendee>>,
    pub creator: Option<GooglePerson>,
    pub organizer: Option<GooglePerson>,
    pub location: Option<String>,
    pub start: Option<GoogleEventTime>,
    pub end: Option<GoogleEventTime>,
    pub recurring_event_id: Option<String>,
    pub event_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAttendee {
    pub id: Option<String>,
    #[serde(default)]
    pub email: String,
    pub optional: Option<bool>,
    pub organizer: Option<bool>,
    pub response_status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GooglePerson {
    pub email: Option<String>,
}

/// Either a timed (`dateTime`) or an all-day (`date`) boundary
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEventTime {
    pub date_time: Option<DateTime<Utc>>,
    pub date: Option<NaiveDate>,
}

impl GoogleEventTime {
    fn to_utc(&self) -> Option<DateTime<Utc>> {
        self.date_time
            .or_else(|| self.date.and_then(|d| d.and_hms_opt(0, 0, 0)).map(|dt| dt.and_utc()))
    }
}

fn or_placeholder(value: Option<String>) -> String {
    value.unwrap_or_else(|| MISSING_FIELD_PLACEHOLDER.to_string())
}

fn email_or_placeholder(person: Option<GooglePerson>) -> String {
    or_placeholder(person.and_then(|p| p.email))
}

fn boundary(time: Option<&GoogleEventTime>) -> DateTime<Utc> {
    time.and_then(GoogleEventTime::to_utc).unwrap_or(DateTime::UNIX_EPOCH)
}

impl GoogleEvent {
    pub fn into_event(self) -> CalendarEvent {
        let start = boundary(self.start.as_ref());
        let end = boundary(self.end.as_ref());
        CalendarEvent {
            id: self.id,
            summary: or_placeholder(self.summary),
            description: or_placeholder(self.description),
            attendees: self
                .attendees
                .unwrap_or_default()
                .into_iter()
                .map(GoogleAttendee::into_attendee)
                .collect(),
            creator: email_or_placeholder(self.creator),
            organizer: email_or_placeholder(self.organizer),
            location: or_placeholder(self.location),
            start,
            end,
            recurring_event_id: self.recurring_event_id,
            event_type: or_placeholder(self.event_type),
            status: or_placeholder(self.status),
        }
    }
}

impl GoogleAttendee {
    fn into_attendee(self) -> EventAttendee {
        EventAttendee {
            id: self.id,
            email: self.email,
            optional: self.optional.unwrap_or(false),
            organizer: self.organizer.unwrap_or(false),
            response_status: or_placeholder(self.response_status),
        }
    }
}

/// Response of the OAuth token endpoint
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
}

fn default_expires_in() -> i64 {
    3600
}

/// Claims read from the ID token payload
#[derive(Debug, Deserialize)]
pub struct IdTokenClaims {
    pub sub: String,
    pub email: Option<String>,
}

/// Body of `POST /calendars/{id}/events/watch`
#[derive(Debug, Serialize)]
pub struct WatchRequest {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub address: String,
    /// Milliseconds since the Unix epoch
    pub expiration: i64,
}

/// Response of the watch endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchResponse {
    pub id: String,
    /// Milliseconds since the Unix epoch, encoded as a string
    pub expiration: Option<String>,
}
