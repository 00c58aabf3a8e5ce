//! Calendar event types
//!
//! Everything except `id` and `status` is opaque payload to the sync engine:
//! it is carried through a merge unmodified and never inspected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::CANCELLED_EVENT_STATUS;

/// One calendar occurrence, as known locally or remotely
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// Provider-assigned identifier, stable across status changes
    pub id: String,
    pub summary: String,
    pub description: String,
    pub attendees: Vec<EventAttendee>,
    /// Creator email
    pub creator: String,
    /// Organizer email
    pub organizer: String,
    pub location: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Parent series id for expanded recurring instances
    pub recurring_event_id: Option<String>,
    pub event_type: String,
    /// Provider status ("confirmed", "tentative", "cancelled", ...)
    pub status: String,
}

impl CalendarEvent {
    /// Whether the provider marked this event as cancelled.
    ///
    /// Covers both a genuine deletion and the provider's convention of
    /// cancelling the event for its previous owner after a host change.
    pub fn is_cancelled(&self) -> bool {
        self.status == CANCELLED_EVENT_STATUS
    }
}

/// An event attendee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttendee {
    pub id: Option<String>,
    pub email: String,
    pub optional: bool,
    pub organizer: bool,
    /// "accepted", "declined", "tentative", "needsAction"
    pub response_status: String,
}
