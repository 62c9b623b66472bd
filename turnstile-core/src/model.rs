use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A capacity-bounded occasion attendees register for.
///
/// Events are immutable once created; there are no update or delete paths.
/// Instants are epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub date: i64,
    pub capacity: i32,
    pub created_at: i64,
}

/// A person registered to one event, tracked for check-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendee {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub email: String,
    /// Opaque unique credential encoded in the attendee's QR code. The sole
    /// public check-in credential; raw attendee ids are never accepted.
    pub scan_token: String,
    pub checked_in: bool,
    /// Set exactly once, the first time `checked_in` transitions to true.
    pub checked_in_at: Option<i64>,
    pub created_at: i64,
}

/// Event listing row: event fields plus the attendee count computed at read
/// time. There is no denormalized counter.
#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    pub id: Uuid,
    pub name: String,
    pub date: i64,
    pub capacity: i32,
    pub attendee_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendeeSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub checked_in: bool,
    pub checked_in_at: Option<i64>,
}

/// An event with its full attendee list embedded.
#[derive(Debug, Clone, Serialize)]
pub struct EventDetail {
    pub id: Uuid,
    pub name: String,
    pub date: i64,
    pub capacity: i32,
    pub attendees: Vec<AttendeeSummary>,
}

/// Pre-check-in preview shown to door staff after a scan.
#[derive(Debug, Clone, Serialize)]
pub struct CheckinPreview {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub event_id: Uuid,
    pub event_name: String,
    pub checked_in: bool,
    pub checked_in_at: Option<i64>,
}
