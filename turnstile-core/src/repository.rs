use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{Attendee, Event};

/// Result of the capacity-guarded registration insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Inserted,
    UnknownEvent,
    CapacityExceeded,
}

/// Repository trait for event records
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn insert(
        &self,
        event: &Event,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Event>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list(
        &self,
    ) -> Result<Vec<Event>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for attendee records
#[async_trait]
pub trait AttendeeRepository: Send + Sync {
    /// Unconditional insert preserving every field of the caller's record.
    /// Used by the migration loader; registration goes through
    /// `insert_within_capacity` instead.
    async fn insert(
        &self,
        attendee: &Attendee,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Capacity-guarded insert. The event lookup, the attendee count, and
    /// the insert must execute atomically in the implementation so that
    /// concurrent registrations cannot overshoot the event's capacity.
    async fn insert_within_capacity(
        &self,
        attendee: &Attendee,
    ) -> Result<RegisterOutcome, Box<dyn std::error::Error + Send + Sync>>;

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Attendee>, Box<dyn std::error::Error + Send + Sync>>;

    async fn find_by_scan_token(
        &self,
        token: &str,
    ) -> Result<Option<Attendee>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<Attendee>, Box<dyn std::error::Error + Send + Sync>>;

    async fn count_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<i64, Box<dyn std::error::Error + Send + Sync>>;

    /// Conditional transition to checked-in, guarded on the attendee not
    /// being checked in yet. Returns true when this call performed the
    /// transition, false when another call already had.
    async fn mark_checked_in(
        &self,
        id: Uuid,
        at: i64,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    async fn list(
        &self,
    ) -> Result<Vec<Attendee>, Box<dyn std::error::Error + Send + Sync>>;
}
