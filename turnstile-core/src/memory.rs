use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{Attendee, Event};
use crate::repository::{AttendeeRepository, EventRepository, RegisterOutcome};

/// In-memory store implementing both repository traits.
///
/// Backs the test suites and the migration pipeline's dry runs; the Postgres
/// store in `turnstile-store` is the production implementation. Records keep
/// insertion order, which doubles as created-at order everywhere it matters.
#[derive(Default)]
pub struct MemoryStore {
    events: RwLock<Vec<Event>>,
    attendees: RwLock<Vec<Attendee>>,
}

impl MemoryStore {
    pub fn events_snapshot(&self) -> Vec<Event> {
        self.read_events().clone()
    }

    pub fn attendees_snapshot(&self) -> Vec<Attendee> {
        self.read_attendees().clone()
    }

    fn read_events(&self) -> RwLockReadGuard<'_, Vec<Event>> {
        self.events.read().expect("events lock poisoned")
    }

    fn read_attendees(&self) -> RwLockReadGuard<'_, Vec<Attendee>> {
        self.attendees.read().expect("attendees lock poisoned")
    }

    fn write_attendees(&self) -> RwLockWriteGuard<'_, Vec<Attendee>> {
        self.attendees.write().expect("attendees lock poisoned")
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn insert(
        &self,
        event: &Event,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.events
            .write()
            .expect("events lock poisoned")
            .push(event.clone());
        Ok(())
    }

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Event>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.read_events().iter().find(|e| e.id == id).cloned())
    }

    async fn list(
        &self,
    ) -> Result<Vec<Event>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.read_events().clone())
    }
}

#[async_trait]
impl AttendeeRepository for MemoryStore {
    async fn insert(
        &self,
        attendee: &Attendee,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.write_attendees().push(attendee.clone());
        Ok(())
    }

    async fn insert_within_capacity(
        &self,
        attendee: &Attendee,
    ) -> Result<RegisterOutcome, Box<dyn std::error::Error + Send + Sync>> {
        // Lock order is events then attendees, here and everywhere else.
        let events = self.read_events();
        let Some(event) = events.iter().find(|e| e.id == attendee.event_id) else {
            return Ok(RegisterOutcome::UnknownEvent);
        };

        let mut attendees = self.write_attendees();
        let count = attendees
            .iter()
            .filter(|a| a.event_id == attendee.event_id)
            .count();
        if count as i64 >= event.capacity as i64 {
            return Ok(RegisterOutcome::CapacityExceeded);
        }

        attendees.push(attendee.clone());
        Ok(RegisterOutcome::Inserted)
    }

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Attendee>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.read_attendees().iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_scan_token(
        &self,
        token: &str,
    ) -> Result<Option<Attendee>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .read_attendees()
            .iter()
            .find(|a| a.scan_token == token)
            .cloned())
    }

    async fn list_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<Attendee>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .read_attendees()
            .iter()
            .filter(|a| a.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn count_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .read_attendees()
            .iter()
            .filter(|a| a.event_id == event_id)
            .count() as i64)
    }

    async fn mark_checked_in(
        &self,
        id: Uuid,
        at: i64,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut attendees = self.write_attendees();
        match attendees.iter_mut().find(|a| a.id == id) {
            Some(attendee) if !attendee.checked_in => {
                attendee.checked_in = true;
                attendee.checked_in_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list(
        &self,
    ) -> Result<Vec<Attendee>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.read_attendees().clone())
    }
}
