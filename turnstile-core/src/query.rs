use std::sync::Arc;

use uuid::Uuid;

use crate::model::{Attendee, AttendeeSummary, CheckinPreview, EventDetail, EventSummary};
use crate::repository::{AttendeeRepository, EventRepository};
use crate::{ServiceError, ServiceResult};

/// Read paths backing the event list, the event detail page, the ticket
/// page, and the pre-check-in preview.
pub struct QueryService {
    events: Arc<dyn EventRepository>,
    attendees: Arc<dyn AttendeeRepository>,
}

impl QueryService {
    pub fn new(events: Arc<dyn EventRepository>, attendees: Arc<dyn AttendeeRepository>) -> Self {
        Self { events, attendees }
    }

    /// All events with their attendee counts, computed per read.
    pub async fn list_events(&self) -> ServiceResult<Vec<EventSummary>> {
        let events = self.events.list().await.map_err(ServiceError::internal)?;

        let mut summaries = Vec::with_capacity(events.len());
        for event in events {
            let attendee_count = self
                .attendees
                .count_for_event(event.id)
                .await
                .map_err(ServiceError::internal)?;
            summaries.push(EventSummary {
                id: event.id,
                name: event.name,
                date: event.date,
                capacity: event.capacity,
                attendee_count,
            });
        }
        Ok(summaries)
    }

    /// One event with its full attendee list, or None for an unknown id.
    pub async fn event_with_attendees(
        &self,
        event_id: Uuid,
    ) -> ServiceResult<Option<EventDetail>> {
        let Some(event) = self
            .events
            .get(event_id)
            .await
            .map_err(ServiceError::internal)?
        else {
            return Ok(None);
        };

        let attendees = self
            .attendees
            .list_for_event(event_id)
            .await
            .map_err(ServiceError::internal)?;

        Ok(Some(EventDetail {
            id: event.id,
            name: event.name,
            date: event.date,
            capacity: event.capacity,
            attendees: attendees
                .into_iter()
                .map(|attendee| AttendeeSummary {
                    id: attendee.id,
                    name: attendee.name,
                    email: attendee.email,
                    checked_in: attendee.checked_in,
                    checked_in_at: attendee.checked_in_at,
                })
                .collect(),
        }))
    }

    /// Full attendee record for the ticket page.
    pub async fn attendee(&self, id: Uuid) -> ServiceResult<Option<Attendee>> {
        self.attendees.get(id).await.map_err(ServiceError::internal)
    }

    /// Pre-check-in preview for a scanned token, with the event name joined
    /// in for the door display.
    pub async fn attendee_by_token(&self, token: &str) -> ServiceResult<Option<CheckinPreview>> {
        let Some(attendee) = self
            .attendees
            .find_by_scan_token(token)
            .await
            .map_err(ServiceError::internal)?
        else {
            return Ok(None);
        };

        let event_name = self
            .events
            .get(attendee.event_id)
            .await
            .map_err(ServiceError::internal)?
            .map(|event| event.name)
            .unwrap_or_else(|| "Unknown Event".to_string());

        Ok(Some(CheckinPreview {
            id: attendee.id,
            name: attendee.name,
            email: attendee.email,
            event_id: attendee.event_id,
            event_name,
            checked_in: attendee.checked_in,
            checked_in_at: attendee.checked_in_at,
        }))
    }
}
