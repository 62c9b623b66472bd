use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::model::Event;
use crate::repository::EventRepository;
use crate::{ServiceError, ServiceResult};

/// Creates events on behalf of organizers. Events are immutable afterwards.
pub struct EventService {
    events: Arc<dyn EventRepository>,
}

impl EventService {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    /// `date` is the epoch-millisecond instant the event takes place.
    pub async fn create(&self, name: &str, date: i64, capacity: i32) -> ServiceResult<Event> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("Name is required".to_string()));
        }
        if capacity <= 0 {
            return Err(ServiceError::Validation(
                "Capacity must be positive".to_string(),
            ));
        }

        let event = Event {
            id: Uuid::new_v4(),
            name: name.to_string(),
            date,
            capacity,
            created_at: Utc::now().timestamp_millis(),
        };

        self.events
            .insert(&event)
            .await
            .map_err(ServiceError::internal)?;

        info!("Event created: {} ({})", event.name, event.id);
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn test_create_event() {
        let store = Arc::new(MemoryStore::default());
        let service = EventService::new(store.clone());

        let event = service
            .create("RustConf Afterparty", 1_760_000_000_000, 150)
            .await
            .unwrap();

        assert_eq!(event.name, "RustConf Afterparty");
        assert_eq!(event.capacity, 150);

        let stored = store.events_snapshot();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, event.id);
    }

    #[tokio::test]
    async fn test_create_event_rejects_blank_name() {
        let store = Arc::new(MemoryStore::default());
        let service = EventService::new(store);

        let err = service.create("   ", 0, 10).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_event_rejects_non_positive_capacity() {
        let store = Arc::new(MemoryStore::default());
        let service = EventService::new(store);

        let err = service.create("Meetup", 0, 0).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = service.create("Meetup", 0, -5).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
