use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::model::Attendee;
use crate::repository::{AttendeeRepository, RegisterOutcome};
use crate::{ServiceError, ServiceResult};

/// Registers attendees for an event and mints their scan tokens.
///
/// Capacity is enforced by the repository's atomic conditional insert, so
/// two concurrent registrations cannot both squeeze into the last slot.
pub struct RegistrationService {
    attendees: Arc<dyn AttendeeRepository>,
}

impl RegistrationService {
    pub fn new(attendees: Arc<dyn AttendeeRepository>) -> Self {
        Self { attendees }
    }

    pub async fn register(
        &self,
        event_id: Uuid,
        name: &str,
        email: &str,
    ) -> ServiceResult<Attendee> {
        let name = validate_name(name)?;
        let email = validate_email(email)?;

        let attendee = Attendee {
            id: Uuid::new_v4(),
            event_id,
            name,
            email,
            scan_token: Uuid::new_v4().to_string(),
            checked_in: false,
            checked_in_at: None,
            created_at: Utc::now().timestamp_millis(),
        };

        let outcome = self
            .attendees
            .insert_within_capacity(&attendee)
            .await
            .map_err(ServiceError::internal)?;

        match outcome {
            RegisterOutcome::Inserted => {
                info!(
                    "Attendee {} registered for event {}",
                    attendee.id, event_id
                );
                Ok(attendee)
            }
            RegisterOutcome::UnknownEvent => Err(ServiceError::EventNotFound),
            RegisterOutcome::CapacityExceeded => Err(ServiceError::CapacityExceeded),
        }
    }
}

fn validate_name(name: &str) -> ServiceResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::Validation("Name is required".to_string()));
    }
    Ok(name.to_string())
}

fn validate_email(email: &str) -> ServiceResult<String> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(ServiceError::Validation(
            "Valid email is required".to_string(),
        ));
    }
    Ok(email.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::memory::MemoryStore;
    use crate::model::Event;
    use crate::repository::EventRepository;

    async fn seed_event(store: &MemoryStore, capacity: i32) -> Uuid {
        let event = Event {
            id: Uuid::new_v4(),
            name: "Launch Party".to_string(),
            date: 1_750_000_000_000,
            capacity,
            created_at: 1_749_000_000_000,
        };
        EventRepository::insert(store, &event).await.unwrap();
        event.id
    }

    #[tokio::test]
    async fn test_register_creates_attendee() {
        let store = Arc::new(MemoryStore::default());
        let event_id = seed_event(&store, 10).await;
        let service = RegistrationService::new(store.clone());

        let attendee = service
            .register(event_id, "Alice", "a@x.com")
            .await
            .unwrap();

        assert_eq!(attendee.event_id, event_id);
        assert!(!attendee.checked_in);
        assert!(attendee.checked_in_at.is_none());
        assert!(!attendee.scan_token.is_empty());
    }

    #[tokio::test]
    async fn test_register_unknown_event() {
        let store = Arc::new(MemoryStore::default());
        let service = RegistrationService::new(store);

        let err = service
            .register(Uuid::new_v4(), "Alice", "a@x.com")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EventNotFound));
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let store = Arc::new(MemoryStore::default());
        let event_id = seed_event(&store, 10).await;
        let service = RegistrationService::new(store);

        let err = service.register(event_id, "", "a@x.com").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = service
            .register(event_id, "Alice", "not-an-email")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = service
            .register(event_id, "Alice", "alice@nodot")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_capacity_boundary() {
        let store = Arc::new(MemoryStore::default());
        let event_id = seed_event(&store, 2).await;
        let service = RegistrationService::new(store);

        // count == capacity - 1 after the first insert; the second still fits
        service
            .register(event_id, "Alice", "a@x.com")
            .await
            .unwrap();
        service.register(event_id, "Bob", "b@x.com").await.unwrap();

        // count == capacity; the third must be rejected
        let err = service
            .register(event_id, "Carol", "c@x.com")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::CapacityExceeded));
    }

    #[tokio::test]
    async fn test_capacity_one_scenario() {
        let store = Arc::new(MemoryStore::default());
        let event_id = seed_event(&store, 1).await;
        let service = RegistrationService::new(store);

        service
            .register(event_id, "Alice", "a@x.com")
            .await
            .unwrap();
        let err = service
            .register(event_id, "Bob", "b@x.com")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::CapacityExceeded));
    }

    #[tokio::test]
    async fn test_scan_tokens_are_unique() {
        let store = Arc::new(MemoryStore::default());
        let event_id = seed_event(&store, 500).await;
        let service = RegistrationService::new(store);

        let mut tokens = HashSet::new();
        for i in 0..500 {
            let attendee = service
                .register(event_id, "Guest", &format!("guest{}@x.com", i))
                .await
                .unwrap();
            tokens.insert(attendee.scan_token);
        }
        assert_eq!(tokens.len(), 500);
    }
}
