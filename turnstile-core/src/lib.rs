pub mod checkin;
pub mod events;
pub mod memory;
pub mod model;
pub mod query;
pub mod registration;
pub mod repository;
pub mod ticket;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Event not found")]
    EventNotFound,
    #[error("Attendee not found")]
    AttendeeNotFound,
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Event is at full capacity")]
    CapacityExceeded,
    #[error("Attendee is not registered for this event")]
    Forbidden,
    #[error("Internal service error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Wraps a store failure; the detail only surfaces in server-side logs.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        ServiceError::Internal(err.to_string())
    }
}
