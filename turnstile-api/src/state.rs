use std::sync::Arc;

use tokio::sync::broadcast;

use turnstile_core::checkin::{AttendeeCheckedIn, CheckInService};
use turnstile_core::events::EventService;
use turnstile_core::query::QueryService;
use turnstile_core::registration::RegistrationService;
use turnstile_core::repository::{AttendeeRepository, EventRepository};

#[derive(Clone)]
pub struct AppState {
    pub events: Arc<EventService>,
    pub registration: Arc<RegistrationService>,
    pub checkin: Arc<CheckInService>,
    pub query: Arc<QueryService>,
    pub sse_tx: broadcast::Sender<AttendeeCheckedIn>,
    pub base_url: String,
}

impl AppState {
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        attendee_repo: Arc<dyn AttendeeRepository>,
        base_url: String,
    ) -> Self {
        let (sse_tx, _) = broadcast::channel(100);
        Self {
            events: Arc::new(EventService::new(event_repo.clone())),
            registration: Arc::new(RegistrationService::new(attendee_repo.clone())),
            checkin: Arc::new(CheckInService::new(attendee_repo.clone())),
            query: Arc::new(QueryService::new(event_repo, attendee_repo)),
            sse_tx,
            base_url,
        }
    }
}
