use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::repository::AttendeeRepository;
use crate::{ServiceError, ServiceResult};

/// Attendee fields surfaced to door staff after a scan.
#[derive(Debug, Clone, Serialize)]
pub struct CheckedInAttendee {
    pub name: String,
    pub email: String,
    pub checked_in_at: Option<i64>,
}

/// Outcome of a successful scan.
#[derive(Debug, Clone, Serialize)]
pub struct CheckIn {
    pub attendee_id: Uuid,
    pub event_id: Uuid,
    pub already_checked_in: bool,
    pub attendee: CheckedInAttendee,
}

/// Published on the broadcast channel for every first-time check-in, so
/// event dashboards can update without polling.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AttendeeCheckedIn {
    pub event_id: Uuid,
    pub attendee_id: Uuid,
    pub name: String,
    pub checked_in_at: i64,
}

/// Marks attendance. The transition is one-way: once checked in, an attendee
/// stays checked in, and repeat scans report the original timestamp.
pub struct CheckInService {
    attendees: Arc<dyn AttendeeRepository>,
}

impl CheckInService {
    pub fn new(attendees: Arc<dyn AttendeeRepository>) -> Self {
        Self { attendees }
    }

    /// Checks in the attendee holding `token`. When `scope` is given, a token
    /// registered to a different event is rejected.
    pub async fn check_in(&self, token: &str, scope: Option<Uuid>) -> ServiceResult<CheckIn> {
        let attendee = self
            .attendees
            .find_by_scan_token(token)
            .await
            .map_err(ServiceError::internal)?
            .ok_or(ServiceError::AttendeeNotFound)?;

        if let Some(event_id) = scope {
            if attendee.event_id != event_id {
                return Err(ServiceError::Forbidden);
            }
        }

        if attendee.checked_in {
            return Ok(CheckIn {
                attendee_id: attendee.id,
                event_id: attendee.event_id,
                already_checked_in: true,
                attendee: CheckedInAttendee {
                    name: attendee.name,
                    email: attendee.email,
                    checked_in_at: attendee.checked_in_at,
                },
            });
        }

        let now = Utc::now().timestamp_millis();
        let transitioned = self
            .attendees
            .mark_checked_in(attendee.id, now)
            .await
            .map_err(ServiceError::internal)?;

        if transitioned {
            info!("Attendee {} checked in", attendee.id);
            return Ok(CheckIn {
                attendee_id: attendee.id,
                event_id: attendee.event_id,
                already_checked_in: false,
                attendee: CheckedInAttendee {
                    name: attendee.name,
                    email: attendee.email,
                    checked_in_at: Some(now),
                },
            });
        }

        // A concurrent scan won the conditional update between our read and
        // the write; report the recorded timestamp, not ours.
        let current = self
            .attendees
            .get(attendee.id)
            .await
            .map_err(ServiceError::internal)?
            .ok_or(ServiceError::AttendeeNotFound)?;

        Ok(CheckIn {
            attendee_id: current.id,
            event_id: current.event_id,
            already_checked_in: true,
            attendee: CheckedInAttendee {
                name: current.name,
                email: current.email,
                checked_in_at: current.checked_in_at,
            },
        })
    }
}
