use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use turnstile_core::checkin::{AttendeeCheckedIn, CheckedInAttendee};
use turnstile_core::model::CheckinPreview;
use turnstile_core::ServiceError;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub token: String,
    /// When set, a token registered to a different event is rejected.
    pub event_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
struct CheckInSuccess {
    success: bool,
    already_checked_in: bool,
    attendee: CheckedInAttendee,
}

#[derive(Debug, Serialize)]
struct CheckInFailure {
    success: bool,
    error: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/checkin", post(check_in))
        .route("/v1/checkin/{token}", get(get_attendee))
}

/// Scan results are part of the response contract, not HTTP errors: an
/// unknown or wrong-event token comes back as `{"success": false, ...}` so
/// the scanner UI can render it inline. Store failures still surface as 500.
async fn check_in(
    State(state): State<AppState>,
    Json(req): Json<CheckInRequest>,
) -> Result<Response, AppError> {
    match state.checkin.check_in(&req.token, req.event_id).await {
        Ok(result) => {
            if !result.already_checked_in {
                let _ = state.sse_tx.send(AttendeeCheckedIn {
                    event_id: result.event_id,
                    attendee_id: result.attendee_id,
                    name: result.attendee.name.clone(),
                    checked_in_at: result.attendee.checked_in_at.unwrap_or_default(),
                });
            }
            Ok(Json(CheckInSuccess {
                success: true,
                already_checked_in: result.already_checked_in,
                attendee: result.attendee,
            })
            .into_response())
        }
        Err(err @ (ServiceError::AttendeeNotFound | ServiceError::Forbidden)) => {
            Ok(Json(CheckInFailure {
                success: false,
                error: err.to_string(),
            })
            .into_response())
        }
        Err(err) => Err(err.into()),
    }
}

async fn get_attendee(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<CheckinPreview>, AppError> {
    let preview = state
        .query
        .attendee_by_token(&token)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Attendee not found".to_string()))?;
    Ok(Json(preview))
}
