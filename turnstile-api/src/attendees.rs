use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use turnstile_core::model::Attendee;
use turnstile_core::ticket;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
}

/// Attendee record plus the scan URL the client renders as a QR code.
#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub email: String,
    pub scan_token: String,
    pub scan_url: String,
    pub checked_in: bool,
    pub checked_in_at: Option<i64>,
    pub created_at: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/events/{id}/register", post(register))
        .route("/v1/attendees/{id}", get(get_attendee))
}

async fn register(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TicketResponse>), AppError> {
    let attendee = state
        .registration
        .register(event_id, &req.name, &req.email)
        .await?;
    Ok((StatusCode::CREATED, Json(ticket_response(&state, attendee))))
}

async fn get_attendee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TicketResponse>, AppError> {
    let attendee = state
        .query
        .attendee(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Attendee not found".to_string()))?;
    Ok(Json(ticket_response(&state, attendee)))
}

fn ticket_response(state: &AppState, attendee: Attendee) -> TicketResponse {
    let scan_url = ticket::scan_url(&state.base_url, attendee.event_id, &attendee.scan_token);
    TicketResponse {
        id: attendee.id,
        event_id: attendee.event_id,
        name: attendee.name,
        email: attendee.email,
        scan_token: attendee.scan_token,
        scan_url,
        checked_in: attendee.checked_in,
        checked_in_at: attendee.checked_in_at,
        created_at: attendee.created_at,
    }
}
