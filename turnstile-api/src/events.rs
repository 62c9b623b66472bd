use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use turnstile_core::model::{EventDetail, EventSummary};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    /// Epoch milliseconds.
    pub date: i64,
    pub capacity: i32,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: Uuid,
    pub name: String,
    pub date: i64,
    pub capacity: i32,
    pub created_at: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/events", post(create_event).get(list_events))
        .route("/v1/events/{id}", get(get_event))
        .route("/v1/events/{id}/stream", get(stream_checkins))
}

async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), AppError> {
    let event = state.events.create(&req.name, req.date, req.capacity).await?;
    Ok((
        StatusCode::CREATED,
        Json(EventResponse {
            id: event.id,
            name: event.name,
            date: event.date,
            capacity: event.capacity,
            created_at: event.created_at,
        }),
    ))
}

async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventSummary>>, AppError> {
    let events = state.query.list_events().await?;
    Ok(Json(events))
}

async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventDetail>, AppError> {
    let detail = state
        .query
        .event_with_attendees(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Event not found".to_string()))?;
    Ok(Json(detail))
}

/// Live check-in feed for one event, used by door dashboards.
async fn stream_checkins(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = state.sse_tx.subscribe();

    let stream = tokio_stream::wrappers::BroadcastStream::new(rx).filter_map(move |result| {
        async move {
            match result {
                Ok(event) if event.event_id == id => Some(Ok::<_, Infallible>(
                    SseEvent::default()
                        .event("checked_in")
                        .data(serde_json::to_string(&event).unwrap_or_default()),
                )),
                _ => None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
