use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod attendees;
pub mod checkin;
pub mod error;
pub mod events;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .merge(events::routes())
        .merge(attendees::routes())
        .merge(checkin::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
