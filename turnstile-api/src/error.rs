use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use turnstile_core::ServiceError;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    ForbiddenError(String),
    ConflictError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ForbiddenError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::EventNotFound | ServiceError::AttendeeNotFound => {
                AppError::NotFoundError(err.to_string())
            }
            ServiceError::Validation(msg) => AppError::ValidationError(msg),
            ServiceError::CapacityExceeded => AppError::ConflictError(err.to_string()),
            ServiceError::Forbidden => AppError::ForbiddenError(err.to_string()),
            ServiceError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}
