use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use igo_core::Error;
use serde_json::json;
use tracing::error;

/// Failure of an API request
#[derive(Debug)]
pub enum ApiError {
    Engine(Error),
    /// A blocking task panicked or was cancelled
    Task(String),
}

impl From<Error> for ApiError {
    fn from(value: Error) -> Self {
        ApiError::Engine(value)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(value: tokio::task::JoinError) -> Self {
        ApiError::Task(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Engine(Error::UnresolvableLocation(place)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Location not recognised: {place}"),
            ),
            ApiError::Engine(Error::NoPath { .. } | Error::InvalidNodeIndex(_)) => (
                StatusCode::NOT_FOUND,
                "No route found between these locations".to_string(),
            ),
            ApiError::Engine(e) => {
                error!("Request failed: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Routing is temporarily unavailable".to_string(),
                )
            }
            ApiError::Task(e) => {
                error!("Routing task failed: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Routing is temporarily unavailable".to_string(),
                )
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}
