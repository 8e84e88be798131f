use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Routing API error: {0}")]
    RoutingApi(String),

    #[error("Elevation API error: {0}")]
    ElevationApi(String),

    #[error("Places API error: {0}")]
    PlacesApi(String),

    #[error("Language model API error: {0}")]
    LlmApi(String),

    #[error("Calibration failed: {0}")]
    Calibration(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("No acceptable routes: {0}")]
    NoCandidates(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

// Convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::RoutingApi(ref e) => {
                tracing::error!("Routing API error: {}", e);
                (StatusCode::BAD_GATEWAY, "Routing service error")
            }
            AppError::ElevationApi(ref e) => {
                tracing::error!("Elevation API error: {}", e);
                (StatusCode::BAD_GATEWAY, "Elevation service error")
            }
            AppError::PlacesApi(ref e) => {
                tracing::error!("Places API error: {}", e);
                (StatusCode::BAD_GATEWAY, "Places service error")
            }
            AppError::LlmApi(ref e) => {
                tracing::error!("Language model API error: {}", e);
                (StatusCode::BAD_GATEWAY, "Language model service error")
            }
            AppError::Calibration(ref e) => {
                tracing::warn!("Calibration failed: {}", e);
                (StatusCode::UNPROCESSABLE_ENTITY, e.as_str())
            }
            AppError::InvalidRequest(ref e) => (StatusCode::BAD_REQUEST, e.as_str()),
            AppError::NoCandidates(ref e) => {
                tracing::warn!("No acceptable routes: {}", e);
                (StatusCode::UNPROCESSABLE_ENTITY, e.as_str())
            }
            AppError::Cache(ref e) => {
                tracing::warn!("Cache error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Cache error")
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("Unknown error"),
            "message": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
