// Error types for the API server

use crate::gemini::GeminiError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// API server error types
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    UnsupportedMediaType(String),
    InternalServerError(String),
    BadGateway(String),

    // Application-specific errors
    ImageProcessingError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::UnsupportedMediaType(msg) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg),
            Self::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            Self::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),

            Self::ImageProcessingError(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": {
                "status": status.as_u16(),
                "message": error_message,
            }
        }));

        (status, body).into_response()
    }
}

// Upstream model failures, surfaced with the message taxonomy the studio
// front end expects (API key / quota / network / generic).
impl From<GeminiError> for ApiError {
    fn from(error: GeminiError) -> Self {
        match error {
            GeminiError::ApiKeyMissing => {
                Self::InternalServerError("API key not configured".to_string())
            }
            GeminiError::UpstreamStatus { status: 429, .. } => {
                Self::BadGateway("API quota exceeded".to_string())
            }
            GeminiError::UpstreamStatus { status, message } => Self::BadGateway(format!(
                "Generative model returned status {}: {}",
                status, message
            )),
            GeminiError::Request(err) if err.is_connect() || err.is_timeout() => {
                Self::BadGateway("Network error - please try again".to_string())
            }
            GeminiError::Request(err) => {
                Self::BadGateway(format!("Upstream request failed: {}", err))
            }
            GeminiError::EmptyResponse => {
                Self::BadGateway("Generative model returned no candidates".to_string())
            }
        }
    }
}
