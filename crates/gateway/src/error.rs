//! Maps producer rejections to HTTP responses with stable reason codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use scrapeline_core::application::SubmitError;
use serde_json::json;

/// Reason codes surfaced in rejection bodies.
pub mod reason {
    pub const INVALID_DOMAIN: &str = "invalid-domain";
    pub const QUEUE_UNAVAILABLE: &str = "queue-unavailable";
}

/// Wrapper so producer rejections convert into HTTP responses via `?`.
#[derive(Debug)]
pub struct GatewayError(pub SubmitError);

impl From<SubmitError> for GatewayError {
    fn from(err: SubmitError) -> Self {
        Self(err)
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, reason) = match &self.0 {
            SubmitError::InvalidDomain { .. } => {
                (StatusCode::BAD_REQUEST, reason::INVALID_DOMAIN)
            }
            SubmitError::QueueUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, reason::QUEUE_UNAVAILABLE)
            }
        };
        let body = Json(json!({
            "error": reason,
            "detail": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
