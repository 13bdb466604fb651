//! Request handlers.
//!
//! All decisions live in the Producer; handlers translate between HTTP and
//! core types.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::app::AppState;
use crate::error::GatewayError;

#[derive(Debug, Deserialize)]
pub struct BrowseRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct BrowseResponse {
    pub message: String,
    pub url: String,
}

/// Accept a URL and enqueue it for scraping.
pub async fn browse_handler(
    State(state): State<AppState>,
    Json(request): Json<BrowseRequest>,
) -> Result<Json<BrowseResponse>, GatewayError> {
    info!(url = %request.url, "Submission received");
    let accepted = state.producer.submit(&request.url).await?;
    Ok(Json(BrowseResponse {
        message: "Job queued".to_string(),
        url: accepted.url,
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Broker reachability probe: opens and closes a connection.
///
/// Returns 200 when the broker answers, 503 otherwise.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.producer.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                service: "gateway".to_string(),
                error: None,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy".to_string(),
                service: "gateway".to_string(),
                error: Some(e.to_string()),
            }),
        ),
    }
}

/// Service description.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "service": "scrapeline-gateway",
        "version": scrapeline_core::VERSION,
        "endpoints": {
            "POST /browse": "Submit a URL for scraping",
            "GET /health": "Broker reachability probe",
        },
    }))
}
