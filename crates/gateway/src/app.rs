//! Router setup and shared state.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use scrapeline_core::application::Producer;
use tower_http::trace::TraceLayer;

use crate::routes;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub producer: Arc<Producer>,
}

/// Build the axum router.
pub fn build_app(producer: Arc<Producer>) -> Router {
    let state = AppState { producer };

    Router::new()
        .route("/", get(routes::root_handler))
        .route("/browse", post(routes::browse_handler))
        .route("/health", get(routes::health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
