use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::server::handlers::{ask, health, upload};
use crate::state::AppState;

/// The full application router: health, the streaming ask endpoint, and
/// PDF upload/re-ingestion, behind permissive CORS and request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/ask-stream", post(ask::ask_stream))
        .route("/upload", post(upload::upload_files))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
