use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::errors::StoreError;
use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let count = state.store.count().await;
    if let Err(err) = &count {
        tracing::error!("health check could not reach the vector store: {}", err);
    }
    Json(health_payload(count, &state.settings.collection))
}

/// A reachable store reports `ok` with its chunk count; a store failure is
/// reported as `degraded` rather than masked as an empty healthy corpus.
fn health_payload(count: Result<usize, StoreError>, collection: &str) -> Value {
    match count {
        Ok(chunks) => json!({
            "status": "ok",
            "collection": collection,
            "chunks": chunks,
        }),
        Err(err) => json!({
            "status": "degraded",
            "collection": collection,
            "error": err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reachable_store_reports_ok_with_count() {
        let payload = health_payload(Ok(42), "pbl_assistant_collection");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["chunks"], 42);
    }

    #[test]
    fn store_failure_reports_degraded_not_empty() {
        let payload = health_payload(Err(StoreError("disk gone".to_string())), "c");
        assert_eq!(payload["status"], "degraded");
        assert!(payload.get("chunks").is_none());
        assert!(payload["error"].as_str().unwrap().contains("disk gone"));
    }
}
