use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Failures while building retrieval context. Both variants are terminal
/// for the request: no partial context is fabricated.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("could not generate an embedding for the question")]
    EmbeddingUnavailable,
    #[error("could not retrieve context from the vector store: {0}")]
    Store(String),
}

/// Failures raised by a generation backend. When the online backend raises
/// one, the orchestrator fails over; from the offline backend it is terminal.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("backend request failed: {0}")]
    Transport(String),
    #[error("backend returned status {status}: {body}")]
    Provider { status: u16, body: String },
}

impl GenerationError {
    pub fn transport<E: std::fmt::Display>(err: E) -> Self {
        GenerationError::Transport(err.to_string())
    }
}

/// Failures from the embedding provider's HTTP interface.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    Transport(String),
    #[error("embedding provider returned status {status}: {body}")]
    Provider { status: u16, body: String },
}

impl EmbeddingError {
    pub fn transport<E: std::fmt::Display>(err: E) -> Self {
        EmbeddingError::Transport(err.to_string())
    }
}

/// Vector store failure, wrapping the underlying database error.
#[derive(Debug, Error)]
#[error("vector store error: {0}")]
pub struct StoreError(pub String);

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError(err.to_string())
    }
}

/// Error type for the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };
        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
