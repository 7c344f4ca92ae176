use std::path::{Component, Path};
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::errors::ApiError;
use crate::state::AppState;

/// Receive PDFs into the knowledge base and re-ingest.
///
/// Ingestion runs in non-overwrite mode: each uploaded source replaces its
/// own previous chunks without disturbing the rest of the corpus.
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let dir = &state.settings.knowledge_base_path;
    std::fs::create_dir_all(dir).map_err(ApiError::internal)?;

    let mut saved = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let Some(file_name) = field.file_name().map(|n| n.to_string()) else {
            continue;
        };
        let file_name = sanitize_file_name(&file_name)
            .ok_or_else(|| ApiError::BadRequest(format!("invalid filename: {}", file_name)))?;
        if !file_name.to_lowercase().ends_with(".pdf") {
            return Err(ApiError::BadRequest(format!(
                "only PDF uploads are supported, got: {}",
                file_name
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        tokio::fs::write(dir.join(&file_name), &bytes)
            .await
            .map_err(ApiError::internal)?;
        saved.push(file_name);
    }

    if saved.is_empty() {
        return Err(ApiError::BadRequest("no PDF files in request".to_string()));
    }

    tracing::info!("uploaded files: {:?}", saved);
    let report = state
        .ingestor
        .run(false)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(json!({
        "message": format!("Saved {} file(s); knowledge base reprocessed.", saved.len()),
        "files": saved,
        "report": report,
    })))
}

/// Keep only a bare file name; reject anything carrying path components.
fn sanitize_file_name(name: &str) -> Option<String> {
    let path = Path::new(name);
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(file)), None) => Some(file.to_string_lossy().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_file_names() {
        assert_eq!(sanitize_file_name("bio101.pdf").as_deref(), Some("bio101.pdf"));
    }

    #[test]
    fn rejects_traversal_attempts() {
        assert_eq!(sanitize_file_name("../etc/passwd.pdf"), None);
        assert_eq!(sanitize_file_name("/tmp/x.pdf"), None);
        assert_eq!(sanitize_file_name("a/b.pdf"), None);
    }
}
