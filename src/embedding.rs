//! Embedding provider interface and the Ollama-backed implementation.
//!
//! The same model serves ingestion and query time; mixing models would put
//! query vectors in a different space than the stored corpus.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::errors::EmbeddingError;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text. An empty vector means the provider produced no
    /// embedding for this input; callers decide whether that is fatal.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

#[derive(Clone)]
pub struct OllamaEmbedder {
    base_url: String,
    model: String,
    client: Client,
}

impl OllamaEmbedder {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}/api/embeddings", self.base_url);
        let body = json!({
            "model": self.model,
            "prompt": text,
        });

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(EmbeddingError::transport)?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(EmbeddingError::Provider { status, body });
        }

        let payload: Value = res.json().await.map_err(EmbeddingError::transport)?;
        let vector = payload["embedding"]
            .as_array()
            .map(|vals| {
                vals.iter()
                    .filter_map(|v| v.as_f64().map(|f| f as f32))
                    .collect()
            })
            .unwrap_or_default();

        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore]
    async fn live_ollama_embedding() {
        let embedder = OllamaEmbedder::new(
            "http://localhost:11434".to_string(),
            "nomic-embed-text".to_string(),
        );
        let vector = embedder.embed("What is osmosis?").await.unwrap();
        assert!(!vector.is_empty());
    }
}
