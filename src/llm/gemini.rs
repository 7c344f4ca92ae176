//! Online generation backend: Gemini streaming over SSE.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use super::backend::{FragmentStream, GenerationBackend};
use super::decode::drain_complete_lines;
use crate::errors::GenerationError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Shown as regular answer content when no credential is configured.
/// This is a soft condition, not a failure: nothing was attempted, so the
/// orchestrator must not fail over on seeing it.
pub const MISSING_KEY_NOTICE: &str =
    "[error] Gemini API key not configured; set GOOGLE_API_KEY in the environment.";

#[derive(Clone)]
pub struct GeminiBackend {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

impl GeminiBackend {
    pub fn new(model: String, api_key: Option<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), model, api_key)
    }

    pub fn with_base_url(base_url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn stream_generate(&self, prompt: &str) -> Result<FragmentStream, GenerationError> {
        let Some(api_key) = self.api_key.clone() else {
            let (tx, rx) = mpsc::channel(1);
            let _ = tx.try_send(Ok(MISSING_KEY_NOTICE.to_string()));
            return Ok(rx);
        };

        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        );
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
        });

        let res = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(GenerationError::transport)?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(GenerationError::Provider { status, body });
        }

        let (tx, rx) = mpsc::channel(32);
        let mut stream = res.bytes_stream();

        tokio::spawn(async move {
            // SSE events can split across network reads, even mid-character;
            // bytes are buffered and decoded one complete line at a time.
            let mut pending: Vec<u8> = Vec::new();
            while let Some(item) = stream.next().await {
                match item {
                    Ok(bytes) => {
                        pending.extend_from_slice(&bytes);
                        for line in drain_complete_lines(&mut pending) {
                            if let Some(fragment) = parse_sse_line(&line) {
                                if !fragment.is_empty()
                                    && tx.send(Ok(fragment)).await.is_err()
                                {
                                    return;
                                }
                            }
                        }
                    }
                    Err(err) => {
                        let _ = tx.send(Err(GenerationError::transport(err))).await;
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }
}

/// Extract the text fragment from one SSE line, if it carries one.
fn parse_sse_line(line: &str) -> Option<String> {
    let data = line.strip_prefix("data: ")?;
    if data == "[DONE]" {
        return None;
    }
    let payload: Value = serde_json::from_str(data).ok()?;
    payload["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(|s| s.to_string())
}
