//! Offline generation backend: local Ollama server, NDJSON streaming.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use super::backend::{FragmentStream, GenerationBackend};
use super::decode::drain_complete_lines;
use super::types::ChatMessage;
use crate::errors::GenerationError;

/// Persona reinforcement sent alongside the composed prompt. The behavioral
/// contract itself lives in the prompt so both backends see it.
const TUTOR_SYSTEM_MESSAGE: &str = "You are an educational tutor who specializes in \
stimulating students' reasoning. Use analogies, examples, and guiding questions \
instead of direct answers.";

#[derive(Clone)]
pub struct OllamaBackend {
    base_url: String,
    model: String,
    client: Client,
}

impl OllamaBackend {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn stream_generate(&self, prompt: &str) -> Result<FragmentStream, GenerationError> {
        let url = format!("{}/api/chat", self.base_url);
        let messages = vec![
            ChatMessage::new("system", TUTOR_SYSTEM_MESSAGE),
            ChatMessage::new("user", prompt),
        ];
        let body = json!({
            "model": self.model,
            "messages": messages,
            "stream": true,
        });

        let res = self
            .client
            .post(&url)
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
            // NDJSON lines can split across reads, even mid-character;
            // decode only complete lines.
            let mut pending: Vec<u8> = Vec::new();
            while let Some(item) = stream.next().await {
                match item {
                    Ok(bytes) => {
                        pending.extend_from_slice(&bytes);
                        for line in drain_complete_lines(&mut pending) {
                            match parse_chat_line(&line) {
                                Ok(Some(fragment)) => {
                                    if !fragment.is_empty()
                                        && tx.send(Ok(fragment)).await.is_err()
                                    {
                                        return;
                                    }
                                }
                                Ok(None) => {}
                                Err(err) => {
                                    let _ = tx.send(Err(err)).await;
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

/// Parse one NDJSON line of an `/api/chat` stream. Returns the content
/// fragment if present; an in-band `error` field becomes a hard failure.
fn parse_chat_line(line: &str) -> Result<Option<String>, GenerationError> {
    if line.is_empty() {
        return Ok(None);
    }
    let payload: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(_) => return Ok(None),
    };
    if let Some(err) = payload["error"].as_str() {
        return Err(GenerationError::Transport(err.to_string()));
    }
    Ok(payload["message"]["content"].as_str().map(|s| s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_content_fragment() {
        let line = r#"{"model":"gemma3:1b","message":{"role":"assistant","content":"Think of"},"done":false}"#;
        assert_eq!(parse_chat_line(line).unwrap().as_deref(), Some("Think of"));
    }

    #[test]
    fn final_line_has_no_content() {
        let line = r#"{"model":"gemma3:1b","message":{"role":"assistant","content":""},"done":true}"#;
        assert_eq!(parse_chat_line(line).unwrap().as_deref(), Some(""));
    }

    #[test]
    fn inband_error_becomes_failure() {
        let line = r#"{"error":"model not found"}"#;
        assert!(parse_chat_line(line).is_err());
    }

    #[tokio::test]
    #[ignore]
    async fn live_ollama_stream() {
        let backend = OllamaBackend::new(
            "http://localhost:11434".to_string(),
            "gemma3:1b".to_string(),
        );
        let mut rx = backend.stream_generate("Say hello.").await.unwrap();
        let mut answer = String::new();
        while let Some(fragment) = rx.recv().await {
            answer.push_str(&fragment.unwrap());
        }
        assert!(!answer.is_empty());
    }
}
