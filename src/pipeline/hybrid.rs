//! The hybrid orchestrator: one failure-tolerant streaming answer per
//! question.
//!
//! Stages run strictly in order: embed, retrieve, compose, route, generate.
//! Generation is the only long stage and it streams; a failover-eligible
//! online failure switches to the offline backend mid-stream with the same
//! composed prompt. Fragments already delivered stand, so the visible
//! answer can be a composite of both backends — continuity over purity.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::errors::{GenerationError, RetrievalError};
use crate::llm::GenerationBackend;
use crate::rag::ContextRetriever;

use super::probe::ConnectivityProbe;
use super::prompt::build_tutor_prompt;
use super::window::window_history;
use super::Turn;

pub struct HybridPipeline {
    retriever: Arc<ContextRetriever>,
    probe: Arc<dyn ConnectivityProbe>,
    online: Arc<dyn GenerationBackend>,
    offline: Arc<dyn GenerationBackend>,
}

enum StreamOutcome {
    /// The backend stream ended normally.
    Completed,
    /// The consumer dropped the receiver; stop producing.
    Disconnected,
    /// The backend raised a failure before or during streaming.
    Failed(GenerationError),
}

impl HybridPipeline {
    pub fn new(
        retriever: Arc<ContextRetriever>,
        probe: Arc<dyn ConnectivityProbe>,
        online: Arc<dyn GenerationBackend>,
        offline: Arc<dyn GenerationBackend>,
    ) -> Self {
        Self {
            retriever,
            probe,
            online,
            offline,
        }
    }

    /// Answer a question as a stream of text fragments.
    ///
    /// The stream always ends with either real content or one diagnostic
    /// fragment; never a half-delivered ambiguous state. The caller owns
    /// the history and is responsible for appending the accumulated answer
    /// once the stream closes. Dropping the receiver cancels generation.
    pub fn respond(&self, question: String, history: Vec<Turn>) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(32);

        let retriever = Arc::clone(&self.retriever);
        let probe = Arc::clone(&self.probe);
        let online = Arc::clone(&self.online);
        let offline = Arc::clone(&self.offline);

        tokio::spawn(async move {
            let context = match retriever.retrieve(&question).await {
                Ok(context) => context,
                Err(err) => {
                    // Embed/retrieve failures are systemic: fail fast, no
                    // answer fabricated from missing context.
                    match &err {
                        RetrievalError::EmbeddingUnavailable => {
                            tracing::error!("embedding unavailable for question")
                        }
                        RetrievalError::Store(detail) => {
                            tracing::error!("vector store failure: {}", detail)
                        }
                    }
                    let _ = tx.send(format!("[error] {}.", err)).await;
                    return;
                }
            };

            let history_text = window_history(&history);
            let prompt = build_tutor_prompt(&question, &context, &history_text);

            // Fresh probe per request; connectivity flaps.
            if probe.is_online().await {
                tracing::info!("routing to online backend ({})", online.name());
                match stream_backend(&tx, online.as_ref(), &prompt).await {
                    StreamOutcome::Completed | StreamOutcome::Disconnected => return,
                    StreamOutcome::Failed(err) => {
                        tracing::warn!(
                            "{} failed: {}; failing over to {}",
                            online.name(),
                            err,
                            offline.name()
                        );
                    }
                }
            } else {
                tracing::info!("offline; routing to {}", offline.name());
            }

            // No further fallback tier exists below the offline backend.
            if let StreamOutcome::Failed(err) = stream_backend(&tx, offline.as_ref(), &prompt).await
            {
                tracing::error!("{} failed: {}", offline.name(), err);
                let _ = tx
                    .send(format!("[error] offline model failed: {}.", err))
                    .await;
            }
        });

        rx
    }
}

/// Forward one backend's fragment stream into the pipeline output.
async fn stream_backend(
    tx: &mpsc::Sender<String>,
    backend: &dyn GenerationBackend,
    prompt: &str,
) -> StreamOutcome {
    let mut stream = match backend.stream_generate(prompt).await {
        Ok(stream) => stream,
        Err(err) => return StreamOutcome::Failed(err),
    };

    while let Some(item) = stream.recv().await {
        match item {
            Ok(fragment) => {
                if fragment.is_empty() {
                    continue;
                }
                if tx.send(fragment).await.is_err() {
                    return StreamOutcome::Disconnected;
                }
            }
            Err(err) => return StreamOutcome::Failed(err),
        }
    }

    StreamOutcome::Completed
}
