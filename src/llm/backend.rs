use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::errors::GenerationError;

/// A fragment stream: text pieces in generation order, closed when the
/// answer is complete. An `Err` item ends the stream; it is not resumable.
pub type FragmentStream = mpsc::Receiver<Result<String, GenerationError>>;

/// One generation capability with two runtime-selected implementations
/// (online and offline). The orchestrator picks between them per request.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Backend name for logs (e.g. "gemini", "ollama").
    fn name(&self) -> &str;

    /// Start generating for the composed prompt, yielding fragments as soon
    /// as the provider produces them.
    ///
    /// An `Err` return (or an `Err` item mid-stream) is a real backend
    /// failure. A soft condition such as a missing credential is delivered
    /// in-band instead: one `Ok` diagnostic fragment, then end of stream.
    async fn stream_generate(&self, prompt: &str) -> Result<FragmentStream, GenerationError>;
}
