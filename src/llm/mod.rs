pub mod backend;
mod decode;
pub mod gemini;
pub mod ollama;
pub mod types;

pub use backend::GenerationBackend;
pub use gemini::GeminiBackend;
pub use ollama::OllamaBackend;
pub use types::ChatMessage;
