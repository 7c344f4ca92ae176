pub mod config;
pub mod embedding;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod rag;
pub mod server;
pub mod state;
