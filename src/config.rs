//! Process-wide settings, loaded once at startup from the environment.
//!
//! Every component receives the values it needs through its constructor;
//! nothing reads the environment after `Settings::from_env` returns.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_ONLINE_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_OFFLINE_MODEL: &str = "gemma3:1b";
pub const DEFAULT_COLLECTION: &str = "pbl_assistant_collection";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Model id used for both corpus and query embeddings. The two must
    /// match or stored vectors are meaningless for search.
    pub embedding_model: String,
    /// Online generation model id.
    pub online_model: String,
    /// Offline generation model id.
    pub offline_model: String,
    /// Credential for the online provider. `None` is a valid state: the
    /// online backend answers with an in-band notice instead of generating.
    pub online_api_key: Option<String>,
    /// Base URL of the local Ollama server (embeddings + offline chat).
    pub ollama_url: String,
    /// Directory holding the vector store database.
    pub vector_db_path: PathBuf,
    /// Chunk collection name within the store.
    pub collection: String,
    /// Directory of source PDFs for ingestion.
    pub knowledge_base_path: PathBuf,
    /// Number of chunks retrieved per question.
    pub top_k: usize,
    /// Connectivity probe target, `host:port`.
    pub probe_addr: String,
    pub probe_timeout: Duration,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub log_dir: PathBuf,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            online_model: DEFAULT_ONLINE_MODEL.to_string(),
            offline_model: DEFAULT_OFFLINE_MODEL.to_string(),
            online_api_key: None,
            ollama_url: "http://localhost:11434".to_string(),
            vector_db_path: PathBuf::from("./vector_db"),
            collection: DEFAULT_COLLECTION.to_string(),
            knowledge_base_path: PathBuf::from("./knowledge_base"),
            top_k: 3,
            probe_addr: "8.8.8.8:53".to_string(),
            probe_timeout: Duration::from_secs(2),
            chunk_size: 1000,
            chunk_overlap: 100,
            log_dir: PathBuf::from("./logs"),
            port: 8000,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Settings::default();
        Settings {
            embedding_model: var_or("EMBEDDING_MODEL", defaults.embedding_model),
            online_model: var_or("GEMINI_MODEL", defaults.online_model),
            offline_model: var_or("OLLAMA_MODEL", defaults.offline_model),
            online_api_key: env::var("GOOGLE_API_KEY").ok().filter(|v| !v.is_empty()),
            ollama_url: var_or("OLLAMA_URL", defaults.ollama_url),
            vector_db_path: env::var("VECTOR_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.vector_db_path),
            collection: var_or("COLLECTION_NAME", defaults.collection),
            knowledge_base_path: env::var("KNOWLEDGE_BASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.knowledge_base_path),
            top_k: parse_or("TOP_K", defaults.top_k),
            probe_addr: var_or("PROBE_ADDR", defaults.probe_addr),
            probe_timeout: Duration::from_secs(parse_or(
                "PROBE_TIMEOUT_SECS",
                defaults.probe_timeout.as_secs(),
            )),
            chunk_size: parse_or("CHUNK_SIZE", defaults.chunk_size),
            chunk_overlap: parse_or("CHUNK_OVERLAP", defaults.chunk_overlap),
            log_dir: env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            port: parse_or("PORT", defaults.port),
        }
    }
}

fn var_or(key: &str, default: String) -> String {
    env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or(default)
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
