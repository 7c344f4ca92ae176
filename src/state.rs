use std::sync::Arc;

use crate::config::Settings;
use crate::embedding::OllamaEmbedder;
use crate::llm::{GeminiBackend, OllamaBackend};
use crate::pipeline::{HybridPipeline, TcpProbe};
use crate::rag::{ContextRetriever, Ingestor, SqliteVectorStore, VectorStore};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Arc<dyn VectorStore>,
    pub pipeline: Arc<HybridPipeline>,
    pub ingestor: Arc<Ingestor>,
}

impl AppState {
    pub async fn initialize(settings: Settings) -> anyhow::Result<Arc<Self>> {
        let settings = Arc::new(settings);

        let store: Arc<dyn VectorStore> = Arc::new(
            SqliteVectorStore::open(&settings.vector_db_path, &settings.collection).await?,
        );
        let embedder = Arc::new(OllamaEmbedder::new(
            settings.ollama_url.clone(),
            settings.embedding_model.clone(),
        ));

        let retriever = Arc::new(ContextRetriever::new(
            embedder.clone(),
            store.clone(),
            settings.top_k,
        ));
        let probe = Arc::new(TcpProbe::new(
            settings.probe_addr.clone(),
            settings.probe_timeout,
        ));
        let online = Arc::new(GeminiBackend::new(
            settings.online_model.clone(),
            settings.online_api_key.clone(),
        ));
        let offline = Arc::new(OllamaBackend::new(
            settings.ollama_url.clone(),
            settings.offline_model.clone(),
        ));

        let pipeline = Arc::new(HybridPipeline::new(retriever, probe, online, offline));
        let ingestor = Arc::new(Ingestor::new(
            embedder,
            store.clone(),
            settings.knowledge_base_path.clone(),
            settings.chunk_size,
            settings.chunk_overlap,
        ));

        Ok(Arc::new(AppState {
            settings,
            store,
            pipeline,
            ingestor,
        }))
    }
}
