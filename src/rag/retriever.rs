//! Context retrieval: embed the question, search the store, format the hits.

use std::sync::Arc;

use crate::embedding::EmbeddingProvider;
use crate::errors::RetrievalError;

use super::store::VectorStore;

pub struct ContextRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl ContextRetriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            top_k,
        }
    }

    /// Build the attributed context block for a question.
    ///
    /// Zero hits is not an error: the prompt instructs the tutor to say it
    /// found no clues, so generation proceeds with an empty context. An
    /// embedding or store failure is terminal for the request.
    pub async fn retrieve(&self, question: &str) -> Result<String, RetrievalError> {
        let vector = self.embedder.embed(question).await.map_err(|err| {
            tracing::error!("embedding provider failed: {}", err);
            RetrievalError::EmbeddingUnavailable
        })?;
        if vector.is_empty() {
            return Err(RetrievalError::EmbeddingUnavailable);
        }

        let hits = self
            .store
            .search(&vector, self.top_k)
            .await
            .map_err(|err| RetrievalError::Store(err.to_string()))?;

        tracing::debug!("retrieved {} context chunks", hits.len());

        let blocks: Vec<String> = hits
            .iter()
            .map(|hit| format!("[Source: {}]\n{}", hit.chunk.source, hit.chunk.text))
            .collect();
        Ok(blocks.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::errors::{EmbeddingError, StoreError};
    use crate::rag::store::{ChunkMatch, StoredChunk};

    struct FakeEmbedder {
        vector: Vec<f32>,
    }

    #[async_trait]
    impl EmbeddingProvider for FakeEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(self.vector.clone())
        }
    }

    struct FakeStore {
        hits: Vec<ChunkMatch>,
        fail: bool,
    }

    #[async_trait]
    impl VectorStore for FakeStore {
        async fn insert_batch(
            &self,
            _items: Vec<(StoredChunk, Vec<f32>)>,
        ) -> Result<(), StoreError> {
            Ok(())
        }

        async fn search(
            &self,
            _query: &[f32],
            limit: usize,
        ) -> Result<Vec<ChunkMatch>, StoreError> {
            if self.fail {
                return Err(StoreError("connection refused".to_string()));
            }
            Ok(self.hits.iter().take(limit).cloned().collect())
        }

        async fn delete_source(&self, _source: &str) -> Result<usize, StoreError> {
            Ok(0)
        }

        async fn count(&self) -> Result<usize, StoreError> {
            Ok(self.hits.len())
        }

        async fn clear(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn hit(source: &str, index: usize, text: &str, score: f32) -> ChunkMatch {
        ChunkMatch {
            chunk: StoredChunk {
                chunk_id: format!("{}_{}", source, index),
                text: text.to_string(),
                source: source.to_string(),
                chunk_index: index,
            },
            score,
        }
    }

    fn retriever(embedder: FakeEmbedder, store: FakeStore, top_k: usize) -> ContextRetriever {
        ContextRetriever::new(Arc::new(embedder), Arc::new(store), top_k)
    }

    #[tokio::test]
    async fn formats_hits_in_relevance_order() {
        let store = FakeStore {
            hits: vec![
                hit("bio101.pdf", 0, "Osmosis moves water across membranes.", 0.9),
                hit("bio101.pdf", 3, "Concentration gradients drive diffusion.", 0.7),
            ],
            fail: false,
        };
        let r = retriever(FakeEmbedder { vector: vec![1.0, 0.0] }, store, 3);

        let context = r.retrieve("What is osmosis?").await.unwrap();
        assert_eq!(
            context,
            "[Source: bio101.pdf]\nOsmosis moves water across membranes.\n\n\
             [Source: bio101.pdf]\nConcentration gradients drive diffusion."
        );
    }

    #[tokio::test]
    async fn limits_to_top_k() {
        let store = FakeStore {
            hits: vec![
                hit("a.pdf", 0, "one", 0.9),
                hit("a.pdf", 1, "two", 0.8),
                hit("a.pdf", 2, "three", 0.7),
            ],
            fail: false,
        };
        let r = retriever(FakeEmbedder { vector: vec![1.0] }, store, 2);

        let context = r.retrieve("q").await.unwrap();
        assert_eq!(context.matches("[Source: a.pdf]").count(), 2);
        assert!(!context.contains("three"));
    }

    #[tokio::test]
    async fn zero_hits_yield_empty_context() {
        let store = FakeStore { hits: vec![], fail: false };
        let r = retriever(FakeEmbedder { vector: vec![1.0] }, store, 3);

        assert_eq!(r.retrieve("q").await.unwrap(), "");
    }

    #[tokio::test]
    async fn empty_embedding_is_unavailable() {
        let store = FakeStore { hits: vec![], fail: false };
        let r = retriever(FakeEmbedder { vector: vec![] }, store, 3);

        assert!(matches!(
            r.retrieve("q").await,
            Err(RetrievalError::EmbeddingUnavailable)
        ));
    }

    #[tokio::test]
    async fn store_failure_is_terminal() {
        let store = FakeStore { hits: vec![], fail: true };
        let r = retriever(FakeEmbedder { vector: vec![1.0] }, store, 3);

        assert!(matches!(r.retrieve("q").await, Err(RetrievalError::Store(_))));
    }
}
