//! Vector store interface.
//!
//! The store is populated by ingestion and read by the retriever. It is the
//! only shared mutable state between requests and is expected to be
//! internally synchronized; the pipeline takes no locks of its own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::StoreError;

/// A corpus chunk as persisted by ingestion. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Unique id, `{source}_{chunk_index}`.
    pub chunk_id: String,
    /// The chunk text.
    pub text: String,
    /// Source identifier, e.g. the PDF filename.
    pub source: String,
    /// Position of the chunk within its source.
    pub chunk_index: usize,
}

/// One similarity-search hit.
#[derive(Debug, Clone)]
pub struct ChunkMatch {
    pub chunk: StoredChunk,
    /// Cosine similarity; higher is closer.
    pub score: f32,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert chunks with their embeddings in one transaction.
    async fn insert_batch(&self, items: Vec<(StoredChunk, Vec<f32>)>) -> Result<(), StoreError>;

    /// Top `limit` chunks by similarity to the query vector, nearest first.
    /// Each hit references a distinct stored chunk.
    async fn search(&self, query: &[f32], limit: usize) -> Result<Vec<ChunkMatch>, StoreError>;

    /// Remove every chunk belonging to a source. Returns the removed count.
    async fn delete_source(&self, source: &str) -> Result<usize, StoreError>;

    /// Number of stored chunks in the collection.
    async fn count(&self) -> Result<usize, StoreError>;

    /// Drop all chunks in the collection (e.g. overwrite re-ingestion, or
    /// the embedding model changed and every vector is invalid).
    async fn clear(&self) -> Result<(), StoreError>;
}
