pub mod ingest;
pub mod retriever;
pub mod sqlite;
pub mod store;

pub use ingest::{IngestReport, Ingestor};
pub use retriever::ContextRetriever;
pub use sqlite::SqliteVectorStore;
pub use store::{ChunkMatch, StoredChunk, VectorStore};
