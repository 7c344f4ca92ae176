//! SQLite-backed vector store.
//!
//! SQLite holds chunk text and metadata; embeddings are stored as
//! little-endian f32 BLOBs and searched by brute-force cosine similarity in
//! process. Corpora here are a handful of course PDFs, so a full scan per
//! query stays fast.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::store::{ChunkMatch, StoredChunk, VectorStore};
use crate::errors::StoreError;

pub struct SqliteVectorStore {
    pool: SqlitePool,
    collection: String,
}

impl SqliteVectorStore {
    /// Open (or create) the store under `dir`, scoped to one collection.
    pub async fn open(dir: &Path, collection: &str) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir).map_err(|e| StoreError(e.to_string()))?;
        Self::with_path(dir.join("vectors.db"), collection).await
    }

    pub async fn with_path(db_path: PathBuf, collection: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await?;

        let store = Self {
            pool,
            collection: collection.to_string(),
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chunks (
                chunk_id TEXT NOT NULL,
                collection TEXT NOT NULL,
                source TEXT NOT NULL,
                chunk_index INTEGER NOT NULL,
                content TEXT NOT NULL,
                embedding BLOB NOT NULL,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now')),
                PRIMARY KEY (collection, chunk_id)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(collection, source)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        let denom = norm_a * norm_b;

        if denom <= f32::EPSILON {
            0.0
        } else {
            dot / denom
        }
    }

    fn row_to_chunk(row: &sqlx::sqlite::SqliteRow) -> StoredChunk {
        let chunk_index: i64 = row.get("chunk_index");
        StoredChunk {
            chunk_id: row.get("chunk_id"),
            text: row.get("content"),
            source: row.get("source"),
            chunk_index: chunk_index.max(0) as usize,
        }
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn insert_batch(&self, items: Vec<(StoredChunk, Vec<f32>)>) -> Result<(), StoreError> {
        if items.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for (chunk, embedding) in &items {
            let blob = Self::serialize_embedding(embedding);
            sqlx::query(
                "INSERT OR REPLACE INTO chunks
                    (chunk_id, collection, source, chunk_index, content, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(&chunk.chunk_id)
            .bind(&self.collection)
            .bind(&chunk.source)
            .bind(chunk.chunk_index as i64)
            .bind(&chunk.text)
            .bind(&blob)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn search(&self, query: &[f32], limit: usize) -> Result<Vec<ChunkMatch>, StoreError> {
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            "SELECT chunk_id, source, chunk_index, content, embedding
             FROM chunks WHERE collection = ?1",
        )
        .bind(&self.collection)
        .fetch_all(&self.pool)
        .await?;

        let mut matches: Vec<ChunkMatch> = rows
            .iter()
            .filter_map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                let embedding = Self::deserialize_embedding(&blob);
                // A dimension mismatch means the row predates an embedding
                // model change; skip it rather than score it at random.
                if embedding.len() != query.len() {
                    return None;
                }
                Some(ChunkMatch {
                    chunk: Self::row_to_chunk(row),
                    score: Self::cosine_similarity(query, &embedding),
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(limit);

        Ok(matches)
    }

    async fn delete_source(&self, source: &str) -> Result<usize, StoreError> {
        let result = sqlx::query("DELETE FROM chunks WHERE collection = ?1 AND source = ?2")
            .bind(&self.collection)
            .bind(source)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() as usize)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM chunks WHERE collection = ?1")
            .bind(&self.collection)
            .fetch_one(&self.pool)
            .await?;
        let n: i64 = row.get("n");
        Ok(n.max(0) as usize)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM chunks WHERE collection = ?1")
            .bind(&self.collection)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(source: &str, index: usize, text: &str) -> StoredChunk {
        StoredChunk {
            chunk_id: format!("{}_{}", source, index),
            text: text.to_string(),
            source: source.to_string(),
            chunk_index: index,
        }
    }

    async fn open_store(dir: &tempfile::TempDir) -> SqliteVectorStore {
        SqliteVectorStore::open(dir.path(), "test_collection")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn search_orders_by_similarity() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        store
            .insert_batch(vec![
                (chunk("bio101.pdf", 0, "osmosis is diffusion of water"), vec![1.0, 0.0, 0.0]),
                (chunk("bio101.pdf", 1, "cells have membranes"), vec![0.6, 0.8, 0.0]),
                (chunk("math.pdf", 0, "derivatives measure change"), vec![0.0, 0.0, 1.0]),
            ])
            .await
            .unwrap();

        let hits = store.search(&[1.0, 0.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk.chunk_id, "bio101.pdf_0");
        assert_eq!(hits[1].chunk.chunk_id, "bio101.pdf_1");
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn search_skips_mismatched_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        store
            .insert_batch(vec![
                (chunk("a.pdf", 0, "stale vector"), vec![1.0, 0.0]),
                (chunk("a.pdf", 1, "current vector"), vec![1.0, 0.0, 0.0]),
            ])
            .await
            .unwrap();

        let hits = store.search(&[1.0, 0.0, 0.0], 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk.chunk_id, "a.pdf_1");
    }

    #[tokio::test]
    async fn delete_source_removes_only_that_source() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        store
            .insert_batch(vec![
                (chunk("a.pdf", 0, "first"), vec![1.0, 0.0]),
                (chunk("a.pdf", 1, "second"), vec![0.0, 1.0]),
                (chunk("b.pdf", 0, "third"), vec![1.0, 1.0]),
            ])
            .await
            .unwrap();

        let removed = store.delete_source("a.pdf").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clear_empties_the_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        store
            .insert_batch(vec![(chunk("a.pdf", 0, "text"), vec![1.0])])
            .await
            .unwrap();
        store.clear().await.unwrap();

        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.search(&[1.0], 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reinsert_replaces_by_chunk_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        store
            .insert_batch(vec![(chunk("a.pdf", 0, "old"), vec![1.0])])
            .await
            .unwrap();
        store
            .insert_batch(vec![(chunk("a.pdf", 0, "new"), vec![1.0])])
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let hits = store.search(&[1.0], 1).await.unwrap();
        assert_eq!(hits[0].chunk.text, "new");
    }
}
