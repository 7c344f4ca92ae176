//! Knowledge base ingestion: PDFs in, embedded chunks out.
//!
//! Each run walks the knowledge base directory, extracts text from every
//! PDF, splits it into overlapping chunks, embeds them with the same model
//! the retriever uses, and writes the batch to the vector store. A chunk
//! whose embedding fails or comes back empty is logged and skipped; the
//! rest of the batch proceeds.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use crate::embedding::EmbeddingProvider;

use super::store::{StoredChunk, VectorStore};

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct IngestReport {
    pub files: usize,
    pub chunks_stored: usize,
    pub chunks_skipped: usize,
}

pub struct Ingestor {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    knowledge_base: PathBuf,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Ingestor {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        knowledge_base: PathBuf,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            knowledge_base,
            chunk_size,
            chunk_overlap,
        }
    }

    /// Re-ingest the whole knowledge base directory.
    ///
    /// A source's old chunks are deleted exactly once, before any of its new
    /// chunks are added, so the result does not depend on processing order.
    /// With `overwrite` the entire collection is cleared first.
    pub async fn run(&self, overwrite: bool) -> anyhow::Result<IngestReport> {
        std::fs::create_dir_all(&self.knowledge_base)
            .with_context(|| format!("creating {}", self.knowledge_base.display()))?;

        if overwrite {
            tracing::info!("clearing the collection before re-ingestion (overwrite)");
            self.store.clear().await?;
        }

        let files = list_pdfs(&self.knowledge_base)?;
        if files.is_empty() {
            tracing::warn!(
                "no PDF documents found in {}",
                self.knowledge_base.display()
            );
            return Ok(IngestReport::default());
        }

        let mut report = IngestReport {
            files: files.len(),
            ..IngestReport::default()
        };

        for path in files {
            let source = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());

            let text = match extract_pdf_text(path.clone()).await {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!("skipping {}: text extraction failed: {}", source, err);
                    continue;
                }
            };

            let chunks = split_into_chunks(&text, self.chunk_size, self.chunk_overlap);
            tracing::info!("{}: {} chunks", source, chunks.len());

            self.store.delete_source(&source).await?;

            let mut batch = Vec::with_capacity(chunks.len());
            for (idx, chunk_text) in chunks.into_iter().enumerate() {
                match self.embedder.embed(&chunk_text).await {
                    Ok(vector) if !vector.is_empty() => {
                        batch.push((
                            StoredChunk {
                                chunk_id: format!("{}_{}", source, idx),
                                text: chunk_text,
                                source: source.clone(),
                                chunk_index: idx,
                            },
                            vector,
                        ));
                    }
                    Ok(_) => {
                        tracing::warn!("no embedding for chunk {} of {}; skipping", idx, source);
                        report.chunks_skipped += 1;
                    }
                    Err(err) => {
                        tracing::warn!(
                            "embedding failed for chunk {} of {}: {}; skipping",
                            idx,
                            source,
                            err
                        );
                        report.chunks_skipped += 1;
                    }
                }
            }

            report.chunks_stored += batch.len();
            self.store.insert_batch(batch).await?;
        }

        tracing::info!(
            "ingestion finished: {} chunks stored, {} skipped across {} files",
            report.chunks_stored,
            report.chunks_skipped,
            report.files
        );
        Ok(report)
    }
}

fn list_pdfs(dir: &std::path::Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// PDF parsing is CPU-bound; keep it off the async workers.
async fn extract_pdf_text(path: PathBuf) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || {
        let bytes = std::fs::read(&path)?;
        pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| anyhow::anyhow!("{}", e))
    })
    .await?
}

/// Split text into chunks of roughly `chunk_size` characters with
/// `overlap` characters carried between consecutive chunks, preferring to
/// cut at a sentence boundary near the end of each chunk.
pub fn split_into_chunks(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let mut chunks = Vec::new();

    if total == 0 || chunk_size == 0 {
        return chunks;
    }

    let mut start = 0;

    while start < total {
        let end = (start + chunk_size).min(total);
        let window = &chars[start..end];

        let cut = if end < total {
            sentence_boundary(window).unwrap_or(window.len())
        } else {
            window.len()
        };

        let chunk: String = window[..cut].iter().collect();
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }

        if end >= total {
            break;
        }
        // The next window must begin inside the emitted chunk: advancing
        // from the cut (not a fixed stride) keeps the overlap and leaves
        // no characters uncovered when a sentence boundary cut early.
        start += cut.saturating_sub(overlap).max(1);
    }

    chunks
}

/// Index (in chars) just past the last sentence end in the final fifth of
/// the window, if there is one.
fn sentence_boundary(window: &[char]) -> Option<usize> {
    let search_start = window.len().saturating_mul(4) / 5;
    for i in (search_start..window.len().saturating_sub(1)).rev() {
        if matches!(window[i], '.' | '!' | '?') && window[i + 1].is_whitespace() {
            return Some(i + 1);
        }
    }
    None
}
