//! Vector Index Module
//!
//! In-memory vector index over document chunks with cosine similarity
//! search and newline-joined context retrieval. Built once per document
//! and immutable afterwards, so concurrent readers need no locking.

use std::sync::Arc;

use thiserror::Error;

use crate::core::embedding::{EmbeddingError, EmbeddingProvider};
use crate::ingestion::chunker::Chunk;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum IndexError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("embedding service returned {got} vectors for {expected} chunks")]
    VectorCountMismatch { expected: usize, got: usize },

    #[error("invalid embedding dimensions: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("cannot build an index over zero chunks")]
    EmptyIndex,

    #[error("search requires k >= 1")]
    InvalidTopK,
}

pub type Result<T> = std::result::Result<T, IndexError>;

// ============================================================================
// Vector Index
// ============================================================================

struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// Immutable chunk/embedding index supporting nearest-neighbor retrieval.
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    provider: Arc<dyn EmbeddingProvider>,
}

impl VectorIndex {
    /// Embed every chunk in one batch call and build the index.
    ///
    /// Fails fatally if the embedding service is unreachable or returns a
    /// malformed vector set; nothing is retried here.
    pub async fn build(
        chunks: Vec<Chunk>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        if chunks.is_empty() {
            return Err(IndexError::EmptyIndex);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let vectors = provider.embed_batch(&texts).await?;

        if vectors.len() != chunks.len() {
            return Err(IndexError::VectorCountMismatch {
                expected: chunks.len(),
                got: vectors.len(),
            });
        }

        let expected = vectors[0].len();
        for vector in &vectors {
            if vector.len() != expected {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    got: vector.len(),
                });
            }
        }

        tracing::info!(
            "built vector index: {} chunks, {} dimensions",
            chunks.len(),
            expected
        );

        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry { chunk, vector })
            .collect();

        Ok(Self { entries, provider })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the `k` chunks most similar to `query`, most similar first.
    /// Ties keep original chunk order; `k` larger than the index returns
    /// every chunk.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<&Chunk>> {
        if k == 0 {
            return Err(IndexError::InvalidTopK);
        }

        let query_vector = self.provider.embed(query).await?;

        let mut scored: Vec<(f32, &Chunk)> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(&query_vector, &entry.vector), &entry.chunk))
            .collect();

        // Stable sort keeps original chunk order on equal scores
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, chunk)| chunk)
            .collect())
    }

    /// Join the top-`k` chunk texts into one newline-separated context
    /// block, similarity order preserved.
    pub async fn retrieve_context(&self, query: &str, k: usize) -> Result<String> {
        let chunks = self.search(query, k).await?;
        Ok(chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
