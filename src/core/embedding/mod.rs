//! Embedding Provider Module
//!
//! Defines the EmbeddingProvider trait used to turn chunk and query text
//! into fixed-dimension vectors.

pub mod openai;

pub use openai::OpenAIEmbeddings;

use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, EmbeddingError>;

// ============================================================================
// Embedding Provider Trait
// ============================================================================

/// Trait for embedding providers
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts (batch)
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions
    fn dimensions(&self) -> usize;

    /// Get provider name
    fn name(&self) -> &str;
}
