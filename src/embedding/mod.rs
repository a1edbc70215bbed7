//! Embedding provider integration
//!
//! Maps text to fixed-dimension vectors through an OpenAI-style embeddings
//! endpoint, with a two-tier cache in front: an in-process moka tier and
//! the shared `emb:` KV namespace behind it.

pub mod cache;
pub mod client;
pub mod models;

pub use cache::EmbeddingCache;
pub use client::EmbeddingClient;
pub use models::{EmbeddingRequest, EmbeddingResponse};

use crate::error::Result;
use async_trait::async_trait;

/// Trait for embedding providers
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed_single(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the dimension of embeddings
    fn embedding_dimension(&self) -> usize;
}
