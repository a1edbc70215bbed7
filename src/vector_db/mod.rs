//! Vector database integration with Qdrant

pub mod client;
pub mod models;

pub use client::VectorDbClient;
pub use models::{ChunkPayload, ChunkPoint, ScoredPoint, SearchParams};

use crate::error::Result;
use async_trait::async_trait;

/// Trait for ANN storage over the chunk collection
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the collection if it does not exist
    async fn ensure_collection(&self) -> Result<()>;

    /// Drop and recreate the collection
    async fn recreate_collection(&self) -> Result<()>;

    /// Upsert chunk points
    async fn upsert_points(&self, points: Vec<ChunkPoint>) -> Result<()>;

    /// Cosine search over stored chunks
    async fn search(&self, params: SearchParams) -> Result<Vec<ScoredPoint>>;

    /// Number of points in the collection
    async fn count(&self) -> Result<usize>;
}
