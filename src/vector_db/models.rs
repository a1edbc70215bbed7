//! Data models for vector database operations

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload stored alongside each chunk vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkPayload {
    /// Chunk text
    pub text: String,

    /// Parent document id
    pub doc_id: String,

    /// 0-based position within the parent document
    pub chunk_index: usize,

    /// Tags inherited from the parent document
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Point to be stored in the vector database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkPoint {
    /// Unique identifier
    pub id: Uuid,

    /// Vector embedding
    pub vector: Vec<f32>,

    /// Associated payload
    pub payload: ChunkPayload,
}

/// Search parameters
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Query vector
    pub vector: Vec<f32>,

    /// Maximum number of results
    pub limit: usize,

    /// Minimum similarity score
    pub score_threshold: Option<f32>,
}

/// Search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPoint {
    /// Point ID
    pub id: Uuid,

    /// Similarity score
    pub score: f32,

    /// Stored payload
    pub payload: ChunkPayload,
}

impl SearchParams {
    pub fn new(vector: Vec<f32>, limit: usize) -> Self {
        Self {
            vector,
            limit,
            score_threshold: None,
        }
    }

    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = Some(threshold);
        self
    }
}
