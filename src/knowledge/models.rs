//! Data models for the knowledge base

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ingest input: one document of the knowledge corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable document id
    pub id: String,

    /// Document text
    pub text: String,

    /// Optional tags
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A bounded slice of a document, the unit of retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Opaque unique identifier
    pub point_id: Uuid,

    /// Parent document id
    pub doc_id: String,

    /// 0-based position within the parent document
    pub chunk_index: usize,

    /// Chunk text
    pub text: String,

    /// Tags inherited from the parent document
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Chunk {
    /// Build a chunk with a deterministic point id so re-ingest upserts
    /// land on the same vector point.
    pub fn new(doc_id: &str, chunk_index: usize, text: String, tags: Vec<String>) -> Self {
        let point_id = Uuid::new_v5(
            &Uuid::NAMESPACE_OID,
            format!("{}:{}", doc_id, chunk_index).as_bytes(),
        );
        Self {
            point_id,
            doc_id: doc_id.to_string(),
            chunk_index,
            text,
            tags,
        }
    }
}

/// A chunk returned from retrieval, with its ranking score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub point_id: Uuid,
    pub doc_id: String,
    pub chunk_index: usize,
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub score: f32,
}

impl RetrievedChunk {
    pub fn from_chunk(chunk: &Chunk, score: f32) -> Self {
        Self {
            point_id: chunk.point_id,
            doc_id: chunk.doc_id.clone(),
            chunk_index: chunk.chunk_index,
            text: chunk.text.clone(),
            tags: chunk.tags.clone(),
            score,
        }
    }
}

/// Reference to a chunk used to source a reply
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    /// Source document id
    #[serde(rename = "id")]
    pub doc_id: String,

    /// Chunk index within the document
    #[serde(rename = "chunk")]
    pub chunk_index: usize,

    /// Retrieval score, rounded to 2 decimal places
    pub score: f32,

    /// 1-based position in the returned list
    #[serde(rename = "ref")]
    pub ref_: usize,
}

impl Citation {
    /// Build the citation list for an ordered set of retrieved chunks
    pub fn from_chunks(chunks: &[RetrievedChunk]) -> Vec<Citation> {
        chunks
            .iter()
            .enumerate()
            .map(|(i, c)| Citation {
                doc_id: c.doc_id.clone(),
                chunk_index: c.chunk_index,
                score: c.score,
                ref_: i + 1,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_id_is_deterministic() {
        let a = Chunk::new("pol-1", 0, "text".to_string(), vec![]);
        let b = Chunk::new("pol-1", 0, "other text".to_string(), vec![]);
        let c = Chunk::new("pol-1", 1, "text".to_string(), vec![]);

        assert_eq!(a.point_id, b.point_id);
        assert_ne!(a.point_id, c.point_id);
    }

    #[test]
    fn test_citation_wire_format() {
        let chunk = Chunk::new("pol-1", 0, "late policy".to_string(), vec![]);
        let citations = Citation::from_chunks(&[RetrievedChunk::from_chunk(&chunk, 0.42)]);

        let json = serde_json::to_value(&citations).unwrap();
        assert_eq!(json[0]["id"], "pol-1");
        assert_eq!(json[0]["chunk"], 0);
        assert_eq!(json[0]["ref"], 1);
    }
}
