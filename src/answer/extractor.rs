//! Per-sentence rescoring against the query

use super::segmenter::segment;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::knowledge::lexical::tokenize;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, warn};

/// Weight of the semantic component
const SEMANTIC_WEIGHT: f32 = 0.7;

/// Weight of the surface-term component
const LEXICAL_WEIGHT: f32 = 0.3;

/// Fixed average sentence length for term-frequency normalization
const AVG_SENTENCE_TOKENS: f32 = 20.0;

const K1: f32 = 1.2;
const B: f32 = 0.75;

/// Cosine similarity between two vectors
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a.sqrt() * norm_b.sqrt())
    }
}

/// Normalized term-frequency contribution of the query terms in a
/// sentence: the BM25 tf factor with a fixed average length and the idf
/// factor dropped, averaged over query terms. Acts as a surface-overlap
/// tiebreaker next to the semantic score.
fn tf_overlap(query_terms: &[String], sentence: &str) -> f32 {
    if query_terms.is_empty() {
        return 0.0;
    }

    let tokens = tokenize(sentence);
    let len = tokens.len() as f32;

    let mut total = 0.0;
    for term in query_terms {
        let tf = tokens.iter().filter(|t| *t == term).count() as f32;
        if tf == 0.0 {
            continue;
        }
        total += tf * (K1 + 1.0) / (tf + K1 * (1.0 - B + B * len / AVG_SENTENCE_TOKENS));
    }

    total / query_terms.len() as f32
}

/// Extracts the single best answer sentence from a chunk
pub struct AnswerExtractor {
    embedder: Arc<dyn EmbeddingProvider>,
}

impl AnswerExtractor {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedder }
    }

    /// Return the sentence of `chunk_text` that best answers `query`.
    /// Falls back to the original chunk text when segmentation produces
    /// nothing, and to surface-term scoring when the embedding provider
    /// is unavailable.
    pub async fn extract(&self, query: &str, chunk_text: &str) -> Result<String> {
        let sentences = segment(chunk_text);

        match sentences.len() {
            0 => return Ok(chunk_text.to_string()),
            1 => return Ok(sentences.into_iter().next().unwrap_or_default()),
            _ => {}
        }

        let query_terms = tokenize(query);

        // Query and sentence embeddings go out as one concurrent batch.
        let mut futures = Vec::with_capacity(sentences.len() + 1);
        futures.push(self.embedder.embed_single(query));
        for sentence in &sentences {
            futures.push(self.embedder.embed_single(sentence));
        }

        let semantic: Option<Vec<Vec<f32>>> = match try_join_all(futures).await {
            Ok(embeddings) => Some(embeddings),
            Err(e) => {
                warn!("Sentence rescoring degraded to lexical-only: {}", e);
                None
            }
        };

        let query_vector = semantic.as_ref().map(|v| v[0].clone());

        let mut best_index = 0;
        let mut best_score = f32::NEG_INFINITY;

        for (i, sentence) in sentences.iter().enumerate() {
            let semantic_score = match (&query_vector, &semantic) {
                (Some(q), Some(vectors)) => cosine(q, &vectors[i + 1]),
                _ => 0.0,
            };
            let lexical_score = tf_overlap(&query_terms, sentence);
            let score = SEMANTIC_WEIGHT * semantic_score + LEXICAL_WEIGHT * lexical_score;

            debug!(
                "Sentence {} scored {:.4} (semantic {:.4}, lexical {:.4})",
                i, score, semantic_score, lexical_score
            );

            if score > best_score {
                best_score = score;
                best_index = i;
            }
        }

        Ok(sentences[best_index].trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        let v = vec![0.5, 0.5, 0.1];
        assert!((cosine(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        assert_eq!(cosine(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_dimension_mismatch() {
        assert_eq!(cosine(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_tf_overlap_prefers_matching_sentence() {
        let terms = tokenize("late policy");
        let on_topic = tf_overlap(&terms, "patients arriving late are covered by the policy");
        let off_topic = tf_overlap(&terms, "parking is available in the garage");

        assert!(on_topic > 0.0);
        assert_eq!(off_topic, 0.0);
    }

    #[test]
    fn test_tf_overlap_empty_query() {
        assert_eq!(tf_overlap(&[], "anything"), 0.0);
    }
}
