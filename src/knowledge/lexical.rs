//! In-process BM25 index over the chunk corpus
//!
//! Rebuilt on every ingest inside the single-writer critical section; the
//! index and the vector collection refer to the same chunk set once an
//! ingest quiesces.

use super::models::{Chunk, RetrievedChunk};
use std::collections::HashMap;

const K1: f32 = 1.2;
const B: f32 = 0.75;

/// Tokenize on ASCII whitespace, case-insensitive
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_ascii_whitespace()
        .map(|t| t.to_lowercase())
        .collect()
}

struct IndexedChunk {
    chunk: Chunk,
    term_freq: HashMap<String, usize>,
    len: usize,
}

/// BM25 index mapping local positions to chunks plus document-frequency stats
#[derive(Default)]
pub struct LexicalIndex {
    chunks: Vec<IndexedChunk>,
    doc_freq: HashMap<String, usize>,
    total_len: usize,
}

impl LexicalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all indexed chunks and statistics
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.doc_freq.clear();
        self.total_len = 0;
    }

    /// Append a chunk to the index
    pub fn add(&mut self, chunk: Chunk) {
        let tokens = tokenize(&chunk.text);
        let len = tokens.len();

        let mut term_freq: HashMap<String, usize> = HashMap::new();
        for token in tokens {
            *term_freq.entry(token).or_insert(0) += 1;
        }
        for term in term_freq.keys() {
            *self.doc_freq.entry(term.clone()).or_insert(0) += 1;
        }

        self.total_len += len;
        self.chunks.push(IndexedChunk {
            chunk,
            term_freq,
            len,
        });
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    fn avg_len(&self) -> f32 {
        if self.chunks.is_empty() {
            0.0
        } else {
            self.total_len as f32 / self.chunks.len() as f32
        }
    }

    fn idf(&self, term: &str) -> f32 {
        let n = self.chunks.len() as f32;
        let df = self.doc_freq.get(term).copied().unwrap_or(0) as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// Score every chunk against the query, returning the top `n` with
    /// positive score in descending order
    pub fn search(&self, query: &str, n: usize) -> Vec<RetrievedChunk> {
        let query_terms = tokenize(query);
        if query_terms.is_empty() || self.chunks.is_empty() {
            return Vec::new();
        }

        let avg_len = self.avg_len();

        let mut scored: Vec<(usize, f32)> = self
            .chunks
            .iter()
            .enumerate()
            .filter_map(|(pos, indexed)| {
                let mut score = 0.0;
                for term in &query_terms {
                    let tf = indexed.term_freq.get(term).copied().unwrap_or(0) as f32;
                    if tf == 0.0 {
                        continue;
                    }
                    let norm = tf * (K1 + 1.0)
                        / (tf + K1 * (1.0 - B + B * indexed.len as f32 / avg_len));
                    score += self.idf(term) * norm;
                }
                (score > 0.0).then_some((pos, score))
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(n);

        scored
            .into_iter()
            .map(|(pos, score)| RetrievedChunk::from_chunk(&self.chunks[pos].chunk, score))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(texts: &[&str]) -> LexicalIndex {
        let mut index = LexicalIndex::new();
        for (i, text) in texts.iter().enumerate() {
            index.add(Chunk::new(&format!("doc-{}", i), 0, text.to_string(), vec![]));
        }
        index
    }

    #[test]
    fn test_exact_terms_rank_first() {
        let index = index_of(&[
            "Our late policy: patients arriving more than 15 minutes late are rescheduled.",
            "Parking is available in the garage on 5th avenue.",
            "We accept most major insurance plans.",
        ]);

        let results = index.search("late policy", 8);
        assert!(!results.is_empty());
        assert_eq!(results[0].doc_id, "doc-0");
    }

    #[test]
    fn test_zero_score_chunks_are_dropped() {
        let index = index_of(&["parking garage", "insurance plans"]);
        let results = index.search("quantum flux", 8);
        assert!(results.is_empty());
    }

    #[test]
    fn test_rare_term_outweighs_common_term() {
        let index = index_of(&[
            "the clinic the office the desk",
            "the grace period for late arrival",
            "the waiting room has the coffee",
        ]);

        let results = index.search("the grace period", 8);
        assert_eq!(results[0].doc_id, "doc-1");
    }

    #[test]
    fn test_case_insensitive_tokens() {
        let index = index_of(&["INSURANCE accepted here"]);
        let results = index.search("insurance", 8);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_clear_resets_statistics() {
        let mut index = index_of(&["parking garage"]);
        index.clear();
        assert!(index.is_empty());
        assert!(index.search("parking", 8).is_empty());
    }

    #[test]
    fn test_top_n_truncation() {
        let texts: Vec<String> = (0..12).map(|i| format!("late policy variant {}", i)).collect();
        let refs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
        let index = index_of(&refs);

        let results = index.search("late policy", 8);
        assert_eq!(results.len(), 8);
    }
}
