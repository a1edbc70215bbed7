//! Maximal Marginal Relevance selection over fused candidates

use super::models::RetrievedChunk;
use std::collections::HashSet;

/// Relevance/diversity trade-off
const LAMBDA: f32 = 0.5;

/// Jaccard similarity over lowercased whitespace-tokenized word sets
pub fn jaccard(a: &str, b: &str) -> f32 {
    let set_a: HashSet<String> = a.split_whitespace().map(|t| t.to_lowercase()).collect();
    let set_b: HashSet<String> = b.split_whitespace().map(|t| t.to_lowercase()).collect();

    if set_a.is_empty() && set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count() as f32;
    let union = set_a.union(&set_b).count() as f32;
    intersection / union
}

/// Greedily pick `k` candidates, seeding with the top-ranked one and then
/// maximizing `λ·rel − (1−λ)·max_sim` against the already-selected set.
/// Candidates must arrive in fused-score order.
pub fn select(candidates: Vec<RetrievedChunk>, k: usize) -> Vec<RetrievedChunk> {
    if candidates.len() <= 1 || k <= 1 {
        let mut selected = candidates;
        selected.truncate(k);
        return selected;
    }

    let mut remaining = candidates;
    let mut selected = vec![remaining.remove(0)];

    while selected.len() < k && !remaining.is_empty() {
        let mut best_index = 0;
        let mut best_score = f32::NEG_INFINITY;

        for (i, candidate) in remaining.iter().enumerate() {
            let max_sim = selected
                .iter()
                .map(|s| jaccard(&candidate.text, &s.text))
                .fold(0.0, f32::max);
            let mmr = LAMBDA * candidate.score - (1.0 - LAMBDA) * max_sim;

            if mmr > best_score {
                best_score = mmr;
                best_index = i;
            }
        }

        selected.push(remaining.remove(best_index));
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::models::Chunk;

    fn candidate(doc: &str, text: &str, score: f32) -> RetrievedChunk {
        let chunk = Chunk::new(doc, 0, text.to_string(), vec![]);
        RetrievedChunk::from_chunk(&chunk, score)
    }

    #[test]
    fn test_jaccard_identical() {
        assert!((jaccard("late policy rules", "late policy rules") - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_jaccard_disjoint() {
        assert_eq!(jaccard("parking garage", "insurance plans"), 0.0);
    }

    #[test]
    fn test_jaccard_case_insensitive() {
        assert!((jaccard("Late Policy", "late policy") - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_seeds_with_top_candidate() {
        let selected = select(
            vec![
                candidate("a", "late policy details", 0.9),
                candidate("b", "parking garage info", 0.8),
            ],
            2,
        );
        assert_eq!(selected[0].doc_id, "a");
    }

    #[test]
    fn test_prefers_diverse_over_near_duplicate() {
        let selected = select(
            vec![
                candidate("a", "patients arriving late are rescheduled", 0.0164),
                candidate("b", "patients arriving late are rescheduled promptly", 0.0161),
                candidate("c", "parking is available in the garage", 0.0159),
            ],
            2,
        );

        assert_eq!(selected[0].doc_id, "a");
        // b is a near-duplicate of a; the diversity term pushes c ahead.
        assert_eq!(selected[1].doc_id, "c");
    }

    #[test]
    fn test_truncates_to_k() {
        let selected = select(
            vec![
                candidate("a", "one", 0.3),
                candidate("b", "two", 0.2),
                candidate("c", "three", 0.1),
            ],
            2,
        );
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(select(Vec::new(), 3).is_empty());
    }
}
