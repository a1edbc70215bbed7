//! Reciprocal Rank Fusion of the lexical and dense retrieval branches

use super::models::RetrievedChunk;
use std::collections::HashMap;
use uuid::Uuid;

/// Standard RRF constant
const RRF_K: usize = 60;

struct FusionSlot {
    chunk: RetrievedChunk,
    score: f32,
    lexical_rank: Option<usize>,
}

/// Fuse two ranked candidate lists into one, scored by summed reciprocal
/// ranks. A candidate missing from a source contributes nothing for it.
/// Ties break by lexical rank (absent ranks last), then point id.
pub fn reciprocal_rank_fusion(
    lexical: Vec<RetrievedChunk>,
    dense: Vec<RetrievedChunk>,
) -> Vec<RetrievedChunk> {
    let mut slots: HashMap<Uuid, FusionSlot> = HashMap::new();

    for (rank, chunk) in lexical.into_iter().enumerate() {
        let rrf = 1.0 / (RRF_K + rank + 1) as f32;
        slots
            .entry(chunk.point_id)
            .and_modify(|slot| {
                slot.score += rrf;
                slot.lexical_rank = Some(rank);
            })
            .or_insert(FusionSlot {
                chunk,
                score: rrf,
                lexical_rank: Some(rank),
            });
    }

    for (rank, chunk) in dense.into_iter().enumerate() {
        let rrf = 1.0 / (RRF_K + rank + 1) as f32;
        slots
            .entry(chunk.point_id)
            .and_modify(|slot| slot.score += rrf)
            .or_insert(FusionSlot {
                chunk,
                score: rrf,
                lexical_rank: None,
            });
    }

    let mut fused: Vec<FusionSlot> = slots.into_values().collect();
    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                a.lexical_rank
                    .unwrap_or(usize::MAX)
                    .cmp(&b.lexical_rank.unwrap_or(usize::MAX))
            })
            .then_with(|| a.chunk.point_id.to_string().cmp(&b.chunk.point_id.to_string()))
    });

    fused
        .into_iter()
        .map(|slot| {
            let mut chunk = slot.chunk;
            chunk.score = slot.score;
            chunk
        })
        .collect()
}
