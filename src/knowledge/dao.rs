//! Knowledge DAO: ingest and hybrid search
//!
//! `search` probes the `query:` cache, then runs the lexical and dense
//! branches concurrently, fuses with RRF, diversifies with MMR, and
//! stores the result back into the cache from a detached task. Either
//! branch failing degrades that branch to empty; the call still returns.

use super::chunker;
use super::fusion;
use super::lexical::LexicalIndex;
use super::mmr;
use super::models::{Document, RetrievedChunk};
use crate::embedding::EmbeddingProvider;
use crate::error::{Result, RetrievalError};
use crate::kv::{self, keys, KvStore};
use crate::vector_db::{ChunkPoint, SearchParams, VectorStore};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Candidates requested from each retrieval branch
const CANDIDATE_POOL: usize = 8;

/// Minimum cosine score for dense candidates
const DENSE_SCORE_CUTOFF: f32 = 0.2;

/// Default number of chunks returned by `search`
pub const DEFAULT_TOP_K: usize = 3;

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Data access object over the lexical index, vector collection, and caches
pub struct KnowledgeDao {
    embedder: Arc<dyn EmbeddingProvider>,
    vector_db: Arc<dyn VectorStore>,
    kv: Arc<dyn KvStore>,
    lexical: Arc<RwLock<LexicalIndex>>,
}

impl KnowledgeDao {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        vector_db: Arc<dyn VectorStore>,
        kv: Arc<dyn KvStore>,
    ) -> Self {
        Self {
            embedder,
            vector_db,
            kv,
            lexical: Arc::new(RwLock::new(LexicalIndex::new())),
        }
    }

    /// Create the vector collection if missing
    pub async fn ensure_collection(&self) -> Result<()> {
        self.vector_db.ensure_collection().await
    }

    /// Number of chunks in the lexical index
    pub async fn chunk_count(&self) -> usize {
        self.lexical.read().await.len()
    }

    /// Hybrid search returning up to `k` diversity-selected chunks.
    /// Deterministic for a fixed corpus and caches.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        let cache_key = keys::query_key(query);

        if let Some(cached) = kv::get_json::<Vec<RetrievedChunk>>(self.kv.as_ref(), &cache_key).await
        {
            debug!("Query cache hit for {:?}", query);
            return Ok(cached);
        }

        let (lexical_results, dense_results) =
            tokio::join!(self.lexical_branch(query), self.dense_branch(query));

        let mut fused = fusion::reciprocal_rank_fusion(lexical_results, dense_results);
        fused.truncate(CANDIDATE_POOL);

        let mut selected = mmr::select(fused, k);
        for chunk in &mut selected {
            chunk.score = round2(chunk.score);
        }

        // Best-effort cache store off the request path.
        let kv = self.kv.clone();
        let to_cache = selected.clone();
        tokio::spawn(async move {
            kv::put_json(kv.as_ref(), &cache_key, &to_cache, keys::QUERY_TTL_SECS).await;
        });

        Ok(selected)
    }

    /// BM25 over the in-process index
    async fn lexical_branch(&self, query: &str) -> Vec<RetrievedChunk> {
        self.lexical.read().await.search(query, CANDIDATE_POOL)
    }

    /// Embed the query and run ANN search; failures degrade to empty
    async fn dense_branch(&self, query: &str) -> Vec<RetrievedChunk> {
        let vector = match self.embedder.embed_single(query).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!("Dense branch degraded, embedding failed: {}", e);
                return Vec::new();
            }
        };

        let params = SearchParams::new(vector, CANDIDATE_POOL)
            .with_score_threshold(DENSE_SCORE_CUTOFF);

        match self.vector_db.search(params).await {
            Ok(points) => points
                .into_iter()
                .map(|p| RetrievedChunk {
                    point_id: p.id,
                    doc_id: p.payload.doc_id,
                    chunk_index: p.payload.chunk_index,
                    text: p.payload.text,
                    tags: p.payload.tags,
                    score: p.score,
                })
                .collect(),
            Err(e) => {
                warn!("Dense branch degraded, vector search failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Ingest documents: chunk, embed, upsert to the vector collection,
    /// and rebuild the lexical index. The index write lock is held for
    /// the whole ingest, so searches block until it completes. Not
    /// transactional across the two indices: a partial failure leaves
    /// them inconsistent and the caller must retry or reset.
    pub async fn upsert(&self, documents: Vec<Document>) -> Result<usize> {
        let mut index = self.lexical.write().await;
        index.clear();

        let mut total_chunks = 0;

        for document in &documents {
            let chunks = chunker::split_document(document);
            if chunks.is_empty() {
                continue;
            }

            let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await.map_err(|e| {
                RetrievalError::IngestError(format!(
                    "embedding failed for document {}: {}",
                    document.id, e
                ))
            })?;

            let points: Vec<ChunkPoint> = chunks
                .iter()
                .zip(embeddings)
                .map(|(chunk, vector)| ChunkPoint {
                    id: chunk.point_id,
                    vector,
                    payload: crate::vector_db::ChunkPayload {
                        text: chunk.text.clone(),
                        doc_id: chunk.doc_id.clone(),
                        chunk_index: chunk.chunk_index,
                        tags: chunk.tags.clone(),
                    },
                })
                .collect();

            self.vector_db.upsert_points(points).await.map_err(|e| {
                RetrievalError::IngestError(format!(
                    "vector upsert failed for document {}: {}",
                    document.id, e
                ))
            })?;

            total_chunks += chunks.len();
            for chunk in chunks {
                index.add(chunk);
            }
        }

        info!(
            "Ingested {} documents into {} chunks",
            documents.len(),
            total_chunks
        );
        Ok(total_chunks)
    }

    /// Drop and recreate the vector collection and clear the lexical
    /// index. Query and knowledge cache entries are left to expire on
    /// their TTLs.
    pub async fn reset(&self) -> Result<()> {
        let mut index = self.lexical.write().await;
        self.vector_db.recreate_collection().await?;
        index.clear();
        info!("Knowledge base reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.016_393), 0.02);
        assert_eq!(round2(0.014_9), 0.01);
        assert_eq!(round2(1.0), 1.0);
    }
}
