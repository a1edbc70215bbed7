//! Deterministic in-process doubles for the external services
//!
//! The embedding double projects bag-of-words token hashes into a fixed
//! dimension, so texts sharing vocabulary land close in cosine space; the
//! vector store double is a brute-force cosine scan. Together they make
//! the full retrieval pipeline runnable without any network.

use async_trait::async_trait;
use frontdesk::answer::AnswerExtractor;
use frontdesk::embedding::EmbeddingProvider;
use frontdesk::error::{EmbeddingError, Result};
use frontdesk::intent::{IntentClassifier, NgramModel};
use frontdesk::knowledge::KnowledgeDao;
use frontdesk::kv::{KvStore, MemoryKvStore};
use frontdesk::orchestrator::Orchestrator;
use frontdesk::schedule::ScheduleService;
use frontdesk::session::SessionMemory;
use frontdesk::vector_db::{ChunkPoint, ScoredPoint, SearchParams, VectorStore};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::RwLock;

pub const STUB_DIMENSION: usize = 64;

/// Deterministic bag-of-words embedding double
pub struct StubEmbedder;

fn embed_text(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; STUB_DIMENSION];
    for token in text.to_lowercase().split_whitespace() {
        let token: String = token.chars().filter(|c| c.is_alphanumeric()).collect();
        if token.is_empty() {
            continue;
        }
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        vector[(hasher.finish() % STUB_DIMENSION as u64) as usize] += 1.0;
    }

    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut vector {
            *x /= norm;
        }
    }
    vector
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed_single(&self, text: &str) -> Result<Vec<f32>> {
        Ok(embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| embed_text(t)).collect())
    }

    fn embedding_dimension(&self) -> usize {
        STUB_DIMENSION
    }
}

/// Embedding double that always fails, for degraded-path tests
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed_single(&self, _text: &str) -> Result<Vec<f32>> {
        Err(EmbeddingError::ServiceUnavailable("stubbed outage".to_string()).into())
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(EmbeddingError::ServiceUnavailable("stubbed outage".to_string()).into())
    }

    fn embedding_dimension(&self) -> usize {
        STUB_DIMENSION
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Brute-force in-memory vector store double
#[derive(Default)]
pub struct StubVectorStore {
    points: RwLock<Vec<ChunkPoint>>,
}

impl StubVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for StubVectorStore {
    async fn ensure_collection(&self) -> Result<()> {
        Ok(())
    }

    async fn recreate_collection(&self) -> Result<()> {
        self.points.write().await.clear();
        Ok(())
    }

    async fn upsert_points(&self, new_points: Vec<ChunkPoint>) -> Result<()> {
        let mut points = self.points.write().await;
        for point in new_points {
            points.retain(|p| p.id != point.id);
            points.push(point);
        }
        Ok(())
    }

    async fn search(&self, params: SearchParams) -> Result<Vec<ScoredPoint>> {
        let points = self.points.read().await;
        let mut scored: Vec<ScoredPoint> = points
            .iter()
            .map(|p| ScoredPoint {
                id: p.id,
                score: cosine(&params.vector, &p.vector),
                payload: p.payload.clone(),
            })
            .filter(|p| params.score_threshold.map(|t| p.score >= t).unwrap_or(true))
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(params.limit);
        Ok(scored)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.points.read().await.len())
    }
}

/// A fully wired in-process stack over the doubles
pub struct TestStack {
    pub kv: Arc<dyn KvStore>,
    pub dao: Arc<KnowledgeDao>,
    pub schedule: Arc<ScheduleService>,
    pub memory: Arc<SessionMemory>,
    pub orchestrator: Orchestrator,
}

pub fn intent_classifier() -> IntentClassifier {
    let model_path = format!("{}/model/intent_model.json", env!("CARGO_MANIFEST_DIR"));
    let model = NgramModel::load(&model_path).expect("test model blob should load");
    IntentClassifier::new(Box::new(model))
}

pub fn build_stack() -> TestStack {
    build_stack_with_embedder(Arc::new(StubEmbedder))
}

pub fn build_stack_with_embedder(embedder: Arc<dyn EmbeddingProvider>) -> TestStack {
    let kv: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
    let vector_db: Arc<dyn VectorStore> = Arc::new(StubVectorStore::new());

    let dao = Arc::new(KnowledgeDao::new(
        embedder.clone(),
        vector_db,
        kv.clone(),
    ));
    let schedule = Arc::new(ScheduleService::new(kv.clone()));
    let memory = Arc::new(SessionMemory::new(kv.clone()));

    let orchestrator = Orchestrator::new(
        intent_classifier(),
        dao.clone(),
        AnswerExtractor::new(embedder),
        schedule.clone(),
        memory.clone(),
        kv.clone(),
    );

    TestStack {
        kv,
        dao,
        schedule,
        memory,
        orchestrator,
    }
}
