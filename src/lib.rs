//! Frontdesk - Retrieval-Augmented Chat Orchestrator for a Medical Front Office
//!
//! This library serves a mixed chat workload where a single turn may ask a
//! factual question, request a scheduling action, or both. Each turn is
//! classified, dispatched to the knowledge and/or scheduling subsystems
//! (in parallel for dual-intent turns), and composed into a reply with
//! citations and a structured plan trace.
//!
//! ## Features
//!
//! - **Hybrid Retrieval**: BM25 lexical search fused with dense vector search
//!   via Reciprocal Rank Fusion, diversified with MMR
//! - **Sentence-Level Answers**: per-sentence rescoring of the best chunk
//! - **Intent Routing**: trained classifier with keyword fallback
//! - **Session Memory**: per-session appointment context with TTL
//! - **Layered Caching**: embedding, query, and reply caches in the KV store
//! - **Observability**: built-in health checks and request metrics
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use frontdesk::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::from_file("config.toml")?;
//!
//!     let kv: Arc<dyn KvStore> = Arc::new(RedisKvStore::connect(&config.kv).await?);
//!     let embedder = Arc::new(EmbeddingClient::new(config.embedding.clone(), kv.clone())?);
//!     let vector_db = Arc::new(VectorDbClient::new(config.vector_db.clone()).await?);
//!
//!     let dao = Arc::new(KnowledgeDao::new(embedder.clone(), vector_db, kv.clone()));
//!     dao.ensure_collection().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod answer;
pub mod api;
pub mod config;
pub mod embedding;
pub mod entities;
pub mod error;
pub mod intent;
pub mod knowledge;
pub mod kv;
pub mod observability;
pub mod orchestrator;
pub mod schedule;
pub mod session;
pub mod shutdown;
pub mod vector_db;

pub use config::Config;
pub use error::{FrontdeskError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::answer::AnswerExtractor;
    pub use crate::config::Config;
    pub use crate::embedding::{EmbeddingClient, EmbeddingProvider};
    pub use crate::error::{FrontdeskError, Result};
    pub use crate::intent::{IntentClassifier, IntentVector};
    pub use crate::knowledge::KnowledgeDao;
    pub use crate::kv::{KvStore, MemoryKvStore, RedisKvStore};
    pub use crate::observability::{HealthChecker, MetricsCollector};
    pub use crate::orchestrator::Orchestrator;
    pub use crate::schedule::ScheduleService;
    pub use crate::session::SessionMemory;
    pub use crate::vector_db::{VectorDbClient, VectorStore};
}
