//! Two-tier embedding cache
//!
//! A moka front tier absorbs repeated lookups within the process; the
//! `emb:` KV namespace behind it is shared across restarts and replicas.
//! Both tiers use the same TTL so the KV entry is the source of truth.

use crate::kv::{self, keys, KvStore};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Cache for embedding vectors, keyed by the `emb:` derivation
pub struct EmbeddingCache {
    local: Cache<String, Vec<f32>>,
    kv: Arc<dyn KvStore>,
    ttl_secs: u64,
}

impl EmbeddingCache {
    /// Create a cache with the given in-process capacity and TTL
    pub fn new(capacity: usize, ttl_secs: u64, kv: Arc<dyn KvStore>) -> Self {
        info!(
            "Initializing embedding cache with capacity={}, ttl={}s",
            capacity, ttl_secs
        );

        let local = Cache::builder()
            .max_capacity(capacity as u64)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            local,
            kv,
            ttl_secs,
        }
    }

    /// Look up the embedding for a text
    pub async fn get(&self, text: &str) -> Option<Vec<f32>> {
        let key = keys::embedding_key(text);

        if let Some(vector) = self.local.get(&key).await {
            debug!("Embedding cache hit (local) for {}", key);
            return Some(vector);
        }

        if let Some(vector) = kv::get_json::<Vec<f32>>(self.kv.as_ref(), &key).await {
            debug!("Embedding cache hit (kv) for {}", key);
            self.local.insert(key, vector.clone()).await;
            return Some(vector);
        }

        debug!("Embedding cache miss for {}", key);
        None
    }

    /// Store the embedding for a text in both tiers
    pub async fn put(&self, text: &str, vector: Vec<f32>) {
        let key = keys::embedding_key(text);
        self.local.insert(key.clone(), vector.clone()).await;
        kv::put_json(self.kv.as_ref(), &key, &vector, self.ttl_secs).await;
    }

    /// Number of entries in the in-process tier
    pub async fn local_size(&self) -> u64 {
        self.local.run_pending_tasks().await;
        self.local.entry_count()
    }
}
