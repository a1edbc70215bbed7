//! KV store integration: cache, session, and appointment persistence
//!
//! All caching namespaces (§ key derivations in [`keys`]) live behind the
//! [`KvStore`] trait. Cache writes are best-effort throughout the crate:
//! a failed write is logged and swallowed, a failed read is a miss.

pub mod keys;
pub mod memory;
pub mod redis;

pub use memory::MemoryKvStore;
pub use redis::RedisKvStore;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for keyed byte storage with TTL and set primitives
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Get a value by key
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a value with a TTL in seconds
    async fn set_ex(&self, key: &str, value: String, ttl_secs: u64) -> Result<()>;

    /// Delete a key
    async fn del(&self, key: &str) -> Result<()>;

    /// Add a member to a set
    async fn sadd(&self, key: &str, member: &str) -> Result<()>;

    /// Remove a member from a set
    async fn srem(&self, key: &str, member: &str) -> Result<()>;

    /// List all members of a set
    async fn smembers(&self, key: &str) -> Result<Vec<String>>;

    /// List keys matching a glob pattern
    async fn keys(&self, pattern: &str) -> Result<Vec<String>>;

    /// Liveness probe
    async fn ping(&self) -> Result<()>;
}

/// Read a JSON value from the store, treating any failure as a miss
pub async fn get_json<T: serde::de::DeserializeOwned>(
    kv: &dyn KvStore,
    key: &str,
) -> Option<T> {
    match kv.get(key).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("KV read failed for {}: {}", key, e);
            None
        }
    }
}

/// Write a JSON value with TTL, logging and swallowing failures
pub async fn put_json<T: serde::Serialize>(
    kv: &dyn KvStore,
    key: &str,
    value: &T,
    ttl_secs: u64,
) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("Failed to serialize cache entry {}: {}", key, e);
            return;
        }
    };
    if let Err(e) = kv.set_ex(key, raw, ttl_secs).await {
        tracing::warn!("KV write failed for {}: {}", key, e);
    }
}
