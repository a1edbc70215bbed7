//! Health checks for the backing services

use crate::embedding::EmbeddingProvider;
use crate::kv::KvStore;
use crate::vector_db::VectorStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Health status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Component health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub name: String,

    /// Health status
    pub status: HealthStatus,

    /// Optional message
    pub message: Option<String>,

    /// Response time in milliseconds
    pub response_time_ms: Option<u64>,
}

/// Overall system health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemHealth {
    /// Overall status
    pub status: HealthStatus,

    /// Uptime in seconds
    pub uptime_secs: u64,

    /// Component health checks
    pub components: Vec<ComponentHealth>,

    /// Timestamp
    pub timestamp: i64,
}

/// Cached health check result
#[derive(Debug, Clone)]
struct CachedHealth {
    result: SystemHealth,
    cached_at: Instant,
}

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Health checker with a short result cache
pub struct HealthChecker {
    start_time: Instant,
    embedding_client: Option<Arc<dyn EmbeddingProvider>>,
    vector_db: Option<Arc<dyn VectorStore>>,
    kv: Option<Arc<dyn KvStore>>,
    cached_result: Arc<RwLock<Option<CachedHealth>>>,
    cache_ttl: Duration,
}

impl HealthChecker {
    /// Create a new health checker with the default 30-second cache TTL
    pub fn new() -> Self {
        Self::with_cache_ttl(Duration::from_secs(30))
    }

    /// Create a new health checker with a custom cache TTL
    pub fn with_cache_ttl(cache_ttl: Duration) -> Self {
        Self {
            start_time: Instant::now(),
            embedding_client: None,
            vector_db: None,
            kv: None,
            cached_result: Arc::new(RwLock::new(None)),
            cache_ttl,
        }
    }

    pub fn with_embedding_client(mut self, client: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_client = Some(client);
        self
    }

    pub fn with_vector_db(mut self, vector_db: Arc<dyn VectorStore>) -> Self {
        self.vector_db = Some(vector_db);
        self
    }

    pub fn with_kv(mut self, kv: Arc<dyn KvStore>) -> Self {
        self.kv = Some(kv);
        self
    }

    /// Check overall system health, serving a cached result when fresh
    pub async fn check_health(&self) -> SystemHealth {
        {
            let cached = self.cached_result.read().await;
            if let Some(cached_health) = &*cached {
                if cached_health.cached_at.elapsed() < self.cache_ttl {
                    debug!("Returning cached health check result");
                    return cached_health.result.clone();
                }
            }
        }

        debug!("Performing fresh health check");
        let health = self.perform_health_check().await;

        {
            let mut cached = self.cached_result.write().await;
            *cached = Some(CachedHealth {
                result: health.clone(),
                cached_at: Instant::now(),
            });
        }

        health
    }

    async fn perform_health_check(&self) -> SystemHealth {
        let components = vec![
            self.check_embedding_service(),
            self.check_vector_db().await,
            self.check_kv().await,
        ];

        let status = if components.iter().all(|c| c.status == HealthStatus::Healthy) {
            HealthStatus::Healthy
        } else if components.iter().any(|c| c.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Degraded
        };

        SystemHealth {
            status,
            uptime_secs: self.start_time.elapsed().as_secs(),
            components,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    fn check_embedding_service(&self) -> ComponentHealth {
        match &self.embedding_client {
            Some(client) => {
                let dim = client.embedding_dimension();
                if dim > 0 {
                    ComponentHealth {
                        name: "embedding_service".to_string(),
                        status: HealthStatus::Healthy,
                        message: Some(format!("Service configured (dim: {})", dim)),
                        response_time_ms: Some(0),
                    }
                } else {
                    ComponentHealth {
                        name: "embedding_service".to_string(),
                        status: HealthStatus::Unhealthy,
                        message: Some("Invalid embedding dimension".to_string()),
                        response_time_ms: Some(0),
                    }
                }
            }
            None => ComponentHealth {
                name: "embedding_service".to_string(),
                status: HealthStatus::Degraded,
                message: Some("Not configured".to_string()),
                response_time_ms: None,
            },
        }
    }

    async fn check_vector_db(&self) -> ComponentHealth {
        let start = Instant::now();

        match &self.vector_db {
            Some(db) => match tokio::time::timeout(PROBE_TIMEOUT, db.count()).await {
                Ok(Ok(count)) => ComponentHealth {
                    name: "vector_database".to_string(),
                    status: HealthStatus::Healthy,
                    message: Some(format!("Collection reachable ({} points)", count)),
                    response_time_ms: Some(start.elapsed().as_millis() as u64),
                },
                Ok(Err(e)) => ComponentHealth {
                    name: "vector_database".to_string(),
                    status: HealthStatus::Unhealthy,
                    message: Some(format!("Database error: {}", e)),
                    response_time_ms: Some(start.elapsed().as_millis() as u64),
                },
                Err(_) => ComponentHealth {
                    name: "vector_database".to_string(),
                    status: HealthStatus::Unhealthy,
                    message: Some("Health check timeout".to_string()),
                    response_time_ms: Some(PROBE_TIMEOUT.as_millis() as u64),
                },
            },
            None => ComponentHealth {
                name: "vector_database".to_string(),
                status: HealthStatus::Degraded,
                message: Some("Not configured".to_string()),
                response_time_ms: None,
            },
        }
    }

    async fn check_kv(&self) -> ComponentHealth {
        let start = Instant::now();

        match &self.kv {
            Some(kv) => match tokio::time::timeout(PROBE_TIMEOUT, kv.ping()).await {
                Ok(Ok(())) => ComponentHealth {
                    name: "kv_store".to_string(),
                    status: HealthStatus::Healthy,
                    message: Some("Store reachable".to_string()),
                    response_time_ms: Some(start.elapsed().as_millis() as u64),
                },
                Ok(Err(e)) => ComponentHealth {
                    name: "kv_store".to_string(),
                    status: HealthStatus::Unhealthy,
                    message: Some(format!("Store error: {}", e)),
                    response_time_ms: Some(start.elapsed().as_millis() as u64),
                },
                Err(_) => ComponentHealth {
                    name: "kv_store".to_string(),
                    status: HealthStatus::Unhealthy,
                    message: Some("Health check timeout".to_string()),
                    response_time_ms: Some(PROBE_TIMEOUT.as_millis() as u64),
                },
            },
            None => ComponentHealth {
                name: "kv_store".to_string(),
                status: HealthStatus::Degraded,
                message: Some("Not configured".to_string()),
                response_time_ms: None,
            },
        }
    }

    /// Simple liveness check
    pub fn liveness(&self) -> bool {
        true
    }

    /// Readiness check
    pub async fn readiness(&self) -> bool {
        let health = self.check_health().await;
        health.status != HealthStatus::Unhealthy
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}
