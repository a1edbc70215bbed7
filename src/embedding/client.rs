//! Embedding client for an OpenAI-style embeddings endpoint

use super::{models::*, EmbeddingCache, EmbeddingProvider};
use crate::config::EmbeddingConfig;
use crate::error::{EmbeddingError, Result};
use crate::kv::KvStore;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Linear backoff step between retry attempts
const BACKOFF_STEP_MS: u64 = 250;

/// Upper bound on a single backoff pause
const BACKOFF_CAP_MS: u64 = 4_000;

/// Auth and input errors will not improve on retry
fn is_retryable(error: &EmbeddingError) -> bool {
    !matches!(
        error,
        EmbeddingError::AuthenticationFailed | EmbeddingError::InvalidInput(_)
    )
}

/// Linear backoff with a sub-step random offset so concurrent turns do
/// not retry in lockstep
fn backoff_delay(attempt: u32) -> Duration {
    let base = (u64::from(attempt) * BACKOFF_STEP_MS).min(BACKOFF_CAP_MS);
    let offset = rand::random::<u64>() % (BACKOFF_STEP_MS / 2);
    Duration::from_millis(base + offset)
}

/// Client for generating embeddings over HTTP
pub struct EmbeddingClient {
    config: EmbeddingConfig,
    http_client: Client,
    cache: EmbeddingCache,
}

impl EmbeddingClient {
    /// Create a new embedding client with a KV-backed cache
    pub fn new(config: EmbeddingConfig, kv: Arc<dyn KvStore>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(EmbeddingError::NetworkError)?;

        let cache = EmbeddingCache::new(config.cache_capacity, config.cache_ttl_secs, kv);

        info!("Initialized embedding client for {}", config.api_url);

        Ok(Self {
            config,
            http_client,
            cache,
        })
    }

    /// Fetch embeddings, retrying transient failures with backoff
    async fn request_embeddings(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse> {
        let mut attempt = 0;
        loop {
            attempt += 1;

            let error = match self.call_api(request).await {
                Ok(response) => return Ok(response),
                Err(error) => error,
            };

            if !is_retryable(&error) || attempt >= self.config.max_retries {
                warn!(
                    "Giving up on embedding call after {} attempt(s): {}",
                    attempt, error
                );
                return Err(error.into());
            }

            let pause = backoff_delay(attempt);
            debug!(
                "Embedding call attempt {}/{} failed ({}), pausing {:?}",
                attempt, self.config.max_retries, error, pause
            );
            tokio::time::sleep(pause).await;
        }
    }

    /// One API round-trip, with HTTP statuses folded into the error
    /// taxonomy
    async fn call_api(
        &self,
        request: &EmbeddingRequest,
    ) -> std::result::Result<EmbeddingResponse, EmbeddingError> {
        let response = self
            .http_client
            .post(&self.config.api_url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(EmbeddingError::NetworkError)?;

        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(EmbeddingError::NetworkError);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                EmbeddingError::AuthenticationFailed
            }
            StatusCode::TOO_MANY_REQUESTS => EmbeddingError::RateLimitExceeded,
            s if s.is_server_error() => {
                EmbeddingError::ServiceUnavailable(format!("{}: {}", s, body))
            }
            s => EmbeddingError::ApiError(format!("{}: {}", s, body)),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for EmbeddingClient {
    async fn embed_single(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(EmbeddingError::InvalidInput("Text cannot be empty".to_string()).into());
        }

        if let Some(embedding) = self.cache.get(text).await {
            return Ok(embedding);
        }

        let request = EmbeddingRequest::single(text);
        let response = self.request_embeddings(&request).await?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::ApiError("No embeddings returned".to_string()))?;

        self.cache.put(text, embedding.clone()).await;

        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        // Check the cache for every text first
        let mut results: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut uncached_indices = Vec::new();
        let mut uncached_texts = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            if let Some(embedding) = self.cache.get(text).await {
                results.push(Some(embedding));
            } else {
                results.push(None);
                uncached_indices.push(i);
                uncached_texts.push(text.clone());
            }
        }

        if !uncached_texts.is_empty() {
            debug!("Fetching {} uncached embeddings", uncached_texts.len());

            let request = EmbeddingRequest::batch(uncached_texts.clone());
            let response = self.request_embeddings(&request).await?;

            for (i, data) in response.data.into_iter().enumerate() {
                let original_index = *uncached_indices.get(i).ok_or_else(|| {
                    EmbeddingError::ApiError("More embeddings than inputs".to_string())
                })?;

                self.cache
                    .put(&uncached_texts[i], data.embedding.clone())
                    .await;
                results[original_index] = Some(data.embedding);
            }
        }

        results
            .into_iter()
            .map(|opt| {
                opt.ok_or_else(|| {
                    EmbeddingError::ApiError("Missing embedding in response".to_string()).into()
                })
            })
            .collect()
    }

    fn embedding_dimension(&self) -> usize {
        self.config.dimension
    }
}
