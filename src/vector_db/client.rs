//! Qdrant client implementation

use super::models::{ChunkPayload, ChunkPoint, ScoredPoint, SearchParams};
use super::VectorStore;
use crate::config::VectorDbConfig;
use crate::error::{Result, VectorDbError};
use async_trait::async_trait;
use qdrant_client::qdrant::vectors_config::Config;
use qdrant_client::qdrant::with_payload_selector::SelectorOptions;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, SearchPoints,
    UpsertPointsBuilder, Value, VectorParamsBuilder, VectorsConfig, WithPayloadSelector,
};
use qdrant_client::Qdrant;
use secrecy::ExposeSecret;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Client for the Qdrant chunk collection
pub struct VectorDbClient {
    config: VectorDbConfig,
    client: Qdrant,
}

impl VectorDbClient {
    /// Create a new vector database client
    pub async fn new(config: VectorDbConfig) -> Result<Self> {
        info!("Connecting to Qdrant at {}", config.url);

        let mut builder = Qdrant::from_url(&config.url);
        if let Some(api_key) = &config.api_key {
            builder = builder.api_key(api_key.expose_secret().to_string());
        }

        let client = builder
            .build()
            .map_err(|e| VectorDbError::ConnectionError(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn collection(&self) -> &str {
        &self.config.collection
    }

    async fn create_collection(&self) -> Result<()> {
        debug!("Creating collection: {}", self.collection());

        let vector_params =
            VectorParamsBuilder::new(self.config.vector_size as u64, Distance::Cosine).build();

        self.client
            .create_collection(
                CreateCollectionBuilder::new(self.collection()).vectors_config(VectorsConfig {
                    config: Some(Config::Params(vector_params)),
                }),
            )
            .await
            .map_err(|e| VectorDbError::ConnectionError(e.to_string()))?;

        info!("Collection created: {}", self.collection());
        Ok(())
    }

    fn to_qdrant_payload(&self, payload: &ChunkPayload) -> HashMap<String, Value> {
        let mut map = HashMap::new();

        map.insert("text".to_string(), Value::from(payload.text.clone()));
        map.insert("doc_id".to_string(), Value::from(payload.doc_id.clone()));
        map.insert(
            "chunk_index".to_string(),
            Value::from(payload.chunk_index as i64),
        );
        map.insert(
            "tags".to_string(),
            Value::from(serde_json::to_string(&payload.tags).unwrap_or_else(|_| "[]".to_string())),
        );

        map
    }

    fn parse_qdrant_payload(&self, payload: HashMap<String, Value>) -> Result<ChunkPayload> {
        use qdrant_client::qdrant::value::Kind;

        let get_string = |key: &str| -> Option<String> {
            payload.get(key).and_then(|v| v.kind.as_ref()).and_then(|kind| match kind {
                Kind::StringValue(s) => Some(s.clone()),
                _ => None,
            })
        };

        let text = get_string("text")
            .ok_or_else(|| VectorDbError::SearchError("Missing text field".to_string()))?;

        let doc_id = get_string("doc_id")
            .ok_or_else(|| VectorDbError::SearchError("Missing doc_id field".to_string()))?;

        let chunk_index = payload
            .get("chunk_index")
            .and_then(|v| v.kind.as_ref())
            .and_then(|kind| match kind {
                Kind::IntegerValue(i) => Some(*i as usize),
                _ => None,
            })
            .ok_or_else(|| VectorDbError::SearchError("Missing chunk_index field".to_string()))?;

        let tags = get_string("tags")
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();

        Ok(ChunkPayload {
            text,
            doc_id,
            chunk_index,
            tags,
        })
    }
}

#[async_trait]
impl VectorStore for VectorDbClient {
    async fn ensure_collection(&self) -> Result<()> {
        let exists = self
            .client
            .collection_info(self.collection())
            .await
            .is_ok();

        if !exists {
            self.create_collection().await?;
        } else {
            debug!("Collection already exists: {}", self.collection());
        }

        Ok(())
    }

    async fn recreate_collection(&self) -> Result<()> {
        debug!("Recreating collection: {}", self.collection());

        // Ignore a missing collection on delete; create must succeed.
        let _ = self.client.delete_collection(self.collection()).await;
        self.create_collection().await
    }

    async fn upsert_points(&self, points: Vec<ChunkPoint>) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        debug!(
            "Upserting {} points into collection: {}",
            points.len(),
            self.collection()
        );

        let qdrant_points: Vec<PointStruct> = points
            .into_iter()
            .map(|point| {
                PointStruct::new(
                    point.id.to_string(),
                    point.vector,
                    self.to_qdrant_payload(&point.payload),
                )
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(self.collection(), qdrant_points).build())
            .await
            .map_err(|e| VectorDbError::InsertError(e.to_string()))?;

        Ok(())
    }

    async fn search(&self, params: SearchParams) -> Result<Vec<ScoredPoint>> {
        debug!(
            "Searching collection {} with limit {}",
            self.collection(),
            params.limit
        );

        let search_points = SearchPoints {
            collection_name: self.collection().to_string(),
            vector: params.vector,
            limit: params.limit as u64,
            with_payload: Some(WithPayloadSelector {
                selector_options: Some(SelectorOptions::Enable(true)),
            }),
            score_threshold: params.score_threshold,
            ..Default::default()
        };

        let results = self
            .client
            .search_points(search_points)
            .await
            .map_err(|e| VectorDbError::SearchError(e.to_string()))?;

        let scored: Result<Vec<ScoredPoint>> = results
            .result
            .into_iter()
            .map(|point| {
                let id_str = point
                    .id
                    .and_then(|id| id.point_id_options)
                    .map(|opts| match opts {
                        qdrant_client::qdrant::point_id::PointIdOptions::Num(num) => {
                            num.to_string()
                        }
                        qdrant_client::qdrant::point_id::PointIdOptions::Uuid(uuid) => uuid,
                    })
                    .ok_or_else(|| VectorDbError::SearchError("Missing point id".to_string()))?;

                let id = Uuid::parse_str(&id_str)
                    .map_err(|e| VectorDbError::SearchError(format!("Invalid UUID: {}", e)))?;

                let payload = self.parse_qdrant_payload(point.payload)?;

                Ok(ScoredPoint {
                    id,
                    score: point.score,
                    payload,
                })
            })
            .collect();

        let scored = scored?;
        debug!("Found {} results", scored.len());
        Ok(scored)
    }

    async fn count(&self) -> Result<usize> {
        let response = self
            .client
            .count(CountPointsBuilder::new(self.collection()).exact(true))
            .await
            .map_err(|e| VectorDbError::SearchError(e.to_string()))?;

        Ok(response.result.map(|r| r.count as usize).unwrap_or(0))
    }
}
