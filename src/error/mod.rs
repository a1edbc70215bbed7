//! Error types for the frontdesk orchestrator

use thiserror::Error;

/// Result type alias for frontdesk operations
pub type Result<T> = std::result::Result<T, FrontdeskError>;

/// Main error type for the frontdesk orchestrator
#[derive(Error, Debug)]
pub enum FrontdeskError {
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Vector database error: {0}")]
    VectorDb(#[from] VectorDbError),

    #[error("KV store error: {0}")]
    Kv(#[from] KvError),

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Intent model error: {0}")]
    Intent(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors related to embedding generation
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Errors related to vector database operations
#[derive(Error, Debug)]
pub enum VectorDbError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Search error: {0}")]
    SearchError(String),

    #[error("Insert error: {0}")]
    InsertError(String),

    #[error("Delete error: {0}")]
    DeleteError(String),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },
}

/// Errors related to the KV store
#[derive(Error, Debug)]
pub enum KvError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Command error: {0}")]
    CommandError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<redis::RedisError> for KvError {
    fn from(err: redis::RedisError) -> Self {
        KvError::CommandError(err.to_string())
    }
}

/// Errors related to the retrieval pipeline
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Ingest failed: {0}")]
    IngestError(String),

    #[error("Search failed: {0}")]
    SearchError(String),

    #[error("Extraction failed: {0}")]
    ExtractionError(String),
}

/// Errors related to appointment scheduling
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Appointment not found: {0}")]
    NotFound(String),

    #[error("Invalid slot: {0}")]
    InvalidSlot(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<config::ConfigError> for FrontdeskError {
    fn from(err: config::ConfigError) -> Self {
        FrontdeskError::Config(err.to_string())
    }
}
