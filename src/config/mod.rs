//! Configuration management for the frontdesk orchestrator

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod loader;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub embedding: EmbeddingConfig,
    pub vector_db: VectorDbConfig,
    #[serde(default)]
    pub kv: KvConfig,
    #[serde(default)]
    pub intent: IntentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host
    #[serde(default = "default_server_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size")]
    pub max_body_size_mb: usize,
}

/// Configuration for the embedding provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embeddings API endpoint URL
    pub api_url: String,

    /// API authentication key (secured)
    #[serde(serialize_with = "serialize_secret", deserialize_with = "deserialize_secret")]
    pub api_key: Secret<String>,

    /// Embedding dimension; the vector collection is created to match
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// In-process cache capacity (entries)
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Embedding cache TTL in seconds (in-process and KV tiers)
    #[serde(default = "default_embedding_cache_ttl")]
    pub cache_ttl_secs: u64,
}

/// Configuration for the Qdrant vector database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorDbConfig {
    /// Qdrant server URL
    pub url: String,

    /// API key (optional, secured)
    #[serde(
        default,
        serialize_with = "serialize_optional_secret",
        deserialize_with = "deserialize_optional_secret"
    )]
    pub api_key: Option<Secret<String>>,

    /// Collection name
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Vector dimension
    #[serde(default = "default_dimension")]
    pub vector_size: usize,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Configuration for the KV store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvConfig {
    /// Redis connection URL
    #[serde(default = "default_kv_url")]
    pub url: String,
}

/// Configuration for the intent classifier
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IntentConfig {
    /// Path to the trained model blob; keyword rules are used when absent
    pub model_path: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json, compact, or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_server_host() -> String {
    "0.0.0.0".to_string()
}
fn default_server_port() -> u16 {
    3002
}
fn default_max_body_size() -> usize {
    10
}
fn default_dimension() -> usize {
    512
}
fn default_timeout() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}
fn default_cache_capacity() -> usize {
    10_000
}
fn default_embedding_cache_ttl() -> u64 {
    3600
}
fn default_collection() -> String {
    "clinic_knowledge".to_string()
}
fn default_kv_url() -> String {
    "redis://localhost:6379".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            max_body_size_mb: default_max_body_size(),
        }
    }
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            url: default_kv_url(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        loader::load_config(path)
    }

    /// Load configuration with environment variable overrides
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        loader::load_config_with_env(path)
    }

    /// Validate this configuration
    pub fn validate(&self) -> crate::error::Result<()> {
        loader::validate_config(self)
    }

    /// Create default configuration for local development and tests
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            embedding: EmbeddingConfig {
                api_url: "https://api.openai.com/v1/embeddings".to_string(),
                api_key: Secret::new(std::env::var("EMBEDDING_API_KEY").unwrap_or_default()),
                dimension: default_dimension(),
                timeout_secs: default_timeout(),
                max_retries: default_max_retries(),
                cache_capacity: default_cache_capacity(),
                cache_ttl_secs: default_embedding_cache_ttl(),
            },
            vector_db: VectorDbConfig {
                url: "http://localhost:6334".to_string(),
                api_key: None,
                collection: default_collection(),
                vector_size: default_dimension(),
                timeout_secs: default_timeout(),
            },
            kv: KvConfig::default(),
            intent: IntentConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Custom serializer for Secret<String>
fn serialize_secret<S>(secret: &Secret<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(secret.expose_secret())
}

/// Custom deserializer for Secret<String>
fn deserialize_secret<'de, D>(deserializer: D) -> Result<Secret<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(Secret::new(s))
}

/// Custom serializer for Option<Secret<String>>
fn serialize_optional_secret<S>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}

/// Custom deserializer for Option<Secret<String>>
fn deserialize_optional_secret<'de, D>(deserializer: D) -> Result<Option<Secret<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.map(Secret::new))
}
