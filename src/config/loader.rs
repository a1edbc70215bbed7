//! Configuration loader with environment variable support

use super::Config;
use crate::error::{FrontdeskError, Result};
use config::{Environment, File};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let config = config::Config::builder()
        .add_source(File::from(path.as_ref()))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Load configuration from a TOML file with environment variable overrides
pub fn load_config_with_env<P: AsRef<Path>>(path: P) -> Result<Config> {
    let config = config::Config::builder()
        .add_source(File::from(path.as_ref()))
        .add_source(
            Environment::with_prefix("FRONTDESK")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Validate configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    if config.embedding.api_url.is_empty() {
        return Err(FrontdeskError::Config(
            "Embedding API URL is required".to_string(),
        ));
    }

    if config.embedding.dimension == 0 {
        return Err(FrontdeskError::Config(
            "Embedding dimension must be greater than 0".to_string(),
        ));
    }

    if config.vector_db.url.is_empty() {
        return Err(FrontdeskError::Config(
            "Vector database URL is required".to_string(),
        ));
    }

    if config.vector_db.vector_size != config.embedding.dimension {
        return Err(FrontdeskError::Config(format!(
            "Vector size {} does not match embedding dimension {}",
            config.vector_db.vector_size, config.embedding.dimension
        )));
    }

    if config.kv.url.is_empty() {
        return Err(FrontdeskError::Config("KV store URL is required".to_string()));
    }

    Ok(())
}
