//! Frontdesk Server Binary
//!
//! Entry point for running the orchestrator as a standalone server: loads
//! configuration, wires the retrieval and scheduling components, and
//! serves the HTTP API with graceful shutdown.

use frontdesk::{
    answer::AnswerExtractor,
    api::{build_router, AppState},
    config::Config,
    embedding::EmbeddingClient,
    intent::IntentClassifier,
    knowledge::KnowledgeDao,
    kv::{KvStore, MemoryKvStore, RedisKvStore},
    observability::{HealthChecker, MetricsCollector},
    orchestrator::Orchestrator,
    schedule::ScheduleService,
    session::SessionMemory,
    shutdown::shutdown_signal,
    vector_db::VectorDbClient,
};
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let config = Config::from_file_with_env(&config_path)?;

    init_tracing(&config);
    info!("Starting Frontdesk server");
    info!("Configuration loaded and validated from {}", config_path);

    let metrics = Arc::new(MetricsCollector::new());

    // KV store; degrade to an in-process store when Redis is unreachable
    let kv: Arc<dyn KvStore> = match RedisKvStore::connect(&config.kv).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("KV store unreachable ({}), using in-memory fallback", e);
            Arc::new(MemoryKvStore::new())
        }
    };

    // Embedding client with its two-tier cache
    let embedder = Arc::new(EmbeddingClient::new(config.embedding.clone(), kv.clone())?);
    info!("Embedding client initialized");

    // Vector database
    let vector_db = Arc::new(VectorDbClient::new(config.vector_db.clone()).await?);
    info!("Vector database initialized");

    // Knowledge DAO over both indices
    let dao = Arc::new(KnowledgeDao::new(
        embedder.clone(),
        vector_db.clone(),
        kv.clone(),
    ));
    dao.ensure_collection().await?;
    info!("Knowledge DAO initialized");

    // Scheduling and session memory
    let schedule = Arc::new(ScheduleService::new(kv.clone()));
    let memory = Arc::new(SessionMemory::new(kv.clone()));

    // Intent classifier: trained model when available, keyword rules otherwise
    let classifier = IntentClassifier::from_config(&config.intent);

    let orchestrator = Arc::new(
        Orchestrator::new(
            classifier,
            dao.clone(),
            AnswerExtractor::new(embedder.clone()),
            schedule.clone(),
            memory.clone(),
            kv.clone(),
        )
        .with_metrics(metrics.clone()),
    );
    info!("Orchestrator initialized");

    let health_checker = Arc::new(
        HealthChecker::new()
            .with_embedding_client(embedder)
            .with_vector_db(vector_db)
            .with_kv(kv.clone()),
    );

    let app_state = AppState {
        orchestrator,
        dao,
        schedule,
        memory,
        kv,
        health_checker,
        metrics,
    };

    let max_body_size = config.server.max_body_size_mb * 1024 * 1024;
    let app = build_router(app_state, max_body_size);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    match config.logging.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_target(false)
                .with_level(true)
                .json()
                .with_env_filter(filter)
                .init();
        }
        "compact" => {
            tracing_subscriber::fmt()
                .with_target(false)
                .with_level(true)
                .compact()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_target(false)
                .with_level(true)
                .with_env_filter(filter)
                .init();
        }
    }
}
