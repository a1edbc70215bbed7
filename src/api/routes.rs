//! API route configuration

use axum::{
    routing::{delete, get, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{self, AppState};

/// Build the API router with tracing and body-size limiting
pub fn build_router(app_state: AppState, max_body_size: usize) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/chat", post(handlers::chat))
        .route("/knowledge", post(handlers::ingest_knowledge))
        .route("/knowledge/reset", delete(handlers::reset_knowledge))
        .route("/tools/schedule_appointment", post(handlers::schedule_appointment))
        .route(
            "/tools/reschedule_appointment",
            post(handlers::reschedule_appointment),
        )
        .route(
            "/appointments",
            get(handlers::list_appointments).delete(handlers::cancel_all_appointments),
        )
        .route(
            "/appointments/:appt_id",
            get(handlers::get_appointment).delete(handlers::cancel_appointment),
        )
        .route("/cache/clear", delete(handlers::clear_cache))
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::stats))
        .route("/debug/sessions", get(handlers::debug_sessions))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(max_body_size)),
        )
        .with_state(app_state)
}

/// Root handler
async fn root_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "Frontdesk Orchestrator",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}
