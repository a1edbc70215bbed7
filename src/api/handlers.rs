//! API request handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::error::{FrontdeskError, ScheduleError};
use crate::knowledge::{Document, KnowledgeDao};
use crate::kv::KvStore;
use crate::observability::{HealthChecker, HealthStatus, MetricsCollector};
use crate::orchestrator::Orchestrator;
use crate::schedule::ScheduleService;
use crate::session::SessionMemory;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub dao: Arc<KnowledgeDao>,
    pub schedule: Arc<ScheduleService>,
    pub memory: Arc<SessionMemory>,
    pub kv: Arc<dyn KvStore>,
    pub health_checker: Arc<HealthChecker>,
    pub metrics: Arc<MetricsCollector>,
}

/// Chat turn request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub session_id: Option<String>,
}

/// Knowledge ingest request
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    #[serde(default)]
    pub documents: Vec<Document>,
}

/// Direct schedule tool request
#[derive(Debug, Deserialize)]
pub struct ScheduleToolRequest {
    pub patient: Option<String>,
    pub preferred_slot_iso: Option<String>,
    pub location: Option<String>,
}

/// Direct reschedule tool request
#[derive(Debug, Deserialize)]
pub struct RescheduleToolRequest {
    pub appt_id: Option<String>,
    pub new_slot_iso: Option<String>,
}

/// Generic error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

fn bad_request(message: &str) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            details: None,
        }),
    )
        .into_response()
}

fn internal_error(e: FrontdeskError) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "internal error".to_string(),
            details: Some(e.to_string()),
        }),
    )
        .into_response()
}

fn not_found(appt_id: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Appointment not found: {}", appt_id),
            details: None,
        }),
    )
        .into_response()
}

/// Handle one chat turn
pub async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> impl IntoResponse {
    let message = match req.message.as_deref().map(str::trim) {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => return bad_request("message is required"),
    };
    let session_id = req
        .session_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let start = Instant::now();
    let outcome = state.orchestrator.handle(&message, &session_id).await;

    state.metrics.record_request(start.elapsed());
    if outcome.error.is_some() {
        state.metrics.record_error();
    }

    let mut body = serde_json::to_value(&outcome).unwrap_or_else(|_| json!({}));
    body["session_id"] = json!(session_id);

    (StatusCode::OK, Json(body)).into_response()
}

/// Ingest documents into the knowledge base
pub async fn ingest_knowledge(
    State(state): State<AppState>,
    Json(req): Json<IngestRequest>,
) -> impl IntoResponse {
    if req.documents.is_empty() {
        return bad_request("documents is required");
    }
    if req.documents.iter().any(|d| d.id.is_empty() || d.text.is_empty()) {
        return bad_request("every document needs an id and text");
    }

    let document_count = req.documents.len();
    match state.dao.upsert(req.documents).await {
        Ok(chunk_count) => (
            StatusCode::OK,
            Json(json!({
                "ok": true,
                "document_count": document_count,
                "chunk_count": chunk_count,
            })),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

/// Create an appointment directly
pub async fn schedule_appointment(
    State(state): State<AppState>,
    Json(req): Json<ScheduleToolRequest>,
) -> impl IntoResponse {
    let (Some(patient), Some(slot), Some(location)) =
        (req.patient, req.preferred_slot_iso, req.location)
    else {
        return bad_request("patient, preferred_slot_iso, and location are required");
    };

    match state.schedule.create(&patient, &slot, &location).await {
        Ok(appointment) => (StatusCode::OK, Json(appointment)).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Move an appointment directly
pub async fn reschedule_appointment(
    State(state): State<AppState>,
    Json(req): Json<RescheduleToolRequest>,
) -> impl IntoResponse {
    let (Some(appt_id), Some(slot)) = (req.appt_id, req.new_slot_iso) else {
        return bad_request("appt_id and new_slot_iso are required");
    };

    match state.schedule.reschedule(&appt_id, &slot).await {
        Ok(appointment) => (StatusCode::OK, Json(appointment)).into_response(),
        Err(FrontdeskError::Schedule(ScheduleError::NotFound(_))) => not_found(&appt_id),
        Err(e) => internal_error(e),
    }
}

/// List live appointments
pub async fn list_appointments(State(state): State<AppState>) -> impl IntoResponse {
    match state.schedule.list().await {
        Ok(appointments) => (StatusCode::OK, Json(appointments)).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Fetch one appointment
pub async fn get_appointment(
    State(state): State<AppState>,
    Path(appt_id): Path<String>,
) -> impl IntoResponse {
    match state.schedule.get(&appt_id).await {
        Ok(Some(appointment)) => (StatusCode::OK, Json(appointment)).into_response(),
        Ok(None) => not_found(&appt_id),
        Err(e) => internal_error(e),
    }
}

/// Cancel one appointment
pub async fn cancel_appointment(
    State(state): State<AppState>,
    Path(appt_id): Path<String>,
) -> impl IntoResponse {
    match state.schedule.cancel(&appt_id).await {
        Ok(appointment) => (
            StatusCode::OK,
            Json(json!({"ok": true, "appointment": appointment})),
        )
            .into_response(),
        Err(FrontdeskError::Schedule(ScheduleError::NotFound(_))) => not_found(&appt_id),
        Err(e) => internal_error(e),
    }
}

/// Cancel every live appointment
pub async fn cancel_all_appointments(State(state): State<AppState>) -> impl IntoResponse {
    match state.schedule.cancel_all().await {
        Ok(cancelled) => (
            StatusCode::OK,
            Json(json!({"ok": true, "cancelled": cancelled})),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

/// Drop all cache namespaces
pub async fn clear_cache(State(state): State<AppState>) -> impl IntoResponse {
    let mut cleared = 0usize;
    for pattern in ["emb:*", "query:*", "knowledge:*"] {
        match state.kv.keys(pattern).await {
            Ok(keys) => {
                for key in keys {
                    if state.kv.del(&key).await.is_ok() {
                        cleared += 1;
                    }
                }
            }
            Err(e) => return internal_error(e),
        }
    }

    (StatusCode::OK, Json(json!({"ok": true, "cleared": cleared}))).into_response()
}

/// Drop and recreate the knowledge base
pub async fn reset_knowledge(State(state): State<AppState>) -> impl IntoResponse {
    match state.dao.reset().await {
        Ok(()) => (StatusCode::OK, Json(json!({"ok": true}))).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Health check
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let health = state.health_checker.check_health().await;
    let status_code = match health.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health)).into_response()
}

/// Service statistics
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    let metrics = state.metrics.get_metrics();
    let chunk_count = state.dao.chunk_count().await;
    let appointment_count = state
        .schedule
        .list()
        .await
        .map(|a| a.len())
        .unwrap_or(0);

    (
        StatusCode::OK,
        Json(json!({
            "metrics": metrics,
            "chunk_count": chunk_count,
            "appointment_count": appointment_count,
        })),
    )
        .into_response()
}

/// Live sessions diagnostic
pub async fn debug_sessions(State(state): State<AppState>) -> impl IntoResponse {
    let sessions = state.memory.list().await;
    let body: serde_json::Map<String, serde_json::Value> = sessions
        .into_iter()
        .map(|(id, context)| (id, serde_json::to_value(context).unwrap_or(json!(null))))
        .collect();

    (StatusCode::OK, Json(serde_json::Value::Object(body))).into_response()
}
