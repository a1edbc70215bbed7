//! Per-session conversation memory
//!
//! Holds the last appointment touched by a session so follow-up turns
//! ("Make it 11:00") can resolve without restating the patient. Entries
//! live in the `memory:` namespace for 30 minutes past the last write;
//! concurrent writes to one session are last-writer-wins, which is
//! acceptable for single-user sessions.

use crate::kv::{self, keys, KvStore};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Context the session carries across turns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionContext {
    pub last_appt: Option<LastAppointment>,
}

/// The appointment most recently created or moved in a session.
/// `appt_id` is a lookup key, not ownership: the appointment may be
/// cancelled while the session still names it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastAppointment {
    pub patient: String,
    pub slot_iso: String,
    pub location: String,
    pub appt_id: String,
    pub timestamp: i64,
}

/// Session memory over the KV store
pub struct SessionMemory {
    kv: Arc<dyn KvStore>,
}

impl SessionMemory {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Read the context for a session; a missing or failed read is empty
    pub async fn get(&self, session_id: &str) -> SessionContext {
        kv::get_json(self.kv.as_ref(), &keys::session_key(session_id))
            .await
            .unwrap_or_default()
    }

    /// Record the last appointment for a session, refreshing the TTL
    pub async fn remember_appointment(
        &self,
        session_id: &str,
        patient: &str,
        slot_iso: &str,
        location: &str,
        appt_id: &str,
    ) {
        let context = SessionContext {
            last_appt: Some(LastAppointment {
                patient: patient.to_string(),
                slot_iso: slot_iso.to_string(),
                location: location.to_string(),
                appt_id: appt_id.to_string(),
                timestamp: Utc::now().timestamp(),
            }),
        };

        debug!("Writing session context for {}", session_id);
        kv::put_json(
            self.kv.as_ref(),
            &keys::session_key(session_id),
            &context,
            keys::SESSION_TTL_SECS,
        )
        .await;
    }

    /// List all live sessions with their contexts, for diagnostics
    pub async fn list(&self) -> Vec<(String, SessionContext)> {
        let keys = match self.kv.keys("memory:*").await {
            Ok(keys) => keys,
            Err(_) => return Vec::new(),
        };

        let mut sessions = Vec::new();
        for key in keys {
            if let Some(context) = kv::get_json::<SessionContext>(self.kv.as_ref(), &key).await {
                let session_id = key.trim_start_matches("memory:").to_string();
                sessions.push((session_id, context));
            }
        }
        sessions
    }
}
