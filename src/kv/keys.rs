//! Cache key derivations for every KV namespace
//!
//! The `emb:` and `knowledge:` keys truncate the base64 form at 100
//! characters. Long inputs sharing a 75-byte prefix therefore collapse to
//! one entry; externally warmed caches depend on this width, so it must
//! not change.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Truncation width for `emb:` and `knowledge:` keys, in base64 characters
const TRUNCATED_KEY_WIDTH: usize = 100;

/// TTLs per namespace, in seconds
pub const EMBEDDING_TTL_SECS: u64 = 3600;
pub const QUERY_TTL_SECS: u64 = 30;
pub const KNOWLEDGE_TTL_SECS: u64 = 600;
pub const SESSION_TTL_SECS: u64 = 1800;
pub const APPOINTMENT_TTL_SECS: u64 = 604_800;

/// Set of all live appointment ids
pub const APPOINTMENTS_SET_KEY: &str = "appts:all";

fn truncated_b64(text: &str) -> String {
    let mut encoded = STANDARD.encode(text.as_bytes());
    encoded.truncate(TRUNCATED_KEY_WIDTH);
    encoded
}

/// `emb:` namespace, embedding vectors, keyed by truncated base64 of the text
pub fn embedding_key(text: &str) -> String {
    format!("emb:{}", truncated_b64(text))
}

/// `query:` namespace, retrieval results, keyed by the full base64 of the query
pub fn query_key(query: &str) -> String {
    format!("query:{}", STANDARD.encode(query.as_bytes()))
}

/// `knowledge:` namespace, composed replies, keyed by truncated base64 of the message
pub fn knowledge_key(message: &str) -> String {
    format!("knowledge:{}", truncated_b64(message))
}

/// `memory:` namespace, session context, keyed by session id
pub fn session_key(session_id: &str) -> String {
    format!("memory:{}", session_id)
}

/// `appt:` namespace, appointment records, keyed by appointment id
pub fn appointment_key(appt_id: &str) -> String {
    format!("appt:{}", appt_id)
}
