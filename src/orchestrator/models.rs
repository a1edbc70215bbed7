//! Turn envelope models and reply templates

use crate::knowledge::Citation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fixed plan step names
pub const STEP_INTENT_DETECTION: &str = "intent_detection";
pub const STEP_EXTRACT_ENTITIES: &str = "extract_entities";
pub const STEP_EXTRACT_TIME: &str = "extract_time";
pub const STEP_SCHEDULE: &str = "schedule_appointment";
pub const STEP_RESCHEDULE: &str = "reschedule_appointment";
pub const STEP_RETRIEVE_KNOWLEDGE: &str = "retrieve_knowledge";

/// One structured trace record per orchestrator stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    pub step: String,

    #[serde(flatten)]
    pub detail: serde_json::Map<String, Value>,

    pub latency_ms: u64,
}

impl PlanStep {
    pub fn new(step: &str, latency_ms: u64) -> Self {
        Self {
            step: step.to_string(),
            detail: serde_json::Map::new(),
            latency_ms,
        }
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.detail.insert(key.to_string(), value);
        self
    }
}

/// Record of one scheduling tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub args: Value,
    pub result: Value,
}

/// The orchestrator's answer for one chat turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    pub reply: String,
    pub citations: Vec<Citation>,
    pub plan_steps: Vec<PlanStep>,
    pub tool_calls: Vec<ToolCall>,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Cached knowledge answer, stored under the `knowledge:` namespace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedAnswer {
    pub reply: String,
    pub citations: Vec<Citation>,
}

// Reply templates. The wording is part of the observable contract;
// behavior tests match on these strings.

pub const CLARIFICATION_REPLY: &str =
    "I'm not sure what you mean. You can ask about our policies or schedule an appointment.";

pub const NO_INFORMATION_REPLY: &str =
    "I couldn't find anything about that. Try asking about our policies, parking, or hours.";

pub const SCHEDULE_PROMPT: &str =
    "I need a patient name and a time. For example: 'Book Chen for tomorrow at 10:30'.";

pub const RESCHEDULE_PROMPT: &str = "I need the new time. For example: 'Make it 11:00'.";

pub const SCHEDULE_FAILURE_REPLY: &str =
    "Sorry, I couldn't book that appointment right now. Please try again in a moment.";

/// en-US short date/time, e.g. `6/12/2025, 10:30 AM`
pub fn format_slot(slot: &DateTime<Utc>) -> String {
    slot.format("%-m/%-d/%Y, %-I:%M %p").to_string()
}

pub fn booked_reply(patient: &str, slot: &DateTime<Utc>, location: &str) -> String {
    format!("Booked {} for {} at {}.", patient, format_slot(slot), location)
}

pub fn rebooked_reply(patient: &str, slot: &DateTime<Utc>) -> String {
    format!("Rebooked {} for {}.", patient, format_slot(slot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_slot_short_en_us() {
        let slot = Utc.with_ymd_and_hms(2025, 6, 12, 10, 30, 0).unwrap();
        assert_eq!(format_slot(&slot), "6/12/2025, 10:30 AM");

        let afternoon = Utc.with_ymd_and_hms(2025, 11, 3, 15, 0, 0).unwrap();
        assert_eq!(format_slot(&afternoon), "11/3/2025, 3:00 PM");
    }

    #[test]
    fn test_booked_reply_prefix() {
        let slot = Utc.with_ymd_and_hms(2025, 6, 12, 10, 30, 0).unwrap();
        let reply = booked_reply("Chen", &slot, "Midtown");
        assert!(reply.starts_with("Booked Chen "));
        assert!(reply.ends_with("at Midtown."));
    }

    #[test]
    fn test_rebooked_reply_prefix() {
        let slot = Utc.with_ymd_and_hms(2025, 6, 12, 11, 0, 0).unwrap();
        assert!(rebooked_reply("Chen", &slot).starts_with("Rebooked Chen "));
    }

    #[test]
    fn test_plan_step_flattens_detail() {
        let step = PlanStep::new(STEP_INTENT_DETECTION, 3)
            .with("schedule", Value::Bool(true))
            .with("knowledge", Value::Bool(false));

        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["step"], "intent_detection");
        assert_eq!(json["schedule"], true);
        assert_eq!(json["latency_ms"], 3);
    }
}
