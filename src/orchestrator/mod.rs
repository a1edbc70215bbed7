//! Turn orchestration: planning, dispatch, and reply composition
//!
//! The orchestrator itself is state-free; session state lives in
//! [`SessionMemory`]. Each turn is classified, dispatched to the knowledge
//! and/or scheduling subflows (concurrently for dual intent), and the
//! reply composed from whatever succeeded. A failure in one branch never
//! aborts the other.

pub mod models;

pub use models::{ChatOutcome, PlanStep, ToolCall};

use crate::answer::AnswerExtractor;
use crate::entities;
use crate::intent::IntentClassifier;
use crate::knowledge::dao::DEFAULT_TOP_K;
use crate::knowledge::{Citation, KnowledgeDao};
use crate::kv::{self, keys, KvStore};
use crate::observability::MetricsCollector;
use crate::schedule::ScheduleService;
use crate::session::{LastAppointment, SessionMemory};
use chrono::{DateTime, Utc};
use models::*;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::{debug, warn};

fn reschedule_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)make it|change to|move|reschedule|change the|move it")
            .expect("valid reschedule regex")
    })
}

struct KnowledgeOutcome {
    reply: Option<String>,
    citations: Vec<Citation>,
    steps: Vec<PlanStep>,
}

struct ScheduleOutcome {
    reply: Option<String>,
    tool_calls: Vec<ToolCall>,
    steps: Vec<PlanStep>,
}

/// Plans and dispatches one chat turn at a time
pub struct Orchestrator {
    classifier: IntentClassifier,
    dao: Arc<KnowledgeDao>,
    extractor: AnswerExtractor,
    schedule: Arc<ScheduleService>,
    memory: Arc<SessionMemory>,
    kv: Arc<dyn KvStore>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl Orchestrator {
    pub fn new(
        classifier: IntentClassifier,
        dao: Arc<KnowledgeDao>,
        extractor: AnswerExtractor,
        schedule: Arc<ScheduleService>,
        memory: Arc<SessionMemory>,
        kv: Arc<dyn KvStore>,
    ) -> Self {
        Self {
            classifier,
            dao,
            extractor,
            schedule,
            memory,
            kv,
            metrics: None,
        }
    }

    /// Attach a metrics collector for reply-cache accounting
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Handle one chat turn. Never fails: errors inside a branch degrade
    /// that branch, and the envelope still carries the accumulated plan.
    pub async fn handle(&self, message: &str, session_id: &str) -> ChatOutcome {
        let turn_start = Instant::now();
        let mut plan_steps = Vec::new();

        let intent_start = Instant::now();
        let intents = self.classifier.predict(message);
        plan_steps.push(
            PlanStep::new(STEP_INTENT_DETECTION, intent_start.elapsed().as_millis() as u64)
                .with("schedule", Value::Bool(intents.schedule))
                .with("knowledge", Value::Bool(intents.knowledge)),
        );
        debug!(
            "Intents for {:?}: schedule={} knowledge={}",
            message, intents.schedule, intents.knowledge
        );

        let context = self.memory.get(session_id).await;
        let reschedule_target = context
            .last_appt
            .filter(|_| reschedule_re().is_match(message));

        // A reschedule phrase with session context is a schedule action
        // even when the classifier missed it.
        let schedule_set = intents.schedule || reschedule_target.is_some();

        let (knowledge, schedule) = match (intents.knowledge, schedule_set) {
            (true, true) => {
                let (knowledge, schedule) = tokio::join!(
                    self.knowledge_path(message),
                    self.schedule_action(message, session_id, reschedule_target)
                );
                (Some(knowledge), Some(schedule))
            }
            (true, false) => (Some(self.knowledge_path(message).await), None),
            (false, true) => (
                None,
                Some(
                    self.schedule_action(message, session_id, reschedule_target)
                        .await,
                ),
            ),
            (false, false) => (None, None),
        };

        let mut citations = Vec::new();
        let mut tool_calls = Vec::new();
        let mut parts = Vec::new();

        let knowledge_ran = knowledge.is_some();
        if let Some(outcome) = knowledge {
            plan_steps.extend(outcome.steps);
            citations = outcome.citations;
            if let Some(reply) = outcome.reply {
                parts.push(reply);
            }
        }
        if let Some(outcome) = schedule {
            plan_steps.extend(outcome.steps);
            tool_calls = outcome.tool_calls;
            if let Some(reply) = outcome.reply {
                parts.push(reply);
            }
        }

        let reply = if parts.is_empty() {
            if knowledge_ran {
                NO_INFORMATION_REPLY.to_string()
            } else {
                CLARIFICATION_REPLY.to_string()
            }
        } else {
            parts.join(" ")
        };

        ChatOutcome {
            reply,
            citations,
            plan_steps,
            tool_calls,
            latency_ms: turn_start.elapsed().as_millis() as u64,
            error: None,
        }
    }

    /// Knowledge path: reply cache, hybrid retrieval, sentence extraction
    async fn knowledge_path(&self, message: &str) -> KnowledgeOutcome {
        let start = Instant::now();
        let cache_key = keys::knowledge_key(message);

        if let Some(cached) = kv::get_json::<CachedAnswer>(self.kv.as_ref(), &cache_key).await {
            if let Some(metrics) = &self.metrics {
                metrics.record_cache_hit();
            }
            let step = PlanStep::new(STEP_RETRIEVE_KNOWLEDGE, start.elapsed().as_millis() as u64)
                .with("cached", Value::Bool(true))
                .with("results", json!(cached.citations.len()));
            return KnowledgeOutcome {
                reply: Some(cached.reply),
                citations: cached.citations,
                steps: vec![step],
            };
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_cache_miss();
        }

        let chunks = match self.dao.search(message, DEFAULT_TOP_K).await {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!("Knowledge retrieval failed: {}", e);
                Vec::new()
            }
        };

        if chunks.is_empty() {
            let step = PlanStep::new(STEP_RETRIEVE_KNOWLEDGE, start.elapsed().as_millis() as u64)
                .with("results", json!(0));
            return KnowledgeOutcome {
                reply: None,
                citations: Vec::new(),
                steps: vec![step],
            };
        }

        let reply = match self.extractor.extract(message, &chunks[0].text).await {
            Ok(sentence) => sentence,
            Err(e) => {
                warn!("Answer extraction degraded to raw chunk: {}", e);
                chunks[0].text.clone()
            }
        };

        let citations = Citation::from_chunks(&chunks);
        let step = PlanStep::new(STEP_RETRIEVE_KNOWLEDGE, start.elapsed().as_millis() as u64)
            .with("results", json!(chunks.len()));

        // Best-effort reply cache store off the request path.
        let kv = self.kv.clone();
        let cached = CachedAnswer {
            reply: reply.clone(),
            citations: citations.clone(),
        };
        tokio::spawn(async move {
            kv::put_json(kv.as_ref(), &cache_key, &cached, keys::KNOWLEDGE_TTL_SECS).await;
        });

        KnowledgeOutcome {
            reply: Some(reply),
            citations,
            steps: vec![step],
        }
    }

    /// Run the reschedule subflow when a target is present, the schedule
    /// subflow otherwise
    async fn schedule_action(
        &self,
        message: &str,
        session_id: &str,
        reschedule_target: Option<LastAppointment>,
    ) -> ScheduleOutcome {
        match reschedule_target {
            Some(last_appt) => self.reschedule_subflow(message, session_id, last_appt).await,
            None => self.schedule_subflow(message, session_id).await,
        }
    }

    /// Schedule subflow: extract entities, create the appointment, and
    /// remember it in the session
    async fn schedule_subflow(&self, message: &str, session_id: &str) -> ScheduleOutcome {
        let mut steps = Vec::new();

        let entities_start = Instant::now();
        let name = entities::extract_name(message);
        let location = entities::extract_location(message);
        steps.push(
            PlanStep::new(STEP_EXTRACT_ENTITIES, entities_start.elapsed().as_millis() as u64)
                .with("name", json!(name))
                .with("location", json!(location)),
        );

        let time_start = Instant::now();
        let slot = entities::parse_time(message);
        steps.push(
            PlanStep::new(STEP_EXTRACT_TIME, time_start.elapsed().as_millis() as u64)
                .with("time", json!(slot.map(|t| t.to_rfc3339()))),
        );

        let (name, slot) = match (name, slot) {
            (Some(name), Some(slot)) => (name, slot),
            _ => {
                return ScheduleOutcome {
                    reply: Some(SCHEDULE_PROMPT.to_string()),
                    tool_calls: Vec::new(),
                    steps,
                };
            }
        };

        let slot_iso = iso_utc(&slot);
        let schedule_start = Instant::now();
        let args = json!({
            "patient": name,
            "preferred_slot_iso": slot_iso,
            "location": location,
        });

        match self.schedule.create(&name, &slot_iso, &location).await {
            Ok(appointment) => {
                self.memory
                    .remember_appointment(
                        session_id,
                        &appointment.patient,
                        &appointment.normalized_slot_iso,
                        &appointment.location,
                        &appointment.appt_id,
                    )
                    .await;

                steps.push(PlanStep::new(
                    STEP_SCHEDULE,
                    schedule_start.elapsed().as_millis() as u64,
                ));

                ScheduleOutcome {
                    reply: Some(booked_reply(&appointment.patient, &slot, &appointment.location)),
                    tool_calls: vec![ToolCall {
                        name: STEP_SCHEDULE.to_string(),
                        args,
                        result: json!({"ok": true, "appointment": appointment}),
                    }],
                    steps,
                }
            }
            Err(e) => {
                warn!("Schedule subflow failed: {}", e);
                steps.push(PlanStep::new(
                    STEP_SCHEDULE,
                    schedule_start.elapsed().as_millis() as u64,
                ));

                ScheduleOutcome {
                    reply: Some(SCHEDULE_FAILURE_REPLY.to_string()),
                    tool_calls: vec![ToolCall {
                        name: STEP_SCHEDULE.to_string(),
                        args,
                        result: json!({"ok": false, "error": e.to_string()}),
                    }],
                    steps,
                }
            }
        }
    }

    /// Reschedule subflow: only the new time is required; the appointment
    /// comes from session context
    async fn reschedule_subflow(
        &self,
        message: &str,
        session_id: &str,
        last_appt: LastAppointment,
    ) -> ScheduleOutcome {
        let mut steps = Vec::new();

        let time_start = Instant::now();
        let slot = entities::parse_time(message);
        steps.push(
            PlanStep::new(STEP_EXTRACT_TIME, time_start.elapsed().as_millis() as u64)
                .with("time", json!(slot.map(|t| t.to_rfc3339()))),
        );

        let Some(slot) = slot else {
            return ScheduleOutcome {
                reply: Some(RESCHEDULE_PROMPT.to_string()),
                tool_calls: Vec::new(),
                steps,
            };
        };

        let slot_iso = iso_utc(&slot);
        let reschedule_start = Instant::now();
        let args = json!({
            "appt_id": last_appt.appt_id,
            "new_slot_iso": slot_iso,
        });

        match self.schedule.reschedule(&last_appt.appt_id, &slot_iso).await {
            Ok(appointment) => {
                self.memory
                    .remember_appointment(
                        session_id,
                        &appointment.patient,
                        &appointment.normalized_slot_iso,
                        &appointment.location,
                        &appointment.appt_id,
                    )
                    .await;

                steps.push(PlanStep::new(
                    STEP_RESCHEDULE,
                    reschedule_start.elapsed().as_millis() as u64,
                ));

                ScheduleOutcome {
                    reply: Some(rebooked_reply(&appointment.patient, &slot)),
                    tool_calls: vec![ToolCall {
                        name: STEP_RESCHEDULE.to_string(),
                        args,
                        result: json!({"ok": true, "appointment": appointment}),
                    }],
                    steps,
                }
            }
            Err(e) => {
                warn!("Reschedule subflow failed: {}", e);
                steps.push(PlanStep::new(
                    STEP_RESCHEDULE,
                    reschedule_start.elapsed().as_millis() as u64,
                ));

                ScheduleOutcome {
                    reply: Some(format!("Sorry, I couldn't move that appointment: {}.", e)),
                    tool_calls: vec![ToolCall {
                        name: STEP_RESCHEDULE.to_string(),
                        args,
                        result: json!({"ok": false, "error": e.to_string()}),
                    }],
                    steps,
                }
            }
        }
    }
}

fn iso_utc(slot: &DateTime<Utc>) -> String {
    slot.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
