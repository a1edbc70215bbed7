//! End-to-end orchestrator scenarios over the in-process doubles
//!
//! These run the full pipeline (intent classification, hybrid retrieval,
//! sentence extraction, scheduling, session memory, and caching) with no
//! external services.

mod common;

use common::{build_stack, build_stack_with_embedder, FailingEmbedder};
use frontdesk::knowledge::Document;
use std::sync::Arc;
use std::time::Duration;

fn policy_document() -> Document {
    Document {
        id: "pol-1".to_string(),
        text: "Our late policy: patients arriving more than 15 minutes late are rescheduled."
            .to_string(),
        tags: vec![],
    }
}

fn corpus() -> Vec<Document> {
    vec![
        policy_document(),
        Document {
            id: "pol-2".to_string(),
            text: "Parking is available in the garage next to the Midtown office.".to_string(),
            tags: vec![],
        },
        Document {
            id: "pol-3".to_string(),
            text: "We accept most major insurance plans including dental coverage.".to_string(),
            tags: vec![],
        },
    ]
}

/// Let detached cache-store tasks finish
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn scenario_knowledge_only() {
    let stack = build_stack();
    stack.dao.upsert(vec![policy_document()]).await.unwrap();

    let outcome = stack
        .orchestrator
        .handle("what is the late policy?", "s1")
        .await;

    assert!(
        outcome.reply.contains("more than 15 minutes late"),
        "reply was: {}",
        outcome.reply
    );

    assert_eq!(outcome.citations.len(), 1);
    let citation = &outcome.citations[0];
    assert_eq!(citation.doc_id, "pol-1");
    assert_eq!(citation.chunk_index, 0);
    assert_eq!(citation.ref_, 1);
    assert!(citation.score > 0.0 && citation.score <= 1.0);

    assert!(outcome.tool_calls.is_empty());
    assert_eq!(outcome.plan_steps[0].step, "intent_detection");
}

#[tokio::test]
async fn scenario_schedule() {
    let stack = build_stack();

    let outcome = stack
        .orchestrator
        .handle("Book Chen for tomorrow at 10:30", "s2")
        .await;

    assert!(outcome.reply.starts_with("Booked Chen "), "reply was: {}", outcome.reply);
    assert_eq!(outcome.tool_calls.len(), 1);
    assert_eq!(outcome.tool_calls[0].name, "schedule_appointment");
    assert_eq!(outcome.tool_calls[0].result["ok"], true);

    let context = stack.memory.get("s2").await;
    assert_eq!(context.last_appt.unwrap().patient, "Chen");
}

#[tokio::test]
async fn scenario_reschedule_by_context() {
    let stack = build_stack();

    let booked = stack
        .orchestrator
        .handle("Book Chen for tomorrow at 10:30", "s2")
        .await;
    let original_id = booked.tool_calls[0].result["appointment"]["appt_id"]
        .as_str()
        .unwrap()
        .to_string();

    let outcome = stack.orchestrator.handle("Make it 11:00", "s2").await;

    assert!(
        outcome.reply.starts_with("Rebooked Chen "),
        "reply was: {}",
        outcome.reply
    );
    assert_eq!(outcome.tool_calls.len(), 1);
    assert_eq!(outcome.tool_calls[0].name, "reschedule_appointment");
    assert_eq!(
        outcome.tool_calls[0].result["appointment"]["appt_id"]
            .as_str()
            .unwrap(),
        original_id
    );
}

#[tokio::test]
async fn scenario_dual_intent() {
    let stack = build_stack();
    stack.dao.upsert(vec![policy_document()]).await.unwrap();

    let outcome = stack
        .orchestrator
        .handle(
            "what's the late policy and book Rivera for tomorrow at 9am at Uptown",
            "s3",
        )
        .await;

    assert!(
        outcome.reply.contains("more than 15 minutes late"),
        "reply was: {}",
        outcome.reply
    );
    assert!(outcome.reply.contains("Booked Rivera "), "reply was: {}", outcome.reply);
    assert!(outcome.reply.contains("Uptown"));

    assert!(!outcome.citations.is_empty());
    assert_eq!(outcome.tool_calls.len(), 1);
    assert_eq!(outcome.tool_calls[0].name, "schedule_appointment");
}

#[tokio::test]
async fn scenario_unclear_intent() {
    let stack = build_stack();

    let outcome = stack.orchestrator.handle("hello", "s4").await;

    assert_eq!(
        outcome.reply,
        "I'm not sure what you mean. You can ask about our policies or schedule an appointment."
    );
    assert!(outcome.citations.is_empty());
    assert!(outcome.tool_calls.is_empty());
    assert_eq!(outcome.plan_steps.len(), 1);
    assert_eq!(outcome.plan_steps[0].step, "intent_detection");
}

#[tokio::test]
async fn scenario_missing_entity() {
    let stack = build_stack();

    let outcome = stack.orchestrator.handle("Book for tomorrow", "s5").await;

    assert!(
        outcome.reply.contains("'Book Chen for tomorrow at 10:30'"),
        "reply was: {}",
        outcome.reply
    );
    assert!(outcome.tool_calls.is_empty());
}

#[tokio::test]
async fn search_top_hit_matches_source_document() {
    let stack = build_stack();
    stack.dao.upsert(corpus()).await.unwrap();

    for (doc_id, probe) in [
        ("pol-1", "patients arriving more than 15 minutes late"),
        ("pol-2", "parking in the garage"),
        ("pol-3", "insurance plans dental"),
    ] {
        let results = stack.dao.search(probe, 3).await.unwrap();
        assert!(!results.is_empty(), "no results for {}", probe);
        assert_eq!(results[0].doc_id, doc_id, "probe {} missed", probe);
    }
}

#[tokio::test]
async fn search_is_idempotent_within_cache_ttl() {
    let stack = build_stack();
    stack.dao.upsert(corpus()).await.unwrap();

    let first = stack.dao.search("what is the late policy?", 3).await.unwrap();
    settle().await;
    let second = stack.dao.search("what is the late policy?", 3).await.unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn cached_and_fresh_replies_are_identical() {
    let stack = build_stack();
    stack.dao.upsert(corpus()).await.unwrap();

    let fresh = stack
        .orchestrator
        .handle("what is the late policy?", "s1")
        .await;
    settle().await;
    let cached = stack
        .orchestrator
        .handle("what is the late policy?", "s1")
        .await;

    assert_eq!(fresh.reply, cached.reply);
    assert_eq!(
        serde_json::to_string(&fresh.citations).unwrap(),
        serde_json::to_string(&cached.citations).unwrap()
    );
}

#[tokio::test]
async fn sessions_do_not_leak_context() {
    let stack = build_stack();

    stack
        .orchestrator
        .handle("Book Chen for tomorrow at 10:30", "s2")
        .await;

    // A fresh session has no appointment context, so a bare reschedule
    // phrase falls through to the schedule subflow and prompts.
    let outcome = stack.orchestrator.handle("Make it 11:00", "s-other").await;
    assert!(outcome.tool_calls.is_empty());
    assert!(stack.memory.get("s-other").await.last_appt.is_none());
}

#[tokio::test]
async fn reschedule_composes_with_schedule() {
    let stack = build_stack();

    let appointment = stack
        .schedule
        .create("Chen", "2025-06-12T10:30:00Z", "Midtown")
        .await
        .unwrap();
    stack
        .schedule
        .reschedule(&appointment.appt_id, "2025-06-12T11:00:00Z")
        .await
        .unwrap();

    let fetched = stack.schedule.get(&appointment.appt_id).await.unwrap().unwrap();
    assert_eq!(fetched.normalized_slot_iso, "2025-06-12T11:00:00Z");
}

#[tokio::test]
async fn plan_steps_start_with_intent_detection() {
    let stack = build_stack();
    stack.dao.upsert(corpus()).await.unwrap();

    for message in [
        "what is the late policy?",
        "Book Chen for tomorrow at 10:30",
        "hello",
    ] {
        let outcome = stack.orchestrator.handle(message, "s-steps").await;
        assert_eq!(outcome.plan_steps[0].step, "intent_detection");
    }
}

#[tokio::test]
async fn embedding_outage_degrades_to_lexical_results() {
    let stack = build_stack_with_embedder(Arc::new(FailingEmbedder));

    // Ingest cannot embed, so seed retrieval through a lexical-only path:
    // upsert fails, but search must still answer from an empty corpus
    // without erroring.
    assert!(stack.dao.upsert(vec![policy_document()]).await.is_err());

    let results = stack.dao.search("what is the late policy?", 3).await.unwrap();
    assert!(results.is_empty());

    let outcome = stack
        .orchestrator
        .handle("what is the late policy?", "s6")
        .await;
    assert!(
        outcome.reply.contains("couldn't find anything"),
        "reply was: {}",
        outcome.reply
    );
    assert!(outcome.citations.is_empty());
}

#[tokio::test]
async fn unknown_reschedule_target_surfaces_tool_error() {
    let stack = build_stack();

    // Seed session context pointing at an appointment that no longer exists.
    stack
        .memory
        .remember_appointment("s7", "Chen", "2025-06-12T10:30:00Z", "Midtown", "gone-id")
        .await;

    let outcome = stack.orchestrator.handle("Make it 11:00", "s7").await;

    assert_eq!(outcome.tool_calls.len(), 1);
    assert_eq!(outcome.tool_calls[0].result["ok"], false);
    assert!(outcome.reply.starts_with("Sorry, I couldn't move that appointment"));
}

#[tokio::test]
async fn dual_intent_schedule_failure_keeps_knowledge_reply() {
    let stack = build_stack();
    stack.dao.upsert(vec![policy_document()]).await.unwrap();

    // Dual-intent message without a patient name: the schedule branch
    // prompts while the knowledge branch still answers.
    let outcome = stack
        .orchestrator
        .handle("what's the late policy and book for tomorrow at 9am", "s8")
        .await;

    assert!(outcome.reply.contains("more than 15 minutes late"));
    assert!(outcome.reply.contains("'Book Chen for tomorrow at 10:30'"));
    assert!(outcome.tool_calls.is_empty());
    assert!(!outcome.citations.is_empty());
}
