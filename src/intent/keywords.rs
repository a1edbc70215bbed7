//! Keyword-rule intent backend
//!
//! Used when no trained model is available. A schedule keyword anywhere in
//! the lowercased message sets schedule; a knowledge keyword sets knowledge
//! only when no schedule keyword matched.

use super::{IntentLabel, IntentModel};

const SCHEDULE_KEYWORDS: &[&str] = &[
    "book",
    "schedule",
    "appointment",
    "reschedule",
    "change",
    "move",
    "make it",
    "change to",
    "rebook",
    "slot",
];

const KNOWLEDGE_KEYWORDS: &[&str] = &[
    "what",
    "where",
    "how",
    "when",
    "why",
    "tell me",
    "policy",
    "parking",
    "hours",
    "insurance",
    "prepare",
    "bring",
    "access",
    "grace",
    "late",
    "cancellation",
    "location",
    "office",
];

/// Substring keyword rules over the lowercased message
#[derive(Default)]
pub struct KeywordModel;

impl KeywordModel {
    pub fn new() -> Self {
        Self
    }
}

impl IntentModel for KeywordModel {
    fn predict(&self, text: &str) -> Vec<(IntentLabel, f32)> {
        let lower = text.to_lowercase();

        let schedule = SCHEDULE_KEYWORDS.iter().any(|kw| lower.contains(kw));
        let knowledge = !schedule && KNOWLEDGE_KEYWORDS.iter().any(|kw| lower.contains(kw));

        let mut scores = vec![
            (IntentLabel::Schedule, if schedule { 1.0 } else { 0.0 }),
            (IntentLabel::Knowledge, if knowledge { 1.0 } else { 0.0 }),
        ];
        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::IntentClassifier;

    fn classifier() -> IntentClassifier {
        IntentClassifier::new(Box::new(KeywordModel::new()))
    }

    #[test]
    fn test_book_sets_schedule() {
        let vector = classifier().predict("please book me in");
        assert!(vector.schedule);
        assert!(!vector.knowledge);
    }

    #[test]
    fn test_schedule_keyword_suppresses_knowledge() {
        // "what" and "book" both appear; the rule gives schedule priority.
        let vector = classifier().predict("what slots can you book?");
        assert!(vector.schedule);
        assert!(!vector.knowledge);
    }

    #[test]
    fn test_knowledge_only() {
        let vector = classifier().predict("tell me about parking");
        assert!(!vector.schedule);
        assert!(vector.knowledge);
    }

    #[test]
    fn test_no_keywords_is_unclear() {
        assert!(classifier().predict("hello").is_unclear());
    }

    #[test]
    fn test_case_insensitive() {
        assert!(classifier().predict("BOOK Chen tomorrow").schedule);
    }
}
