//! Patient name extraction
//!
//! A cascade of three regexes applied in order; the first capture wins.
//! Captures must be capitalized words, and verbs or time words that
//! happen to open a sentence are filtered out.

use regex::Regex;
use std::sync::OnceLock;

fn after_verb_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?i:book|schedule)\s+([A-Z][a-z]+)\b").expect("valid regex"))
}

fn after_preposition_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?:for|patient)\s+([A-Z][a-z]+)\b").expect("valid regex"))
}

fn before_time_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b([A-Z][a-z]+)\s+(?:tomorrow|today|next|at|for)\b").expect("valid regex")
    })
}

/// Capitalized words that are never patient names
const NON_NAMES: &[&str] = &[
    "Book", "Schedule", "Make", "Change", "Move", "Reschedule", "Rebook", "Tomorrow", "Today",
    "Next", "The", "What", "When", "Where", "Please", "Appointment",
];

fn is_plausible_name(candidate: &str) -> bool {
    !NON_NAMES.contains(&candidate)
}

/// Extract a patient name from a chat message
pub fn extract_name(text: &str) -> Option<String> {
    for re in [after_verb_re(), after_preposition_re(), before_time_word_re()] {
        for captures in re.captures_iter(text) {
            let candidate = captures[1].to_string();
            if is_plausible_name(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_after_book() {
        assert_eq!(extract_name("Book Chen for tomorrow at 10:30"), Some("Chen".to_string()));
    }

    #[test]
    fn test_name_after_lowercase_verb() {
        assert_eq!(
            extract_name("book Rivera for tomorrow at 9am at Uptown"),
            Some("Rivera".to_string())
        );
    }

    #[test]
    fn test_name_after_for() {
        assert_eq!(
            extract_name("an appointment for Alvarez next week"),
            Some("Alvarez".to_string())
        );
    }

    #[test]
    fn test_name_after_patient() {
        assert_eq!(extract_name("patient Okafor at 3pm"), Some("Okafor".to_string()));
    }

    #[test]
    fn test_name_before_time_word() {
        assert_eq!(extract_name("Chen tomorrow at 10"), Some("Chen".to_string()));
    }

    #[test]
    fn test_missing_name() {
        assert_eq!(extract_name("Book for tomorrow"), None);
    }

    #[test]
    fn test_lowercase_candidate_is_not_a_name() {
        assert_eq!(extract_name("book something for tomorrow"), None);
    }

    #[test]
    fn test_no_name_in_knowledge_question() {
        assert_eq!(extract_name("what is the late policy?"), None);
    }
}
