//! Sentence segmentation for answer extraction

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Sentences longer than this are re-split on ". "
const LONG_SENTENCE_CHARS: usize = 200;

/// Fragments at or below this length are dropped
const MIN_FRAGMENT_CHARS: usize = 10;

/// Sentences longer than this are excluded outright
const MAX_SENTENCE_CHARS: usize = 500;

fn banner_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"===[^=]+===").expect("valid banner regex"))
}

fn boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]\s+[A-Z]").expect("valid boundary regex"))
}

fn blank_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("valid blank-line regex"))
}

fn has_terminal_punctuation(sentence: &str) -> bool {
    sentence.ends_with('.') || sentence.ends_with('!') || sentence.ends_with('?')
}

/// Split a line at `[.!?]<ws><capital>` boundaries, keeping the
/// punctuation with the left piece.
fn split_line(line: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut start = 0;

    for m in boundary_re().find_iter(line) {
        // The match spans punctuation, whitespace, and the capital that
        // opens the next sentence; cut right after the punctuation.
        let cut = m.start() + 1;
        pieces.push(line[start..cut].trim().to_string());
        start = m.end() - 1;
    }
    pieces.push(line[start..].trim().to_string());

    pieces.into_iter().filter(|p| !p.is_empty()).collect()
}

/// Segment chunk text into candidate answer sentences
pub fn segment(text: &str) -> Vec<String> {
    let stripped = banner_re().replace_all(text, "");

    let mut raw: Vec<String> = Vec::new();
    for paragraph in blank_line_re().split(&stripped) {
        for line in paragraph.lines() {
            raw.extend(split_line(line));
        }
    }

    // Overlong or unterminated sentences get re-split on ". " and
    // re-terminated.
    let mut resplit: Vec<String> = Vec::new();
    for sentence in raw {
        if sentence.chars().count() > LONG_SENTENCE_CHARS || !has_terminal_punctuation(&sentence) {
            for piece in sentence.split(". ") {
                let piece = piece.trim().trim_end_matches('.');
                if piece.is_empty() {
                    continue;
                }
                resplit.push(format!("{}.", piece));
            }
        } else {
            resplit.push(sentence);
        }
    }

    let mut seen = HashSet::new();
    resplit
        .into_iter()
        .filter(|s| s.chars().count() > MIN_FRAGMENT_CHARS)
        .filter(|s| s.chars().count() <= MAX_SENTENCE_CHARS)
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_split() {
        let sentences = segment("We open at nine every day. Parking is in the garage.");
        assert_eq!(
            sentences,
            vec![
                "We open at nine every day.".to_string(),
                "Parking is in the garage.".to_string(),
            ]
        );
    }

    #[test]
    fn test_banner_markers_are_stripped() {
        let sentences = segment("=== Late Policy ===\nPatients arriving late are rescheduled.");
        assert_eq!(sentences, vec!["Patients arriving late are rescheduled.".to_string()]);
    }

    #[test]
    fn test_abbreviation_without_capital_does_not_split() {
        let sentences = segment("Arrive at 10 a.m. sharp for your visit please.");
        assert_eq!(sentences.len(), 1);
    }

    #[test]
    fn test_blank_lines_separate_paragraphs() {
        let sentences = segment("First paragraph here.\n\nSecond paragraph here.");
        assert_eq!(sentences.len(), 2);
    }

    #[test]
    fn test_unterminated_text_is_reterminated() {
        let sentences = segment("Our hours are nine to five on weekdays");
        assert_eq!(sentences, vec!["Our hours are nine to five on weekdays.".to_string()]);
    }

    #[test]
    fn test_long_sentence_is_resplit() {
        let long = format!(
            "{} first part. {} second part.",
            "filler ".repeat(20).trim(),
            "padding ".repeat(20).trim()
        );
        assert!(long.len() > 200);
        let sentences = segment(&long);
        assert!(sentences.len() >= 2);
        assert!(sentences.iter().all(|s| s.ends_with('.')));
    }

    #[test]
    fn test_short_fragments_are_dropped() {
        let sentences = segment("Okay. Our cancellation policy requires a day of notice.");
        assert_eq!(
            sentences,
            vec!["Our cancellation policy requires a day of notice.".to_string()]
        );
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let sentences = segment("Call us anytime today. Call us anytime today.");
        assert_eq!(sentences.len(), 1);
    }

    #[test]
    fn test_oversized_sentences_are_excluded() {
        // No ". " split points, so the 600-char run survives resplitting
        // and is excluded by the hard cap.
        let oversized = "word".repeat(150);
        assert!(segment(&oversized).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(segment("").is_empty());
    }
}
