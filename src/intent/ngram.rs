//! Trained word n-gram intent backend
//!
//! A linear model over unigram and bigram features with a softmax across
//! the two labels, loaded from a JSON weight blob produced offline from
//! the labeled front-office corpus.

use super::{IntentLabel, IntentModel};
use crate::error::{FrontdeskError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Serialized model weights: per-feature `[schedule, knowledge]` pairs
#[derive(Debug, Deserialize)]
pub struct ModelWeights {
    pub vocab: HashMap<String, [f32; 2]>,
    #[serde(default)]
    pub bias: [f32; 2],
}

/// Word uni+bigram linear-softmax classifier
pub struct NgramModel {
    weights: ModelWeights,
}

impl NgramModel {
    /// Load model weights from a JSON blob
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| FrontdeskError::Intent(format!("cannot read model blob: {}", e)))?;
        let weights: ModelWeights = serde_json::from_str(&raw)
            .map_err(|e| FrontdeskError::Intent(format!("cannot parse model blob: {}", e)))?;

        if weights.vocab.is_empty() {
            return Err(FrontdeskError::Intent("model vocabulary is empty".to_string()));
        }

        Ok(Self { weights })
    }

    pub fn from_weights(weights: ModelWeights) -> Self {
        Self { weights }
    }

    /// Lowercased alphanumeric unigrams plus adjacent bigrams
    fn features(text: &str) -> Vec<String> {
        let normalized: String = text
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();
        let words: Vec<&str> = normalized.split_whitespace().collect();

        let mut features: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        for pair in words.windows(2) {
            features.push(format!("{} {}", pair[0], pair[1]));
        }
        features
    }
}

impl IntentModel for NgramModel {
    fn predict(&self, text: &str) -> Vec<(IntentLabel, f32)> {
        let mut logits = self.weights.bias;
        let mut matched = false;

        for feature in Self::features(text) {
            if let Some(w) = self.weights.vocab.get(&feature) {
                logits[0] += w[0];
                logits[1] += w[1];
                matched = true;
            }
        }

        // No known feature: the model abstains rather than guessing from
        // the bias alone.
        if !matched {
            return vec![
                (IntentLabel::Schedule, 0.0),
                (IntentLabel::Knowledge, 0.0),
            ];
        }

        let max = logits[0].max(logits[1]);
        let exp_s = (logits[0] - max).exp();
        let exp_k = (logits[1] - max).exp();
        let denom = exp_s + exp_k;

        let mut scores = vec![
            (IntentLabel::Schedule, exp_s / denom),
            (IntentLabel::Knowledge, exp_k / denom),
        ];
        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::IntentClassifier;

    fn model() -> NgramModel {
        let mut vocab = HashMap::new();
        vocab.insert("book".to_string(), [1.2, 0.0]);
        vocab.insert("tomorrow".to_string(), [0.6, 0.0]);
        vocab.insert("for tomorrow".to_string(), [0.5, 0.0]);
        vocab.insert("what".to_string(), [0.0, 1.0]);
        vocab.insert("late".to_string(), [0.0, 0.6]);
        vocab.insert("policy".to_string(), [0.0, 1.0]);
        NgramModel::from_weights(ModelWeights {
            vocab,
            bias: [0.0, 0.0],
        })
    }

    #[test]
    fn test_schedule_message() {
        let classifier = IntentClassifier::new(Box::new(model()));
        let vector = classifier.predict("Book Chen for tomorrow at 10:30");
        assert!(vector.schedule);
        assert!(!vector.knowledge);
    }

    #[test]
    fn test_knowledge_message() {
        let classifier = IntentClassifier::new(Box::new(model()));
        let vector = classifier.predict("what is the late policy?");
        assert!(vector.knowledge);
        assert!(!vector.schedule);
    }

    #[test]
    fn test_dual_intent_message() {
        let classifier = IntentClassifier::new(Box::new(model()));
        let vector =
            classifier.predict("what's the late policy and book Rivera for tomorrow at 9am");
        assert!(vector.is_dual());
    }

    #[test]
    fn test_out_of_vocabulary_abstains() {
        let classifier = IntentClassifier::new(Box::new(model()));
        assert!(classifier.predict("hello").is_unclear());
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let scores = model().predict("book tomorrow");
        let total: f32 = scores.iter().map(|(_, s)| s).sum();
        assert!((total - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_punctuation_is_normalized() {
        let features = NgramModel::features("What's the policy?");
        assert!(features.contains(&"what".to_string()));
        assert!(features.contains(&"policy".to_string()));
    }
}
