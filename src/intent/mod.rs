//! Intent classification for chat turns
//!
//! Two interchangeable backends sit behind the [`IntentModel`] capability
//! trait: a trained word n-gram softmax model and a keyword rule set. The
//! backend is chosen at construction; the orchestrator treats both
//! identically.

pub mod keywords;
pub mod ngram;

pub use keywords::KeywordModel;
pub use ngram::NgramModel;

use crate::config::IntentConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Confidence threshold for setting an intent label
const CONFIDENCE_THRESHOLD: f32 = 0.3;

/// Intent labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentLabel {
    Schedule,
    Knowledge,
}

/// Multi-label intent prediction for one chat turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentVector {
    pub schedule: bool,
    pub knowledge: bool,
}

impl IntentVector {
    pub fn is_unclear(&self) -> bool {
        !self.schedule && !self.knowledge
    }

    pub fn is_dual(&self) -> bool {
        self.schedule && self.knowledge
    }
}

/// Capability interface: text to label-score pairs, best first
pub trait IntentModel: Send + Sync {
    fn predict(&self, text: &str) -> Vec<(IntentLabel, f32)>;
}

/// Classifier applying the confidence threshold over a backend
pub struct IntentClassifier {
    model: Box<dyn IntentModel>,
}

impl IntentClassifier {
    /// Choose the backend from configuration: the trained model when its
    /// blob loads, keyword rules otherwise. A load failure is not
    /// user-visible.
    pub fn from_config(config: &IntentConfig) -> Self {
        if let Some(path) = &config.model_path {
            match NgramModel::load(path) {
                Ok(model) => {
                    info!("Intent classifier using trained model from {}", path);
                    return Self::new(Box::new(model));
                }
                Err(e) => {
                    warn!(
                        "Intent model unavailable ({}), falling back to keyword rules",
                        e
                    );
                }
            }
        } else {
            info!("No intent model configured, using keyword rules");
        }
        Self::new(Box::new(KeywordModel::new()))
    }

    pub fn new(model: Box<dyn IntentModel>) -> Self {
        Self { model }
    }

    /// Predict the intent vector for a message. A label is set when its
    /// confidence reaches the threshold; when none does, the top label is
    /// set provided the backend produced any signal at all.
    pub fn predict(&self, message: &str) -> IntentVector {
        let scores = self.model.predict(message);

        let mut vector = IntentVector::default();
        for (label, confidence) in &scores {
            if *confidence >= CONFIDENCE_THRESHOLD {
                match label {
                    IntentLabel::Schedule => vector.schedule = true,
                    IntentLabel::Knowledge => vector.knowledge = true,
                }
            }
        }

        if vector.is_unclear() {
            if let Some((label, confidence)) = scores.first() {
                if *confidence > 0.0 {
                    match label {
                        IntentLabel::Schedule => vector.schedule = true,
                        IntentLabel::Knowledge => vector.knowledge = true,
                    }
                }
            }
        }

        vector
    }
}
