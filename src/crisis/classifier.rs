// Per-message risk classifier
//
// Pure function of (text, lexicon, thresholds). No hidden state.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::lexicon::Lexicon;
use super::tier::RiskTier;

/// Length cut-offs used when a message has no crisis wording.
/// Both comparisons are strict `>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthThresholds {
    pub mid: usize,
    pub high: usize,
}

impl Default for LengthThresholds {
    fn default() -> Self {
        Self { mid: 40, high: 100 }
    }
}

impl LengthThresholds {
    pub fn tier_for_length(&self, length: usize) -> RiskTier {
        if length > self.high {
            RiskTier::High
        } else if length > self.mid {
            RiskTier::Mid
        } else {
            RiskTier::Low
        }
    }
}

/// Classifier output for one message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub local_tier: RiskTier,
    pub critical_match: bool,
}

#[derive(Debug, Clone)]
pub struct RiskClassifier {
    lexicon: Arc<Lexicon>,
    thresholds: LengthThresholds,
}

impl RiskClassifier {
    pub fn new(lexicon: Arc<Lexicon>, thresholds: LengthThresholds) -> Self {
        Self {
            lexicon,
            thresholds,
        }
    }

    /// Classify a single user message.
    ///
    /// Callers reject blank text before getting here; a blank message would
    /// simply classify as `Low`.
    pub fn classify(&self, text: &str) -> Classification {
        classify(text, &self.lexicon, &self.thresholds)
    }

    pub fn lexicon(&self) -> &Arc<Lexicon> {
        &self.lexicon
    }

    pub fn thresholds(&self) -> LengthThresholds {
        self.thresholds
    }
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self::new(Arc::new(Lexicon::default()), LengthThresholds::default())
    }
}

/// Message length as seen by the heuristic: Unicode scalar values of the
/// text exactly as sent and stored.
pub fn message_length(text: &str) -> usize {
    text.chars().count()
}

pub fn classify(text: &str, lexicon: &Lexicon, thresholds: &LengthThresholds) -> Classification {
    let critical_match = lexicon.is_critical_match(text);

    let local_tier = if critical_match {
        RiskTier::Critical
    } else {
        thresholds.tier_for_length(message_length(text))
    };

    Classification {
        local_tier,
        critical_match,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of_length(n: usize) -> String {
        "a".repeat(n)
    }

    #[test]
    fn test_critical_phrase_forces_critical() {
        let classifier = RiskClassifier::default();
        let result = classifier.classify("I want to die");

        assert!(result.critical_match);
        assert_eq!(result.local_tier, RiskTier::Critical);
    }

    #[test]
    fn test_length_boundaries_are_strict() {
        let classifier = RiskClassifier::default();

        assert_eq!(classifier.classify(&text_of_length(40)).local_tier, RiskTier::Low);
        assert_eq!(classifier.classify(&text_of_length(41)).local_tier, RiskTier::Mid);
        assert_eq!(classifier.classify(&text_of_length(100)).local_tier, RiskTier::Mid);
        assert_eq!(classifier.classify(&text_of_length(101)).local_tier, RiskTier::High);
    }

    #[test]
    fn test_short_text_is_low() {
        let result = RiskClassifier::default().classify("I'm stressed");
        assert!(!result.critical_match);
        assert_eq!(result.local_tier, RiskTier::Low);
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        // 41 multi-byte characters
        let text = "é".repeat(41);
        assert_eq!(message_length(&text), 41);
        assert_eq!(RiskClassifier::default().classify(&text).local_tier, RiskTier::Mid);
    }

    #[test]
    fn test_surrounding_whitespace_counts() {
        let padded = format!("{} ", text_of_length(40));
        assert_eq!(message_length(&padded), 41);
        assert_eq!(RiskClassifier::default().classify(&padded).local_tier, RiskTier::Mid);
    }

    #[test]
    fn test_custom_thresholds() {
        let classifier = RiskClassifier::new(
            Arc::new(Lexicon::default()),
            LengthThresholds { mid: 5, high: 10 },
        );
        assert_eq!(classifier.classify("abcdef").local_tier, RiskTier::Mid);
        assert_eq!(classifier.classify("abcdefghijk").local_tier, RiskTier::High);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = RiskClassifier::default();
        let text = "nothing feels right lately and I can't sleep at all";
        assert_eq!(classifier.classify(text), classifier.classify(text));
    }
}
