// Lexicon-based emotion analyzer
//
// Counts stemmed word hits per emotion. Informational only; it never
// feeds the risk tier.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

static WORD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z]+(?:'[a-z]+)?").expect("Failed to compile word regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emotion {
    Sadness,
    Happiness,
    Anger,
    Fear,
    Disgust,
    Surprise,
    Trust,
    Anticipation,
}

impl Emotion {
    /// Declaration order doubles as the tie-break order
    pub const ALL: [Emotion; 8] = [
        Emotion::Sadness,
        Emotion::Happiness,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Disgust,
        Emotion::Surprise,
        Emotion::Trust,
        Emotion::Anticipation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Sadness => "sadness",
            Emotion::Happiness => "happiness",
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Disgust => "disgust",
            Emotion::Surprise => "surprise",
            Emotion::Trust => "trust",
            Emotion::Anticipation => "anticipation",
        }
    }

    fn words(&self) -> &'static [&'static str] {
        match self {
            Emotion::Sadness => &[
                "sad", "unhappy", "lonely", "alone", "cry", "tears", "grief", "depressed",
                "hopeless", "miserable", "hurt", "loss", "empty", "gloomy", "heartbroken",
                "sorrow", "regret",
            ],
            Emotion::Happiness => &[
                "happy", "joy", "glad", "love", "wonderful", "excited", "grateful", "smile",
                "laugh", "peace", "calm", "proud", "hope", "fun", "relieved",
            ],
            Emotion::Anger => &[
                "angry", "mad", "furious", "hate", "annoyed", "irritated", "rage", "frustrated",
                "resent", "unfair",
            ],
            Emotion::Fear => &[
                "afraid", "scared", "fear", "anxious", "anxiety", "panic", "worry", "nervous",
                "terrified", "dread", "stress", "threat",
            ],
            Emotion::Disgust => &[
                "disgust", "gross", "nasty", "awful", "revolting", "ashamed", "shame",
            ],
            Emotion::Surprise => &[
                "surprise", "shocked", "sudden", "unexpected", "amazed", "astonished",
            ],
            Emotion::Trust => &[
                "trust", "friend", "support", "safe", "honest", "rely", "believe", "family",
                "faith",
            ],
            Emotion::Anticipation => &[
                "expect", "wait", "soon", "plan", "hope", "tomorrow", "future", "ready", "eager",
            ],
        }
    }
}

/// `{ top_emotion, scores }` as served to chat front-ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmotionReport {
    pub top_emotion: String,
    pub scores: BTreeMap<String, u32>,
}

impl EmotionReport {
    fn neutral() -> Self {
        Self {
            top_emotion: "neutral".to_string(),
            scores: BTreeMap::new(),
        }
    }
}

pub struct EmotionAnalyzer {
    stemmer: Stemmer,
    lexicon: HashMap<String, Vec<Emotion>>,
}

impl EmotionAnalyzer {
    pub fn new() -> Self {
        let stemmer = Stemmer::create(Algorithm::English);
        let mut lexicon: HashMap<String, Vec<Emotion>> = HashMap::new();

        for emotion in Emotion::ALL {
            for word in emotion.words() {
                let stem = stemmer.stem(word).into_owned();
                let entry = lexicon.entry(stem).or_default();
                if !entry.contains(&emotion) {
                    entry.push(emotion);
                }
            }
        }

        Self { stemmer, lexicon }
    }

    pub fn analyze(&self, text: &str) -> EmotionReport {
        let text = text.trim();
        if text.is_empty() {
            return EmotionReport::neutral();
        }

        let lowered = text.to_lowercase();
        let mut counts: HashMap<Emotion, u32> = HashMap::new();
        for word in WORD_REGEX.find_iter(&lowered) {
            let stem = self.stemmer.stem(word.as_str());
            if let Some(emotions) = self.lexicon.get(stem.as_ref()) {
                for emotion in emotions {
                    *counts.entry(*emotion).or_insert(0) += 1;
                }
            }
        }

        let mut top: Option<(Emotion, u32)> = None;
        let mut scores = BTreeMap::new();
        for emotion in Emotion::ALL {
            let score = counts.get(&emotion).copied().unwrap_or(0);
            scores.insert(emotion.as_str().to_string(), score);
            if score > 0 && top.map_or(true, |(_, best)| score > best) {
                top = Some((emotion, score));
            }
        }

        EmotionReport {
            top_emotion: top
                .map(|(emotion, _)| emotion.as_str().to_string())
                .unwrap_or_else(|| "neutral".to_string()),
            scores,
        }
    }
}

impl Default for EmotionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_neutral() {
        let report = EmotionAnalyzer::new().analyze("   ");
        assert_eq!(report.top_emotion, "neutral");
        assert!(report.scores.is_empty());
    }

    #[test]
    fn test_no_hits_is_neutral_with_zero_scores() {
        let report = EmotionAnalyzer::new().analyze("the table is brown");
        assert_eq!(report.top_emotion, "neutral");
        assert_eq!(report.scores.len(), 8);
        assert!(report.scores.values().all(|score| *score == 0));
    }

    #[test]
    fn test_counts_stemmed_hits() {
        let report = EmotionAnalyzer::new().analyze("I feel so sad and lonely");
        assert_eq!(report.top_emotion, "sadness");
        assert_eq!(report.scores["sadness"], 2);
    }

    #[test]
    fn test_inflected_forms_match() {
        let report = EmotionAnalyzer::new().analyze("I keep worrying, I'm so worried");
        assert_eq!(report.top_emotion, "fear");
        assert_eq!(report.scores["fear"], 2);
    }

    #[test]
    fn test_tie_goes_to_declared_order() {
        let report = EmotionAnalyzer::new().analyze("angry but happy");
        assert_eq!(report.scores["anger"], 1);
        assert_eq!(report.scores["happiness"], 1);
        assert_eq!(report.top_emotion, "happiness");
    }

    #[test]
    fn test_report_json_shape() {
        let report = EmotionAnalyzer::new().analyze("so scared");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["top_emotion"], "fear");
        assert_eq!(json["scores"]["fear"], 1);
    }
}
