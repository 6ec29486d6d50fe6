// Crisis phrase lexicon
//
// One canonical list of self-harm, suicidal-ideation and death wording.
// Every classification path consults the same `Lexicon`.

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Built-in crisis phrases, lowercase. Matching is substring based.
pub const CANONICAL_PHRASES: &[&str] = &[
    "death",
    "die",
    "dying",
    "dieing",
    "suicide",
    "kill myself",
    "killing",
    "murder",
    "end my life",
    "self-harm",
    "hurt myself",
    "take my life",
    "i want to die",
    "i want die",
    "cut myself",
    "no reason to live",
    "better off dead",
    "world without me",
    "end it all",
];

static CANONICAL: Lazy<Lexicon> = Lazy::new(|| {
    Lexicon::from_phrases(CANONICAL_PHRASES.iter().copied())
});

/// On-disk form of a replacement lexicon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconFile {
    pub phrases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexicon {
    phrases: Vec<String>,
}

impl Lexicon {
    /// The built-in canonical lexicon
    pub fn canonical() -> &'static Lexicon {
        &CANONICAL
    }

    /// Build a lexicon from arbitrary phrases. Phrases are lowercased,
    /// trimmed and deduplicated; blanks are dropped.
    pub fn from_phrases<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for phrase in phrases {
            let phrase = phrase.as_ref().trim().to_lowercase();
            if !phrase.is_empty() && !normalized.contains(&phrase) {
                normalized.push(phrase);
            }
        }
        Self { phrases: normalized }
    }

    /// Load a replacement lexicon from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read lexicon file: {}", path.display()))?;

        let file: LexiconFile = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse lexicon file: {}", path.display()))?;

        let lexicon = Self::from_phrases(file.phrases);
        if lexicon.is_empty() {
            bail!("Lexicon file {} contains no phrases", path.display());
        }
        Ok(lexicon)
    }

    /// Case-insensitive substring match against every phrase
    pub fn is_critical_match(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }

    /// The first phrase found in `text`, if any
    pub fn first_match(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.phrases
            .iter()
            .find(|phrase| lowered.contains(phrase.as_str()))
            .map(String::as_str)
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::canonical().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_crisis_detection() {
        let lexicon = Lexicon::canonical();

        assert!(lexicon.is_critical_match("I'm thinking about suicide"));
        assert!(lexicon.is_critical_match("I want to kill myself"));
        assert!(lexicon.is_critical_match("everyone is better off dead than me"));
        assert!(!lexicon.is_critical_match("What is the meaning of life?"));
    }

    #[test]
    fn test_case_insensitive() {
        let lexicon = Lexicon::canonical();

        assert!(lexicon.is_critical_match("SUICIDE"));
        assert!(lexicon.is_critical_match("SuIcIdE"));
        assert!(lexicon.is_critical_match("I Want To DIE"));
    }

    #[test]
    fn test_formerly_narrow_list_terms_are_included() {
        // "killing", "dieing" and "murder" used to live on a separate list
        let lexicon = Lexicon::canonical();

        assert!(lexicon.is_critical_match("the stress is killing me"));
        assert!(lexicon.is_critical_match("i feel like dieing"));
        assert!(lexicon.is_critical_match("murder"));
    }

    #[test]
    fn test_first_match_reports_phrase() {
        let lexicon = Lexicon::canonical();
        assert_eq!(lexicon.first_match("thoughts of suicide"), Some("suicide"));
        assert_eq!(lexicon.first_match("just tired"), None);
    }

    #[test]
    fn test_from_phrases_normalizes() {
        let lexicon = Lexicon::from_phrases(["  Suicide ", "suicide", "", "End It All"]);
        assert_eq!(lexicon.phrases(), &["suicide".to_string(), "end it all".to_string()]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"phrases": ["Give Up", "no way out"]}}"#).unwrap();

        let lexicon = Lexicon::load_from_file(file.path()).unwrap();
        assert_eq!(lexicon.len(), 2);
        assert!(lexicon.is_critical_match("I just want to GIVE UP"));
        assert!(!lexicon.is_critical_match("suicide"));
    }

    #[test]
    fn test_load_from_file_rejects_empty_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"phrases": ["   "]}}"#).unwrap();

        let err = Lexicon::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("contains no phrases"));
    }
}
