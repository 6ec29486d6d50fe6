// Configuration structs

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::backend::BackendConfig;
use crate::crisis::{Helpline, LengthThresholds, Lexicon, DEFAULT_MENTION_THRESHOLD};

pub const DEFAULT_GREETING: &str = "Welcome to WizCare! I'm your mental health companion. \
How are you feeling today? I'm here to listen and support you. 💚";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reply-completion endpoint
    pub backend: BackendConfig,

    /// Classifier and escalation tuning
    pub escalation: EscalationConfig,

    /// Optional JSON file replacing the built-in crisis lexicon
    pub lexicon_path: Option<PathBuf>,

    /// Helpline shown with the crisis alert
    pub helpline: Helpline,

    /// Assistant message that opens every fresh session
    pub greeting: String,

    /// HTTP surface settings
    pub server: ServerConfig,

    /// Force debug-level logging
    pub debug_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            escalation: EscalationConfig::default(),
            lexicon_path: None,
            helpline: Helpline::default(),
            greeting: DEFAULT_GREETING.to_string(),
            server: ServerConfig::default(),
            debug_logging: false,
        }
    }
}

impl Config {
    /// Reject settings that would break the tier heuristics
    pub fn validate(&self) -> Result<()> {
        let esc = &self.escalation;
        if esc.critical_mention_threshold == 0 {
            bail!("escalation.critical_mention_threshold must be at least 1");
        }
        if esc.high_length_threshold <= esc.mid_length_threshold {
            bail!(
                "escalation.high_length_threshold ({}) must exceed mid_length_threshold ({})",
                esc.high_length_threshold,
                esc.mid_length_threshold
            );
        }
        if self.backend.url.trim().is_empty() {
            bail!("backend.url must not be empty");
        }
        if self.server.max_sessions == 0 {
            bail!("server.max_sessions must be at least 1");
        }
        Ok(())
    }

    /// The configured lexicon, or the canonical one
    pub fn load_lexicon(&self) -> Result<Lexicon> {
        match &self.lexicon_path {
            Some(path) => Lexicon::load_from_file(path),
            None => Ok(Lexicon::default()),
        }
    }

    /// Apply `WIZCARE_API_URL` / `WIZCARE_DEBUG` style overrides
    pub fn apply_overrides(&mut self, api_url: Option<String>, debug: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.backend.url = url;
        }
        if let Some(flag) = debug {
            if flag == "1" || flag.eq_ignore_ascii_case("true") {
                self.debug_logging = true;
            }
        }
    }

    /// Point at a different reply backend (`--api-url`). The result is
    /// validated like a loaded file.
    pub fn set_backend_url(&mut self, url: impl Into<String>) -> Result<()> {
        self.backend.url = url.into();
        self.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    /// Cumulative critical mentions that pin the session at Critical
    pub critical_mention_threshold: u32,
    /// Messages longer than this are at least Mid
    pub mid_length_threshold: usize,
    /// Messages longer than this are at least High
    pub high_length_threshold: usize,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        let lengths = LengthThresholds::default();
        Self {
            critical_mention_threshold: DEFAULT_MENTION_THRESHOLD,
            mid_length_threshold: lengths.mid,
            high_length_threshold: lengths.high,
        }
    }
}

impl EscalationConfig {
    pub fn length_thresholds(&self) -> LengthThresholds {
        LengthThresholds {
            mid: self.mid_length_threshold,
            high: self.high_length_threshold,
        }
    }
}

/// Configuration for the HTTP server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8000")
    pub bind_address: String,
    /// Maximum number of concurrent sessions
    pub max_sessions: usize,
    /// Idle session timeout in minutes
    pub session_timeout_minutes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
            max_sessions: 100,
            session_timeout_minutes: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.escalation.critical_mention_threshold, 2);
        assert_eq!(config.escalation.length_thresholds(), LengthThresholds::default());
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let mut config = Config::default();
        config.escalation.high_length_threshold = 40;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must exceed"));
    }

    #[test]
    fn test_validate_rejects_zero_mentions() {
        let mut config = Config::default();
        config.escalation.critical_mention_threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_set_backend_url_is_validated() {
        let mut config = Config::default();
        config.set_backend_url("http://example.test/chat").unwrap();
        assert_eq!(config.backend.url, "http://example.test/chat");

        let err = config.set_backend_url("  ").unwrap_err();
        assert!(err.to_string().contains("backend.url must not be empty"));
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(Some("http://example.test/chat".to_string()), Some("TRUE".to_string()));
        assert_eq!(config.backend.url, "http://example.test/chat");
        assert!(config.debug_logging);

        config.apply_overrides(Some("  ".to_string()), Some("0".to_string()));
        assert_eq!(config.backend.url, "http://example.test/chat");
        assert!(config.debug_logging);
    }

    #[test]
    fn test_canonical_lexicon_without_path() {
        let lexicon = Config::default().load_lexicon().unwrap();
        assert!(lexicon.is_critical_match("suicide"));
    }
}
