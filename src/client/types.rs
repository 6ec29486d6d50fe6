// Wire types for the reply-completion call

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::crisis::RiskSignal;
use crate::errors::TurnError;

/// `POST` body: `{ "message": ... }`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// Response body. Success carries `response` (and maybe `stressLevel`),
/// failure carries `error`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default, rename = "stressLevel")]
    pub stress_level: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

/// A successful reply, ready for the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyCompletion {
    pub text: String,
    /// Present only when the backend sent a valid 0-3 level
    pub backend_signal: Option<RiskSignal>,
}

impl ReplyCompletion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            backend_signal: None,
        }
    }

    pub fn with_signal(mut self, signal: RiskSignal) -> Self {
        self.backend_signal = Some(signal);
        self
    }
}

impl ChatResponse {
    /// The backend's error text, if the body reports one
    pub fn error_message(&self) -> Option<String> {
        match &self.error {
            None | Some(Value::Null) | Some(Value::Bool(false)) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }

    /// Integer stress level, accepting whole floats such as `2.0`
    fn stress_level_value(&self) -> Option<i64> {
        let value = self.stress_level.as_ref()?;
        if let Some(level) = value.as_i64() {
            return Some(level);
        }
        match value.as_f64() {
            Some(f) if f.fract() == 0.0 => Some(f as i64),
            _ => {
                if !value.is_null() {
                    tracing::warn!(stress_level = %value, "Ignoring non-integer backend stress level");
                }
                None
            }
        }
    }

    pub fn into_completion(self) -> Result<ReplyCompletion, TurnError> {
        if let Some(error) = self.error_message() {
            return Err(TurnError::server(error));
        }

        let backend_signal = self
            .stress_level_value()
            .and_then(RiskSignal::from_backend_level);

        match self.response {
            Some(text) if !text.trim().is_empty() => Ok(ReplyCompletion {
                text,
                backend_signal,
            }),
            Some(_) => Err(TurnError::malformed("empty response text")),
            None => Err(TurnError::malformed("missing response field")),
        }
    }
}
