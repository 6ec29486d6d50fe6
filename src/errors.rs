// Turn-level error taxonomy and user-facing messages
//
// Every failure a turn can hit is caught at the turn boundary and turned
// into an assistant message. The helpers at the bottom format diagnostics
// for the terminal.

use thiserror::Error;

pub const TRANSPORT_FALLBACK: &str =
    "Unable to connect to the server. Please make sure the backend is running.";
pub const SERVER_FALLBACK: &str = "Server error. Please try again later.";
pub const GENERIC_FALLBACK: &str = "Sorry, I am having trouble responding right now.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("message is empty")]
    InvalidInput,

    #[error("a turn is already in progress for this session")]
    TurnInProgress,

    #[error("could not reach the reply backend: {reason}")]
    TransportFailure { reason: String },

    #[error("reply backend failed: {reason}")]
    ServerFailure { reason: String },

    #[error("reply backend sent an unreadable response: {reason}")]
    MalformedReply { reason: String },
}

impl TurnError {
    pub fn transport(reason: impl Into<String>) -> Self {
        TurnError::TransportFailure {
            reason: reason.into(),
        }
    }

    pub fn server(reason: impl Into<String>) -> Self {
        TurnError::ServerFailure {
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        TurnError::MalformedReply {
            reason: reason.into(),
        }
    }

    /// Assistant text shown in place of a reply. `None` for errors that are
    /// rejected before anything is appended.
    pub fn fallback_message(&self) -> Option<&'static str> {
        match self {
            TurnError::InvalidInput | TurnError::TurnInProgress => None,
            TurnError::TransportFailure { .. } => Some(TRANSPORT_FALLBACK),
            TurnError::ServerFailure { .. } => Some(SERVER_FALLBACK),
            TurnError::MalformedReply { .. } => Some(GENERIC_FALLBACK),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TurnError::InvalidInput => "invalid_input",
            TurnError::TurnInProgress => "turn_in_progress",
            TurnError::TransportFailure { .. } => "transport_failure",
            TurnError::ServerFailure { .. } => "server_failure",
            TurnError::MalformedReply { .. } => "malformed_reply",
        }
    }
}

/// Format a backend-unreachable diagnostic with suggestions
pub fn connection_refused_error(url: &str) -> String {
    format!(
        "Could not reach the reply backend at {}\n\n\
        \x1b[1;33mPossible causes:\x1b[0m\n\
        • Backend is not running\n\
        • Wrong backend URL\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Start the backend service\n\n\
        2. Point wizcare at it:\n\
           \x1b[36mexport WIZCARE_API_URL=\"http://host:port/api/chat\"\x1b[0m\n\n\
        3. Check the configured URL:\n\
           \x1b[36mcat ~/.wizcare/config.toml\x1b[0m",
        url
    )
}

/// Format a config parse diagnostic with suggestions
pub fn config_parse_error(error: &str) -> String {
    format!(
        "Failed to load config file\n\n\
        \x1b[1;33mError:\x1b[0m {}\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Check config file syntax:\n\
           \x1b[36mcat ~/.wizcare/config.toml\x1b[0m\n\n\
        2. Move it aside to fall back to defaults:\n\
           \x1b[36mmv ~/.wizcare/config.toml ~/.wizcare/config.toml.backup\x1b[0m",
        error
    )
}
