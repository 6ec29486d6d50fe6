// Conversation session: ordered message log plus authoritative risk state

use serde::{Deserialize, Serialize};

use crate::crisis::{
    AlertView, Classification, EscalationController, EscalationOutcome, Helpline, RiskSignal,
    RiskState, RiskTier,
};
use crate::errors::TurnError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

/// One chat message. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    /// Position in the session log, starting at 0
    pub sequence: usize,
}

/// Append-only message log and the risk state derived from it.
///
/// Risk fields only change through `apply_turn_result`, which delegates to
/// the escalation controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationSession {
    messages: Vec<Message>,
    risk: RiskState,
    #[serde(skip)]
    greeting: Option<String>,
    /// Bumped on every reset so late replies can be recognised
    #[serde(skip)]
    pub(super) epoch: u64,
    #[serde(skip)]
    pub(super) turn_pending: bool,
}

impl ConversationSession {
    /// Create an empty session (tier Low, no mentions)
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            risk: RiskState::default(),
            greeting: None,
            epoch: 0,
            turn_pending: false,
        }
    }

    /// Create a session whose log opens with an assistant greeting
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let mut session = Self::new();
        session.greeting = Some(greeting.into());
        session.seed_greeting();
        session
    }

    fn seed_greeting(&mut self) {
        if let Some(greeting) = self.greeting.clone() {
            self.push(Sender::Assistant, greeting);
        }
    }

    fn push(&mut self, sender: Sender, text: String) -> &Message {
        let sequence = self.messages.len();
        self.messages.push(Message {
            sender,
            text,
            sequence,
        });
        &self.messages[sequence]
    }

    /// Append a user message. Blank text is rejected and nothing changes.
    pub fn append_user_message(&mut self, text: &str) -> Result<&Message, TurnError> {
        if text.trim().is_empty() {
            return Err(TurnError::InvalidInput);
        }
        Ok(self.push(Sender::User, text.to_string()))
    }

    /// Append an assistant reply
    pub fn append_assistant_message(&mut self, text: &str) -> &Message {
        self.push(Sender::Assistant, text.to_string())
    }

    /// Run escalation for a completed turn and commit the result
    pub fn apply_turn_result(
        &mut self,
        controller: &EscalationController,
        classification: &Classification,
        backend: Option<RiskSignal>,
    ) -> EscalationOutcome {
        controller.apply(&mut self.risk, classification, backend)
    }

    /// Start over (logout / new chat). Replies still in flight for the old
    /// conversation will be discarded.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.risk = RiskState::default();
        self.turn_pending = false;
        self.epoch = self.epoch.wrapping_add(1);
        self.seed_greeting();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn risk(&self) -> &RiskState {
        &self.risk
    }

    pub fn current_tier(&self) -> RiskTier {
        self.risk.current_tier()
    }

    pub fn critical_mention_count(&self) -> u32 {
        self.risk.critical_mention_count()
    }

    pub fn alert_active(&self) -> bool {
        self.risk.alert_active()
    }

    pub fn is_turn_pending(&self) -> bool {
        self.turn_pending
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn alert_view(&self, helpline: &Helpline) -> AlertView {
        AlertView::new(&self.risk, helpline)
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_creation() {
        let session = ConversationSession::new();
        assert_eq!(session.message_count(), 0);
        assert_eq!(session.current_tier(), RiskTier::Low);
        assert_eq!(session.critical_mention_count(), 0);
        assert!(!session.alert_active());
    }

    #[test]
    fn test_add_messages_in_order() {
        let mut session = ConversationSession::new();

        session.append_user_message("Hello").unwrap();
        session.append_assistant_message("Hi there!");

        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].text, "Hello");
        assert_eq!(messages[0].sequence, 0);
        assert_eq!(messages[1].sender, Sender::Assistant);
        assert_eq!(messages[1].sequence, 1);
    }

    #[test]
    fn test_blank_user_message_rejected() {
        let mut session = ConversationSession::new();

        assert_eq!(session.append_user_message("").unwrap_err(), TurnError::InvalidInput);
        assert_eq!(session.append_user_message("  \n\t").unwrap_err(), TurnError::InvalidInput);
        assert_eq!(session.message_count(), 0);
    }

    #[test]
    fn test_greeting_opens_session() {
        let session = ConversationSession::with_greeting("Welcome!");
        assert_eq!(session.message_count(), 1);
        assert_eq!(session.messages()[0].sender, Sender::Assistant);
        assert_eq!(session.messages()[0].text, "Welcome!");
    }

    #[test]
    fn test_reset_clears_state_and_bumps_epoch() {
        let controller = EscalationController::default();
        let mut session = ConversationSession::with_greeting("Welcome!");
        session.append_user_message("suicide").unwrap();
        session.apply_turn_result(
            &controller,
            &Classification {
                local_tier: RiskTier::Critical,
                critical_match: true,
            },
            None,
        );
        assert!(session.alert_active());

        let epoch = session.epoch();
        session.reset();

        assert_eq!(session.epoch(), epoch + 1);
        assert_eq!(session.message_count(), 1);
        assert_eq!(session.current_tier(), RiskTier::Low);
        assert_eq!(session.critical_mention_count(), 0);
        assert!(!session.alert_active());
    }

    #[test]
    fn test_serializes_messages_and_risk() {
        let mut session = ConversationSession::new();
        session.append_user_message("hello").unwrap();

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["messages"][0]["sender"], "user");
        assert_eq!(json["risk"]["current_tier"], "low");
        assert!(json.get("epoch").is_none());
    }
}
