// Turn lifecycle: begin (validate, classify, log the user message) and
// complete (escalate, log the reply). Completion is a reducer over the
// session; a reset between the two phases makes the completion a no-op.

use crate::client::ReplyCompletion;
use crate::crisis::{Classification, EscalationController, EscalationOutcome, RiskClassifier};
use crate::errors::{TurnError, GENERIC_FALLBACK};

use super::conversation::{ConversationSession, Message};

/// A turn whose reply has not arrived yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    epoch: u64,
    text: String,
    classification: Classification,
}

impl PendingTurn {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Everything needed to finish a turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnInput {
    pub classification: Classification,
    pub reply: Result<ReplyCompletion, TurnError>,
}

/// A turn that made it into the session
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedTurn {
    pub outcome: EscalationOutcome,
    pub assistant_message: Message,
    /// Set when the reply failed and fallback text was used
    pub error: Option<TurnError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnCommit {
    Committed(CommittedTurn),
    /// The session was reset while the reply was outstanding
    Discarded,
}

impl ConversationSession {
    /// Validate and record a user message, returning the turn to complete.
    ///
    /// Blank text fails with `InvalidInput` and a session with an
    /// outstanding turn fails with `TurnInProgress`; neither mutates.
    pub fn begin_turn(
        &mut self,
        text: &str,
        classifier: &RiskClassifier,
    ) -> Result<PendingTurn, TurnError> {
        if self.turn_pending {
            return Err(TurnError::TurnInProgress);
        }
        self.append_user_message(text)?;

        let classification = classifier.classify(text);
        self.turn_pending = true;

        Ok(PendingTurn {
            epoch: self.epoch,
            text: text.to_string(),
            classification,
        })
    }

    /// Finish a turn started with `begin_turn`
    pub fn complete_turn(
        &mut self,
        pending: PendingTurn,
        reply: Result<ReplyCompletion, TurnError>,
        controller: &EscalationController,
    ) -> TurnCommit {
        if pending.epoch != self.epoch {
            tracing::info!(
                turn_epoch = pending.epoch,
                session_epoch = self.epoch,
                "Discarding reply for a reset session"
            );
            return TurnCommit::Discarded;
        }

        let input = TurnInput {
            classification: pending.classification,
            reply,
        };
        TurnCommit::Committed(self.apply_turn_input(&input, controller))
    }

    /// Escalate and append the assistant message. A failed reply still
    /// commits the heuristic-only tier.
    pub fn apply_turn_input(
        &mut self,
        input: &TurnInput,
        controller: &EscalationController,
    ) -> CommittedTurn {
        let backend = input
            .reply
            .as_ref()
            .ok()
            .and_then(|reply| reply.backend_signal);

        let outcome = self.apply_turn_result(controller, &input.classification, backend);

        let (text, error) = match &input.reply {
            Ok(reply) => (reply.text.as_str(), None),
            Err(e) => (e.fallback_message().unwrap_or(GENERIC_FALLBACK), Some(e.clone())),
        };
        let assistant_message = self.append_assistant_message(text).clone();
        self.turn_pending = false;

        CommittedTurn {
            outcome,
            assistant_message,
            error,
        }
    }
}

/// Pure form of turn completion: `(session, input) -> session'`
pub fn reduce(
    session: &ConversationSession,
    input: &TurnInput,
    controller: &EscalationController,
) -> ConversationSession {
    let mut next = session.clone();
    next.apply_turn_input(input, controller);
    next
}
