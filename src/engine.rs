// Turn orchestration
//
// validate -> classify -> reply backend -> escalate -> commit. Turn-level
// failures never escape: they become fallback assistant messages.

use anyhow::Result;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::client::{ReplyBackend, ReplyCompletion};
use crate::config::Config;
use crate::crisis::{AlertView, EscalationController, Helpline, RiskClassifier};
use crate::errors::TurnError;
use crate::metrics::Metrics;
use crate::session::{ConversationSession, PendingTurn, TurnCommit};

/// Short stable fingerprint for logging user text without its content
pub fn text_hash(text: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(text.as_bytes()));
    digest[..12].to_string()
}

pub struct ChatEngine {
    classifier: RiskClassifier,
    controller: EscalationController,
    backend: Arc<dyn ReplyBackend>,
    helpline: Helpline,
    greeting: Option<String>,
    metrics: Option<Metrics>,
}

impl ChatEngine {
    pub fn new(
        classifier: RiskClassifier,
        controller: EscalationController,
        backend: Arc<dyn ReplyBackend>,
    ) -> Self {
        Self {
            classifier,
            controller,
            backend,
            helpline: Helpline::default(),
            greeting: None,
            metrics: None,
        }
    }

    /// Build an engine from configuration (lexicon, thresholds, helpline,
    /// greeting)
    pub fn from_config(config: &Config, backend: Arc<dyn ReplyBackend>) -> Result<Self> {
        let lexicon = Arc::new(config.load_lexicon()?);
        let classifier = RiskClassifier::new(lexicon, config.escalation.length_thresholds());
        let controller = EscalationController::new(config.escalation.critical_mention_threshold);

        Ok(Self::new(classifier, controller, backend)
            .with_helpline(config.helpline.clone())
            .with_greeting(config.greeting.clone()))
    }

    pub fn with_helpline(mut self, helpline: Helpline) -> Self {
        self.helpline = helpline;
        self
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        self.greeting = if greeting.trim().is_empty() {
            None
        } else {
            Some(greeting)
        };
        self
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// A fresh session (new chat)
    pub fn new_session(&self) -> ConversationSession {
        match &self.greeting {
            Some(greeting) => ConversationSession::with_greeting(greeting.clone()),
            None => ConversationSession::new(),
        }
    }

    pub fn alert_view(&self, session: &ConversationSession) -> AlertView {
        session.alert_view(&self.helpline)
    }

    pub fn helpline(&self) -> &Helpline {
        &self.helpline
    }

    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    pub fn controller(&self) -> &EscalationController {
        &self.controller
    }

    /// Phase one: record the user message. Nothing reaches the backend if
    /// this fails.
    pub fn begin(
        &self,
        session: &mut ConversationSession,
        text: &str,
    ) -> Result<PendingTurn, TurnError> {
        let pending = session.begin_turn(text, &self.classifier).map_err(|e| {
            tracing::debug!(error = %e, "Turn rejected");
            e
        })?;

        let classification = pending.classification();
        tracing::info!(
            text_hash = %text_hash(text),
            local_tier = classification.local_tier.as_str(),
            critical_match = classification.critical_match,
            "Turn started"
        );

        Ok(pending)
    }

    /// Ask the backend for a reply. Holds no session state.
    pub async fn fetch_reply(&self, pending: &PendingTurn) -> Result<ReplyCompletion, TurnError> {
        let reply = self.backend.complete(pending.text()).await;
        if let Err(e) = &reply {
            tracing::warn!(backend = self.backend.name(), error = %e, "Reply failed; using fallback");
        }
        reply
    }

    /// Phase two: escalate and commit, unless the session was reset
    pub fn finish(
        &self,
        session: &mut ConversationSession,
        pending: PendingTurn,
        reply: Result<ReplyCompletion, TurnError>,
    ) -> TurnCommit {
        let critical_match = pending.classification().critical_match;
        let commit = session.complete_turn(pending, reply, &self.controller);

        match &commit {
            TurnCommit::Committed(turn) => {
                let state = turn.outcome.state;
                tracing::info!(
                    tier = state.current_tier().as_str(),
                    mentions = state.critical_mention_count(),
                    alert_active = state.alert_active(),
                    fallback = turn.error.is_some(),
                    "Turn committed"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_turn(turn.error.as_ref().map_or("reply", TurnError::kind));
                    if critical_match {
                        metrics.record_critical_match();
                    }
                    if turn.outcome.alert_raised {
                        metrics.record_alert_raised();
                    }
                }
            }
            TurnCommit::Discarded => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_turn("discarded");
                }
            }
        }

        commit
    }

    /// Run one whole turn on an exclusively held session
    pub async fn run_turn(
        &self,
        session: &mut ConversationSession,
        text: &str,
    ) -> Result<TurnCommit, TurnError> {
        let pending = self.begin(session, text)?;
        let reply = self.fetch_reply(&pending).await;
        Ok(self.finish(session, pending, reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crisis::RiskTier;
    use async_trait::async_trait;

    struct EchoBackend;

    #[async_trait]
    impl ReplyBackend for EchoBackend {
        async fn complete(&self, message: &str) -> Result<ReplyCompletion, TurnError> {
            Ok(ReplyCompletion::new(format!("You said: {}", message)))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn engine() -> ChatEngine {
        ChatEngine::from_config(&Config::default(), Arc::new(EchoBackend)).unwrap()
    }

    #[test]
    fn test_text_hash_is_stable_and_short() {
        assert_eq!(text_hash("hello"), text_hash("hello"));
        assert_ne!(text_hash("hello"), text_hash("hullo"));
        assert_eq!(text_hash("hello").len(), 12);
    }

    #[test]
    fn test_new_session_has_greeting() {
        let session = engine().new_session();
        assert_eq!(session.message_count(), 1);
        assert!(session.messages()[0].text.starts_with("Welcome to WizCare"));
    }

    #[test]
    fn test_blank_greeting_means_empty_session() {
        let engine = engine().with_greeting("  ");
        assert_eq!(engine.new_session().message_count(), 0);
    }

    #[tokio::test]
    async fn test_run_turn_appends_reply() {
        let engine = engine();
        let mut session = engine.new_session();

        let commit = engine.run_turn(&mut session, "hello").await.unwrap();
        let TurnCommit::Committed(turn) = commit else {
            panic!("turn should commit");
        };
        assert_eq!(turn.assistant_message.text, "You said: hello");
        assert_eq!(session.message_count(), 3);
        assert_eq!(engine.alert_view(&session).current_tier(), RiskTier::Low);
    }

    #[tokio::test]
    async fn test_run_turn_records_metrics() {
        let metrics = Metrics::new().unwrap();
        let engine = engine().with_metrics(metrics.clone());
        let mut session = engine.new_session();

        engine.run_turn(&mut session, "suicide").await.unwrap();
        assert_eq!(metrics.turn_count("reply"), 1);
        assert!(metrics.render().unwrap().contains("wizcare_alerts_raised_total 1"));
    }

    #[tokio::test]
    async fn test_discarded_turn_is_not_a_critical_match() {
        let metrics = Metrics::new().unwrap();
        let engine = engine().with_metrics(metrics.clone());
        let mut session = engine.new_session();

        let pending = engine.begin(&mut session, "I want to die").unwrap();
        let reply = engine.fetch_reply(&pending).await;
        session.reset();
        assert_eq!(engine.finish(&mut session, pending, reply), TurnCommit::Discarded);

        let rendered = metrics.render().unwrap();
        assert!(rendered.contains("wizcare_critical_matches_total 0"));
        assert_eq!(metrics.turn_count("discarded"), 1);

        engine.run_turn(&mut session, "I want to die").await.unwrap();
        assert!(metrics
            .render()
            .unwrap()
            .contains("wizcare_critical_matches_total 1"));
    }
}
