// Escalation controller
//
// Merges the classifier result, an optional backend tier and the running
// critical-mention counter into the session's authoritative tier.

use serde::Serialize;

use super::classifier::Classification;
use super::tier::{RiskSignal, RiskTier};

pub const DEFAULT_MENTION_THRESHOLD: u32 = 2;

/// Authoritative risk state of a session.
///
/// `alert_active` is true exactly when `current_tier` is `Critical`, and
/// `critical_mention_count` only grows until the session is reset.
///
/// Only `EscalationController` produces new states, so the invariant
/// cannot be broken from outside this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RiskState {
    current_tier: RiskTier,
    critical_mention_count: u32,
    alert_active: bool,
}

impl RiskState {
    pub fn current_tier(&self) -> RiskTier {
        self.current_tier
    }

    pub fn critical_mention_count(&self) -> u32 {
        self.critical_mention_count
    }

    pub fn alert_active(&self) -> bool {
        self.alert_active
    }
}

/// What one escalation step did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EscalationOutcome {
    pub previous_tier: RiskTier,
    pub state: RiskState,
    /// The mention-count floor overrode both signals
    pub floor_applied: bool,
    /// The alert went from inactive to active on this turn
    pub alert_raised: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationController {
    mention_threshold: u32,
}

impl EscalationController {
    /// A threshold of zero is treated as one.
    pub fn new(mention_threshold: u32) -> Self {
        Self {
            mention_threshold: mention_threshold.max(1),
        }
    }

    pub fn mention_threshold(&self) -> u32 {
        self.mention_threshold
    }

    /// Compute the next risk state without touching the current one
    pub fn escalate(
        &self,
        state: &RiskState,
        classification: &Classification,
        backend: Option<RiskSignal>,
    ) -> EscalationOutcome {
        let start = backend
            .map(|signal| signal.tier)
            .unwrap_or(classification.local_tier);

        let critical_mention_count = if classification.critical_match {
            state.critical_mention_count.saturating_add(1)
        } else {
            state.critical_mention_count
        };

        let floor_applied = critical_mention_count >= self.mention_threshold;
        let current_tier = if floor_applied {
            RiskTier::Critical
        } else {
            start.max(classification.local_tier)
        };

        let alert_active = current_tier == RiskTier::Critical;

        EscalationOutcome {
            previous_tier: state.current_tier,
            state: RiskState {
                current_tier,
                critical_mention_count,
                alert_active,
            },
            floor_applied,
            alert_raised: alert_active && !state.alert_active,
        }
    }

    /// Escalate and commit into `state`
    pub fn apply(
        &self,
        state: &mut RiskState,
        classification: &Classification,
        backend: Option<RiskSignal>,
    ) -> EscalationOutcome {
        let outcome = self.escalate(state, classification, backend);
        *state = outcome.state;

        if outcome.alert_raised {
            tracing::warn!(
                mentions = outcome.state.critical_mention_count,
                floor_applied = outcome.floor_applied,
                "Risk escalated to critical; crisis alert raised"
            );
        } else if outcome.previous_tier != outcome.state.current_tier {
            tracing::info!(
                from = outcome.previous_tier.as_str(),
                to = outcome.state.current_tier.as_str(),
                "Risk tier changed"
            );
        }

        outcome
    }
}

impl Default for EscalationController {
    fn default() -> Self {
        Self::new(DEFAULT_MENTION_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_critical(tier: RiskTier) -> Classification {
        Classification {
            local_tier: tier,
            critical_match: false,
        }
    }

    fn critical() -> Classification {
        Classification {
            local_tier: RiskTier::Critical,
            critical_match: true,
        }
    }

    #[test]
    fn test_backend_tier_used_when_higher() {
        let controller = EscalationController::default();
        let mut state = RiskState::default();

        controller.apply(
            &mut state,
            &non_critical(RiskTier::Low),
            Some(RiskSignal::backend(RiskTier::High)),
        );
        assert_eq!(state.current_tier, RiskTier::High);
        assert!(!state.alert_active);
    }

    #[test]
    fn test_backend_never_lowers_local_tier() {
        let controller = EscalationController::default();
        let mut state = RiskState::default();

        controller.apply(
            &mut state,
            &non_critical(RiskTier::High),
            Some(RiskSignal::backend(RiskTier::Low)),
        );
        assert_eq!(state.current_tier, RiskTier::High);
    }

    #[test]
    fn test_backend_critical_raises_alert_without_mention() {
        let controller = EscalationController::default();
        let mut state = RiskState::default();

        let outcome = controller.apply(
            &mut state,
            &non_critical(RiskTier::Low),
            Some(RiskSignal::backend(RiskTier::Critical)),
        );
        assert_eq!(state.current_tier, RiskTier::Critical);
        assert!(state.alert_active);
        assert!(outcome.alert_raised);
        assert_eq!(state.critical_mention_count, 0);
    }

    #[test]
    fn test_single_mention_counts_once() {
        let controller = EscalationController::default();
        let mut state = RiskState::default();

        let outcome = controller.apply(&mut state, &critical(), None);
        assert_eq!(state.critical_mention_count, 1);
        assert_eq!(state.current_tier, RiskTier::Critical);
        assert!(state.alert_active);
        assert!(!outcome.floor_applied);
    }

    #[test]
    fn test_floor_forces_critical_regardless_of_signals() {
        let controller = EscalationController::default();
        let mut state = RiskState::default();

        controller.apply(&mut state, &critical(), None);
        controller.apply(&mut state, &critical(), Some(RiskSignal::backend(RiskTier::Low)));
        assert_eq!(state.critical_mention_count, 2);

        let outcome = controller.apply(
            &mut state,
            &non_critical(RiskTier::Low),
            Some(RiskSignal::backend(RiskTier::Low)),
        );
        assert!(outcome.floor_applied);
        assert_eq!(state.current_tier, RiskTier::Critical);
        assert!(state.alert_active);
        assert!(!outcome.alert_raised, "alert was already active");
    }

    #[test]
    fn test_single_mention_can_deescalate() {
        let controller = EscalationController::default();
        let mut state = RiskState::default();

        controller.apply(&mut state, &critical(), None);
        controller.apply(&mut state, &non_critical(RiskTier::Low), None);

        assert_eq!(state.current_tier, RiskTier::Low);
        assert!(!state.alert_active);
        assert_eq!(state.critical_mention_count, 1);
    }

    #[test]
    fn test_alert_stays_active_while_critical() {
        let controller = EscalationController::default();
        let mut state = RiskState::default();

        controller.apply(&mut state, &critical(), None);
        let outcome = controller.apply(
            &mut state,
            &non_critical(RiskTier::Low),
            Some(RiskSignal::backend(RiskTier::Critical)),
        );
        assert!(state.alert_active);
        assert!(!outcome.alert_raised);
    }

    #[test]
    fn test_custom_threshold() {
        let controller = EscalationController::new(3);
        let mut state = RiskState::default();

        controller.apply(&mut state, &critical(), None);
        controller.apply(&mut state, &critical(), None);
        controller.apply(&mut state, &non_critical(RiskTier::Low), None);
        assert_eq!(state.current_tier, RiskTier::Low);

        controller.apply(&mut state, &critical(), None);
        controller.apply(&mut state, &non_critical(RiskTier::Low), None);
        assert_eq!(state.current_tier, RiskTier::Critical);
    }

    #[test]
    fn test_zero_threshold_is_clamped() {
        assert_eq!(EscalationController::new(0).mention_threshold(), 1);
    }

    #[test]
    fn test_alert_tracks_critical_for_every_reachable_state() {
        let controller = EscalationController::default();
        let backends = [None]
            .into_iter()
            .chain(RiskTier::ALL.iter().map(|tier| Some(RiskSignal::backend(*tier))));

        for backend in backends {
            for classification in [
                critical(),
                non_critical(RiskTier::Low),
                non_critical(RiskTier::Mid),
                non_critical(RiskTier::High),
            ] {
                let mut state = RiskState::default();
                for _ in 0..3 {
                    controller.apply(&mut state, &classification, backend);
                    assert_eq!(
                        state.alert_active(),
                        state.current_tier() == RiskTier::Critical
                    );
                }
            }
        }
    }

    #[test]
    fn test_escalate_is_pure() {
        let controller = EscalationController::default();
        let state = RiskState::default();

        let first = controller.escalate(&state, &critical(), None);
        let second = controller.escalate(&state, &critical(), None);
        assert_eq!(first, second);
        assert_eq!(state, RiskState::default());
    }
}
