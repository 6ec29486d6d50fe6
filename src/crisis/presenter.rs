// Read-only view handed to whatever renders the chat

use serde::{Deserialize, Serialize};

use super::escalation::RiskState;
use super::tier::RiskTier;

/// Crisis helpline shown alongside the alert block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Helpline {
    pub name: String,
    pub phone: String,
    pub url: String,
}

impl Default for Helpline {
    fn default() -> Self {
        Self {
            name: "Indian Mental Health Helpline".to_string(),
            phone: "8448-8448-45".to_string(),
            url: "https://manastha.com/".to_string(),
        }
    }
}

/// Tier indicator for the stress meter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierIndicator {
    pub tier: RiskTier,
    pub level: u8,
    pub label: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
}

impl From<RiskTier> for TierIndicator {
    fn from(tier: RiskTier) -> Self {
        Self {
            tier,
            level: tier.level(),
            label: tier.label(),
            emoji: tier.emoji(),
            description: tier.description(),
        }
    }
}

/// Everything a renderer needs after a turn. The core makes no rendering
/// decisions beyond this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertView {
    pub indicator: TierIndicator,
    pub alert_active: bool,
    pub helpline: Helpline,
}

impl AlertView {
    pub fn new(state: &RiskState, helpline: &Helpline) -> Self {
        Self {
            indicator: TierIndicator::from(state.current_tier()),
            alert_active: state.alert_active(),
            helpline: helpline.clone(),
        }
    }

    pub fn current_tier(&self) -> RiskTier {
        self.indicator.tier
    }
}

/// Conversation starters offered by the chat surface
pub const QUICK_REPLIES: [&str; 6] = [
    "I'm feeling anxious",
    "I need motivation",
    "I'm stressed",
    "I feel lonely",
    "I need a breathing exercise",
    "Tell me a positive quote",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crisis::{Classification, EscalationController};

    #[test]
    fn test_view_reflects_state() {
        let mut state = RiskState::default();
        let crisis = Classification {
            local_tier: RiskTier::Critical,
            critical_match: true,
        };
        EscalationController::default().apply(&mut state, &crisis, None);
        let view = AlertView::new(&state, &Helpline::default());

        assert!(view.alert_active);
        assert_eq!(view.current_tier(), RiskTier::Critical);
        assert_eq!(view.indicator.level, 3);
        assert_eq!(view.helpline.phone, "8448-8448-45");
    }

    #[test]
    fn test_view_serializes_for_renderers() {
        let view = AlertView::new(&RiskState::default(), &Helpline::default());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["alert_active"], false);
        assert_eq!(json["indicator"]["tier"], "low");
        assert_eq!(json["indicator"]["description"], "Feeling good");
        assert_eq!(json["helpline"]["url"], "https://manastha.com/");
    }
}
