// Risk tiers and per-turn risk signals

use serde::{Deserialize, Serialize};
use std::fmt;

/// Four-level ordered risk classification assigned once per turn.
///
/// The derive order is the risk order, so `max()` and comparisons work
/// directly on the enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    #[default]
    Low,
    Mid,
    High,
    Critical,
}

impl RiskTier {
    pub const ALL: [RiskTier; 4] = [
        RiskTier::Low,
        RiskTier::Mid,
        RiskTier::High,
        RiskTier::Critical,
    ];

    /// Convert a backend-reported level. Anything outside 0-3 is rejected.
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            0 => Some(RiskTier::Low),
            1 => Some(RiskTier::Mid),
            2 => Some(RiskTier::High),
            3 => Some(RiskTier::Critical),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Mid => "mid",
            RiskTier::High => "high",
            RiskTier::Critical => "critical",
        }
    }

    /// Label shown on the stress meter
    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Mid => "Mid",
            RiskTier::High => "High",
            RiskTier::Critical => "Very High",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskTier::Low => "😊",
            RiskTier::Mid => "😐",
            RiskTier::High => "😟",
            RiskTier::Critical => "🚨",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskTier::Low => "Feeling good",
            RiskTier::Mid => "Slightly stressed",
            RiskTier::High => "Quite stressed",
            RiskTier::Critical => "Critical - Please seek help",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a per-turn tier came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    Heuristic,
    Backend,
}

/// Transient tier reading produced during a turn. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSignal {
    pub source: SignalSource,
    pub tier: RiskTier,
}

impl RiskSignal {
    pub fn heuristic(tier: RiskTier) -> Self {
        Self {
            source: SignalSource::Heuristic,
            tier,
        }
    }

    pub fn backend(tier: RiskTier) -> Self {
        Self {
            source: SignalSource::Backend,
            tier,
        }
    }

    /// Build a backend signal from the raw `stressLevel` value, dropping
    /// out-of-range levels.
    pub fn from_backend_level(level: i64) -> Option<Self> {
        match RiskTier::from_level(level) {
            Some(tier) => Some(Self::backend(tier)),
            None => {
                tracing::warn!(level, "Ignoring out-of-range backend stress level");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_are_ordered() {
        assert!(RiskTier::Low < RiskTier::Mid);
        assert!(RiskTier::Mid < RiskTier::High);
        assert!(RiskTier::High < RiskTier::Critical);
        assert_eq!(RiskTier::Mid.max(RiskTier::High), RiskTier::High);
    }

    #[test]
    fn test_from_level_rejects_out_of_range() {
        assert_eq!(RiskTier::from_level(0), Some(RiskTier::Low));
        assert_eq!(RiskTier::from_level(3), Some(RiskTier::Critical));
        assert_eq!(RiskTier::from_level(4), None);
        assert_eq!(RiskTier::from_level(-1), None);
    }

    #[test]
    fn test_level_round_trips_for_every_tier() {
        for tier in RiskTier::ALL {
            assert_eq!(RiskTier::from_level(tier.level() as i64), Some(tier));
        }
    }

    #[test]
    fn test_backend_signal_from_level() {
        let signal = RiskSignal::from_backend_level(2).unwrap();
        assert_eq!(signal.source, SignalSource::Backend);
        assert_eq!(signal.tier, RiskTier::High);
        assert!(RiskSignal::from_backend_level(7).is_none());
    }

    #[test]
    fn test_critical_label_matches_stress_meter() {
        assert_eq!(RiskTier::Critical.label(), "Very High");
        assert_eq!(RiskTier::Critical.to_string(), "Very High");
        assert_eq!(serde_json::to_string(&RiskTier::Mid).unwrap(), "\"mid\"");
    }
}
