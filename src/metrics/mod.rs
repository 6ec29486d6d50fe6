// Metrics module
// Prometheus counters for turns and crisis alerts

use anyhow::{Context, Result};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Process-wide counters, cheap to clone
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    turns: IntCounterVec,
    critical_matches: IntCounter,
    alerts_raised: IntCounter,
    active_sessions: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let turns = IntCounterVec::new(
            Opts::new("wizcare_turns_total", "Completed turns by outcome"),
            &["outcome"],
        )?;
        let critical_matches = IntCounter::new(
            "wizcare_critical_matches_total",
            "User messages that matched the crisis lexicon",
        )?;
        let alerts_raised = IntCounter::new(
            "wizcare_alerts_raised_total",
            "Turns on which the crisis alert became active",
        )?;
        let active_sessions =
            IntGauge::new("wizcare_active_sessions", "Sessions currently held in memory")?;

        registry.register(Box::new(turns.clone()))?;
        registry.register(Box::new(critical_matches.clone()))?;
        registry.register(Box::new(alerts_raised.clone()))?;
        registry.register(Box::new(active_sessions.clone()))?;

        Ok(Self {
            registry,
            turns,
            critical_matches,
            alerts_raised,
            active_sessions,
        })
    }

    /// `outcome` is "reply", "discarded" or a `TurnError::kind()`
    pub fn record_turn(&self, outcome: &str) {
        self.turns.with_label_values(&[outcome]).inc();
    }

    pub fn record_critical_match(&self) {
        self.critical_matches.inc();
    }

    pub fn record_alert_raised(&self) {
        self.alerts_raised.inc();
    }

    pub fn set_active_sessions(&self, count: usize) {
        self.active_sessions.set(count as i64);
    }

    pub fn turn_count(&self, outcome: &str) -> u64 {
        self.turns.with_label_values(&[outcome]).get()
    }

    /// Prometheus text exposition format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics output was not UTF-8")
    }
}
