//! Signal gate: owns the per-instrument state store
//!
//! Each entry is only mutated by the evaluation of its own instrument; the
//! lock is held for single transitions, never across I/O.

pub mod machine;

pub use machine::*;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::core::clock::Clock;
use crate::models::indicators::IndicatorSnapshot;
use crate::models::signal::{SignalCandidate, SignalDirection};
use crate::models::verdict::AdvisoryVerdict;

pub struct SignalGate {
    config: GateConfig,
    clock: Arc<dyn Clock>,
    states: RwLock<HashMap<String, InstrumentState>>,
}

impl SignalGate {
    pub fn new(config: GateConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            states: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Apply time-based expiries to every known instrument. Returns how many
    /// transitions happened.
    pub async fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut states = self.states.write().await;
        let mut expired = 0;
        for entry in states.values_mut() {
            let from = entry.state;
            if let Some(expiry) = entry.expire(now, &self.config) {
                expired += 1;
                log_transition(&entry.instrument_id, from, entry.state, &format!("{:?}", expiry));
            }
        }
        expired
    }

    /// Create the entry if needed, apply expiries and return the current state.
    pub async fn prepare(&self, instrument_id: &str) -> GateState {
        let now = self.clock.now();
        let mut states = self.states.write().await;
        let entry = states
            .entry(instrument_id.to_string())
            .or_insert_with(|| InstrumentState::new(instrument_id, now));
        let from = entry.state;
        if let Some(expiry) = entry.expire(now, &self.config) {
            log_transition(instrument_id, from, entry.state, &format!("{:?}", expiry));
        }
        entry.state
    }

    pub async fn observe(&self, candidate: &SignalCandidate, trigger: &IndicatorSnapshot) -> GateAction {
        let now = self.clock.now();
        let mut states = self.states.write().await;
        let entry = states
            .entry(candidate.instrument.clone())
            .or_insert_with(|| InstrumentState::new(candidate.instrument.as_str(), now));

        let from = entry.state;
        if let Some(expiry) = entry.expire(now, &self.config) {
            log_transition(&candidate.instrument, from, entry.state, &format!("{:?}", expiry));
        }

        let from = entry.state;
        let action = entry.observe(candidate, trigger, now, &self.config);
        if entry.state != from {
            log_transition(&candidate.instrument, from, entry.state, &format!("{:?}", action));
        } else if let GateAction::Suppressed(reason) = action {
            debug!(
                instrument = %candidate.instrument,
                direction = %candidate.direction,
                state = %entry.state,
                reason = %reason,
                "SignalGate: candidate suppressed for {} ({})",
                candidate.instrument,
                reason
            );
        }
        action
    }

    pub async fn resolve(
        &self,
        instrument_id: &str,
        direction: SignalDirection,
        verdict: &AdvisoryVerdict,
    ) -> Resolution {
        let now = self.clock.now();
        let mut states = self.states.write().await;
        let Some(entry) = states.get_mut(instrument_id) else {
            return Resolution::Stale;
        };

        let from = entry.state;
        let resolution = entry.resolve(direction, verdict, now, &self.config);
        if entry.state != from {
            log_transition(instrument_id, from, entry.state, verdict.verdict.as_str());
        }
        resolution
    }

    pub async fn state_of(&self, instrument_id: &str) -> Option<GateState> {
        self.states.read().await.get(instrument_id).map(|s| s.state)
    }

    pub async fn snapshot(&self, instrument_id: &str) -> Option<InstrumentState> {
        self.states.read().await.get(instrument_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }
}

fn log_transition(instrument: &str, from: GateState, to: GateState, cause: &str) {
    info!(
        instrument = %instrument,
        from = %from,
        to = %to,
        cause = %cause,
        "SignalGate: {} {} -> {}",
        instrument,
        from,
        to
    );
}
