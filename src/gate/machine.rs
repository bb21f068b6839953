//! Per-instrument hysteresis state machine
//!
//! ```text
//! Idle ──candidate──▶ PendingConfirm ──confirm──▶ Active{Long,Short}
//!   ▲                      │ reject/abstain/timeout        │ release band
//!   │                      ▼                               ▼
//!   └──────────────────── Idle (debounced)          Cooldown ──dwell──▶ Idle
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

use crate::models::indicators::IndicatorSnapshot;
use crate::models::signal::{SignalCandidate, SignalDirection};
use crate::models::verdict::{AdvisoryVerdict, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateState {
    Idle,
    PendingConfirm,
    ActiveLong,
    ActiveShort,
    Cooldown,
}

impl GateState {
    pub fn active(direction: SignalDirection) -> Option<Self> {
        match direction {
            SignalDirection::Long => Some(GateState::ActiveLong),
            SignalDirection::Short => Some(GateState::ActiveShort),
            SignalDirection::None => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, GateState::ActiveLong | GateState::ActiveShort)
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GateState::Idle => "IDLE",
            GateState::PendingConfirm => "PENDING_CONFIRM",
            GateState::ActiveLong => "ACTIVE_LONG",
            GateState::ActiveShort => "ACTIVE_SHORT",
            GateState::Cooldown => "COOLDOWN",
        };
        f.write_str(label)
    }
}

/// Gate timing and hysteresis settings.
///
/// Release thresholds must sit outside the classifier's trigger bands: a long
/// releases only once momentum falls below `long_release_below`, which is
/// lower than the long trigger floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub long_release_below: f64,
    pub short_release_above: f64,
    /// Also release when the averages cross against the active direction.
    pub release_on_crossover: bool,
    pub cooldown_seconds: u64,
    pub debounce_seconds: u64,
    pub max_pending_seconds: u64,
    pub allow_reversal: bool,
    /// When false candidates activate without consulting the oracle.
    pub confirmation_required: bool,
    pub min_confirm_confidence: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            long_release_below: 49.0,
            short_release_above: 51.0,
            release_on_crossover: true,
            cooldown_seconds: 30 * 60,
            debounce_seconds: 15 * 60,
            max_pending_seconds: 120,
            allow_reversal: false,
            confirmation_required: true,
            min_confirm_confidence: 0.0,
        }
    }
}

impl GateConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_secs(self.debounce_seconds)
    }

    pub fn max_pending(&self) -> Duration {
        Duration::from_secs(self.max_pending_seconds)
    }
}

/// What the caller should do after [`InstrumentState::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    Hold,
    Suppressed(SuppressReason),
    /// State is now `PendingConfirm`; consult the oracle.
    RequestConfirmation(SignalDirection),
    /// Activated directly because confirmation is disabled.
    Activated(SignalDirection),
    /// Active state released into cooldown.
    Released(SignalDirection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    AlreadyActive,
    CoolingDown,
    Debounced,
    ReversalDisabled,
    ConfirmationInFlight,
}

impl fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SuppressReason::AlreadyActive => "already active",
            SuppressReason::CoolingDown => "cooling down",
            SuppressReason::Debounced => "debounced after rejection",
            SuppressReason::ReversalDisabled => "reversal disabled",
            SuppressReason::ConfirmationInFlight => "confirmation in flight",
        };
        f.write_str(label)
    }
}

/// Outcome of [`InstrumentState::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Activated(SignalDirection),
    /// Carries the effective verdict (a low-confidence confirm counts as abstain).
    Rejected(Verdict),
    /// The state is no longer waiting for this verdict.
    Stale,
}

/// Time-based transition applied by [`InstrumentState::expire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    CooldownElapsed,
    PendingTimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Activation {
    state: GateState,
    direction: SignalDirection,
    entered_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingConfirmation {
    direction: SignalDirection,
    /// Active state to restore when a reversal is not confirmed.
    resume: Option<Activation>,
}

/// Debounce deadline per direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Debounce {
    long: Option<Instant>,
    short: Option<Instant>,
}

impl Debounce {
    fn slot(&mut self, direction: SignalDirection) -> Option<&mut Option<Instant>> {
        match direction {
            SignalDirection::Long => Some(&mut self.long),
            SignalDirection::Short => Some(&mut self.short),
            SignalDirection::None => None,
        }
    }

    fn until(&self, direction: SignalDirection) -> Option<Instant> {
        match direction {
            SignalDirection::Long => self.long,
            SignalDirection::Short => self.short,
            SignalDirection::None => None,
        }
    }

    fn set(&mut self, direction: SignalDirection, until: Instant) {
        if let Some(slot) = self.slot(direction) {
            *slot = Some(until);
        }
    }

    fn clear(&mut self, direction: SignalDirection) {
        if let Some(slot) = self.slot(direction) {
            *slot = None;
        }
    }

    fn prune(&mut self, now: Instant) {
        for slot in [&mut self.long, &mut self.short] {
            if slot.map(|until| now >= until).unwrap_or(false) {
                *slot = None;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentState {
    pub instrument_id: String,
    pub state: GateState,
    pub last_direction: SignalDirection,
    pub entered_at: Instant,
    pending: Option<PendingConfirmation>,
    debounce: Debounce,
}

impl InstrumentState {
    pub fn new(instrument_id: impl Into<String>, now: Instant) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            state: GateState::Idle,
            last_direction: SignalDirection::None,
            entered_at: now,
            pending: None,
            debounce: Debounce::default(),
        }
    }

    /// Direction awaiting confirmation, if any.
    pub fn pending_direction(&self) -> Option<SignalDirection> {
        self.pending.map(|p| p.direction)
    }

    pub fn is_debounced(&self, direction: SignalDirection, now: Instant) -> bool {
        self.debounce
            .until(direction)
            .map(|until| now < until)
            .unwrap_or(false)
    }

    /// Apply time-based transitions.
    pub fn expire(&mut self, now: Instant, config: &GateConfig) -> Option<Expiry> {
        self.debounce.prune(now);

        let dwell = now.saturating_duration_since(self.entered_at);
        match self.state {
            GateState::Cooldown if dwell >= config.cooldown() => {
                self.enter(GateState::Idle, now);
                Some(Expiry::CooldownElapsed)
            }
            GateState::PendingConfirm if dwell >= config.max_pending() => {
                self.abandon_pending(now, config);
                Some(Expiry::PendingTimedOut)
            }
            _ => None,
        }
    }

    /// Feed a fresh candidate and the trigger-timeframe snapshot.
    pub fn observe(
        &mut self,
        candidate: &SignalCandidate,
        trigger: &IndicatorSnapshot,
        now: Instant,
        config: &GateConfig,
    ) -> GateAction {
        let direction = candidate.direction;
        match self.state {
            GateState::PendingConfirm => GateAction::Suppressed(SuppressReason::ConfirmationInFlight),
            GateState::Cooldown => {
                if direction.is_none() {
                    GateAction::Hold
                } else {
                    GateAction::Suppressed(SuppressReason::CoolingDown)
                }
            }
            GateState::ActiveLong | GateState::ActiveShort => {
                let active = self.last_direction;
                let opposite = !direction.is_none() && direction != active;

                if opposite && config.allow_reversal && !self.is_debounced(direction, now) {
                    let resume = Activation {
                        state: self.state,
                        direction: active,
                        entered_at: self.entered_at,
                    };
                    return self.begin(direction, Some(resume), now, config);
                }

                if should_release(active, trigger, config) {
                    self.enter(GateState::Cooldown, now);
                    return GateAction::Released(active);
                }

                if direction.is_none() {
                    GateAction::Hold
                } else if direction == active {
                    GateAction::Suppressed(SuppressReason::AlreadyActive)
                } else if config.allow_reversal {
                    GateAction::Suppressed(SuppressReason::Debounced)
                } else {
                    GateAction::Suppressed(SuppressReason::ReversalDisabled)
                }
            }
            GateState::Idle => {
                if direction.is_none() {
                    GateAction::Hold
                } else if self.is_debounced(direction, now) {
                    GateAction::Suppressed(SuppressReason::Debounced)
                } else {
                    self.begin(direction, None, now, config)
                }
            }
        }
    }

    /// Apply the oracle verdict for a pending direction.
    pub fn resolve(
        &mut self,
        direction: SignalDirection,
        verdict: &AdvisoryVerdict,
        now: Instant,
        config: &GateConfig,
    ) -> Resolution {
        let waiting = self.state == GateState::PendingConfirm
            && self.pending_direction() == Some(direction);
        if !waiting {
            return Resolution::Stale;
        }

        if verdict.is_confirm() && verdict.confidence >= config.min_confirm_confidence {
            self.pending = None;
            self.activate(direction, now);
            return Resolution::Activated(direction);
        }

        let effective = match verdict.verdict {
            Verdict::Confirm => Verdict::Abstain,
            other => other,
        };
        self.abandon_pending(now, config);
        Resolution::Rejected(effective)
    }

    fn begin(
        &mut self,
        direction: SignalDirection,
        resume: Option<Activation>,
        now: Instant,
        config: &GateConfig,
    ) -> GateAction {
        if !config.confirmation_required {
            self.activate(direction, now);
            return GateAction::Activated(direction);
        }
        self.pending = Some(PendingConfirmation { direction, resume });
        self.enter(GateState::PendingConfirm, now);
        GateAction::RequestConfirmation(direction)
    }

    fn activate(&mut self, direction: SignalDirection, now: Instant) {
        if let Some(state) = GateState::active(direction) {
            self.last_direction = direction;
            self.debounce.clear(direction);
            self.enter(state, now);
        }
    }

    fn abandon_pending(&mut self, now: Instant, config: &GateConfig) {
        let pending = self.pending.take();
        if let Some(p) = pending {
            self.debounce.set(p.direction, now + config.debounce());
        }

        match pending.and_then(|p| p.resume) {
            Some(previous) => {
                self.state = previous.state;
                self.last_direction = previous.direction;
                self.entered_at = previous.entered_at;
            }
            None => self.enter(GateState::Idle, now),
        }
    }

    fn enter(&mut self, state: GateState, now: Instant) {
        self.state = state;
        self.entered_at = now;
    }
}

/// Whether the market has left an active direction through the release band.
pub fn should_release(
    active: SignalDirection,
    snapshot: &IndicatorSnapshot,
    config: &GateConfig,
) -> bool {
    let crossed = config.release_on_crossover;
    match active {
        SignalDirection::Long => {
            snapshot.momentum < config.long_release_below
                || (crossed && snapshot.ema_fast < snapshot.ema_slow)
        }
        SignalDirection::Short => {
            snapshot.momentum > config.short_release_above
                || (crossed && snapshot.ema_fast > snapshot.ema_slow)
        }
        SignalDirection::None => true,
    }
}
