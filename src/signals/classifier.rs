//! Directional classification of indicator snapshots

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::indicators::IndicatorSnapshot;
use crate::models::instrument::{Instrument, Timeframe};
use crate::models::signal::{SignalCandidate, SignalDirection, TriggerRule};
use crate::signals::multi_timeframe;
use crate::signals::scoring::{band_position, trend_strength_score};

/// Snapshots of one instrument keyed by timeframe.
pub type SnapshotsByTimeframe = BTreeMap<Timeframe, IndicatorSnapshot>;

/// ADX distance above the floor at which trend strength saturates.
const TREND_STRENGTH_SPAN: f64 = 30.0;

/// Trigger thresholds for the momentum oscillator and trend strength.
///
/// The long band is `[long_band_low, long_band_high)`, the short band is
/// `(short_band_low, short_band_high]`. Values beyond either band are treated
/// as extreme and never trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    pub long_band_low: f64,
    pub long_band_high: f64,
    pub short_band_low: f64,
    pub short_band_high: f64,
    pub trend_strength_floor: f64,
    /// 0 disables the volume filter.
    pub min_volume_ratio: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            long_band_low: 50.0,
            long_band_high: 70.0,
            short_band_low: 30.0,
            short_band_high: 50.0,
            trend_strength_floor: 20.0,
            min_volume_ratio: 0.0,
        }
    }
}

impl ClassifierThresholds {
    pub fn in_long_band(&self, momentum: f64) -> bool {
        momentum >= self.long_band_low && momentum < self.long_band_high
    }

    pub fn in_short_band(&self, momentum: f64) -> bool {
        momentum > self.short_band_low && momentum <= self.short_band_high
    }

    fn volume_ok(&self, snapshot: &IndicatorSnapshot) -> bool {
        self.min_volume_ratio <= 0.0 || snapshot.volume_ratio >= self.min_volume_ratio
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrendClassifier {
    thresholds: ClassifierThresholds,
}

impl TrendClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    /// Single-timeframe rule. Returns the direction and setup strength.
    pub fn evaluate_single(&self, snapshot: &IndicatorSnapshot) -> (SignalDirection, f64) {
        let t = &self.thresholds;
        let trending = snapshot.trend_strength > t.trend_strength_floor && t.volume_ok(snapshot);

        let long = trending
            && snapshot.ema_fast > snapshot.ema_slow
            && t.in_long_band(snapshot.momentum);
        let short = trending
            && snapshot.ema_fast < snapshot.ema_slow
            && t.in_short_band(snapshot.momentum);

        let adx_score =
            trend_strength_score(snapshot.trend_strength, t.trend_strength_floor, TREND_STRENGTH_SPAN);

        match (long, short) {
            (true, false) => {
                let band = band_position(snapshot.momentum, t.long_band_low, t.long_band_high);
                (SignalDirection::Long, setup_strength(adx_score, band))
            }
            (false, true) => {
                let band =
                    1.0 - band_position(snapshot.momentum, t.short_band_low, t.short_band_high);
                (SignalDirection::Short, setup_strength(adx_score, band))
            }
            // both or neither: no signal is the safe default
            _ => (SignalDirection::None, 0.0),
        }
    }

    /// Classify an instrument from its snapshots. The trigger timeframe must
    /// fire; confirming timeframes can only veto.
    pub fn classify(
        &self,
        instrument: &Instrument,
        snapshots: &SnapshotsByTimeframe,
    ) -> SignalCandidate {
        let Some(trigger) = instrument
            .trigger_timeframe()
            .and_then(|tf| snapshots.get(&tf))
        else {
            return SignalCandidate::none(&instrument.id);
        };

        let (direction, strength) = self.evaluate_single(trigger);
        if direction.is_none() {
            return SignalCandidate::none(&instrument.id);
        }

        if !instrument.is_multi_timeframe() {
            return SignalCandidate {
                instrument: instrument.id.clone(),
                direction,
                rule: TriggerRule::TrendMomentum,
                strength,
            };
        }

        let Some(combined) =
            multi_timeframe::combine(&instrument.timeframes, snapshots, &self.thresholds)
        else {
            debug!(instrument = %instrument.id, "confirming timeframe missing, no candidate");
            return SignalCandidate::none(&instrument.id);
        };

        if !combined.bucket.confirms(direction) {
            debug!(
                instrument = %instrument.id,
                direction = %direction,
                bucket = %combined.bucket,
                score = combined.score,
                "trigger not confirmed across timeframes"
            );
            return SignalCandidate::none(&instrument.id);
        }

        SignalCandidate {
            instrument: instrument.id.clone(),
            direction,
            rule: TriggerRule::MultiTimeframe(combined.bucket),
            strength: ((strength + combined.score.abs()) / 2.0).clamp(0.0, 1.0),
        }
    }
}

fn setup_strength(adx_score: f64, band: f64) -> f64 {
    (0.4 + 0.3 * adx_score + 0.3 * band).clamp(0.0, 1.0)
}
