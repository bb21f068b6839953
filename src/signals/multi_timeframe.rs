//! Weighted multi-timeframe trend score
//!
//! Every timeframe scores in [-1, 1] from three components: average crossover
//! (0.4), momentum band (0.3) and trend-strength confirmation (0.3). Scores are
//! combined with [`TimeframeWeights`] and bucketed.

use crate::models::indicators::IndicatorSnapshot;
use crate::models::instrument::Timeframe;
use crate::models::signal::TrendBucket;
use crate::signals::categories::TimeframeWeights;
use crate::signals::classifier::{ClassifierThresholds, SnapshotsByTimeframe};
use crate::signals::scoring::bucket_for;

const CROSSOVER_WEIGHT: f64 = 0.4;
const MOMENTUM_WEIGHT: f64 = 0.3;
const STRENGTH_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct MultiTimeframeScore {
    pub score: f64,
    pub bucket: TrendBucket,
    pub contributions: Vec<(Timeframe, f64)>,
}

/// Signed score of a single timeframe.
pub fn timeframe_score(snapshot: &IndicatorSnapshot, thresholds: &ClassifierThresholds) -> f64 {
    let crossover = snapshot.crossover_sign() as f64;

    let in_long = thresholds.in_long_band(snapshot.momentum);
    let in_short = thresholds.in_short_band(snapshot.momentum);
    let momentum = match (in_long, in_short) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    };

    let strength = if snapshot.trend_strength > thresholds.trend_strength_floor {
        crossover
    } else {
        0.0
    };

    (CROSSOVER_WEIGHT * crossover + MOMENTUM_WEIGHT * momentum + STRENGTH_WEIGHT * strength)
        .clamp(-1.0, 1.0)
}

/// Combine the configured timeframes. Returns `None` when any of them has no
/// snapshot.
pub fn combine(
    timeframes: &[Timeframe],
    snapshots: &SnapshotsByTimeframe,
    thresholds: &ClassifierThresholds,
) -> Option<MultiTimeframeScore> {
    let weights = TimeframeWeights::normalized(timeframes);
    if weights.is_empty() {
        return None;
    }

    let mut contributions = Vec::with_capacity(weights.len());
    let mut score = 0.0;
    for (timeframe, weight) in weights {
        let snapshot = snapshots.get(&timeframe)?;
        let tf_score = timeframe_score(snapshot, thresholds);
        score += weight * tf_score;
        contributions.push((timeframe, tf_score));
    }

    Some(MultiTimeframeScore {
        score,
        bucket: bucket_for(score),
        contributions,
    })
}
