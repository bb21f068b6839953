//! Score normalization helpers

use crate::models::signal::TrendBucket;

/// Position of `value` inside `[low, high]` as 0..1
pub fn band_position(value: f64, low: f64, high: f64) -> f64 {
    if high <= low {
        return 0.0;
    }
    ((value - low) / (high - low)).clamp(0.0, 1.0)
}

/// Map ADX above a floor onto 0..1, saturating at `floor + span`
pub fn trend_strength_score(adx: f64, floor: f64, span: f64) -> f64 {
    if span <= 0.0 {
        return 0.0;
    }
    ((adx - floor) / span).clamp(0.0, 1.0)
}

/// Bucket a combined score in [-1, 1]
pub fn bucket_for(score: f64) -> TrendBucket {
    if score >= 0.6 {
        TrendBucket::StrongBullish
    } else if score >= 0.2 {
        TrendBucket::Bullish
    } else if score > -0.2 {
        TrendBucket::Neutral
    } else if score > -0.6 {
        TrendBucket::Bearish
    } else {
        TrendBucket::StrongBearish
    }
}
