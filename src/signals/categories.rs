//! Timeframe weight table for multi-timeframe aggregation

use crate::models::instrument::Timeframe;

/// Fixed per-timeframe weights. The full table sums to 1.0; a subset is
/// renormalized by [`TimeframeWeights::normalized`].
pub struct TimeframeWeights;

impl TimeframeWeights {
    pub const M1: f64 = 0.05;
    pub const M5: f64 = 0.10;
    pub const M15: f64 = 0.15;
    pub const M30: f64 = 0.15;
    pub const H1: f64 = 0.20;
    pub const H4: f64 = 0.20;
    pub const D1: f64 = 0.15;

    /// Get weight for a timeframe
    pub fn get(timeframe: Timeframe) -> f64 {
        match timeframe {
            Timeframe::M1 => Self::M1,
            Timeframe::M5 => Self::M5,
            Timeframe::M15 => Self::M15,
            Timeframe::M30 => Self::M30,
            Timeframe::H1 => Self::H1,
            Timeframe::H4 => Self::H4,
            Timeframe::D1 => Self::D1,
        }
    }

    /// Weights for the given timeframes scaled so they sum to 1.0.
    /// Duplicates are counted once.
    pub fn normalized(timeframes: &[Timeframe]) -> Vec<(Timeframe, f64)> {
        let mut unique: Vec<Timeframe> = Vec::with_capacity(timeframes.len());
        for tf in timeframes {
            if !unique.contains(tf) {
                unique.push(*tf);
            }
        }

        let total: f64 = unique.iter().map(|tf| Self::get(*tf)).sum();
        if total <= 0.0 {
            return Vec::new();
        }
        unique
            .into_iter()
            .map(|tf| (tf, Self::get(tf) / total))
            .collect()
    }

    /// Verify weights sum to 1.0
    pub fn verify() -> bool {
        let total: f64 = Timeframe::ALL.iter().map(|tf| Self::get(*tf)).sum();
        (total - 1.0).abs() < 0.001
    }
}
