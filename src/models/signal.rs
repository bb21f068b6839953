//! Directional candidate produced by the classifier

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalDirection {
    Long,
    Short,
    None,
}

impl SignalDirection {
    pub fn opposite(&self) -> Self {
        match self {
            SignalDirection::Long => SignalDirection::Short,
            SignalDirection::Short => SignalDirection::Long,
            SignalDirection::None => SignalDirection::None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, SignalDirection::None)
    }

    /// +1.0 for long, -1.0 for short.
    pub fn sign(&self) -> f64 {
        match self {
            SignalDirection::Long => 1.0,
            SignalDirection::Short => -1.0,
            SignalDirection::None => 0.0,
        }
    }
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SignalDirection::Long => "LONG",
            SignalDirection::Short => "SHORT",
            SignalDirection::None => "NONE",
        };
        f.write_str(label)
    }
}

/// Combined multi-timeframe score bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendBucket {
    StrongBullish,
    Bullish,
    Neutral,
    Bearish,
    StrongBearish,
}

impl TrendBucket {
    /// Whether this bucket confirms a trigger in `direction`.
    pub fn confirms(&self, direction: SignalDirection) -> bool {
        match direction {
            SignalDirection::Long => {
                matches!(self, TrendBucket::Bullish | TrendBucket::StrongBullish)
            }
            SignalDirection::Short => {
                matches!(self, TrendBucket::Bearish | TrendBucket::StrongBearish)
            }
            SignalDirection::None => false,
        }
    }
}

impl fmt::Display for TrendBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrendBucket::StrongBullish => "strong bullish",
            TrendBucket::Bullish => "bullish",
            TrendBucket::Neutral => "neutral",
            TrendBucket::Bearish => "bearish",
            TrendBucket::StrongBearish => "strong bearish",
        };
        f.write_str(label)
    }
}

/// Rule that produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerRule {
    /// Average crossover + momentum band + trend-strength floor on the trigger timeframe.
    TrendMomentum,
    /// Trend-momentum trigger confirmed by the weighted multi-timeframe bucket.
    MultiTimeframe(TrendBucket),
    NoTrigger,
}

impl fmt::Display for TriggerRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerRule::TrendMomentum => f.write_str("EMA trend + RSI band + ADX floor"),
            TriggerRule::MultiTimeframe(bucket) => {
                write!(f, "EMA trend + RSI band + ADX floor, {} across timeframes", bucket)
            }
            TriggerRule::NoTrigger => f.write_str("no trigger"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalCandidate {
    pub instrument: String,
    pub direction: SignalDirection,
    pub rule: TriggerRule,
    /// Confidence of the technical setup in [0, 1].
    pub strength: f64,
}

impl SignalCandidate {
    pub fn none(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            direction: SignalDirection::None,
            rule: TriggerRule::NoTrigger,
            strength: 0.0,
        }
    }

    pub fn is_actionable(&self) -> bool {
        !self.direction.is_none()
    }
}
