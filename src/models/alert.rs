//! Finalized alert handed to the notifier

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::indicators::IndicatorSnapshot;
use crate::models::instrument::Instrument;
use crate::models::signal::{SignalCandidate, SignalDirection, TriggerRule};

const MIN_SUGGESTED_LEVERAGE: u32 = 3;
const MAX_SUGGESTED_LEVERAGE: u32 = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub instrument: String,
    pub direction: SignalDirection,
    pub entry_price: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub leverage: u32,
    pub rule: TriggerRule,
    pub rationale: String,
    pub issued_at: DateTime<Utc>,
}

impl Alert {
    /// Build an alert for an activated candidate. Returns `None` for a
    /// candidate without direction.
    pub fn build(
        instrument: &Instrument,
        candidate: &SignalCandidate,
        snapshot: &IndicatorSnapshot,
        advisory_reason: Option<&str>,
        issued_at: DateTime<Utc>,
    ) -> Option<Self> {
        let sign = match candidate.direction {
            SignalDirection::None => return None,
            direction => direction.sign(),
        };

        let price = snapshot.price;
        let atr = snapshot.volatility;
        let take_profit = price + sign * instrument.risk.target_atr * atr;
        let stop_loss = price - sign * instrument.risk.stop_atr * atr;

        let mut rationale = explain(candidate.direction, snapshot);
        if let Some(reason) = advisory_reason.map(str::trim).filter(|r| !r.is_empty()) {
            rationale.push_str(" Advisory: ");
            rationale.push_str(reason);
        }

        Some(Self {
            instrument: instrument.id.clone(),
            direction: candidate.direction,
            entry_price: price,
            take_profit,
            stop_loss,
            leverage: suggested_leverage(instrument.leverage, price, atr),
            rule: candidate.rule,
            rationale,
            issued_at,
        })
    }

    /// Reward-to-risk ratio implied by the levels.
    pub fn reward_risk(&self) -> f64 {
        let risk = (self.entry_price - self.stop_loss).abs();
        if risk == 0.0 {
            return 0.0;
        }
        (self.take_profit - self.entry_price).abs() / risk
    }
}

/// Configured leverage, lowered when volatility is high.
///
/// The cap is `1 / (atr / price)` clamped to [3, 15].
pub fn suggested_leverage(configured: u32, price: f64, atr: f64) -> u32 {
    if atr <= 0.0 || price <= 0.0 {
        return configured;
    }
    let cap = (price / atr).floor();
    let cap = if cap.is_finite() {
        (cap as u32).clamp(MIN_SUGGESTED_LEVERAGE, MAX_SUGGESTED_LEVERAGE)
    } else {
        MAX_SUGGESTED_LEVERAGE
    };
    configured.min(cap)
}

/// Short technical explanation of a setup.
pub fn explain(direction: SignalDirection, snapshot: &IndicatorSnapshot) -> String {
    match direction {
        SignalDirection::Long => format!(
            "Fast EMA {:.4} above slow EMA {:.4}, RSI {:.1} in the bullish band with ADX {:.1}: upward momentum is likely.",
            snapshot.ema_fast, snapshot.ema_slow, snapshot.momentum, snapshot.trend_strength
        ),
        SignalDirection::Short => format!(
            "Fast EMA {:.4} below slow EMA {:.4}, RSI {:.1} in the bearish band with ADX {:.1}: the trend is weakening.",
            snapshot.ema_fast, snapshot.ema_slow, snapshot.momentum, snapshot.trend_strength
        ),
        SignalDirection::None => "No clear market direction.".to_string(),
    }
}
