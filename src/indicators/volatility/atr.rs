//! ATR (Average True Range) indicator

use crate::common::math;
use crate::models::indicators::{AtrIndicator, Candle};

/// Calculate ATR (Average True Range)
///
/// ATR measures market volatility as the exponential average of true range.
pub fn calculate_atr(candles: &[Candle], period: u32) -> Option<AtrIndicator> {
    if period == 0 || candles.len() < period as usize + 1 {
        return None;
    }

    let tr_values: Vec<f64> = candles
        .windows(2)
        .map(|pair| math::true_range(pair[1].high, pair[1].low, pair[0].close))
        .collect();

    let atr_value = math::ema(&tr_values, period as usize)?;

    Some(AtrIndicator {
        value: atr_value,
        period,
    })
}
