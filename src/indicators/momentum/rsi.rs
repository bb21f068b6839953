//! RSI (Relative Strength Index) indicator

use crate::common::math;
use crate::models::indicators::{Candle, RsiIndicator};

/// Calculate RSI indicator
///
/// RSI = 100 - (100 / (1 + RS))
/// RS = EMA(gains) / EMA(losses)
pub fn calculate_rsi(candles: &[Candle], period: u32) -> Option<RsiIndicator> {
    if period == 0 || candles.len() < period as usize + 1 {
        return None;
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = candles
        .windows(2)
        .map(|pair| {
            let change = pair[1].close - pair[0].close;
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let avg_gain = math::ema(&gains, period as usize)?;
    let avg_loss = math::ema(&losses, period as usize)?;

    Some(RsiIndicator {
        value: rsi_from_averages(avg_gain, avg_loss),
        period,
    })
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        // flat series has no direction
        return if avg_gain <= 0.0 { 50.0 } else { 100.0 };
    }
    let rs = avg_gain / avg_loss;
    (100.0 - (100.0 / (1.0 + rs))).clamp(0.0, 100.0)
}
