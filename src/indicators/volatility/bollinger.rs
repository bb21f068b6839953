//! Bollinger Bands indicator

use crate::common::math;
use crate::models::indicators::{BollingerBandsIndicator, Candle};

/// Calculate Bollinger Bands
///
/// Middle Band = EMA(period)
/// Upper Band = Middle + (std_dev * standard deviation around the middle)
/// Lower Band = Middle - (std_dev * standard deviation around the middle)
pub fn calculate_bollinger_bands(
    candles: &[Candle],
    period: u32,
    std_dev: f64,
) -> Option<BollingerBandsIndicator> {
    if period == 0 || candles.len() < period as usize {
        return None;
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let middle = math::ema(&closes, period as usize)?;
    let std = math::standard_deviation_around(&closes, period as usize, middle)?;

    Some(BollingerBandsIndicator {
        upper: middle + (std_dev * std),
        middle,
        lower: middle - (std_dev * std),
        period,
        std_dev,
    })
}
