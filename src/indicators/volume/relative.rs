//! Relative volume: current bar volume against its trailing average

use crate::common::math;
use crate::models::indicators::{Candle, VolumeIndicator};

/// Ratio of the newest bar's volume to the EMA of the `period` bars before it.
///
/// The average is floored at [`math::EPSILON`] so a dead market yields a large
/// but finite ratio instead of a division by zero.
pub fn calculate_relative_volume(candles: &[Candle], period: u32) -> Option<VolumeIndicator> {
    if period == 0 || candles.len() < period as usize + 1 {
        return None;
    }

    let (current, previous) = candles.split_last()?;
    let volumes: Vec<f64> = previous.iter().map(|c| c.volume).collect();
    let volume_ma = math::ema(&volumes, period as usize)?;

    Some(VolumeIndicator {
        volume: current.volume,
        volume_ma,
        ratio: math::safe_ratio(current.volume, volume_ma),
        period,
    })
}
