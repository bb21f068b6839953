//! ADX (Average Directional Index) indicator

use crate::common::math;
use crate::models::indicators::{AdxIndicator, Candle};

/// Minimum number of candles needed for an ADX of `period`.
pub fn adx_min_candles(period: u32) -> usize {
    2 * period as usize
}

/// Calculate ADX indicator
///
/// ADX measures trend strength regardless of direction. True range and the
/// directional movements are smoothed exponentially, each bar yields a DX
/// value, and ADX is the exponential average of the DX series.
pub fn calculate_adx(candles: &[Candle], period: u32) -> Option<AdxIndicator> {
    if period == 0 || candles.len() < adx_min_candles(period) {
        return None;
    }

    let mut tr_values = Vec::with_capacity(candles.len() - 1);
    let mut plus_dm_values = Vec::with_capacity(candles.len() - 1);
    let mut minus_dm_values = Vec::with_capacity(candles.len() - 1);

    for pair in candles.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        tr_values.push(math::true_range(cur.high, cur.low, prev.close));

        let up_move = cur.high - prev.high;
        let down_move = prev.low - cur.low;

        plus_dm_values.push(if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        });
        minus_dm_values.push(if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        });
    }

    let period = period as usize;
    let smoothed_tr = math::ema_series(&tr_values, period)?;
    let smoothed_plus = math::ema_series(&plus_dm_values, period)?;
    let smoothed_minus = math::ema_series(&minus_dm_values, period)?;

    let mut dx_values = Vec::with_capacity(smoothed_tr.len());
    let mut plus_di = 0.0;
    let mut minus_di = 0.0;

    for ((tr, plus), minus) in smoothed_tr.iter().zip(&smoothed_plus).zip(&smoothed_minus) {
        plus_di = if *tr > 0.0 { 100.0 * plus / tr } else { 0.0 };
        minus_di = if *tr > 0.0 { 100.0 * minus / tr } else { 0.0 };

        let di_sum = plus_di + minus_di;
        let dx = if di_sum > 0.0 {
            100.0 * (plus_di - minus_di).abs() / di_sum
        } else {
            0.0
        };
        dx_values.push(dx);
    }

    let adx_value = math::ema(&dx_values, period)?;

    Some(AdxIndicator {
        value: adx_value.max(0.0),
        plus_di,
        minus_di,
        period: period as u32,
    })
}
