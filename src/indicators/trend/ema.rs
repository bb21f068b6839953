//! EMA (Exponential Moving Average) of closes

use crate::common::math;
use crate::models::indicators::{Candle, EmaIndicator};

/// Fast and slow averages over the same window.
#[derive(Debug, Clone)]
pub struct EmaPair {
    pub fast: EmaIndicator,
    pub slow: EmaIndicator,
}

impl EmaPair {
    /// 1 when fast is above slow, -1 below, 0 level.
    pub fn crossover(&self) -> i32 {
        match self.fast.value.partial_cmp(&self.slow.value) {
            Some(std::cmp::Ordering::Greater) => 1,
            Some(std::cmp::Ordering::Less) => -1,
            _ => 0,
        }
    }
}

fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

pub fn calculate_ema(candles: &[Candle], period: u32) -> Option<EmaIndicator> {
    if period == 0 || candles.len() < period as usize {
        return None;
    }
    let value = math::ema(&closes(candles), period as usize)?;
    Some(EmaIndicator { value, period })
}

/// Both averages, or `None` unless the series covers the slower period.
pub fn calculate_ema_pair(candles: &[Candle], fast: u32, slow: u32) -> Option<EmaPair> {
    if fast == 0 || slow == 0 || candles.len() < fast.max(slow) as usize {
        return None;
    }
    let closes = closes(candles);
    Some(EmaPair {
        fast: EmaIndicator {
            value: math::ema(&closes, fast as usize)?,
            period: fast,
        },
        slow: EmaIndicator {
            value: math::ema(&closes, slow as usize)?,
            period: slow,
        },
    })
}
