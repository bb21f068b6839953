//! Shared fixtures for unit tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use perpsentry::models::indicators::{Candle, IndicatorSnapshot};
use perpsentry::models::instrument::Timeframe;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Bars spaced one minute apart with the given closes, ±0.5 wicks.
pub fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            Candle::new(
                close,
                close + 0.5,
                close - 0.5,
                close,
                1000.0,
                base_time() + Duration::minutes(i as i64),
            )
        })
        .collect()
}

pub fn rising_candles(count: usize, start: f64, step: f64) -> Vec<Candle> {
    let closes: Vec<f64> = (0..count).map(|i| start + i as f64 * step).collect();
    candles_from_closes(&closes)
}

/// Uptrend that alternates +1.0 / -0.6 closes with ±0.2 wicks: RSI settles
/// around 60 and ADX in the mid twenties.
pub fn zigzag_uptrend(count: usize) -> Vec<Candle> {
    let mut close = 100.0;
    (0..count)
        .map(|i| {
            if i > 0 {
                close += if i % 2 == 1 { 1.0 } else { -0.6 };
            }
            Candle::new(
                close,
                close + 0.2,
                close - 0.2,
                close,
                1000.0,
                base_time() + Duration::minutes(15 * i as i64),
            )
        })
        .collect()
}

pub fn snapshot(
    timeframe: Timeframe,
    ema_fast: f64,
    ema_slow: f64,
    momentum: f64,
    trend_strength: f64,
) -> IndicatorSnapshot {
    IndicatorSnapshot {
        timeframe,
        price: 100.0,
        ema_fast,
        ema_slow,
        momentum,
        trend_strength,
        plus_di: 25.0,
        minus_di: 15.0,
        volatility: 2.0,
        volume_ratio: 1.0,
        bands: None,
        timestamp: base_time(),
    }
}

pub fn long_snapshot() -> IndicatorSnapshot {
    snapshot(Timeframe::M15, 105.0, 100.0, 55.0, 28.0)
}

pub fn short_snapshot() -> IndicatorSnapshot {
    snapshot(Timeframe::M15, 95.0, 100.0, 45.0, 28.0)
}
