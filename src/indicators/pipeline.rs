//! Turns a candle series into a fixed [`IndicatorSnapshot`].

use serde::{Deserialize, Serialize};

use crate::indicators::error::IndicatorError;
use crate::indicators::momentum::calculate_rsi;
use crate::indicators::trend::{adx_min_candles, calculate_adx, calculate_ema_pair};
use crate::indicators::volatility::{calculate_atr, calculate_bollinger_bands};
use crate::indicators::volume::calculate_relative_volume;
use crate::models::indicators::{Bands, CandleSeries, IndicatorSnapshot};

/// Indicator periods used by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorPeriods {
    pub ema_fast: u32,
    pub ema_slow: u32,
    pub rsi: u32,
    pub adx: u32,
    pub atr: u32,
    pub volume: u32,
    /// `None` disables the bands.
    pub bands: Option<u32>,
    pub bands_std_dev: f64,
}

impl Default for IndicatorPeriods {
    fn default() -> Self {
        Self {
            ema_fast: 20,
            ema_slow: 50,
            rsi: 14,
            adx: 14,
            atr: 14,
            volume: 20,
            bands: Some(20),
            bands_std_dev: 2.0,
        }
    }
}

impl IndicatorPeriods {
    /// Shortest history that yields every indicator.
    pub fn min_history(&self) -> usize {
        [
            self.ema_fast as usize,
            self.ema_slow as usize,
            self.rsi as usize + 1,
            adx_min_candles(self.adx),
            self.atr as usize + 1,
            self.volume as usize + 1,
            self.bands.unwrap_or(0) as usize,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    pub fn validate(&self) -> Result<(), IndicatorError> {
        let periods = [
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("rsi", self.rsi),
            ("adx", self.adx),
            ("atr", self.atr),
            ("volume", self.volume),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(IndicatorError::InvalidParameter(format!(
                "{} period must be positive",
                name
            )));
        }
        if self.ema_fast >= self.ema_slow {
            return Err(IndicatorError::InvalidParameter(format!(
                "ema_fast ({}) must be shorter than ema_slow ({})",
                self.ema_fast, self.ema_slow
            )));
        }
        if self.bands == Some(0) || self.bands_std_dev <= 0.0 {
            return Err(IndicatorError::InvalidParameter(
                "bands period and std_dev must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pure indicator computation over the trailing window of a series.
#[derive(Debug, Clone, Default)]
pub struct IndicatorPipeline {
    periods: IndicatorPeriods,
}

impl IndicatorPipeline {
    pub fn new(periods: IndicatorPeriods) -> Self {
        Self { periods }
    }

    pub fn periods(&self) -> &IndicatorPeriods {
        &self.periods
    }

    pub fn compute(&self, series: &CandleSeries) -> Result<IndicatorSnapshot, IndicatorError> {
        let required = self.periods.min_history();
        let available = series.len();
        if available < required || available == 0 {
            return Err(IndicatorError::InsufficientData {
                required,
                available,
            });
        }
        if !series.is_chronological() {
            return Err(IndicatorError::UnorderedSeries);
        }

        let candles = series.candles();
        let insufficient = || IndicatorError::InsufficientData {
            required,
            available,
        };

        let last = candles.last().ok_or_else(insufficient)?;
        let emas = calculate_ema_pair(candles, self.periods.ema_fast, self.periods.ema_slow)
            .ok_or_else(insufficient)?;
        let rsi = calculate_rsi(candles, self.periods.rsi).ok_or_else(insufficient)?;
        let adx = calculate_adx(candles, self.periods.adx).ok_or_else(insufficient)?;
        let atr = calculate_atr(candles, self.periods.atr).ok_or_else(insufficient)?;
        let volume =
            calculate_relative_volume(candles, self.periods.volume).ok_or_else(insufficient)?;
        let bands = match self.periods.bands {
            Some(period) => Some(
                calculate_bollinger_bands(candles, period, self.periods.bands_std_dev)
                    .map(|bb| Bands::from(&bb))
                    .ok_or_else(insufficient)?,
            ),
            None => None,
        };

        Ok(IndicatorSnapshot {
            timeframe: series.timeframe,
            price: last.close,
            ema_fast: emas.fast.value,
            ema_slow: emas.slow.value,
            momentum: rsi.value,
            trend_strength: adx.value,
            plus_di: adx.plus_di,
            minus_di: adx.minus_di,
            volatility: atr.value,
            volume_ratio: volume.ratio,
            bands,
            timestamp: last.timestamp,
        })
    }
}
