use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::instrument::Timeframe;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub timestamp: DateTime<Utc>,
}

impl Candle {
    pub fn new(
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume,
            timestamp,
        }
    }
}

/// Result of [`CandleSeries::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Appended,
    /// Same timestamp as the newest bar: the in-progress bar was updated.
    Replaced,
    /// Older than the newest bar; the series is append-only.
    Rejected,
}

/// Bars for one instrument and timeframe, always oldest-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    pub instrument: String,
    pub timeframe: Timeframe,
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Build a series from bars in any order. Duplicate timestamps keep the
    /// bar that appeared last in the input.
    pub fn new(instrument: impl Into<String>, timeframe: Timeframe, mut candles: Vec<Candle>) -> Self {
        // stable sort keeps input order among equal timestamps
        candles.sort_by_key(|c| c.timestamp);
        let mut deduped: Vec<Candle> = Vec::with_capacity(candles.len());
        for candle in candles {
            match deduped.last_mut() {
                Some(last) if last.timestamp == candle.timestamp => *last = candle,
                _ => deduped.push(candle),
            }
        }

        Self {
            instrument: instrument.into(),
            timeframe,
            candles: deduped,
        }
    }

    pub fn push(&mut self, candle: Candle) -> PushOutcome {
        match self.candles.last_mut() {
            Some(last) if candle.timestamp < last.timestamp => PushOutcome::Rejected,
            Some(last) if candle.timestamp == last.timestamp => {
                *last = candle;
                PushOutcome::Replaced
            }
            _ => {
                self.candles.push(candle);
                PushOutcome::Appended
            }
        }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Whether timestamps are strictly increasing.
    pub fn is_chronological(&self) -> bool {
        self.candles
            .windows(2)
            .all(|pair| pair[0].timestamp < pair[1].timestamp)
    }

    /// Keep only the newest `limit` bars.
    pub fn truncate_front(&mut self, limit: usize) {
        if self.candles.len() > limit {
            let excess = self.candles.len() - limit;
            self.candles.drain(..excess);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiIndicator {
    pub value: f64,
    pub period: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmaIndicator {
    pub value: f64,
    pub period: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdxIndicator {
    pub value: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub period: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtrIndicator {
    pub value: f64,
    pub period: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BollingerBandsIndicator {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub period: u32,
    pub std_dev: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeIndicator {
    pub volume: f64,
    pub volume_ma: f64,
    pub ratio: f64,
    pub period: u32,
}

/// Band bounds carried by a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl From<&BollingerBandsIndicator> for Bands {
    fn from(bb: &BollingerBandsIndicator) -> Self {
        Self {
            upper: bb.upper,
            middle: bb.middle,
            lower: bb.lower,
        }
    }
}

/// Indicator values derived from one candle series. Recomputed every poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub timeframe: Timeframe,
    pub price: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    /// RSI-style oscillator in [0, 100].
    pub momentum: f64,
    /// ADX-style value, non-negative and unbounded above.
    pub trend_strength: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    /// Average true range.
    pub volatility: f64,
    pub volume_ratio: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bands: Option<Bands>,
    pub timestamp: DateTime<Utc>,
}

impl IndicatorSnapshot {
    /// +1 when the fast average is above the slow one, -1 below, 0 when equal.
    pub fn crossover_sign(&self) -> i32 {
        if self.ema_fast > self.ema_slow {
            1
        } else if self.ema_fast < self.ema_slow {
            -1
        } else {
            0
        }
    }

    /// One-line summary used in prompts and logs.
    pub fn describe(&self) -> String {
        let mut line = format!(
            "{}: price={:.4} ema_fast={:.4} ema_slow={:.4} rsi={:.1} adx={:.1} atr={:.4} vol_ratio={:.2}",
            self.timeframe,
            self.price,
            self.ema_fast,
            self.ema_slow,
            self.momentum,
            self.trend_strength,
            self.volatility,
            self.volume_ratio
        );
        if let Some(bands) = &self.bands {
            line.push_str(&format!(
                " bands=[{:.4}, {:.4}, {:.4}]",
                bands.lower, bands.middle, bands.upper
            ));
        }
        line
    }
}
