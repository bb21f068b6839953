//! Market data source interface

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::indicators::{Candle, CandleSeries};
use crate::models::instrument::Timeframe;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("market data request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("market data request returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("market data api error {code}: {message}")]
    Api { code: String, message: String },
    #[error("failed to parse market data: {0}")]
    Parse(String),
}

#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Most recent `limit` bars, oldest-first. `Ok(None)` means the source has
    /// no data for this instrument/timeframe.
    async fn get_candles(
        &self,
        instrument: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Option<CandleSeries>, MarketDataError>;
}

/// In-memory source, used for replays and tests.
#[derive(Debug, Default)]
pub struct StaticCandleSource {
    series: RwLock<HashMap<(String, Timeframe), Vec<Candle>>>,
    requests: AtomicUsize,
}

impl StaticCandleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, instrument: &str, timeframe: Timeframe, candles: Vec<Candle>) {
        self.series
            .write()
            .await
            .insert((instrument.to_string(), timeframe), candles);
    }

    pub async fn remove(&self, instrument: &str, timeframe: Timeframe) {
        self.series
            .write()
            .await
            .remove(&(instrument.to_string(), timeframe));
    }

    /// Number of `get_candles` calls served so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CandleSource for StaticCandleSource {
    async fn get_candles(
        &self,
        instrument: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Option<CandleSeries>, MarketDataError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let series = self.series.read().await;
        let Some(candles) = series.get(&(instrument.to_string(), timeframe)) else {
            return Ok(None);
        };
        if candles.is_empty() {
            return Ok(None);
        }

        let mut series = CandleSeries::new(instrument, timeframe, candles.clone());
        series.truncate_front(limit);
        Ok(Some(series))
    }
}
