#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use perpsentry::core::clock::ManualClock;
use perpsentry::gate::{GateConfig, SignalGate};
use perpsentry::models::alert::Alert;
use perpsentry::models::indicators::{Candle, IndicatorSnapshot};
use perpsentry::models::instrument::Timeframe;
use perpsentry::models::verdict::AdvisoryVerdict;
use perpsentry::services::market_data::StaticCandleSource;
use perpsentry::services::notifier::{AlertEmitter, DeliveryError, RecordingEmitter};
use perpsentry::services::oracle::{
    AdvisoryOracle, AdvisoryRequest, OracleError, OracleTransport, Prompt, RetryPolicy,
};
use perpsentry::signals::SignalEngine;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn snapshot(ema_fast: f64, ema_slow: f64, momentum: f64, trend_strength: f64) -> IndicatorSnapshot {
    snapshot_on(Timeframe::M15, ema_fast, ema_slow, momentum, trend_strength)
}

pub fn snapshot_on(
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

/// Choppy uptrend: +1.0 / -0.6 closes, 15 minute bars. RSI ~66, ADX ~25.
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
                base_time() + ChronoDuration::minutes(15 * i as i64),
            )
        })
        .collect()
}

pub fn flat_candles(count: usize) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            Candle::new(
                100.0,
                100.5,
                99.5,
                100.0,
                1000.0,
                base_time() + ChronoDuration::minutes(15 * i as i64),
            )
        })
        .collect()
}

/// Oracle that replays a fixed list of verdicts, then abstains.
#[derive(Default)]
pub struct ScriptedOracle {
    script: Mutex<VecDeque<AdvisoryVerdict>>,
    requests: Mutex<Vec<AdvisoryRequest>>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new(verdicts: Vec<AdvisoryVerdict>) -> Self {
        Self {
            script: Mutex::new(verdicts.into()),
            ..Self::default()
        }
    }

    pub fn always_confirm(count: usize) -> Self {
        Self::new(vec![AdvisoryVerdict::confirm(0.8, "trend intact"); count])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn requests(&self) -> Vec<AdvisoryRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl AdvisoryOracle for ScriptedOracle {
    async fn confirm(&self, request: &AdvisoryRequest) -> AdvisoryVerdict {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request.clone());
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| AdvisoryVerdict::abstain("script exhausted"))
    }
}

/// Transport that times out on every call.
#[derive(Default)]
pub struct TimeoutTransport {
    calls: AtomicUsize,
}

impl TimeoutTransport {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OracleTransport for TimeoutTransport {
    async fn complete(&self, _prompt: &Prompt) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(OracleError::Timeout)
    }
}

/// Transport returning a fixed reply.
pub struct FixedTransport(pub String);

#[async_trait]
impl OracleTransport for FixedTransport {
    async fn complete(&self, _prompt: &Prompt) -> Result<String, OracleError> {
        Ok(self.0.clone())
    }
}

/// Transport replaying a list of replies in order; the last one repeats.
pub struct SequenceTransport {
    replies: Vec<String>,
    calls: AtomicUsize,
}

impl SequenceTransport {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OracleTransport for SequenceTransport {
    async fn complete(&self, _prompt: &Prompt) -> Result<String, OracleError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .get(call.min(self.replies.len().saturating_sub(1)))
            .cloned()
            .ok_or(OracleError::EmptyResponse)
    }
}

/// Emitter that rejects every delivery.
#[derive(Default)]
pub struct FailingEmitter {
    attempts: AtomicUsize,
}

impl FailingEmitter {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlertEmitter for FailingEmitter {
    async fn send(&self, _alert: &Alert) -> Result<(), DeliveryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(DeliveryError::Rejected("chat not found".to_string()))
    }

    async fn notify(&self, _text: &str) -> Result<(), DeliveryError> {
        Err(DeliveryError::Rejected("chat not found".to_string()))
    }
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(2, Duration::from_millis(5))
}

/// Engine wired to in-memory collaborators and a manual clock.
pub struct Harness {
    pub source: Arc<StaticCandleSource>,
    pub emitter: Arc<RecordingEmitter>,
    pub clock: Arc<ManualClock>,
    pub gate: Arc<SignalGate>,
    pub engine: Arc<SignalEngine>,
}

impl Harness {
    pub fn new(config: GateConfig, oracle: Option<Arc<dyn AdvisoryOracle>>) -> Self {
        let source = Arc::new(StaticCandleSource::new());
        let emitter = Arc::new(RecordingEmitter::new());
        let clock = Arc::new(ManualClock::new(base_time()));
        let gate = Arc::new(SignalGate::new(config, clock.clone()));

        let mut engine = SignalEngine::new(source.clone(), gate.clone(), emitter.clone())
            .with_delivery_retry(fast_retry());
        if let Some(oracle) = oracle {
            engine = engine.with_oracle(oracle);
        }

        Self {
            source,
            emitter,
            clock,
            gate,
            engine: Arc::new(engine),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }
}

pub fn minutes(m: u64) -> Duration {
    Duration::from_secs(m * 60)
}
