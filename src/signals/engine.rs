//! Per-instrument orchestration: fetch → compute → classify → gate → oracle → gate → emit

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::gate::{GateAction, GateState, Resolution, SignalGate, SuppressReason};
use crate::indicators::error::IndicatorError;
use crate::indicators::pipeline::IndicatorPipeline;
use crate::metrics::Metrics;
use crate::models::alert::{explain, Alert};
use crate::models::indicators::IndicatorSnapshot;
use crate::models::instrument::{Instrument, Timeframe};
use crate::models::signal::{SignalCandidate, SignalDirection};
use crate::models::verdict::{AdvisoryVerdict, Verdict};
use crate::services::market_data::{CandleSource, MarketDataError};
use crate::services::notifier::AlertEmitter;
use crate::services::oracle::{with_retry, AdvisoryOracle, AdvisoryRequest, RetryPolicy};
use crate::services::pacing::Pacer;
use crate::signals::classifier::{SnapshotsByTimeframe, TrendClassifier};

/// Bars requested per timeframe unless the indicator periods need more.
pub const DEFAULT_HISTORY_LIMIT: usize = 200;

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("market data unavailable for {instrument} {timeframe}: {source}")]
    DataUnavailable {
        instrument: String,
        timeframe: Timeframe,
        #[source]
        source: MarketDataError,
    },
    #[error("no market data for {instrument} {timeframe}")]
    NoData {
        instrument: String,
        timeframe: Timeframe,
    },
    #[error("indicator computation failed for {instrument} {timeframe}: {source}")]
    Indicator {
        instrument: String,
        timeframe: Timeframe,
        #[source]
        source: IndicatorError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationOutcome {
    /// Not enough history on some timeframe; skipped this cycle.
    InsufficientData {
        timeframe: Timeframe,
        required: usize,
        available: usize,
    },
    NoSignal,
    Suppressed(SuppressReason),
    Released(SignalDirection),
    Rejected(Verdict),
    /// The gate moved on while the oracle was consulted.
    Stale,
    Alerted(Alert),
    /// Activation stands, the alert was dropped after retries.
    DeliveryFailed(Alert),
}

impl EvaluationOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            EvaluationOutcome::InsufficientData { .. } => "insufficient_data",
            EvaluationOutcome::NoSignal => "no_signal",
            EvaluationOutcome::Suppressed(_) => "suppressed",
            EvaluationOutcome::Released(_) => "released",
            EvaluationOutcome::Rejected(_) => "rejected",
            EvaluationOutcome::Stale => "stale",
            EvaluationOutcome::Alerted(_) => "alerted",
            EvaluationOutcome::DeliveryFailed(_) => "delivery_failed",
        }
    }

    pub fn alert(&self) -> Option<&Alert> {
        match self {
            EvaluationOutcome::Alerted(alert) => Some(alert),
            _ => None,
        }
    }
}

pub struct SignalEngine {
    source: Arc<dyn CandleSource>,
    pipeline: IndicatorPipeline,
    classifier: TrendClassifier,
    gate: Arc<SignalGate>,
    oracle: Option<Arc<dyn AdvisoryOracle>>,
    emitter: Arc<dyn AlertEmitter>,
    pacer: Arc<Pacer>,
    history_limit: usize,
    delivery_retry: RetryPolicy,
    metrics: Option<Arc<Metrics>>,
}

impl SignalEngine {
    pub fn new(
        source: Arc<dyn CandleSource>,
        gate: Arc<SignalGate>,
        emitter: Arc<dyn AlertEmitter>,
    ) -> Self {
        Self {
            source,
            pipeline: IndicatorPipeline::default(),
            classifier: TrendClassifier::default(),
            gate,
            oracle: None,
            emitter,
            pacer: Arc::new(Pacer::disabled()),
            history_limit: DEFAULT_HISTORY_LIMIT,
            delivery_retry: RetryPolicy::new(2, Duration::from_millis(500)),
            metrics: None,
        }
    }

    pub fn with_pipeline(mut self, pipeline: IndicatorPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_classifier(mut self, classifier: TrendClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn AdvisoryOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn with_pacer(mut self, pacer: Arc<Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    pub fn with_delivery_retry(mut self, retry: RetryPolicy) -> Self {
        self.delivery_retry = retry;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn gate(&self) -> &Arc<SignalGate> {
        &self.gate
    }

    pub fn emitter(&self) -> &Arc<dyn AlertEmitter> {
        &self.emitter
    }

    /// Full evaluation of one instrument. Data problems are returned as
    /// errors and leave the gate untouched.
    pub async fn evaluate_instrument(
        &self,
        instrument: &Instrument,
    ) -> Result<EvaluationOutcome, EvaluationError> {
        let result = self.evaluate(instrument).await;
        if let Some(metrics) = &self.metrics {
            let label = match &result {
                Ok(outcome) => outcome.label(),
                Err(_) => "data_unavailable",
            };
            metrics.evaluations_total.with_label_values(&[label]).inc();
        }
        result
    }

    async fn evaluate(
        &self,
        instrument: &Instrument,
    ) -> Result<EvaluationOutcome, EvaluationError> {
        if self.gate.prepare(&instrument.id).await == GateState::PendingConfirm {
            // an interrupted evaluation still owns this instrument until max_pending
            return Ok(EvaluationOutcome::Suppressed(
                SuppressReason::ConfirmationInFlight,
            ));
        }

        let mut snapshots = SnapshotsByTimeframe::new();
        let limit = self.history_limit.max(self.pipeline.periods().min_history());

        for &timeframe in &instrument.timeframes {
            self.pacer.acquire().await;
            let series = self
                .source
                .get_candles(&instrument.id, timeframe, limit)
                .await
                .map_err(|source| EvaluationError::DataUnavailable {
                    instrument: instrument.id.clone(),
                    timeframe,
                    source,
                })?
                .ok_or_else(|| EvaluationError::NoData {
                    instrument: instrument.id.clone(),
                    timeframe,
                })?;

            match self.pipeline.compute(&series) {
                Ok(snapshot) => {
                    snapshots.insert(timeframe, snapshot);
                }
                Err(IndicatorError::InsufficientData {
                    required,
                    available,
                }) => {
                    debug!(
                        instrument = %instrument.id,
                        timeframe = %timeframe,
                        required,
                        available,
                        "SignalEngine: not enough candles for {} ({} < {})",
                        instrument.id,
                        available,
                        required
                    );
                    return Ok(EvaluationOutcome::InsufficientData {
                        timeframe,
                        required,
                        available,
                    });
                }
                Err(source) => {
                    return Err(EvaluationError::Indicator {
                        instrument: instrument.id.clone(),
                        timeframe,
                        source,
                    })
                }
            }
        }

        Ok(self.process_snapshots(instrument, &snapshots).await)
    }

    /// Everything after indicator computation.
    pub async fn process_snapshots(
        &self,
        instrument: &Instrument,
        snapshots: &SnapshotsByTimeframe,
    ) -> EvaluationOutcome {
        let Some(trigger) = instrument
            .trigger_timeframe()
            .and_then(|tf| snapshots.get(&tf))
        else {
            return EvaluationOutcome::NoSignal;
        };

        let candidate = self.classifier.classify(instrument, snapshots);
        if candidate.is_actionable() {
            debug!(
                instrument = %instrument.id,
                direction = %candidate.direction,
                rule = %candidate.rule,
                strength = candidate.strength,
                "SignalEngine: candidate {} for {}",
                candidate.direction,
                instrument.id
            );
        }

        match self.gate.observe(&candidate, trigger).await {
            GateAction::Hold => EvaluationOutcome::NoSignal,
            GateAction::Suppressed(reason) => EvaluationOutcome::Suppressed(reason),
            GateAction::Released(direction) => EvaluationOutcome::Released(direction),
            GateAction::Activated(_) => self.emit(instrument, &candidate, trigger, None).await,
            GateAction::RequestConfirmation(direction) => {
                let verdict = self
                    .consult(instrument, &candidate, trigger, snapshots)
                    .await;
                if let Some(metrics) = &self.metrics {
                    metrics
                        .oracle_verdicts_total
                        .with_label_values(&[verdict.verdict.as_str()])
                        .inc();
                }

                match self.gate.resolve(&instrument.id, direction, &verdict).await {
                    Resolution::Activated(_) => {
                        self.emit(instrument, &candidate, trigger, Some(&verdict.reason))
                            .await
                    }
                    Resolution::Rejected(effective) => {
                        info!(
                            instrument = %instrument.id,
                            direction = %direction,
                            verdict = %effective,
                            reason = %verdict.reason,
                            "SignalEngine: {} {} not confirmed ({})",
                            instrument.id,
                            direction,
                            effective
                        );
                        EvaluationOutcome::Rejected(effective)
                    }
                    Resolution::Stale => EvaluationOutcome::Stale,
                }
            }
        }
    }

    async fn consult(
        &self,
        instrument: &Instrument,
        candidate: &SignalCandidate,
        trigger: &IndicatorSnapshot,
        snapshots: &SnapshotsByTimeframe,
    ) -> AdvisoryVerdict {
        let Some(oracle) = &self.oracle else {
            warn!(
                instrument = %instrument.id,
                "SignalEngine: confirmation required but no oracle configured"
            );
            return AdvisoryVerdict::abstain("no oracle configured");
        };

        let ordered = instrument
            .timeframes
            .iter()
            .filter_map(|tf| snapshots.get(tf).cloned())
            .collect();
        let request = AdvisoryRequest::new(
            candidate,
            trigger,
            ordered,
            explain(candidate.direction, trigger),
        );
        oracle.confirm(&request).await
    }

    async fn emit(
        &self,
        instrument: &Instrument,
        candidate: &SignalCandidate,
        trigger: &IndicatorSnapshot,
        advisory_reason: Option<&str>,
    ) -> EvaluationOutcome {
        let issued_at = self.gate.clock().utc();
        let Some(alert) = Alert::build(instrument, candidate, trigger, advisory_reason, issued_at)
        else {
            return EvaluationOutcome::NoSignal;
        };

        match with_retry(&self.delivery_retry, || self.emitter.send(&alert)).await {
            Ok(()) => {
                info!(
                    instrument = %alert.instrument,
                    direction = %alert.direction,
                    entry = alert.entry_price,
                    take_profit = alert.take_profit,
                    stop_loss = alert.stop_loss,
                    "SignalEngine: alert emitted for {} ({})",
                    alert.instrument,
                    alert.direction
                );
                if let Some(metrics) = &self.metrics {
                    metrics.alerts_emitted_total.inc();
                }
                EvaluationOutcome::Alerted(alert)
            }
            Err(err) => {
                error!(
                    instrument = %alert.instrument,
                    direction = %alert.direction,
                    error = %err,
                    "SignalEngine: failed to deliver alert for {}, dropping",
                    alert.instrument
                );
                if let Some(metrics) = &self.metrics {
                    metrics.delivery_failures_total.inc();
                }
                EvaluationOutcome::DeliveryFailed(alert)
            }
        }
    }
}
