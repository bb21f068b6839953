//! Evaluation passes over every configured instrument

use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::metrics::Metrics;
use crate::models::instrument::Instrument;
use crate::signals::engine::{EvaluationError, EvaluationOutcome, SignalEngine};

/// Pass cadence and resource bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub evaluation_interval_seconds: u64,
    /// Instruments evaluated at once. 1 keeps passes sequential.
    pub concurrency: usize,
    /// Minimum spacing between outbound calls.
    pub call_spacing_ms: u64,
    /// Bars requested per timeframe.
    pub history_limit: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            evaluation_interval_seconds: 300,
            concurrency: 1,
            call_spacing_ms: 250,
            history_limit: crate::signals::engine::DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl RuntimeConfig {
    pub fn call_spacing(&self) -> Duration {
        Duration::from_millis(self.call_spacing_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassSummary {
    pub evaluated: usize,
    pub alerts: usize,
    pub rejected: usize,
    /// Insufficient history or missing data.
    pub skipped: usize,
    pub errors: usize,
    /// Instruments not evaluated because the pass was cancelled.
    pub cancelled: usize,
    pub duration: Duration,
}

pub struct SignalRuntime {
    engine: Arc<SignalEngine>,
    instruments: Vec<Instrument>,
    concurrency: usize,
    metrics: Option<Arc<Metrics>>,
}

impl SignalRuntime {
    pub fn new(engine: Arc<SignalEngine>, instruments: Vec<Instrument>) -> Self {
        Self {
            engine,
            instruments,
            concurrency: 1,
            metrics: None,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn engine(&self) -> &Arc<SignalEngine> {
        &self.engine
    }

    /// Evaluate every instrument once. Never fails: per-instrument problems
    /// are logged and counted.
    pub async fn run_pass(&self, cancel: &CancellationToken) -> PassSummary {
        let started = Instant::now();
        self.engine.gate().sweep().await;

        info!(
            instruments = self.instruments.len(),
            concurrency = self.concurrency,
            "SignalRuntime: starting pass over {} instruments",
            self.instruments.len()
        );

        // collected first so the pass future can be handed to tokio::spawn
        let evaluations: Vec<_> = self
            .instruments
            .iter()
            .map(|instrument| self.evaluate_one(instrument, cancel))
            .collect();
        let results: Vec<Option<Result<EvaluationOutcome, EvaluationError>>> =
            stream::iter(evaluations)
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        let mut summary = PassSummary::default();
        for result in results {
            match result {
                None => summary.cancelled += 1,
                Some(Ok(outcome)) => {
                    summary.evaluated += 1;
                    match outcome {
                        EvaluationOutcome::Alerted(_) => summary.alerts += 1,
                        EvaluationOutcome::Rejected(_) => summary.rejected += 1,
                        EvaluationOutcome::InsufficientData { .. } => summary.skipped += 1,
                        _ => {}
                    }
                }
                Some(Err(EvaluationError::NoData { .. })) => summary.skipped += 1,
                Some(Err(_)) => summary.errors += 1,
            }
        }
        summary.duration = started.elapsed();

        if let Some(metrics) = &self.metrics {
            metrics
                .pass_duration_seconds
                .observe(summary.duration.as_secs_f64());
        }

        info!(
            evaluated = summary.evaluated,
            alerts = summary.alerts,
            rejected = summary.rejected,
            skipped = summary.skipped,
            errors = summary.errors,
            cancelled = summary.cancelled,
            duration_ms = summary.duration.as_millis() as u64,
            "SignalRuntime: pass finished"
        );
        summary
    }

    async fn evaluate_one(
        &self,
        instrument: &Instrument,
        cancel: &CancellationToken,
    ) -> Option<Result<EvaluationOutcome, EvaluationError>> {
        if cancel.is_cancelled() {
            return None;
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            result = self.engine.evaluate_instrument(instrument) => result,
        };

        if let Err(err) = &result {
            warn!(
                instrument = %instrument.id,
                error = %err,
                "SignalRuntime: skipping {} this pass",
                instrument.id
            );
        }
        Some(result)
    }
}
