//! Prometheus metrics for evaluation passes

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    /// Labelled by outcome (alerted, suppressed, rejected, no_signal, skipped, ...).
    pub evaluations_total: IntCounterVec,
    /// Labelled by verdict.
    pub oracle_verdicts_total: IntCounterVec,
    pub alerts_emitted_total: IntCounter,
    pub delivery_failures_total: IntCounter,
    pub pass_duration_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let evaluations_total = IntCounterVec::new(
            Opts::new("perpsentry_evaluations_total", "Instrument evaluations by outcome"),
            &["outcome"],
        )?;
        let oracle_verdicts_total = IntCounterVec::new(
            Opts::new("perpsentry_oracle_verdicts_total", "Advisory oracle verdicts"),
            &["verdict"],
        )?;
        let alerts_emitted_total =
            IntCounter::new("perpsentry_alerts_emitted_total", "Alerts handed to the emitter")?;
        let delivery_failures_total = IntCounter::new(
            "perpsentry_delivery_failures_total",
            "Alerts dropped after failed delivery",
        )?;
        let pass_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("perpsentry_pass_duration_seconds", "Evaluation pass duration")
                .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        )?;

        registry.register(Box::new(evaluations_total.clone()))?;
        registry.register(Box::new(oracle_verdicts_total.clone()))?;
        registry.register(Box::new(alerts_emitted_total.clone()))?;
        registry.register(Box::new(delivery_failures_total.clone()))?;
        registry.register(Box::new(pass_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            evaluations_total,
            oracle_verdicts_total,
            alerts_emitted_total,
            delivery_failures_total,
            pass_duration_seconds,
        })
    }

    /// Text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
