//! Perpsentry Worker
//!
//! Evaluates the configured instruments on a cron cadence and delivers alerts.

use dotenvy::dotenv;
use perpsentry::config::{get_environment, Config};
use perpsentry::core::clock::SystemClock;
use perpsentry::core::runtime::SignalRuntime;
use perpsentry::core::scheduler::PassScheduler;
use perpsentry::gate::SignalGate;
use perpsentry::indicators::pipeline::IndicatorPipeline;
use perpsentry::logging;
use perpsentry::metrics::Metrics;
use perpsentry::services::market_data::CandleSource;
use perpsentry::services::notifier::{AlertEmitter, LogEmitter, TelegramEmitter};
use perpsentry::services::okx::OkxCandleSource;
use perpsentry::services::oracle::{AdvisoryClient, AdvisoryOracle, ChatCompletionsTransport};
use perpsentry::services::pacing::Pacer;
use perpsentry::signals::classifier::TrendClassifier;
use perpsentry::signals::engine::SignalEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let env = get_environment();
    info!("Starting Perpsentry Worker");
    info!(environment = %env, "Environment");

    let config = Config::load()?;
    let instrument_ids: Vec<&str> = config.instruments.iter().map(|i| i.id.as_str()).collect();
    info!(
        instruments = ?instrument_ids,
        interval = config.runtime.evaluation_interval_seconds,
        concurrency = config.runtime.concurrency,
        "Evaluating {} every {} seconds",
        instrument_ids.join(", "),
        config.runtime.evaluation_interval_seconds
    );

    let metrics = Arc::new(Metrics::new()?);
    let pacer = Arc::new(Pacer::new(config.runtime.call_spacing()));

    let source: Arc<dyn CandleSource> = Arc::new(
        OkxCandleSource::new(&config.market_data.base_url)?.with_market(config.market_data.market),
    );

    let emitter: Arc<dyn AlertEmitter> = match config.telegram.credentials() {
        Some((token, chat_id)) => {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()?;
            info!("Alerts go to Telegram");
            Arc::new(TelegramEmitter::with_client(
                config.telegram.base_url.clone(),
                token,
                chat_id,
                client,
            ))
        }
        None => {
            warn!("Telegram not configured, alerts will be logged only");
            Arc::new(LogEmitter)
        }
    };

    let gate = Arc::new(SignalGate::new(config.effective_gate(), Arc::new(SystemClock)));

    let mut engine = SignalEngine::new(source, gate, emitter.clone())
        .with_pipeline(IndicatorPipeline::new(config.indicators.clone()))
        .with_classifier(TrendClassifier::new(config.classifier.clone()))
        .with_pacer(pacer.clone())
        .with_history_limit(config.runtime.history_limit)
        .with_metrics(metrics.clone());

    match config.oracle.api_key.as_deref().filter(|_| config.oracle.is_enabled()) {
        Some(api_key) => {
            let transport = ChatCompletionsTransport::new(
                &config.oracle.base_url,
                api_key,
                Duration::from_secs(config.oracle.timeout_seconds),
            )?
            .with_model(config.oracle.model.clone())
            .with_max_tokens(config.oracle.max_tokens);
            let oracle: Arc<dyn AdvisoryOracle> = Arc::new(
                AdvisoryClient::new(transport)
                    .with_retry_policy(config.oracle.retry.clone())
                    .with_pacer(pacer.clone()),
            );
            info!(model = %config.oracle.model, "Advisory oracle enabled");
            engine = engine.with_oracle(oracle);
        }
        None => warn!("No oracle API key, candidates activate without confirmation"),
    }

    let runtime = Arc::new(
        SignalRuntime::new(Arc::new(engine), config.instruments.clone())
            .with_concurrency(config.runtime.concurrency)
            .with_metrics(metrics.clone()),
    );

    if let Err(e) = emitter
        .notify(&format!(
            "Perpsentry started: {} every {}s",
            instrument_ids.join(", "),
            config.runtime.evaluation_interval_seconds
        ))
        .await
    {
        warn!(error = %e, "Failed to send startup notice");
    }

    let cancel = CancellationToken::new();
    let scheduler = PassScheduler::new(
        runtime,
        config.runtime.evaluation_interval_seconds,
        cancel.clone(),
    )?;
    scheduler.start(true).await;

    info!("Worker started, waiting for shutdown signal...");
    signal::ctrl_c().await?;

    info!("Shutting down worker...");
    scheduler.stop().await;
    if let Err(e) = emitter.notify("Perpsentry stopped").await {
        warn!(error = %e, "Failed to send shutdown notice");
    }
    match metrics.export() {
        Ok(text) => info!("Final metrics:\n{}", text),
        Err(e) => warn!(error = %e, "Failed to export metrics"),
    }
    info!("Worker stopped");

    Ok(())
}
