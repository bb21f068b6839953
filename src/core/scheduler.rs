//! Cron-based scheduler driving evaluation passes

use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::core::runtime::SignalRuntime;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler disabled: interval is 0")]
    Disabled,
    #[error("invalid cron expression '{expr}': {source}")]
    InvalidCron {
        expr: String,
        #[source]
        source: cron::error::Error,
    },
}

/// Cron expression (with seconds) firing every `interval_seconds`.
pub fn cron_expression(interval_seconds: u64) -> Result<String, SchedulerError> {
    match interval_seconds {
        0 => Err(SchedulerError::Disabled),
        s if s >= 3600 && s % 3600 == 0 => Ok(format!("0 0 */{} * * *", s / 3600)),
        s if s >= 60 => Ok(format!("0 */{} * * * *", s / 60)),
        s => Ok(format!("*/{} * * * * *", s)),
    }
}

/// Runs one pass per cron tick. Passes never overlap: a tick that arrives
/// while a pass is running is picked up after it finishes.
pub struct PassScheduler {
    runtime: Arc<SignalRuntime>,
    schedule: Schedule,
    cancel: CancellationToken,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl PassScheduler {
    pub fn new(
        runtime: Arc<SignalRuntime>,
        interval_seconds: u64,
        cancel: CancellationToken,
    ) -> Result<Self, SchedulerError> {
        let expr = cron_expression(interval_seconds)?;
        let schedule = Schedule::from_str(&expr).map_err(|source| SchedulerError::InvalidCron {
            expr: expr.clone(),
            source,
        })?;

        info!(
            interval = interval_seconds,
            cron = %expr,
            "PassScheduler: created with interval {}s (cron: {})",
            interval_seconds,
            expr
        );

        Ok(Self {
            runtime,
            schedule,
            cancel,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    /// Spawn the scheduling loop. With `run_now` a pass runs before the first tick.
    pub async fn start(&self, run_now: bool) {
        let runtime = self.runtime.clone();
        let schedule = self.schedule.clone();
        let cancel = self.cancel.clone();

        let handle = tokio::spawn(async move {
            info!("PassScheduler: started, waiting for cron schedule...");
            if run_now {
                runtime.run_pass(&cancel).await;
            }

            loop {
                let Some(next_tick) = schedule.upcoming(chrono::Utc).next() else {
                    warn!("PassScheduler: schedule has no upcoming ticks");
                    break;
                };
                let wait = (next_tick - chrono::Utc::now()).to_std().unwrap_or_default();

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(wait) => {}
                }

                info!(tick = %next_tick, "PassScheduler: cron tick");
                runtime.run_pass(&cancel).await;
                if cancel.is_cancelled() {
                    break;
                }
            }
            info!("PassScheduler: loop exited");
        });

        *self.handle.write().await = Some(handle);
        info!("PassScheduler: started successfully");
    }

    /// Cancel the loop and wait for an in-flight pass to wind down.
    pub async fn stop(&self) {
        self.cancel.cancel();
        let handle = self.handle.write().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "PassScheduler: task ended abnormally");
            }
            info!("PassScheduler: stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle
            .read()
            .await
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}
