//! Alert delivery

pub mod format;
pub mod telegram;

pub use format::render_alert;
pub use telegram::{TelegramEmitter, DEFAULT_TELEGRAM_BASE_URL};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::models::alert::Alert;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("delivery request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("delivery endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("delivery rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait AlertEmitter: Send + Sync {
    async fn send(&self, alert: &Alert) -> Result<(), DeliveryError>;

    /// Operational notice (startup, shutdown).
    async fn notify(&self, text: &str) -> Result<(), DeliveryError>;
}

#[async_trait]
impl<T: AlertEmitter + ?Sized> AlertEmitter for Arc<T> {
    async fn send(&self, alert: &Alert) -> Result<(), DeliveryError> {
        (**self).send(alert).await
    }

    async fn notify(&self, text: &str) -> Result<(), DeliveryError> {
        (**self).notify(text).await
    }
}

/// Writes alerts to the log. Used when no chat transport is configured.
#[derive(Debug, Default)]
pub struct LogEmitter;

#[async_trait]
impl AlertEmitter for LogEmitter {
    async fn send(&self, alert: &Alert) -> Result<(), DeliveryError> {
        info!(
            instrument = %alert.instrument,
            direction = %alert.direction,
            entry = alert.entry_price,
            take_profit = alert.take_profit,
            stop_loss = alert.stop_loss,
            leverage = alert.leverage,
            "ALERT\n{}",
            render_alert(alert)
        );
        Ok(())
    }

    async fn notify(&self, text: &str) -> Result<(), DeliveryError> {
        info!(notice = %text, "notice: {}", text);
        Ok(())
    }
}

/// Keeps delivered alerts in memory.
#[derive(Debug, Default)]
pub struct RecordingEmitter {
    alerts: Mutex<Vec<Alert>>,
    notices: Mutex<Vec<String>>,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().await.clone()
    }

    pub async fn notices(&self) -> Vec<String> {
        self.notices.lock().await.clone()
    }
}

#[async_trait]
impl AlertEmitter for RecordingEmitter {
    async fn send(&self, alert: &Alert) -> Result<(), DeliveryError> {
        self.alerts.lock().await.push(alert.clone());
        Ok(())
    }

    async fn notify(&self, text: &str) -> Result<(), DeliveryError> {
        self.notices.lock().await.push(text.to_string());
        Ok(())
    }
}
