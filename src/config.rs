//! Application configuration
//!
//! Loaded once at startup: defaults, then an optional JSON file named by
//! `PERPSENTRY_CONFIG`, then individual environment overrides.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::core::runtime::RuntimeConfig;
use crate::gate::GateConfig;
use crate::indicators::pipeline::IndicatorPeriods;
use crate::models::instrument::{Instrument, MarketClass, Timeframe};
use crate::services::notifier::DEFAULT_TELEGRAM_BASE_URL;
use crate::services::okx::DEFAULT_OKX_BASE_URL;
use crate::services::oracle::{RetryPolicy, DEFAULT_ORACLE_BASE_URL, DEFAULT_ORACLE_MODEL};
use crate::signals::classifier::ClassifierThresholds;

pub const CONFIG_PATH_VAR: &str = "PERPSENTRY_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(String),
    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        message: message.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub max_tokens: u32,
    pub retry: RetryPolicy,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_ORACLE_BASE_URL.to_string(),
            model: DEFAULT_ORACLE_MODEL.to_string(),
            timeout_seconds: 15,
            max_tokens: 200,
            retry: RetryPolicy::default(),
        }
    }
}

impl OracleConfig {
    pub fn is_enabled(&self) -> bool {
        self.api_key.as_deref().map(|k| !k.trim().is_empty()).unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub base_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            base_url: DEFAULT_TELEGRAM_BASE_URL.to_string(),
        }
    }
}

impl TelegramConfig {
    /// Token and chat id, when both are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.bot_token.as_deref(), self.chat_id.as_deref()) {
            (Some(token), Some(chat)) if !token.is_empty() && !chat.is_empty() => {
                Some((token, chat))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    pub base_url: String,
    pub market: MarketClass,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OKX_BASE_URL.to_string(),
            market: MarketClass::Perpetual,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub instruments: Vec<Instrument>,
    pub runtime: RuntimeConfig,
    pub indicators: IndicatorPeriods,
    pub classifier: ClassifierThresholds,
    pub gate: GateConfig,
    pub oracle: OracleConfig,
    pub telegram: TelegramConfig,
    pub market_data: MarketDataConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            instruments: vec![Instrument::new("BTC"), Instrument::new("ETH")],
            runtime: RuntimeConfig::default(),
            indicators: IndicatorPeriods::default(),
            classifier: ClassifierThresholds::default(),
            gate: GateConfig::default(),
            oracle: OracleConfig::default(),
            telegram: TelegramConfig::default(),
            market_data: MarketDataConfig::default(),
        }
    }
}

impl Config {
    /// Defaults, optional JSON file, then process environment. Call
    /// `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var(CONFIG_PATH_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Apply environment-style overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(raw) = get("INSTRUMENTS") {
            let template = self.instruments.first().cloned().unwrap_or_else(|| Instrument::new(""));
            self.instruments = split_list(&raw)
                .map(|id| Instrument {
                    id: id.to_string(),
                    ..template.clone()
                })
                .collect();
        }
        if let Some(raw) = get("TIMEFRAMES") {
            let timeframes = split_list(&raw)
                .map(|tf| Timeframe::from_str(tf).map_err(|e| invalid("TIMEFRAMES", e)))
                .collect::<Result<Vec<_>, _>>()?;
            for instrument in &mut self.instruments {
                instrument.timeframes = timeframes.clone();
            }
        }
        if let Some(raw) = get("LEVERAGE") {
            let leverage: u32 = parse("LEVERAGE", &raw)?;
            for instrument in &mut self.instruments {
                instrument.leverage = leverage;
            }
        }

        if let Some(raw) = get("EVAL_INTERVAL_SECONDS") {
            self.runtime.evaluation_interval_seconds = parse("EVAL_INTERVAL_SECONDS", &raw)?;
        }
        if let Some(raw) = get("WORKER_CONCURRENCY") {
            self.runtime.concurrency = parse("WORKER_CONCURRENCY", &raw)?;
        }
        if let Some(raw) = get("CALL_SPACING_MS") {
            self.runtime.call_spacing_ms = parse("CALL_SPACING_MS", &raw)?;
        }
        if let Some(raw) = get("COOLDOWN_SECONDS") {
            self.gate.cooldown_seconds = parse("COOLDOWN_SECONDS", &raw)?;
        }

        if let Some(key) = get("DEEPSEEK_API_KEY") {
            self.oracle.api_key = Some(key);
        }
        if let Some(url) = get("ORACLE_BASE_URL") {
            self.oracle.base_url = url;
        }
        if let Some(model) = get("ORACLE_MODEL") {
            self.oracle.model = model;
        }
        if let Some(token) = get("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Some(token);
        }
        if let Some(chat) = get("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = Some(chat);
        }
        if let Some(url) = get("OKX_BASE_URL") {
            self.market_data.base_url = url;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instruments.is_empty() {
            return Err(ConfigError::Missing("INSTRUMENTS".to_string()));
        }
        let mut seen = HashSet::new();
        for instrument in &self.instruments {
            if instrument.id.trim().is_empty() {
                return Err(invalid("instruments", "instrument id must not be empty"));
            }
            if !seen.insert(instrument.id.as_str()) {
                return Err(invalid("instruments", format!("duplicate instrument {}", instrument.id)));
            }
            if instrument.timeframes.is_empty() {
                return Err(invalid(
                    "timeframes",
                    format!("{} has no timeframes", instrument.id),
                ));
            }
            if instrument.leverage == 0 {
                return Err(invalid("leverage", format!("{} leverage must be positive", instrument.id)));
            }
            if instrument.risk.stop_atr <= 0.0 || instrument.risk.target_atr <= 0.0 {
                return Err(invalid("risk", format!("{} ATR multiples must be positive", instrument.id)));
            }
        }

        self.indicators
            .validate()
            .map_err(|e| invalid("indicators", e.to_string()))?;

        let c = &self.classifier;
        if c.long_band_low >= c.long_band_high {
            return Err(invalid("classifier", "long band is empty"));
        }
        if c.short_band_low >= c.short_band_high {
            return Err(invalid("classifier", "short band is empty"));
        }
        if c.trend_strength_floor < 0.0 || c.min_volume_ratio < 0.0 {
            return Err(invalid("classifier", "floors must not be negative"));
        }

        let g = &self.gate;
        if g.long_release_below >= c.long_band_low {
            return Err(invalid(
                "gate.long_release_below",
                format!(
                    "{} must be below the long trigger floor {}",
                    g.long_release_below, c.long_band_low
                ),
            ));
        }
        if g.short_release_above <= c.short_band_high {
            return Err(invalid(
                "gate.short_release_above",
                format!(
                    "{} must be above the short trigger ceiling {}",
                    g.short_release_above, c.short_band_high
                ),
            ));
        }
        if !(0.0..=1.0).contains(&g.min_confirm_confidence) {
            return Err(invalid("gate.min_confirm_confidence", "must be within [0, 1]"));
        }
        if g.max_pending_seconds == 0 {
            return Err(invalid("gate.max_pending_seconds", "must be positive"));
        }

        if self.runtime.evaluation_interval_seconds == 0 {
            return Err(invalid("EVAL_INTERVAL_SECONDS", "must be positive"));
        }
        if self.runtime.concurrency == 0 {
            return Err(invalid("WORKER_CONCURRENCY", "must be positive"));
        }

        let t = &self.telegram;
        if t.bot_token.is_some() != t.chat_id.is_some() {
            return Err(invalid(
                "telegram",
                "TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must be set together",
            ));
        }
        Ok(())
    }

    /// Gate settings for this deployment: confirmation only when an oracle is configured.
    pub fn effective_gate(&self) -> GateConfig {
        GateConfig {
            confirmation_required: self.gate.confirmation_required && self.oracle.is_enabled(),
            ..self.gate.clone()
        }
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| invalid(key, format!("{:?}: {}", raw, e)))
}

/// Deployment environment from `APP_ENV` (default `sandbox`).
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}
