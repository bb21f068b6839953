//! Instrument configuration models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Candle timeframe supported by the evaluation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 7] = [
        Timeframe::M1,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::M30,
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::D1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
        }
    }

    /// Bar code understood by the OKX candles endpoint.
    pub fn okx_bar(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1H",
            Timeframe::H4 => "4H",
            Timeframe::D1 => "1Dutc",
        }
    }

    pub fn duration(&self) -> Duration {
        let minutes = match self {
            Timeframe::M1 => 1,
            Timeframe::M5 => 5,
            Timeframe::M15 => 15,
            Timeframe::M30 => 30,
            Timeframe::H1 => 60,
            Timeframe::H4 => 240,
            Timeframe::D1 => 1440,
        };
        Duration::from_secs(minutes * 60)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Timeframe::ALL
            .iter()
            .copied()
            .find(|tf| tf.as_str() == normalized)
            .ok_or_else(|| format!("unknown timeframe '{}'", s))
    }
}

/// Market class of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketClass {
    Perpetual,
    Spot,
}

impl Default for MarketClass {
    fn default() -> Self {
        MarketClass::Perpetual
    }
}

/// ATR multiples used to place stop-loss and take-profit levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMultipliers {
    #[serde(default = "default_stop_atr")]
    pub stop_atr: f64,
    #[serde(default = "default_target_atr")]
    pub target_atr: f64,
}

fn default_stop_atr() -> f64 {
    2.0
}

fn default_target_atr() -> f64 {
    3.5
}

impl Default for RiskMultipliers {
    fn default() -> Self {
        Self {
            stop_atr: default_stop_atr(),
            target_atr: default_target_atr(),
        }
    }
}

/// A tradable instrument. The first timeframe triggers signals; any further
/// timeframes only confirm them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: String,
    #[serde(default)]
    pub market: MarketClass,
    #[serde(default = "default_leverage")]
    pub leverage: u32,
    #[serde(default = "default_timeframes")]
    pub timeframes: Vec<Timeframe>,
    #[serde(default)]
    pub risk: RiskMultipliers,
}

fn default_leverage() -> u32 {
    10
}

fn default_timeframes() -> Vec<Timeframe> {
    vec![Timeframe::M15]
}

impl Instrument {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            market: MarketClass::default(),
            leverage: default_leverage(),
            timeframes: default_timeframes(),
            risk: RiskMultipliers::default(),
        }
    }

    pub fn with_timeframes(mut self, timeframes: Vec<Timeframe>) -> Self {
        self.timeframes = timeframes;
        self
    }

    pub fn with_leverage(mut self, leverage: u32) -> Self {
        self.leverage = leverage;
        self
    }

    pub fn with_market(mut self, market: MarketClass) -> Self {
        self.market = market;
        self
    }

    pub fn with_risk(mut self, risk: RiskMultipliers) -> Self {
        self.risk = risk;
        self
    }

    /// Timeframe whose snapshot triggers candidates.
    pub fn trigger_timeframe(&self) -> Option<Timeframe> {
        self.timeframes.first().copied()
    }

    pub fn is_multi_timeframe(&self) -> bool {
        self.timeframes.len() > 1
    }
}
