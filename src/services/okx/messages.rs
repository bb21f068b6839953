//! OKX v5 REST payloads

use chrono::DateTime;
use serde::Deserialize;

use crate::models::indicators::Candle;
use crate::services::market_data::MarketDataError;

/// Envelope of every OKX v5 response. `code == "0"` means success.
#[derive(Debug, Clone, Deserialize)]
pub struct OkxResponse<T> {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> OkxResponse<T> {
    pub fn is_ok(&self) -> bool {
        self.code == "0"
    }
}

/// `[ts, o, h, l, c, vol, volCcy, volCcyQuote, confirm]`, all strings.
pub type CandleRow = Vec<String>;

pub fn parse_candle_row(row: &CandleRow) -> Result<Candle, MarketDataError> {
    if row.len() < 6 {
        return Err(MarketDataError::Parse(format!(
            "candle row has {} fields, expected at least 6",
            row.len()
        )));
    }

    let millis: i64 = row[0]
        .parse()
        .map_err(|e| MarketDataError::Parse(format!("invalid timestamp {:?}: {}", row[0], e)))?;
    let timestamp = DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| MarketDataError::Parse(format!("timestamp out of range: {}", millis)))?;

    let field = |index: usize, name: &str| -> Result<f64, MarketDataError> {
        row[index]
            .parse::<f64>()
            .map_err(|e| MarketDataError::Parse(format!("invalid {} {:?}: {}", name, row[index], e)))
    };

    Ok(Candle::new(
        field(1, "open")?,
        field(2, "high")?,
        field(3, "low")?,
        field(4, "close")?,
        field(5, "volume")?,
        timestamp,
    ))
}
