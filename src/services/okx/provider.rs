//! OKX candle source over the public REST API

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::messages::{parse_candle_row, CandleRow, OkxResponse};
use crate::models::indicators::CandleSeries;
use crate::models::instrument::{MarketClass, Timeframe};
use crate::services::market_data::{CandleSource, MarketDataError};

pub const DEFAULT_OKX_BASE_URL: &str = "https://www.okx.com";
const CANDLES_PATH: &str = "/api/v5/market/candles";
/// Largest page the candles endpoint serves.
pub const MAX_CANDLES_PER_REQUEST: usize = 300;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct OkxCandleSource {
    client: reqwest::Client,
    endpoint: Url,
    market: MarketClass,
    quote: String,
}

impl OkxCandleSource {
    pub fn new(base_url: &str) -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self, MarketDataError> {
        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join(CANDLES_PATH))
            .map_err(|e| MarketDataError::Parse(format!("invalid OKX base url {:?}: {}", base_url, e)))?;

        Ok(Self {
            client,
            endpoint,
            market: MarketClass::Perpetual,
            quote: "USDT".to_string(),
        })
    }

    pub fn with_market(mut self, market: MarketClass) -> Self {
        self.market = market;
        self
    }

    /// Exchange instrument id. Ids that already carry a dash are used as-is,
    /// bare bases get the quote and, for perpetuals, the swap suffix.
    pub fn inst_id(&self, instrument: &str) -> String {
        if instrument.contains('-') {
            return instrument.to_string();
        }
        match self.market {
            MarketClass::Perpetual => format!("{}-{}-SWAP", instrument, self.quote),
            MarketClass::Spot => format!("{}-{}", instrument, self.quote),
        }
    }
}

#[async_trait]
impl CandleSource for OkxCandleSource {
    async fn get_candles(
        &self,
        instrument: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Option<CandleSeries>, MarketDataError> {
        let inst_id = self.inst_id(instrument);
        let limit = limit.clamp(1, MAX_CANDLES_PER_REQUEST).to_string();

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("instId", inst_id.as_str()),
                ("bar", timeframe.okx_bar()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: OkxResponse<CandleRow> = response
            .json()
            .await
            .map_err(|e| MarketDataError::Parse(e.to_string()))?;
        if !payload.is_ok() {
            return Err(MarketDataError::Api {
                code: payload.code,
                message: payload.msg,
            });
        }

        if payload.data.is_empty() {
            debug!(instrument = %inst_id, timeframe = %timeframe, "OKX: no candles returned for {}", inst_id);
            return Ok(None);
        }

        // rows arrive newest-first; the series normalizes order
        let candles = payload
            .data
            .iter()
            .map(parse_candle_row)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            instrument = %inst_id,
            timeframe = %timeframe,
            count = candles.len(),
            "OKX: fetched {} candles for {}",
            candles.len(),
            inst_id
        );

        Ok(Some(CandleSeries::new(instrument, timeframe, candles)))
    }
}
