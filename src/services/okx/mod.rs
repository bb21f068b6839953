//! OKX market data adapter

pub mod messages;
pub mod provider;

pub use provider::{OkxCandleSource, DEFAULT_OKX_BASE_URL, MAX_CANDLES_PER_REQUEST};
