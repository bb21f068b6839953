//! Trend indicators: EMA, ADX

pub mod ema;
pub mod adx;

pub use ema::*;
pub use adx::*;

