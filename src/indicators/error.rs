use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error("insufficient data: {available} candles available, {required} required")]
    InsufficientData { required: usize, available: usize },
    #[error("candle series is not in chronological order")]
    UnorderedSeries,
    #[error("invalid indicator parameter: {0}")]
    InvalidParameter(String),
}
