//! Shared data models spanning the engine layers.

pub mod alert;
pub mod indicators;
pub mod instrument;
pub mod signal;
pub mod verdict;

pub use alert::Alert;
pub use indicators::{Bands, Candle, CandleSeries, IndicatorSnapshot, PushOutcome};
pub use instrument::{Instrument, MarketClass, RiskMultipliers, Timeframe};
pub use signal::{SignalCandidate, SignalDirection, TrendBucket, TriggerRule};
pub use verdict::{AdvisoryVerdict, Verdict};
