//! Advisory oracle: second-opinion confirmation of trade candidates
//!
//! The oracle boundary is infallible. Transport failures, exhausted retries
//! and unparseable replies all become an abstain verdict, never a confirm.

pub mod client;
pub mod parser;
pub mod prompt;
pub mod retry;

pub use client::{AdvisoryClient, ChatCompletionsTransport, OracleTransport, DEFAULT_ORACLE_BASE_URL, DEFAULT_ORACLE_MODEL};
pub use parser::parse_verdict;
pub use prompt::Prompt;
pub use retry::{with_retry, RetryPolicy};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::indicators::IndicatorSnapshot;
use crate::models::signal::{SignalCandidate, SignalDirection, TriggerRule};
use crate::models::verdict::AdvisoryVerdict;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("oracle request timed out")]
    Timeout,
    #[error("oracle returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to parse oracle response: {0}")]
    Parse(String),
    #[error("oracle response had no content")]
    EmptyResponse,
}

/// Everything the oracle sees about a candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisoryRequest {
    pub instrument: String,
    pub direction: SignalDirection,
    pub rule: TriggerRule,
    pub strength: f64,
    pub price: f64,
    pub rationale: String,
    /// Trigger timeframe first.
    pub snapshots: Vec<IndicatorSnapshot>,
}

impl AdvisoryRequest {
    pub fn new(
        candidate: &SignalCandidate,
        trigger: &IndicatorSnapshot,
        snapshots: Vec<IndicatorSnapshot>,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            instrument: candidate.instrument.clone(),
            direction: candidate.direction,
            rule: candidate.rule,
            strength: candidate.strength,
            price: trigger.price,
            rationale: rationale.into(),
            snapshots,
        }
    }
}

#[async_trait]
pub trait AdvisoryOracle: Send + Sync {
    async fn confirm(&self, request: &AdvisoryRequest) -> AdvisoryVerdict;
}
