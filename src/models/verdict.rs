//! Typed advisory verdict returned by the oracle client

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Confirm,
    Reject,
    Abstain,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Confirm => "confirm",
            Verdict::Reject => "reject",
            Verdict::Abstain => "abstain",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryVerdict {
    pub verdict: Verdict,
    /// Normalized to [0, 1].
    pub confidence: f64,
    pub reason: String,
}

impl AdvisoryVerdict {
    pub fn new(verdict: Verdict, confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            verdict,
            confidence: confidence.clamp(0.0, 1.0),
            reason: reason.into(),
        }
    }

    pub fn confirm(confidence: f64, reason: impl Into<String>) -> Self {
        Self::new(Verdict::Confirm, confidence, reason)
    }

    pub fn reject(confidence: f64, reason: impl Into<String>) -> Self {
        Self::new(Verdict::Reject, confidence, reason)
    }

    pub fn abstain(reason: impl Into<String>) -> Self {
        Self::new(Verdict::Abstain, 0.0, reason)
    }

    pub fn is_confirm(&self) -> bool {
        self.verdict == Verdict::Confirm
    }
}
