//! Prompt construction for the advisory oracle

use std::fmt::Write;

use super::AdvisoryRequest;

const SYSTEM_PROMPT: &str = "You are a risk-aware crypto futures analyst. \
You review technical trade setups and answer only with a JSON object.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn for_request(request: &AdvisoryRequest) -> Self {
        let mut user = String::new();
        // writing into a String cannot fail
        let _ = writeln!(user, "Instrument: {}", request.instrument);
        let _ = writeln!(user, "Proposed direction: {}", request.direction);
        let _ = writeln!(user, "Price: {:.4}", request.price);
        let _ = writeln!(user, "Trigger: {} (setup strength {:.2})", request.rule, request.strength);
        let _ = writeln!(user, "Indicators:");
        for snapshot in &request.snapshots {
            let _ = writeln!(user, "- {}", snapshot.describe());
        }
        let _ = writeln!(user, "Rationale: {}", request.rationale);
        let _ = writeln!(user);
        let _ = write!(
            user,
            "Should this {} be taken now? Reply with JSON only: \
{{\"verdict\": \"BUY|SELL|WAIT\", \"confidence\": 0-100, \"reason\": \"one sentence\"}}",
            request.direction
        );

        Self {
            system: SYSTEM_PROMPT.to_string(),
            user,
        }
    }
}
