//! External collaborators: market data, advisory oracle, alert delivery

pub mod market_data;
pub mod notifier;
pub mod okx;
pub mod oracle;
pub mod pacing;
