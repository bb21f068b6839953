//! Signal evaluation: classification, multi-timeframe scoring and orchestration.

pub mod categories;
pub mod classifier;
pub mod engine;
pub mod multi_timeframe;
pub mod scoring;

pub use categories::*;
pub use classifier::*;
pub use engine::*;
pub use multi_timeframe::*;
pub use scoring::*;
