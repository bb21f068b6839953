//! perpsentry: technical-indicator signal alerts for perpetual futures,
//! gated by hysteresis and an optional advisory oracle.

pub mod common;
pub mod config;
pub mod core;
pub mod gate;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
