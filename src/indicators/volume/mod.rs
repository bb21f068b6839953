//! Volume indicators

pub mod relative;

pub use relative::*;
