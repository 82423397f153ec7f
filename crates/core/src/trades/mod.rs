//! Journaled trades and derived statistics.

mod trades_model;
mod trades_stats;

pub use trades_model::*;
pub use trades_stats::*;
