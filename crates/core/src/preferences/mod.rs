//! Per-user display preferences: pill colors and the public profile.

mod preferences_model;

pub use preferences_model::*;
