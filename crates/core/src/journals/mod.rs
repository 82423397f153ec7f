//! Daily journal entries.

mod journals_model;

pub use journals_model::*;
