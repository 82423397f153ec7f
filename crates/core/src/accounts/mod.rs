//! Trading accounts.

mod accounts_model;

pub use accounts_model::*;
