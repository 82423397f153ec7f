//! Trade journal core: domain models, store contracts and the sync engine.

pub mod accounts;
pub mod copy_groups;
pub mod errors;
pub mod journals;
pub mod preferences;
pub mod store;
pub mod sync;
pub mod trades;

pub use errors::{Error, Result};
