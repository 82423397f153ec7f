//! SQLite implementation of the journal's local command surface.

pub mod accounts;
pub mod copy_groups;
pub mod db;
pub mod errors;
pub mod journals;
pub mod local_store;
pub mod preferences;
pub mod schema;
pub mod trades;
mod utils;

pub use errors::StorageError;
pub use local_store::SqliteLocalStore;
