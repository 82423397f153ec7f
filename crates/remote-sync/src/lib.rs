//! REST client for the shared remote relational service.
//!
//! Speaks the PostgREST dialect (`/rest/v1/{table}` with `eq.` filters and
//! `Prefer` headers) and implements the core `RemoteStoreTrait`.

mod client;
mod error;

pub use client::RemoteSyncClient;
pub use error::{ApiRetryClass, RemoteSyncError, Result};
