//! Storage-layer errors and their conversion into core errors.

use thiserror::Error;
use tradejournal_core::errors::Error;

/// Errors raised by the SQLite store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    /// A stored value could not be decoded into its domain type.
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    #[error("Database writer is unavailable")]
    WriterUnavailable,
}

impl StorageError {
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Query(diesel::result::Error::NotFound))
    }
}

impl From<diesel::r2d2::PoolError> for StorageError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidData(err.to_string())
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Error::Local(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_recognised() {
        assert!(StorageError::Query(diesel::result::Error::NotFound).is_not_found());
        assert!(!StorageError::WriterUnavailable.is_not_found());
    }

    #[test]
    fn storage_errors_surface_as_local_errors() {
        let err: Error = StorageError::invalid_data("pnl 'abc' is not a decimal").into();
        assert_eq!(
            err.to_string(),
            "Local store error: Invalid stored data: pnl 'abc' is not a decimal"
        );
    }
}
