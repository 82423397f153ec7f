//! Error types for the remote sync crate.

use thiserror::Error;
use tradejournal_core::errors::{RemoteError, RemoteErrorKind};

/// Result type alias for remote sync operations.
pub type Result<T> = std::result::Result<T, RemoteSyncError>;

/// Retry policy class for API failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiRetryClass {
    Retryable,
    Permanent,
    ReauthRequired,
}

/// PostgREST / Postgres codes meaning "the schema does not have this".
const MISSING_SCHEMA_CODES: [&str; 4] = ["42703", "42P01", "PGRST204", "PGRST205"];

/// Errors that can occur while talking to the remote relational service.
#[derive(Debug, Error)]
pub enum RemoteSyncError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error response from the remote service
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid request (missing filter, malformed header, etc.)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication error (missing or invalid token)
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl RemoteSyncError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// HTTP status if this is an API error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classify error for retry policy.
    pub fn retry_class(&self) -> ApiRetryClass {
        match self {
            Self::Api { status, .. } => match *status {
                401 | 403 => ApiRetryClass::ReauthRequired,
                408 | 409 | 423 | 425 | 429 => ApiRetryClass::Retryable,
                500..=599 => ApiRetryClass::Retryable,
                _ => ApiRetryClass::Permanent,
            },
            Self::Http(_) => ApiRetryClass::Retryable,
            Self::Json(_) => ApiRetryClass::Permanent,
            Self::InvalidRequest(_) => ApiRetryClass::Permanent,
            Self::Auth(_) => ApiRetryClass::ReauthRequired,
        }
    }

    /// Returns true when the remote rejected a request because a column or
    /// table does not exist (undefined column/table or a schema cache miss).
    pub fn is_missing_schema_error(&self) -> bool {
        match self {
            Self::Api { status, message } => {
                matches!(*status, 400 | 404)
                    && MISSING_SCHEMA_CODES.iter().any(|code| message.contains(code))
            }
            _ => false,
        }
    }
}

impl From<RemoteSyncError> for RemoteError {
    fn from(err: RemoteSyncError) -> Self {
        let kind = if err.is_missing_schema_error() {
            RemoteErrorKind::MissingSchema
        } else {
            match err.retry_class() {
                ApiRetryClass::Retryable => RemoteErrorKind::Unavailable,
                ApiRetryClass::ReauthRequired => RemoteErrorKind::Unauthorized,
                ApiRetryClass::Permanent => RemoteErrorKind::Rejected,
            }
        };
        RemoteError::new(kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_column_is_a_missing_schema_error() {
        let err = RemoteSyncError::api(400, "42703: column trades.mistakes does not exist");
        assert!(err.is_missing_schema_error());
        assert_eq!(RemoteError::from(err).kind, RemoteErrorKind::MissingSchema);
    }

    #[test]
    fn schema_cache_miss_is_a_missing_schema_error() {
        let err = RemoteSyncError::api(
            404,
            "PGRST205: Could not find the table 'public.copy_groups' in the schema cache",
        );
        assert!(err.is_missing_schema_error());
    }

    #[test]
    fn conflict_status_is_retryable() {
        let err = RemoteSyncError::api(409, "23505: duplicate key value violates unique constraint");
        assert!(!err.is_missing_schema_error());
        assert_eq!(err.retry_class(), ApiRetryClass::Retryable);
    }

    #[test]
    fn invalid_input_is_rejected() {
        let err = RemoteSyncError::api(400, "22P02: invalid input syntax for type uuid");
        assert_eq!(RemoteError::from(err).kind, RemoteErrorKind::Rejected);
    }

    #[test]
    fn retry_class_for_auth_error_is_reauth() {
        let err = RemoteSyncError::api(401, "JWT expired");
        assert_eq!(err.retry_class(), ApiRetryClass::ReauthRequired);
        assert_eq!(RemoteError::from(err).kind, RemoteErrorKind::Unauthorized);
    }

    #[test]
    fn server_errors_map_to_unavailable() {
        let err = RemoteSyncError::api(503, "upstream connect error");
        assert_eq!(RemoteError::from(err).kind, RemoteErrorKind::Unavailable);
    }
}
