//! Error taxonomy shared by the journal core and its store implementations.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of remote failures.
///
/// The sync engine branches on this, never on transport details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// Network failure, timeout, or 5xx. The remote state is unknown.
    Unavailable,
    /// The remote schema lacks the requested column or table.
    MissingSchema,
    /// Missing or expired credentials.
    Unauthorized,
    /// The remote understood the request and refused it.
    Rejected,
}

/// Failure reported by the remote relational service.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Unavailable, message)
    }

    pub fn missing_schema(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::MissingSchema, message)
    }

    pub fn is_missing_schema(&self) -> bool {
        self.kind == RemoteErrorKind::MissingSchema
    }
}

/// Errors surfaced by the journal core.
#[derive(Debug, Error)]
pub enum Error {
    /// The local command surface returned an unsuccessful envelope.
    #[error("Local store error: {0}")]
    Local(String),

    /// The remote relational service failed.
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// A sync precondition or protocol step failed.
    #[error("Sync error: {0}")]
    Sync(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid caller input (missing user, malformed record, etc.)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn local(message: impl Into<String>) -> Self {
        Self::Local(message.into())
    }

    pub fn sync(message: impl Into<String>) -> Self {
        Self::Sync(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Remote failure kind, if this error came from the remote.
    pub fn remote_kind(&self) -> Option<RemoteErrorKind> {
        match self {
            Self::Remote(err) => Some(err.kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_kind_is_exposed_for_remote_errors_only() {
        let err = Error::from(RemoteError::missing_schema("column trades.mistakes does not exist"));
        assert_eq!(err.remote_kind(), Some(RemoteErrorKind::MissingSchema));
        assert_eq!(Error::local("boom").remote_kind(), None);
    }

    #[test]
    fn remote_error_display_is_the_message() {
        let err = RemoteError::unavailable("connection refused");
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(
            Error::from(err).to_string(),
            "Remote error: connection refused"
        );
    }
}
