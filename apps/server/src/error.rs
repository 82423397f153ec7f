use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tradejournal_core::errors::{Error as CoreError, RemoteErrorKind};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }

    /// Maps an unsuccessful local command's message.
    pub fn local(message: String) -> Self {
        if message.to_ascii_lowercase().contains("not found") {
            ApiError::NotFound(message)
        } else {
            ApiError::BadRequest(message)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!("[Api] {}: {}", code, self);
        }
        let body = ErrorBody {
            code,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::InvalidInput(message) => ApiError::BadRequest(message.clone()),
            CoreError::Local(message) => ApiError::local(message.clone()),
            CoreError::Remote(remote) => match remote.kind {
                RemoteErrorKind::Unauthorized => ApiError::Unauthorized(err.to_string()),
                RemoteErrorKind::Unavailable => ApiError::Unavailable(err.to_string()),
                RemoteErrorKind::MissingSchema | RemoteErrorKind::Rejected => {
                    ApiError::Internal(err.to_string())
                }
            },
            CoreError::Sync(_) | CoreError::Serialization(_) => ApiError::Internal(err.to_string()),
        }
    }
}
