//! Uniform response envelope of the local command surface.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::errors::{Error, Result};

/// Which owner's rows a local read returns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "userId")]
pub enum OwnerFilter {
    /// Rows with no owner (created before sign-in).
    Guest,
    /// Rows owned by one user.
    User(String),
    /// Every row regardless of owner.
    All,
}

impl OwnerFilter {
    /// The filter matching the current identity: a user's rows, or guest rows.
    pub fn current(user_id: Option<&str>) -> Self {
        match user_id {
            Some(id) => OwnerFilter::User(id.to_string()),
            None => OwnerFilter::Guest,
        }
    }

    pub fn matches(&self, owner: Option<&str>) -> bool {
        match (self, owner) {
            (OwnerFilter::All, _) => true,
            (OwnerFilter::Guest, None) => true,
            (OwnerFilter::User(expected), Some(actual)) => expected == actual,
            _ => false,
        }
    }
}

/// `{success, data?, error?}` envelope returned by every local command.
///
/// Callers branch on `success` (via [`CommandResponse::into_result`]) before
/// touching `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> CommandResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    pub fn from_result<E: Display>(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::err(err.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn into_result(self) -> Result<T> {
        if !self.success {
            return Err(Error::local(
                self.error
                    .unwrap_or_else(|| "Local command failed without an error message".to_string()),
            ));
        }
        self.data
            .ok_or_else(|| Error::local("Local command succeeded without returning data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_envelope_never_exposes_data() {
        let response: CommandResponse<Vec<i64>> = CommandResponse {
            success: false,
            data: Some(vec![1, 2]),
            error: Some("disk full".to_string()),
        };
        let err = response.into_result().expect_err("must fail");
        assert_eq!(err.to_string(), "Local store error: disk full");
    }

    #[test]
    fn successful_envelope_without_data_is_an_error() {
        let response: CommandResponse<i64> = CommandResponse {
            success: true,
            data: None,
            error: None,
        };
        assert!(response.into_result().is_err());
    }

    #[test]
    fn envelope_serializes_without_absent_fields() {
        let encoded = serde_json::to_value(CommandResponse::ok(7)).expect("serialize");
        assert_eq!(encoded, serde_json::json!({ "success": true, "data": 7 }));
    }

    #[test]
    fn owner_filter_matching() {
        assert!(OwnerFilter::Guest.matches(None));
        assert!(!OwnerFilter::Guest.matches(Some("u1")));
        assert!(OwnerFilter::User("u1".into()).matches(Some("u1")));
        assert!(!OwnerFilter::User("u1".into()).matches(Some("u2")));
        assert!(!OwnerFilter::User("u1".into()).matches(None));
        assert!(OwnerFilter::All.matches(None));
        assert_eq!(OwnerFilter::current(None), OwnerFilter::Guest);
    }
}
