//! Column codecs shared by the repositories.
//!
//! Decimals are stored as text to keep their exact scale; string lists as
//! JSON arrays.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::StorageError;

pub(crate) fn decimal_from_db(value: &str, column: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(value.trim()).map_err(|e| {
        StorageError::invalid_data(format!("{} '{}' is not a decimal: {}", column, value, e))
    })
}

pub(crate) fn optional_decimal_from_db(
    value: Option<&str>,
    column: &str,
) -> Result<Option<Decimal>, StorageError> {
    value.map(|v| decimal_from_db(v, column)).transpose()
}

pub(crate) fn list_to_db(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

/// Lenient: a malformed list reads as empty.
pub(crate) fn list_from_db(value: &str, column: &str) -> Vec<String> {
    serde_json::from_str(value).unwrap_or_else(|e| {
        log::warn!("[Storage] Ignoring malformed {} list '{}': {}", column, value, e);
        Vec::new()
    })
}
