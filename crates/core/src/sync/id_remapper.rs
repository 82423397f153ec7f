//! Identifier translation between the local and remote identifier spaces.
//!
//! Maps live for exactly one push or pull; remote ids are never persisted
//! locally. A reference whose source id is missing from the map resolves to
//! `None`, never to a fabricated id.

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Ephemeral source-id -> target-id map for one sync cycle.
#[derive(Debug, Clone)]
pub struct IdRemap<S, T> {
    entries: HashMap<S, T>,
}

impl<S, T> Default for IdRemap<S, T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<S: Eq + Hash, T: Clone> IdRemap<S, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: S, target: T) {
        self.entries.insert(source, target);
    }

    pub fn resolve(&self, source: &S) -> Option<T> {
        self.entries.get(source).cloned()
    }

    /// Resolves an optional reference; `None` and unmapped ids both yield `None`.
    pub fn resolve_ref(&self, source: Option<&S>) -> Option<T> {
        source.and_then(|id| self.resolve(id))
    }

    pub fn contains(&self, source: &S) -> bool {
        self.entries.contains_key(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Local id -> remote id, built while pushing.
pub type LocalToRemote = IdRemap<i64, String>;
/// Remote id -> local id, built while pulling.
pub type RemoteToLocal = IdRemap<String, i64>;

/// A row submitted to the remote, tagged with the client-generated key the
/// remote is expected to echo back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedRow {
    pub local_id: i64,
    pub correlation_id: String,
}

impl SubmittedRow {
    pub fn new(local_id: i64, correlation_id: impl Into<String>) -> Self {
        Self {
            local_id,
            correlation_id: correlation_id.into(),
        }
    }
}

/// Reads an identifier column as a string, accepting numeric ids too.
pub fn row_id(row: &Value, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(value) if !value.is_empty() => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

/// Builds the local -> remote map from an insert response.
///
/// Rows are matched on the echoed correlation key, so the response order does
/// not matter and rows the remote did not store get no entry. When the remote
/// replaced every key with its own ids, the map falls back to positional
/// correlation, which is only attempted when the response has exactly as many
/// rows as were submitted.
pub fn remap_from_insert_response(
    submitted: &[SubmittedRow],
    returned: &[Value],
    key: &str,
) -> LocalToRemote {
    let mut map = LocalToRemote::new();
    if submitted.is_empty() {
        return map;
    }

    let returned_ids: Vec<Option<String>> = returned.iter().map(|row| row_id(row, key)).collect();
    let echoed: HashSet<&str> = returned_ids.iter().flatten().map(String::as_str).collect();

    for row in submitted {
        if echoed.contains(row.correlation_id.as_str()) {
            map.insert(row.local_id, row.correlation_id.clone());
        }
    }

    if !map.is_empty() {
        if map.len() < submitted.len() {
            log::warn!(
                "[Sync] Remote stored {} of {} submitted rows; unmatched references resolve to none",
                map.len(),
                submitted.len()
            );
        }
        return map;
    }

    if returned.len() == submitted.len() {
        log::warn!(
            "[Sync] Remote did not echo correlation keys; falling back to positional correlation for {} rows",
            submitted.len()
        );
        for (row, remote_id) in submitted.iter().zip(returned_ids) {
            if let Some(remote_id) = remote_id {
                map.insert(row.local_id, remote_id);
            }
        }
    } else {
        log::warn!(
            "[Sync] Cannot correlate insert response ({} rows) with {} submitted rows",
            returned.len(),
            submitted.len()
        );
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submitted() -> Vec<SubmittedRow> {
        vec![
            SubmittedRow::new(1, "aaaa"),
            SubmittedRow::new(2, "bbbb"),
            SubmittedRow::new(3, "cccc"),
        ]
    }

    #[test]
    fn correlation_ignores_response_order() {
        let returned = vec![
            json!({ "id": "cccc", "name": "three" }),
            json!({ "id": "aaaa", "name": "one" }),
            json!({ "id": "bbbb", "name": "two" }),
        ];
        let map = remap_from_insert_response(&submitted(), &returned, "id");
        assert_eq!(map.len(), 3);
        assert_eq!(map.resolve(&1).as_deref(), Some("aaaa"));
        assert_eq!(map.resolve(&3).as_deref(), Some("cccc"));
    }

    #[test]
    fn rows_missing_from_response_get_no_entry() {
        let returned = vec![json!({ "id": "bbbb" })];
        let map = remap_from_insert_response(&submitted(), &returned, "id");
        assert_eq!(map.len(), 1);
        assert_eq!(map.resolve(&1), None);
        assert_eq!(map.resolve(&2).as_deref(), Some("bbbb"));
    }

    #[test]
    fn positional_fallback_when_remote_assigned_its_own_ids() {
        let returned = vec![json!({ "id": "x1" }), json!({ "id": "x2" }), json!({ "id": "x3" })];
        let map = remap_from_insert_response(&submitted(), &returned, "id");
        assert_eq!(map.resolve(&1).as_deref(), Some("x1"));
        assert_eq!(map.resolve(&2).as_deref(), Some("x2"));
        assert_eq!(map.resolve(&3).as_deref(), Some("x3"));
    }

    #[test]
    fn length_mismatch_without_echo_maps_nothing() {
        let returned = vec![json!({ "id": "x1" })];
        let map = remap_from_insert_response(&submitted(), &returned, "id");
        assert!(map.is_empty());
    }

    #[test]
    fn unresolved_reference_is_none_not_fabricated() {
        let mut map = LocalToRemote::new();
        map.insert(1, "aaaa".to_string());
        assert_eq!(map.resolve_ref(Some(&1)).as_deref(), Some("aaaa"));
        assert_eq!(map.resolve_ref(Some(&9)), None);
        assert_eq!(map.resolve_ref(None), None);
    }

    #[test]
    fn numeric_ids_are_read_as_strings() {
        assert_eq!(row_id(&json!({ "id": 42 }), "id").as_deref(), Some("42"));
        assert_eq!(row_id(&json!({ "id": "" }), "id"), None);
        assert_eq!(row_id(&json!({}), "id"), None);
    }
}
