use async_trait::async_trait;
use serde_json::Value;

use crate::errors::Result;

/// Tables of the remote relational service touched by sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteTable {
    Accounts,
    Trades,
    PillColors,
    CopyGroups,
    CopyGroupMembers,
    DailyJournals,
    Profiles,
}

impl RemoteTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteTable::Accounts => "accounts",
            RemoteTable::Trades => "trades",
            RemoteTable::PillColors => "pill_colors",
            RemoteTable::CopyGroups => "copy_groups",
            RemoteTable::CopyGroupMembers => "copy_group_members",
            RemoteTable::DailyJournals => "daily_journals",
            RemoteTable::Profiles => "profiles",
        }
    }
}

impl std::fmt::Display for RemoteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column selection, equality filters and limit for a remote read or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteQuery {
    /// Select expression; `*` or a comma-separated list, may embed related tables.
    pub columns: String,
    pub filters: Vec<(String, String)>,
    pub limit: Option<usize>,
}

impl Default for RemoteQuery {
    fn default() -> Self {
        Self {
            columns: "*".to_string(),
            filters: Vec::new(),
            limit: None,
        }
    }
}

impl RemoteQuery {
    /// Rows owned by one user.
    pub fn for_user(user_id: &str) -> Self {
        Self::default().eq("user_id", user_id)
    }

    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Table-scoped operations of the shared remote relational service.
///
/// Rows travel as JSON objects so callers can prune columns the remote does
/// not have. `insert` and `upsert` return the stored rows.
#[async_trait]
pub trait RemoteStoreTrait: Send + Sync {
    async fn select(&self, table: RemoteTable, query: RemoteQuery) -> Result<Vec<Value>>;

    async fn insert(&self, table: RemoteTable, rows: Vec<Value>) -> Result<Vec<Value>>;

    /// Insert-or-merge on the given conflict columns.
    async fn upsert(
        &self,
        table: RemoteTable,
        rows: Vec<Value>,
        on_conflict: &[&str],
    ) -> Result<Vec<Value>>;

    /// Deletes rows matching every filter of `query`. An unfiltered delete is refused.
    async fn delete(&self, table: RemoteTable, query: RemoteQuery) -> Result<()>;
}
