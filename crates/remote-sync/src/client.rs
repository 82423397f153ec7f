//! REST client for the remote relational service.
//!
//! Tables live under `{base_url}/rest/v1/{table}`. Reads use `select=` plus
//! `column=eq.value` filters; writes ask for the stored rows back with
//! `Prefer: return=representation`.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::error::{RemoteSyncError, Result};
use tradejournal_core::errors::{RemoteError, Result as CoreResult};
use tradejournal_core::store::{RemoteQuery, RemoteStoreTrait, RemoteTable};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_LOG_BODY_CHARS: usize = 512;

const PREFER_REPRESENTATION: &str = "return=representation";
const PREFER_MERGE: &str = "resolution=merge-duplicates,return=representation";
const PREFER_MINIMAL: &str = "return=minimal";

/// Error body returned by PostgREST.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// Client for the remote relational service.
///
/// Cheap to clone; clones share the session token.
#[derive(Debug, Clone)]
pub struct RemoteSyncClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    access_token: Arc<RwLock<Option<String>>>,
}

impl RemoteSyncClient {
    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("[Remote] Response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("[Remote] Response error ({}): {}", status, preview);
    }

    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Project URL of the remote service (e.g. "https://xyz.supabase.co")
    /// * `api_key` - Public API key sent with every request
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Self::with_timeout(base_url, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client whose requests give up after `timeout`.
    ///
    /// A timed-out request fails as unavailable, which ends the running cycle.
    pub fn with_timeout(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            access_token: Arc::new(RwLock::new(None)),
        })
    }

    /// Sets (or clears) the signed-in user's access token.
    ///
    /// Without a token requests authenticate with the API key alone.
    pub fn set_access_token(&self, token: Option<String>) {
        *self
            .access_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn bearer(&self) -> String {
        self.access_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_else(|| self.api_key.clone())
    }

    /// Create headers for an API request.
    fn headers(&self, prefer: Option<&'static str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let api_key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| RemoteSyncError::auth("Invalid API key format"))?;
        headers.insert("apikey", api_key);

        let auth_value = HeaderValue::from_str(&format!("Bearer {}", self.bearer()))
            .map_err(|_| RemoteSyncError::auth("Invalid access token format"))?;
        headers.insert(AUTHORIZATION, auth_value);

        if let Some(prefer) = prefer {
            headers.insert("prefer", HeaderValue::from_static(prefer));
        }
        Ok(headers)
    }

    fn table_url(&self, table: RemoteTable, params: &[(String, String)]) -> String {
        let mut url = format!("{}/rest/v1/{}", self.base_url, table.as_str());
        if !params.is_empty() {
            let encoded = params
                .iter()
                .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&encoded);
        }
        url
    }

    fn filter_params(query: &RemoteQuery) -> Vec<(String, String)> {
        query
            .filters
            .iter()
            .map(|(column, value)| (column.clone(), format!("eq.{}", value)))
            .collect()
    }

    fn select_params(query: &RemoteQuery) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), query.columns.clone())];
        params.extend(Self::filter_params(query));
        if let Some(limit) = query.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    /// Turns a non-2xx response into an API error, keeping the Postgres code.
    async fn check_status(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if status.is_success() {
            return Ok(body);
        }
        if let Ok(error) = serde_json::from_str::<PostgrestError>(&body) {
            let message = match error.code {
                Some(code) => format!("{}: {}", code, error.message),
                None => error.message,
            };
            return Err(RemoteSyncError::api(status.as_u16(), message));
        }
        Err(RemoteSyncError::api(
            status.as_u16(),
            format!("Request failed: {}", body),
        ))
    }

    async fn parse_rows(response: reqwest::Response) -> Result<Vec<Value>> {
        let body = Self::check_status(response).await?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&body)? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Ok(vec![other]),
        }
    }

    /// GET /rest/v1/{table}?select=...&col=eq.value&limit=n
    pub async fn select_rows(&self, table: RemoteTable, query: &RemoteQuery) -> Result<Vec<Value>> {
        let url = self.table_url(table, &Self::select_params(query));
        debug!("[Remote] select {}", table);

        let response = self
            .client
            .get(&url)
            .headers(self.headers(None)?)
            .send()
            .await?;

        Self::parse_rows(response).await
    }

    /// POST /rest/v1/{table}
    pub async fn insert_rows(&self, table: RemoteTable, rows: &[Value]) -> Result<Vec<Value>> {
        let url = self.table_url(table, &[]);
        debug!("[Remote] insert {} rows into {}", rows.len(), table);

        let response = self
            .client
            .post(&url)
            .headers(self.headers(Some(PREFER_REPRESENTATION))?)
            .json(rows)
            .send()
            .await?;

        Self::parse_rows(response).await
    }

    /// POST /rest/v1/{table}?on_conflict=a,b with merge-duplicates resolution.
    pub async fn upsert_rows(
        &self,
        table: RemoteTable,
        rows: &[Value],
        on_conflict: &[&str],
    ) -> Result<Vec<Value>> {
        if on_conflict.is_empty() {
            return Err(RemoteSyncError::invalid_request(
                "Upsert requires at least one conflict column",
            ));
        }
        let params = [("on_conflict".to_string(), on_conflict.join(","))];
        let url = self.table_url(table, &params);
        debug!("[Remote] upsert {} rows into {}", rows.len(), table);

        let response = self
            .client
            .post(&url)
            .headers(self.headers(Some(PREFER_MERGE))?)
            .json(rows)
            .send()
            .await?;

        Self::parse_rows(response).await
    }

    /// DELETE /rest/v1/{table}?col=eq.value
    ///
    /// Refuses to send a delete without filters.
    pub async fn delete_rows(&self, table: RemoteTable, query: &RemoteQuery) -> Result<()> {
        if query.filters.is_empty() {
            return Err(RemoteSyncError::invalid_request(format!(
                "Refusing unfiltered delete on {}",
                table
            )));
        }
        let url = self.table_url(table, &Self::filter_params(query));
        debug!("[Remote] delete from {}", table);

        let response = self
            .client
            .delete(&url)
            .headers(self.headers(Some(PREFER_MINIMAL))?)
            .send()
            .await?;

        Self::check_status(response).await.map(|_| ())
    }
}

fn to_core(err: RemoteSyncError) -> tradejournal_core::Error {
    RemoteError::from(err).into()
}

#[async_trait]
impl RemoteStoreTrait for RemoteSyncClient {
    async fn select(&self, table: RemoteTable, query: RemoteQuery) -> CoreResult<Vec<Value>> {
        self.select_rows(table, &query).await.map_err(to_core)
    }

    async fn insert(&self, table: RemoteTable, rows: Vec<Value>) -> CoreResult<Vec<Value>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        self.insert_rows(table, &rows).await.map_err(to_core)
    }

    async fn upsert(
        &self,
        table: RemoteTable,
        rows: Vec<Value>,
        on_conflict: &[&str],
    ) -> CoreResult<Vec<Value>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        self.upsert_rows(table, &rows, on_conflict)
            .await
            .map_err(to_core)
    }

    async fn delete(&self, table: RemoteTable, query: RemoteQuery) -> CoreResult<()> {
        self.delete_rows(table, &query).await.map_err(to_core)
    }
}
