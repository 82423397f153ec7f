//! Server settings read from the environment.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use tradejournal_core::sync::SyncConfig;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8088";
const DEFAULT_DATA_DIR: &str = "./data";

/// Connection details of the remote relational service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub data_dir: PathBuf,
    /// `None` runs the server local-only.
    pub remote: Option<RemoteConfig>,
    pub sync: SyncConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let listen_addr = non_empty("TRADEJOURNAL_LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("TRADEJOURNAL_LISTEN_ADDR is not a socket address")?;

        let data_dir = PathBuf::from(
            non_empty("TRADEJOURNAL_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
        );

        let remote = non_empty("TRADEJOURNAL_REMOTE_URL").map(|url| RemoteConfig {
            url: url.trim_end_matches('/').to_string(),
            api_key: non_empty("TRADEJOURNAL_REMOTE_API_KEY").unwrap_or_default(),
        });

        let mut sync = SyncConfig::from_env();
        if remote.is_none() {
            sync.enabled = false;
        }

        Ok(Self {
            listen_addr,
            data_dir,
            remote,
            sync,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn defaults_run_local_only() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.listen_addr.to_string(), "127.0.0.1:8088");
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert!(config.remote.is_none());
        assert!(!config.sync.enabled);
    }

    #[test]
    fn remote_url_enables_sync() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("TRADEJOURNAL_REMOTE_URL", "https://db.example.com/"),
            ("TRADEJOURNAL_REMOTE_API_KEY", "anon"),
            ("TRADEJOURNAL_LISTEN_ADDR", "0.0.0.0:9000"),
        ]))
        .unwrap();
        assert_eq!(
            config.remote,
            Some(RemoteConfig {
                url: "https://db.example.com".to_string(),
                api_key: "anon".to_string(),
            })
        );
        assert_eq!(config.listen_addr.port(), 9000);
    }

    #[test]
    fn bad_listen_addr_is_an_error() {
        let result =
            ServerConfig::from_lookup(lookup_from(&[("TRADEJOURNAL_LISTEN_ADDR", "nowhere")]));
        assert!(result.is_err());
    }
}
