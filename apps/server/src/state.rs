use std::sync::Arc;

use anyhow::{Context, Result};
use tradejournal_core::store::{LocalStoreTrait, RemoteStoreTrait};
use tradejournal_core::sync::{SyncConfig, SyncEngine, TrackedLocalStore};
use tradejournal_remote_sync::RemoteSyncClient;
use tradejournal_storage_sqlite::SqliteLocalStore;

use crate::config::ServerConfig;

pub struct AppState {
    pub engine: SyncEngine,
    /// Local store for UI writes; every successful mutation arms the push.
    pub store: TrackedLocalStore,
    pub remote: Option<Arc<RemoteSyncClient>>,
}

impl AppState {
    pub fn new(
        local: Arc<dyn LocalStoreTrait>,
        remote: Option<Arc<RemoteSyncClient>>,
        sync: SyncConfig,
    ) -> Self {
        let remote_store = remote
            .clone()
            .map(|client| client as Arc<dyn RemoteStoreTrait>);
        let engine = SyncEngine::new(local, remote_store, sync);
        let store = engine.tracked_store();
        Self {
            engine,
            store,
            remote,
        }
    }
}

pub fn build_state(config: &ServerConfig) -> Result<Arc<AppState>> {
    let local = SqliteLocalStore::open(&config.data_dir)
        .with_context(|| format!("Cannot open local store in {}", config.data_dir.display()))?;

    let remote = match &config.remote {
        Some(remote) => {
            let client = RemoteSyncClient::new(&remote.url, &remote.api_key)
                .context("Cannot create remote sync client")?;
            tracing::info!("Remote sync target: {}", remote.url);
            Some(Arc::new(client))
        }
        None => {
            tracing::info!("No remote configured; running local-only");
            None
        }
    };

    Ok(Arc::new(AppState::new(
        Arc::new(local),
        remote,
        config.sync.clone(),
    )))
}
