//! Server-sent events carrying the engine's [`SyncEvent`]s.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;
use tradejournal_core::sync::SyncEvent;

use crate::state::AppState;

const KEEP_ALIVE_SECS: u64 = 15;

/// SSE event name for a [`SyncEvent`].
pub fn event_name(event: &SyncEvent) -> &'static str {
    match event {
        SyncEvent::ImportAvailable { .. } => "import-available",
        SyncEvent::SyncStarted { .. } => "sync-started",
        SyncEvent::SyncFinished { .. } => "sync-finished",
        SyncEvent::DataReloaded { .. } => "data-reloaded",
        SyncEvent::CapabilitiesResolved { .. } => "capabilities-resolved",
    }
}

fn to_sse(event: &SyncEvent) -> Option<Event> {
    match Event::default().event(event_name(event)).json_data(event) {
        Ok(sse) => Some(sse),
        Err(err) => {
            tracing::warn!("[Events] Dropping unserializable event: {}", err);
            None
        }
    }
}

pub async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.engine.subscribe();
    let stream = BroadcastStream::new(receiver).filter_map(|item| async move {
        match item {
            Ok(event) => to_sse(&event).map(Ok),
            Err(err) => {
                // Lagged subscribers skip what they missed.
                tracing::debug!("[Events] Subscriber lagged: {}", err);
                None
            }
        }
    });
    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(KEEP_ALIVE_SECS)))
}
