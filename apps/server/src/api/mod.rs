use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::events::stream_events;
use crate::state::AppState;

mod records;
mod sync;

pub fn app_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(sync::router())
        .merge(records::router())
        .route("/events", get(stream_events));

    Router::new().nest("/api/v1", api).with_state(state)
}

#[cfg(test)]
mod tests;
