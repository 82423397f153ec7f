//! Session and sync endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;
use tradejournal_core::sync::{
    ClaimReport, GuestDataPolicy, SyncResponse, SyncStatus, UserTransitionReport,
};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub user_id: String,
    #[serde(default)]
    pub access_token: Option<String>,
    /// What happens to records created before sign-in. Defaults to discard.
    #[serde(default)]
    pub guest_policy: GuestDataPolicy,
}

async fn start_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StartSessionRequest>,
) -> ApiResult<Json<UserTransitionReport>> {
    let user_id = body.user_id.trim().to_string();
    if user_id.is_empty() {
        return Err(ApiError::BadRequest("userId is required".to_string()));
    }
    info!("[Session] Signing in; guest policy {:?}", body.guest_policy);

    if let Some(remote) = &state.remote {
        remote.set_access_token(body.access_token.filter(|t| !t.is_empty()));
    }
    state.engine.set_guest_policy(body.guest_policy);
    let report = state.engine.on_user_changed(Some(user_id)).await;
    Ok(Json(report))
}

async fn end_session(State(state): State<Arc<AppState>>) -> Json<UserTransitionReport> {
    info!("[Session] Signing out");
    let report = state.engine.on_user_changed(None).await;
    if let Some(remote) = &state.remote {
        remote.set_access_token(None);
    }
    Json(report)
}

async fn get_status(State(state): State<Arc<AppState>>) -> Json<SyncStatus> {
    Json(state.engine.status())
}

async fn sync_now(State(state): State<Arc<AppState>>) -> Json<SyncResponse> {
    Json(state.engine.sync_now().await)
}

async fn push_now(State(state): State<Arc<AppState>>) -> Json<SyncResponse> {
    Json(state.engine.push_now().await)
}

async fn claim_guest_data(State(state): State<Arc<AppState>>) -> ApiResult<Json<ClaimReport>> {
    let report = state.engine.claim_guest_data().await?;
    info!("[Session] Claimed {} guest record(s)", report.total_claimed());
    Ok(Json(report))
}

async fn confirm_import(State(state): State<Arc<AppState>>) -> Json<SyncResponse> {
    Json(state.engine.confirm_import().await)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/session", post(start_session).delete(end_session))
        .route("/sync/status", get(get_status))
        .route("/sync/now", post(sync_now))
        .route("/sync/push", post(push_now))
        .route("/sync/claim", post(claim_guest_data))
        .route("/sync/import", post(confirm_import))
}
