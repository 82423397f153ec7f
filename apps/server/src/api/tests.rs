use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use tradejournal_core::sync::SyncConfig;
use tradejournal_storage_sqlite::SqliteLocalStore;

use super::app_router;
use crate::state::AppState;

fn local_only_app() -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteLocalStore::open(dir.path()).unwrap();
    let state = AppState::new(Arc::new(store), None, SyncConfig::disabled());
    (dir, app_router(Arc::new(state)))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn account_body(name: &str) -> Value {
    json!({
        "name": name,
        "accountType": "evaluation",
        "initialCapital": 50000,
        "currency": "USD"
    })
}

#[tokio::test]
async fn status_reports_a_local_only_session() {
    let (_dir, app) = local_only_app();
    let (status, body) = send(&app, "GET", "/api/v1/sync/status", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enabled"], false);
    assert_eq!(body["isSyncing"], false);
    assert_eq!(body["userId"], Value::Null);
}

#[tokio::test]
async fn records_are_stamped_with_the_signed_in_user() {
    let (_dir, app) = local_only_app();
    let (status, _) = send(&app, "POST", "/api/v1/session", Some(json!({ "userId": "u1" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, created) = send(&app, "POST", "/api/v1/accounts", Some(account_body("Eval"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["userId"], "u1");

    let (_, listed) = send(&app, "GET", "/api/v1/accounts", None).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    // Signed out, the user's rows are no longer visible.
    send(&app, "DELETE", "/api/v1/session", None).await;
    let (_, listed) = send(&app, "GET", "/api/v1/accounts", None).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn signing_in_discards_guest_records() {
    let (_dir, app) = local_only_app();
    send(&app, "POST", "/api/v1/accounts", Some(account_body("Scratch"))).await;

    let (_, report) = send(&app, "POST", "/api/v1/session", Some(json!({ "userId": "u1" }))).await;
    assert_eq!(report["guestDataCleared"], true);
    assert_eq!(report["importAvailable"], false);

    send(&app, "DELETE", "/api/v1/session", None).await;
    let (_, listed) = send(&app, "GET", "/api/v1/accounts", None).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn sync_without_a_remote_is_refused_in_the_envelope() {
    let (_dir, app) = local_only_app();
    send(&app, "POST", "/api/v1/session", Some(json!({ "userId": "u1" }))).await;

    let (status, body) = send(&app, "POST", "/api/v1/sync/now", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Sync is disabled");
}

#[tokio::test]
async fn claim_requires_a_signed_in_user() {
    let (_dir, app) = local_only_app();
    let (status, body) = send(&app, "POST", "/api/v1/sync/claim", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn empty_user_id_is_rejected() {
    let (_dir, app) = local_only_app();
    let (status, body) = send(&app, "POST", "/api/v1/session", Some(json!({ "userId": "  " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "userId is required");
}

#[tokio::test]
async fn deleting_a_missing_record_is_not_found() {
    let (_dir, app) = local_only_app();
    let (status, body) = send(&app, "DELETE", "/api/v1/trades/42", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn journals_round_trip_through_the_api() {
    let (_dir, app) = local_only_app();
    let (status, created) = send(
        &app,
        "POST",
        "/api/v1/journals",
        Some(json!({ "date": "2024-03-01", "content": "Waited for the open range" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let id = created["id"].as_i64().unwrap();
    let mut updated = created.clone();
    updated["content"] = json!("Took the breakout");
    let (status, body) = send(&app, "PUT", &format!("/api/v1/journals/{}", id), Some(updated)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Took the breakout");

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/journals/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn claim_policy_keeps_guest_records() {
    let (_dir, app) = local_only_app();
    send(&app, "POST", "/api/v1/accounts", Some(account_body("Scratch"))).await;

    let (status, report) = send(
        &app,
        "POST",
        "/api/v1/session",
        Some(json!({ "userId": "u1", "guestPolicy": "claim" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(report["claim"].is_object());

    let (_, listed) = send(&app, "GET", "/api/v1/accounts", None).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "Scratch");
    assert_eq!(listed[0]["userId"], "u1");
}

#[tokio::test]
async fn records_of_another_user_cannot_be_changed() {
    let (_dir, app) = local_only_app();
    send(&app, "POST", "/api/v1/session", Some(json!({ "userId": "alice" }))).await;
    let (_, created) = send(&app, "POST", "/api/v1/accounts", Some(account_body("Funded"))).await;
    let id = created["id"].as_i64().unwrap();
    send(&app, "DELETE", "/api/v1/session", None).await;

    send(&app, "POST", "/api/v1/session", Some(json!({ "userId": "bob" }))).await;
    let mut renamed = created.clone();
    renamed["name"] = json!("Taken");
    let (status, body) = send(&app, "PUT", &format!("/api/v1/accounts/{}", id), Some(renamed)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
    let (status, _) = send(&app, "DELETE", &format!("/api/v1/accounts/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    send(&app, "DELETE", "/api/v1/session", None).await;

    send(&app, "POST", "/api/v1/session", Some(json!({ "userId": "alice" }))).await;
    let (_, listed) = send(&app, "GET", "/api/v1/accounts", None).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "Funded");
    assert_eq!(listed[0]["userId"], "alice");
}

#[tokio::test]
async fn updates_keep_the_stored_owner() {
    let (_dir, app) = local_only_app();
    send(&app, "POST", "/api/v1/session", Some(json!({ "userId": "u1" }))).await;
    let (_, created) = send(&app, "POST", "/api/v1/accounts", Some(account_body("Eval"))).await;
    let id = created["id"].as_i64().unwrap();

    let mut updated = created.clone();
    updated["name"] = json!("Eval 2");
    updated["userId"] = json!("someone-else");
    let (status, body) = send(&app, "PUT", &format!("/api/v1/accounts/{}", id), Some(updated)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Eval 2");
    assert_eq!(body["userId"], "u1");
}
