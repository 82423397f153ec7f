//! Local record CRUD. Writes go through the tracked store so they schedule a push.
//!
//! Every route only sees the current owner's rows: the signed-in user's, or
//! the guest rows when nobody is signed in.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use tradejournal_core::accounts::{Account, NewAccount};
use tradejournal_core::journals::{DailyJournal, NewDailyJournal};
use tradejournal_core::preferences::{NewPillColor, PillColor};
use tradejournal_core::store::{CommandResponse, LocalStoreTrait, OwnerFilter};
use tradejournal_core::trades::{NewTrade, Trade};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

fn respond<T>(response: CommandResponse<T>) -> ApiResult<Json<T>> {
    if !response.success {
        return Err(ApiError::local(
            response
                .error
                .unwrap_or_else(|| "Local command failed".to_string()),
        ));
    }
    response
        .data
        .map(Json)
        .ok_or_else(|| ApiError::Internal("Local command returned no data".to_string()))
}

fn respond_deleted(response: CommandResponse<()>) -> ApiResult<StatusCode> {
    respond(response).map(|_| StatusCode::NO_CONTENT)
}

fn current_owner(state: &AppState) -> OwnerFilter {
    OwnerFilter::current(state.engine.current_user().as_deref())
}

/// The row with `id` among the caller's rows; rows of other owners read as missing.
fn find_owned<T>(
    rows: CommandResponse<Vec<T>>,
    id: i64,
    id_of: fn(&T) -> i64,
    kind: &str,
) -> ApiResult<T> {
    let Json(rows) = respond(rows)?;
    rows.into_iter()
        .find(|row| id_of(row) == id)
        .ok_or_else(|| ApiError::NotFound(format!("{} {} not found", kind, id)))
}

// Accounts

async fn list_accounts(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Account>>> {
    respond(state.store.get_accounts(current_owner(&state)).await)
}

async fn create_account(
    State(state): State<Arc<AppState>>,
    Json(mut account): Json<NewAccount>,
) -> ApiResult<Json<Account>> {
    account.user_id = state.engine.current_user();
    respond(state.store.add_account(account).await)
}

async fn update_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(mut account): Json<Account>,
) -> ApiResult<Json<Account>> {
    let existing = find_owned(
        state.store.get_accounts(current_owner(&state)).await,
        id,
        |row: &Account| row.id,
        "Account",
    )?;
    account.id = id;
    account.user_id = existing.user_id;
    respond(state.store.update_account(account).await)
}

async fn delete_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    find_owned(
        state.store.get_accounts(current_owner(&state)).await,
        id,
        |row: &Account| row.id,
        "Account",
    )?;
    respond_deleted(state.store.delete_account(id).await)
}

// Trades

async fn list_trades(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Trade>>> {
    respond(state.store.get_trades(current_owner(&state)).await)
}

async fn create_trade(
    State(state): State<Arc<AppState>>,
    Json(mut trade): Json<NewTrade>,
) -> ApiResult<Json<Trade>> {
    trade.user_id = state.engine.current_user();
    respond(state.store.add_trade(trade).await)
}

async fn update_trade(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(mut trade): Json<Trade>,
) -> ApiResult<Json<Trade>> {
    let existing = find_owned(
        state.store.get_trades(current_owner(&state)).await,
        id,
        |row: &Trade| row.id,
        "Trade",
    )?;
    trade.id = id;
    trade.user_id = existing.user_id;
    respond(state.store.update_trade(trade).await)
}

async fn delete_trade(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    find_owned(
        state.store.get_trades(current_owner(&state)).await,
        id,
        |row: &Trade| row.id,
        "Trade",
    )?;
    respond_deleted(state.store.delete_trade(id).await)
}

// Daily journals

async fn list_journals(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<DailyJournal>>> {
    respond(state.store.get_journals(current_owner(&state)).await)
}

async fn create_journal(
    State(state): State<Arc<AppState>>,
    Json(mut journal): Json<NewDailyJournal>,
) -> ApiResult<Json<DailyJournal>> {
    journal.user_id = state.engine.current_user();
    respond(state.store.add_journal(journal).await)
}

async fn update_journal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(mut journal): Json<DailyJournal>,
) -> ApiResult<Json<DailyJournal>> {
    let existing = find_owned(
        state.store.get_journals(current_owner(&state)).await,
        id,
        |row: &DailyJournal| row.id,
        "Journal",
    )?;
    journal.id = id;
    journal.user_id = existing.user_id;
    respond(state.store.update_journal(journal).await)
}

async fn delete_journal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    find_owned(
        state.store.get_journals(current_owner(&state)).await,
        id,
        |row: &DailyJournal| row.id,
        "Journal",
    )?;
    respond_deleted(state.store.delete_journal(id).await)
}

// Pill colors

async fn list_pill_colors(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<PillColor>>> {
    respond(state.store.get_pill_colors(current_owner(&state)).await)
}

async fn create_pill_color(
    State(state): State<Arc<AppState>>,
    Json(mut pill): Json<NewPillColor>,
) -> ApiResult<Json<PillColor>> {
    pill.user_id = state.engine.current_user();
    respond(state.store.add_pill_color(pill).await)
}

async fn update_pill_color(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(mut pill): Json<PillColor>,
) -> ApiResult<Json<PillColor>> {
    let existing = find_owned(
        state.store.get_pill_colors(current_owner(&state)).await,
        id,
        |row: &PillColor| row.id,
        "Pill color",
    )?;
    pill.id = id;
    pill.user_id = existing.user_id;
    respond(state.store.update_pill_color(pill).await)
}

async fn delete_pill_color(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    find_owned(
        state.store.get_pill_colors(current_owner(&state)).await,
        id,
        |row: &PillColor| row.id,
        "Pill color",
    )?;
    respond_deleted(state.store.delete_pill_color(id).await)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/{id}", put(update_account).delete(delete_account))
        .route("/trades", get(list_trades).post(create_trade))
        .route("/trades/{id}", put(update_trade).delete(delete_trade))
        .route("/journals", get(list_journals).post(create_journal))
        .route("/journals/{id}", put(update_journal).delete(delete_journal))
        .route("/pill-colors", get(list_pill_colors).post(create_pill_color))
        .route(
            "/pill-colors/{id}",
            put(update_pill_color).delete(delete_pill_color),
        )
}
