// Operator routes
// Every request must carry the operator secret in `x-operator-key`

use axum::{
    extract::State,
    http::HeaderMap,
    response::Json,
};
use serde_json::{json, Value};
use tokio::sync::MutexGuard;

use crate::app_state::{AppState, SharedState};
use crate::error::LedgerResult;
use crate::extract::{ApiJson, ApiPath};
use crate::models::{FundRequest, ResolveRequest, WithdrawFeesRequest};

pub const OPERATOR_KEY_HEADER: &str = "x-operator-key";

/// Lock the state and check the operator secret; yields the operator identity
async fn operator_session<'a>(
    state: &'a SharedState,
    headers: &HeaderMap,
) -> LedgerResult<(MutexGuard<'a, AppState>, String)> {
    let presented = headers.get(OPERATOR_KEY_HEADER).and_then(|v| v.to_str().ok());

    let app_state = state.lock().await;
    app_state.verify_operator_key(presented)?;

    let operator = app_state.engine.config().operator.address().to_string();
    Ok((app_state, operator))
}

/// POST /admin/markets/:id/resolve
pub async fn resolve_market(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<u64>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<ResolveRequest>,
) -> LedgerResult<Json<Value>> {
    let (mut app_state, operator) = operator_session(&state, &headers).await?;

    app_state.engine.resolve_market(&operator, id, payload.winning_side)?;

    Ok(Json(json!({
        "success": true,
        "market_id": id,
        "winning_side": payload.winning_side,
    })))
}

/// POST /admin/fees/withdraw
pub async fn withdraw_fees(
    State(state): State<SharedState>,
    headers: HeaderMap,
    payload: Option<Json<WithdrawFeesRequest>>,
) -> LedgerResult<Json<Value>> {
    let (mut app_state, operator) = operator_session(&state, &headers).await?;

    let to = payload
        .and_then(|Json(body)| body.to)
        .unwrap_or_else(|| operator.clone());
    let amount = app_state.engine.withdraw_fees(&operator, &to)?;

    Ok(Json(json!({ "success": true, "to": to, "amount": amount })))
}

/// POST /admin/pause
pub async fn pause(State(state): State<SharedState>, headers: HeaderMap) -> LedgerResult<Json<Value>> {
    let (mut app_state, operator) = operator_session(&state, &headers).await?;

    let changed = app_state.engine.pause(&operator)?;
    Ok(Json(json!({ "success": true, "paused": true, "changed": changed })))
}

/// POST /admin/unpause
pub async fn unpause(State(state): State<SharedState>, headers: HeaderMap) -> LedgerResult<Json<Value>> {
    let (mut app_state, operator) = operator_session(&state, &headers).await?;

    let changed = app_state.engine.unpause(&operator)?;
    Ok(Json(json!({ "success": true, "paused": false, "changed": changed })))
}

/// POST /admin/fund
/// Credits fresh collateral to a wallet
pub async fn fund_wallet(
    State(state): State<SharedState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<FundRequest>,
) -> LedgerResult<Json<Value>> {
    let (mut app_state, operator) = operator_session(&state, &headers).await?;

    let balance = app_state.engine.fund(&operator, &payload.address, payload.amount)?;

    Ok(Json(json!({
        "success": true,
        "address": payload.address,
        "amount": payload.amount,
        "balance": balance,
    })))
}
