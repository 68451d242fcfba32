// Collateral wallet routes: balances and engine allowances

use axum::{
    extract::State,
    http::HeaderMap,
    response::Json,
};
use serde_json::{json, Value};

use crate::app_state::SharedState;
use crate::error::LedgerResult;
use crate::extract::{ApiJson, ApiPath};
use crate::handlers::caller_from;
use crate::models::ApproveRequest;

/// GET /wallets/:address
pub async fn get_wallet(State(state): State<SharedState>, ApiPath(address): ApiPath<String>) -> Json<Value> {
    let app_state = state.lock().await;

    Json(json!({
        "address": address,
        "balance": app_state.engine.collateral_balance(&address),
        "allowance": app_state.engine.allowance(&address),
    }))
}

/// POST /approvals
/// Authorizes the engine to pull up to `amount` collateral from the caller on buys.
pub async fn approve(
    State(state): State<SharedState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<ApproveRequest>,
) -> LedgerResult<Json<Value>> {
    let holder = caller_from(&headers)?;
    let mut app_state = state.lock().await;

    app_state.engine.approve(&holder, payload.amount)?;

    Ok(Json(json!({
        "success": true,
        "address": holder,
        "allowance": payload.amount,
    })))
}
