// HTTP request handlers for the market ledger API

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::app_state::SharedState;
use crate::engine::MarketSummary;
use crate::error::{LedgerError, LedgerResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::markets::Category;
use crate::models::*;
use crate::shares::Side;

pub const CALLER_HEADER: &str = "x-wallet-address";

// ===== ERROR MAPPING =====

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let status = match &self {
            LedgerError::MarketNotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            LedgerError::TradingClosed(_)
            | LedgerError::TradingStillOpen(_)
            | LedgerError::AlreadyResolved(_)
            | LedgerError::NotResolved(_) => StatusCode::CONFLICT,
            LedgerError::InsufficientBalance { .. }
            | LedgerError::InsufficientCollateral { .. }
            | LedgerError::NothingToRedeem(_)
            | LedgerError::NoFeesToWithdraw
            | LedgerError::InsufficientFunds { .. }
            | LedgerError::InsufficientAllowance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            LedgerError::SystemPaused => StatusCode::SERVICE_UNAVAILABLE,
            LedgerError::InvalidAmount(_)
            | LedgerError::InvalidDuration(_)
            | LedgerError::InvalidFeeRate(_)
            | LedgerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            LedgerError::ArithmeticOverflow => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "success": false,
            "kind": self.kind(),
            "error": self.to_string(),
            "temporary": self.is_temporary(),
        }));

        (status, body).into_response()
    }
}

/// Identity of the caller; signing happens upstream of this service
pub fn caller_from(headers: &HeaderMap) -> LedgerResult<String> {
    headers
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| LedgerError::Unauthorized(format!("missing {} header", CALLER_HEADER)))
}

pub async fn health_check() -> &'static str {
    "Binary market ledger - online"
}

// ===== MARKET ENDPOINTS =====

pub async fn get_markets(State(state): State<SharedState>) -> Json<Value> {
    let app_state = state.lock().await;
    Json(json!({ "markets": app_state.engine.market_summaries() }))
}

pub async fn get_market(State(state): State<SharedState>, ApiPath(id): ApiPath<u64>) -> LedgerResult<Json<MarketSummary>> {
    let app_state = state.lock().await;
    Ok(Json(app_state.engine.market_summary(id)?))
}

pub async fn create_market(
    State(state): State<SharedState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<CreateMarketRequest>,
) -> LedgerResult<Json<Value>> {
    let creator = caller_from(&headers)?;
    let mut app_state = state.lock().await;

    let market_id = app_state.engine.create_market(
        &creator,
        payload.question,
        payload.duration_seconds,
        payload.category,
    )?;
    let end_time = app_state.engine.market(market_id)?.end_time;

    Ok(Json(json!({ "success": true, "market_id": market_id, "end_time": end_time })))
}

pub async fn get_markets_by_category(
    State(state): State<SharedState>,
    ApiPath(category): ApiPath<Category>,
) -> Json<Value> {
    let app_state = state.lock().await;
    let ids = app_state.engine.markets_by_category(category);
    Json(json!({ "category": category, "market_ids": ids }))
}

// ===== TRADING ENDPOINTS =====

pub async fn buy_shares(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<u64>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<TradeRequest>,
) -> LedgerResult<Json<Value>> {
    let buyer = caller_from(&headers)?;
    let mut app_state = state.lock().await;

    let quote = app_state.engine.buy_shares(&buyer, id, payload.side, payload.amount)?;
    let balance = app_state.engine.balance_of(id, payload.side, &buyer);

    Ok(Json(json!({
        "success": true,
        "market_id": id,
        "side": payload.side,
        "amount": quote.amount,
        "fee": quote.fee,
        "shares": quote.net_shares,
        "new_balance": balance,
    })))
}

pub async fn sell_shares(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<u64>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<TradeRequest>,
) -> LedgerResult<Json<Value>> {
    let seller = caller_from(&headers)?;
    let mut app_state = state.lock().await;

    let returned = app_state.engine.sell_shares(&seller, id, payload.side, payload.amount)?;
    let balance = app_state.engine.balance_of(id, payload.side, &seller);

    Ok(Json(json!({
        "success": true,
        "market_id": id,
        "side": payload.side,
        "collateral_returned": returned,
        "new_balance": balance,
    })))
}

pub async fn redeem(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<u64>,
    headers: HeaderMap,
) -> LedgerResult<Json<Value>> {
    let holder = caller_from(&headers)?;
    let mut app_state = state.lock().await;

    let result = app_state.engine.redeem(&holder, id)?;
    Ok(Json(json!({ "success": true, "redemption": result })))
}

// ===== LEDGER QUERIES =====

pub async fn get_position(
    State(state): State<SharedState>,
    ApiPath((id, holder)): ApiPath<(u64, String)>,
) -> LedgerResult<Json<PositionResponse>> {
    let app_state = state.lock().await;
    app_state.engine.market(id)?;

    Ok(Json(PositionResponse {
        market_id: id,
        yes: app_state.engine.balance_of(id, Side::Yes, &holder),
        no: app_state.engine.balance_of(id, Side::No, &holder),
        holder,
    }))
}

pub async fn get_market_fees(State(state): State<SharedState>, ApiPath(id): ApiPath<u64>) -> LedgerResult<Json<Value>> {
    let app_state = state.lock().await;
    app_state.engine.market(id)?;
    Ok(Json(json!({ "market_id": id, "fees_collected": app_state.engine.fees_collected(id) })))
}

pub async fn get_market_audit(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<u64>,
) -> LedgerResult<Json<AuditResponse>> {
    let app_state = state.lock().await;
    let audit = app_state.engine.audit(id)?;
    Ok(Json(AuditResponse { sound: audit.is_sound(), audit }))
}

pub async fn get_total_fees(State(state): State<SharedState>) -> Json<Value> {
    let app_state = state.lock().await;
    Json(json!({ "total_fees_collected": app_state.engine.total_fees_collected() }))
}

pub async fn get_paused(State(state): State<SharedState>) -> Json<Value> {
    let app_state = state.lock().await;
    Json(json!({ "paused": app_state.engine.is_paused() }))
}

/// GET /events?since=N&limit=M
/// Pages forward through the event log; pass `next_since` back as `since`.
pub async fn get_events(State(state): State<SharedState>, ApiQuery(query): ApiQuery<EventsQuery>) -> Json<Value> {
    let app_state = state.lock().await;
    let events = app_state.engine.events_page(query.since, query.page_size());
    let next_since = events.last().map(|r| r.seq).unwrap_or(query.since);
    let has_more = app_state.engine.events_since(next_since).first().is_some();

    Json(json!({ "events": events, "next_since": next_since, "has_more": has_more }))
}
