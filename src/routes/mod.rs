// Routes module - assembles every HTTP endpoint into one router
// Each sub-module handles a specific caller group

pub mod admin;
pub mod wallets;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::app_state::SharedState;
use crate::handlers::*;

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        // ===== HEALTH =====
        .route("/", get(health_check))
        .route("/health", get(health_check))
        // ===== MARKETS =====
        .route("/markets", get(get_markets).post(create_market))
        .route("/markets/:id", get(get_market))
        .route("/categories/:category/markets", get(get_markets_by_category))
        // ===== TRADING =====
        .route("/markets/:id/buy", post(buy_shares))
        .route("/markets/:id/sell", post(sell_shares))
        .route("/markets/:id/redeem", post(redeem))
        // ===== LEDGER QUERIES =====
        .route("/markets/:id/positions/:holder", get(get_position))
        .route("/markets/:id/fees", get(get_market_fees))
        .route("/markets/:id/audit", get(get_market_audit))
        .route("/fees", get(get_total_fees))
        .route("/paused", get(get_paused))
        .route("/events", get(get_events))
        // ===== WALLETS =====
        .route("/approvals", post(wallets::approve))
        .route("/wallets/:address", get(wallets::get_wallet))
        // ===== OPERATOR =====
        .route("/admin/markets/:id/resolve", post(admin::resolve_market))
        .route("/admin/fees/withdraw", post(admin::withdraw_fees))
        .route("/admin/pause", post(admin::pause))
        .route("/admin/unpause", post(admin::unpause))
        .route("/admin/fund", post(admin::fund_wallet))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
