// Request and response bodies for the HTTP API

use serde::{Deserialize, Serialize};

use crate::engine::MarketAudit;
use crate::markets::Category;
use crate::shares::Side;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMarketRequest {
    pub question: String,
    pub duration_seconds: u64,
    pub category: Category,
}

/// Body for buy and sell
#[derive(Debug, Clone, Deserialize)]
pub struct TradeRequest {
    pub side: Side,
    /// Collateral in the asset's smallest unit
    pub amount: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveRequest {
    pub winning_side: Side,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WithdrawFeesRequest {
    /// Defaults to the operator
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FundRequest {
    pub address: String,
    pub amount: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApproveRequest {
    pub amount: u64,
}

/// Events returned when no `limit` is given
pub const DEFAULT_EVENTS_PAGE: usize = 100;
/// Upper bound on `limit`
pub const MAX_EVENTS_PAGE: usize = 1_000;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub since: u64,
    pub limit: Option<usize>,
}

impl EventsQuery {
    pub fn page_size(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_EVENTS_PAGE).min(MAX_EVENTS_PAGE)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionResponse {
    pub market_id: u64,
    pub holder: String,
    pub yes: u64,
    pub no: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditResponse {
    pub sound: bool,
    pub audit: MarketAudit,
}
