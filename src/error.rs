// ============================================================================
// Errors - Binary Market Ledger
// ============================================================================
//
// Every ledger failure is a terminal, reported outcome. Nothing here is
// retried internally; retry policy belongs to the caller.
//
// ============================================================================

use thiserror::Error;

/// Errors returned by the market ledger and its sub-ledgers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // === Lifecycle ===
    #[error("Market {0} not found")]
    MarketNotFound(u64),

    #[error("Trading has closed for market {0}")]
    TradingClosed(u64),

    #[error("Trading period for market {0} has not ended yet")]
    TradingStillOpen(u64),

    #[error("Market {0} is already resolved")]
    AlreadyResolved(u64),

    #[error("Market {0} is not resolved")]
    NotResolved(u64),

    // === State insufficiency ===
    #[error("Insufficient shares: have {available}, need {requested}")]
    InsufficientBalance { available: u64, requested: u64 },

    #[error("Insufficient collateral in market {market_id}: held {held}, requested {requested}")]
    InsufficientCollateral { market_id: u64, held: u64, requested: u64 },

    #[error("Nothing to redeem in market {0}")]
    NothingToRedeem(u64),

    #[error("No fees to withdraw")]
    NoFeesToWithdraw,

    #[error("Insufficient funds: have {available}, need {requested}")]
    InsufficientFunds { available: u64, requested: u64 },

    #[error("Insufficient allowance: approved {approved}, need {requested}")]
    InsufficientAllowance { approved: u64, requested: u64 },

    // === Operational ===
    #[error("System is paused; trading resumes once the operator unpauses")]
    SystemPaused,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // === Input validation ===
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid fee rate: {0} bps exceeds 10000")]
    InvalidFeeRate(u32),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

impl LedgerError {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::MarketNotFound(_) => "market_not_found",
            LedgerError::TradingClosed(_) => "trading_closed",
            LedgerError::TradingStillOpen(_) => "trading_still_open",
            LedgerError::AlreadyResolved(_) => "already_resolved",
            LedgerError::NotResolved(_) => "not_resolved",
            LedgerError::InsufficientBalance { .. } => "insufficient_balance",
            LedgerError::InsufficientCollateral { .. } => "insufficient_collateral",
            LedgerError::NothingToRedeem(_) => "nothing_to_redeem",
            LedgerError::NoFeesToWithdraw => "no_fees_to_withdraw",
            LedgerError::InsufficientFunds { .. } => "insufficient_funds",
            LedgerError::InsufficientAllowance { .. } => "insufficient_allowance",
            LedgerError::SystemPaused => "system_paused",
            LedgerError::Unauthorized(_) => "unauthorized",
            LedgerError::InvalidAmount(_) => "invalid_amount",
            LedgerError::InvalidDuration(_) => "invalid_duration",
            LedgerError::InvalidFeeRate(_) => "invalid_fee_rate",
            LedgerError::BadRequest(_) => "bad_request",
            LedgerError::ArithmeticOverflow => "arithmetic_overflow",
        }
    }

    /// Whether the same call may succeed later without the caller changing anything
    pub fn is_temporary(&self) -> bool {
        matches!(self, LedgerError::SystemPaused)
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors raised while saving or loading a ledger snapshot
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot rejected: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Snapshot at {path} failed its conservation audit")]
    Unsound { path: String },
}
