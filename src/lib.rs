/// Binary Market Ledger
/// Fully-collateralized binary prediction markets: issuance, exit,
/// resolution and pro-rata redemption, behind an optional HTTP service.

pub mod app_state;
pub mod auth;
pub mod clock;
pub mod collateral;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod extract;
pub mod handlers;
pub mod markets;
pub mod models;
pub mod pause;
pub mod routes;
pub mod shares;

pub use app_state::{AppState, SharedState};
pub use auth::{Operator, OperatorKey};
pub use clock::{Clock, ManualClock, SystemClock};
pub use collateral::{CollateralAccount, CollateralToken, FeeLedger, MarketCollateral, VAULT_ACCOUNT};
pub use config::{Config, ConfigError, EngineConfig};
pub use engine::{LedgerAudit, LedgerSnapshot, MarketAudit, MarketEngine, MarketSummary};
pub use error::{LedgerError, LedgerResult, PersistError};
pub use events::{EventLog, EventRecord, LedgerEvent};
pub use markets::{Category, Market, MarketPhase, MarketRegistry};
pub use pause::PauseGate;
pub use routes::build_router;
pub use shares::{quote_mint, MintQuote, OutcomeTokenLedger, RedeemResult, Side, DEFAULT_FEE_BPS};
