// Runtime configuration loaded from the environment (and `.env`)

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::{Operator, OperatorKey};
use crate::error::{LedgerError, LedgerResult};
use crate::shares::{validate_fee_bps, DEFAULT_FEE_BPS};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:1234";
pub const DEFAULT_OPERATOR: &str = "operator";
pub const DEFAULT_STATE_PATH: &str = "data/state.json";
pub const DEFAULT_SAVE_INTERVAL_SECS: u64 = 60;

/// Settings the engine itself needs. Passed in explicitly so the engine
/// never reads ambient global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub operator: Operator,
    /// Buy fee in basis points
    pub fee_bps: u32,
}

impl EngineConfig {
    pub fn new(operator: impl Into<String>, fee_bps: u32) -> LedgerResult<Self> {
        validate_fee_bps(fee_bps)?;
        Ok(Self {
            operator: Operator::new(operator),
            fee_bps,
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            operator: Operator::new(DEFAULT_OPERATOR),
            fee_bps: DEFAULT_FEE_BPS,
        }
    }
}

/// Full service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub engine: EngineConfig,
    /// Operator HTTP routes are disabled when unset
    pub operator_key: Option<OperatorKey>,
    pub state_path: PathBuf,
    /// Periodic snapshot interval; `None` saves only on shutdown
    pub save_interval: Option<Duration>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not valid: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl Config {
    /// Load `.env` if present, then read `LEDGER_*` variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup("LEDGER_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|e| ConfigError::Invalid {
            var: "LEDGER_BIND_ADDR",
            reason: format!("{}: {}", bind_raw, e),
        })?;

        let operator = lookup("LEDGER_OPERATOR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OPERATOR.to_string());

        let fee_bps = match lookup("LEDGER_FEE_BPS") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
                var: "LEDGER_FEE_BPS",
                reason: format!("{}: {}", raw, e),
            })?,
            None => DEFAULT_FEE_BPS,
        };

        // A pre-hashed key keeps the plain secret out of the environment
        let operator_key = match lookup("LEDGER_OPERATOR_KEY_SHA256").filter(|v| !v.trim().is_empty()) {
            Some(digest) => {
                let digest = digest.trim();
                if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(ConfigError::Invalid {
                        var: "LEDGER_OPERATOR_KEY_SHA256",
                        reason: "expected 64 hex characters".to_string(),
                    });
                }
                Some(OperatorKey::from_digest(digest))
            }
            None => lookup("LEDGER_OPERATOR_KEY")
                .filter(|v| !v.is_empty())
                .map(|secret| OperatorKey::from_secret(&secret)),
        };

        let state_path = lookup("LEDGER_STATE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH));

        let save_secs = match lookup("LEDGER_SAVE_INTERVAL_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                var: "LEDGER_SAVE_INTERVAL_SECS",
                reason: format!("{}: {}", raw, e),
            })?,
            None => DEFAULT_SAVE_INTERVAL_SECS,
        };
        let save_interval = (save_secs > 0).then(|| Duration::from_secs(save_secs));

        Ok(Self {
            bind_addr,
            engine: EngineConfig::new(operator, fee_bps)?,
            operator_key,
            state_path,
            save_interval,
        })
    }
}
