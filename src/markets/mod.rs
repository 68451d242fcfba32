// ============================================================================
// Markets Module - Binary Market Ledger
// ============================================================================
//
// A market is one binary question with a trading deadline.
//
// Lifecycle:
//   Trading  (now < end_time, unresolved)
//   Ended    (now >= end_time, unresolved)   derived from time, never stored
//   Resolved (winning side recorded)         set exactly once by the operator
//
// Markets are never deleted and ids are never reused.
//
// ============================================================================

pub mod registry;

pub use registry::*;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::shares::Side;

/// Market category tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    DeFi,
    Crypto,
    Politics,
    Sports,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::DeFi,
        Category::Crypto,
        Category::Politics,
        Category::Sports,
        Category::Other,
    ];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::DeFi => "defi",
            Category::Crypto => "crypto",
            Category::Politics => "politics",
            Category::Sports => "sports",
            Category::Other => "other",
        };
        f.write_str(name)
    }
}

/// Phase of a market at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketPhase {
    Trading,
    Ended,
    Resolved,
}

/// One prediction question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    /// Sequential id assigned at creation
    pub id: u64,

    pub question: String,

    pub category: Category,

    /// Wallet that opened the market
    pub creator: String,

    pub created_at: u64,

    /// Trading closes at this instant (inclusive)
    pub end_time: u64,

    /// Outstanding YES tokens across all holders
    pub(crate) total_yes_shares: u64,

    /// Outstanding NO tokens across all holders
    pub(crate) total_no_shares: u64,

    /// Winning side, set once on resolution
    pub winning_outcome: Option<Side>,

    pub resolved_at: Option<u64>,
}

impl Market {
    pub fn is_resolved(&self) -> bool {
        self.winning_outcome.is_some()
    }

    pub fn phase(&self, now: u64) -> MarketPhase {
        if self.is_resolved() {
            MarketPhase::Resolved
        } else if now >= self.end_time {
            MarketPhase::Ended
        } else {
            MarketPhase::Trading
        }
    }

    /// Buys and sells are only accepted while trading
    pub fn ensure_trading(&self, now: u64) -> LedgerResult<()> {
        match self.phase(now) {
            MarketPhase::Trading => Ok(()),
            _ => Err(LedgerError::TradingClosed(self.id)),
        }
    }

    pub fn total_shares(&self, side: Side) -> u64 {
        match side {
            Side::Yes => self.total_yes_shares,
            Side::No => self.total_no_shares,
        }
    }

    pub(crate) fn total_shares_mut(&mut self, side: Side) -> &mut u64 {
        match side {
            Side::Yes => &mut self.total_yes_shares,
            Side::No => &mut self.total_no_shares,
        }
    }

    pub fn total_yes_shares(&self) -> u64 {
        self.total_yes_shares
    }

    pub fn total_no_shares(&self) -> u64 {
        self.total_no_shares
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(end_time: u64) -> Market {
        Market {
            id: 0,
            question: "Will ETH flip BTC?".to_string(),
            category: Category::Crypto,
            creator: "alice".to_string(),
            created_at: 0,
            end_time,
            total_yes_shares: 0,
            total_no_shares: 0,
            winning_outcome: None,
            resolved_at: None,
        }
    }

    #[test]
    fn test_phase_is_derived_from_time() {
        let m = market(100);
        assert_eq!(m.phase(99), MarketPhase::Trading);
        assert_eq!(m.phase(100), MarketPhase::Ended);
        assert_eq!(m.phase(5_000), MarketPhase::Ended);
    }

    #[test]
    fn test_resolved_overrides_time() {
        let mut m = market(100);
        m.winning_outcome = Some(Side::No);
        assert_eq!(m.phase(0), MarketPhase::Resolved);
        assert_eq!(m.ensure_trading(0), Err(LedgerError::TradingClosed(0)));
    }

    #[test]
    fn test_category_serializes_lowercase() {
        let json = serde_json::to_string(&Category::DeFi).unwrap();
        assert_eq!(json, "\"defi\"");
        let parsed: Category = serde_json::from_str("\"sports\"").unwrap();
        assert_eq!(parsed, Category::Sports);
    }
}
