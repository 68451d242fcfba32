// ============================================================================
// Shares Module - Binary Market Ledger
// ============================================================================
//
// Outcome tokens for binary markets. Each market has two independent
// balance tables, one per side.
//
// Core Invariant:
//   sum of holder balances for (market, side) == market's side total
//
// Both numbers only ever move together inside `mint` and `burn`.
// A zero balance is the same as no entry; burned-out holders are removed.
//
// ============================================================================

pub mod mint;
pub mod redeem;

pub use mint::*;
pub use redeem::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{LedgerError, LedgerResult};
use crate::markets::Market;

// ============================================================================
// SIDE
// ============================================================================

/// Outcome side of a binary market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Yes,
    No,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Yes, Side::No];

    pub fn opposite(self) -> Side {
        match self {
            Side::Yes => Side::No,
            Side::No => Side::Yes,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Yes => f.write_str("yes"),
            Side::No => f.write_str("no"),
        }
    }
}

// ============================================================================
// OUTCOME TOKEN LEDGER
// ============================================================================

/// Holder balances for one market
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct MarketBook {
    yes: BTreeMap<String, u64>,
    no: BTreeMap<String, u64>,
}

impl MarketBook {
    fn side(&self, side: Side) -> &BTreeMap<String, u64> {
        match side {
            Side::Yes => &self.yes,
            Side::No => &self.no,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BTreeMap<String, u64> {
        match side {
            Side::Yes => &mut self.yes,
            Side::No => &mut self.no,
        }
    }
}

/// Per-market, per-side outcome token balances
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutcomeTokenLedger {
    books: BTreeMap<u64, MarketBook>,
}

impl OutcomeTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` tokens of `side` to `holder` and grow the market's side total.
    /// Minting zero is a no-op.
    pub fn mint(&mut self, market: &mut Market, side: Side, holder: &str, amount: u64) -> LedgerResult<()> {
        if amount == 0 {
            return Ok(());
        }

        let new_total = market
            .total_shares(side)
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        let table = self.books.entry(market.id).or_default().side_mut(side);
        let new_balance = table
            .get(holder)
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        table.insert(holder.to_string(), new_balance);
        *market.total_shares_mut(side) = new_total;

        Ok(())
    }

    /// Debit `amount` tokens of `side` from `holder` and shrink the market's side total.
    /// Nothing changes when the holder is short.
    pub fn burn(&mut self, market: &mut Market, side: Side, holder: &str, amount: u64) -> LedgerResult<()> {
        let available = self.balance_of(market.id, side, holder);
        if amount > available {
            return Err(LedgerError::InsufficientBalance { available, requested: amount });
        }
        if amount == 0 {
            return Ok(());
        }

        let new_total = market
            .total_shares(side)
            .checked_sub(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        let remaining = available - amount;
        if let Some(book) = self.books.get_mut(&market.id) {
            let table = book.side_mut(side);
            if remaining == 0 {
                table.remove(holder);
            } else {
                table.insert(holder.to_string(), remaining);
            }
        }
        *market.total_shares_mut(side) = new_total;

        Ok(())
    }

    pub fn balance_of(&self, market_id: u64, side: Side, holder: &str) -> u64 {
        self.books
            .get(&market_id)
            .and_then(|book| book.side(side).get(holder))
            .copied()
            .unwrap_or(0)
    }

    /// Holders with a non-zero balance on one side of a market
    pub fn holders(&self, market_id: u64, side: Side) -> impl Iterator<Item = (&str, u64)> {
        self.books
            .get(&market_id)
            .into_iter()
            .flat_map(move |book| book.side(side).iter())
            .map(|(holder, balance)| (holder.as_str(), *balance))
    }

    /// Sum of every holder balance on one side; used by audits
    pub fn sum_of_balances(&self, market_id: u64, side: Side) -> u128 {
        self.holders(market_id, side).map(|(_, b)| b as u128).sum()
    }
}

// ============================================================================
// TESTS
// ============================================================================
