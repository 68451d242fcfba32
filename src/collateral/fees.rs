// Fee accrual and withdrawal

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::CollateralToken;
use crate::error::{LedgerError, LedgerResult};

/// Per-market and global fee counters.
///
/// Per-market totals are historical and only ever grow. The global total is
/// the fee pot currently sitting in the vault and is drained on withdrawal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeeLedger {
    per_market: BTreeMap<u64, u64>,
    total_fees_collected: u64,
    total_withdrawn: u128,
}

impl FeeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fees_collected(&self, market_id: u64) -> u64 {
        self.per_market.get(&market_id).copied().unwrap_or(0)
    }

    pub fn total_fees_collected(&self) -> u64 {
        self.total_fees_collected
    }

    pub fn total_withdrawn(&self) -> u128 {
        self.total_withdrawn
    }

    /// Check that `amount` can be accrued without changing anything
    pub fn ensure_can_accrue(&self, market_id: u64, amount: u64) -> LedgerResult<()> {
        self.fees_collected(market_id)
            .checked_add(amount)
            .and_then(|_| self.total_fees_collected.checked_add(amount))
            .map(|_| ())
            .ok_or(LedgerError::ArithmeticOverflow)
    }

    pub fn accrue(&mut self, market_id: u64, amount: u64) -> LedgerResult<()> {
        if amount == 0 {
            return Ok(());
        }

        let market_total = self
            .fees_collected(market_id)
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let global_total = self
            .total_fees_collected
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        self.per_market.insert(market_id, market_total);
        self.total_fees_collected = global_total;
        Ok(())
    }

    /// Send the whole fee pot from the vault to `to`
    pub fn withdraw(&mut self, vault: &str, to: &str, token: &mut CollateralToken) -> LedgerResult<u64> {
        let amount = self.total_fees_collected;
        if amount == 0 {
            return Err(LedgerError::NoFeesToWithdraw);
        }

        token.transfer(vault, to, amount)?;

        self.total_fees_collected = 0;
        self.total_withdrawn += u128::from(amount);
        Ok(amount)
    }
}
