// Collateral asset balances and engine allowances

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{LedgerError, LedgerResult};

/// Fungible collateral asset (e.g. a 6-decimal stablecoin).
///
/// Holders authorize the engine to pull collateral by setting an allowance;
/// a buy spends it through `transfer_from`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollateralToken {
    balances: BTreeMap<String, u64>,
    allowances: BTreeMap<String, u64>,
    total_supply: u64,
}

impl CollateralToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, holder: &str) -> u64 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Amount `holder` has authorized the engine to pull
    pub fn allowance(&self, holder: &str) -> u64 {
        self.allowances.get(holder).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Overwrite the engine allowance for `holder`
    pub fn approve(&mut self, holder: &str, amount: u64) {
        if amount == 0 {
            self.allowances.remove(holder);
        } else {
            self.allowances.insert(holder.to_string(), amount);
        }
    }

    /// Create new collateral in `to`'s wallet
    pub fn mint_to(&mut self, to: &str, amount: u64) -> LedgerResult<u64> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        // Every balance is bounded by total supply, so this cannot overflow
        let balance = self.balance_of(to) + amount;

        self.total_supply = supply;
        self.set_balance(to, balance);
        Ok(balance)
    }

    pub fn transfer(&mut self, from: &str, to: &str, amount: u64) -> LedgerResult<()> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientFunds { available, requested: amount });
        }
        if amount == 0 || from == to {
            return Ok(());
        }

        let credited = self.balance_of(to) + amount;
        self.set_balance(from, available - amount);
        self.set_balance(to, credited);
        Ok(())
    }

    /// Check that `owner` can fund a pull of `amount` without changing anything
    pub fn ensure_can_pull(&self, owner: &str, amount: u64) -> LedgerResult<()> {
        let approved = self.allowance(owner);
        if approved < amount {
            return Err(LedgerError::InsufficientAllowance { approved, requested: amount });
        }
        let available = self.balance_of(owner);
        if available < amount {
            return Err(LedgerError::InsufficientFunds { available, requested: amount });
        }
        Ok(())
    }

    /// Move `amount` from `owner` to `to`, spending the owner's allowance
    pub fn transfer_from(&mut self, owner: &str, to: &str, amount: u64) -> LedgerResult<()> {
        self.ensure_can_pull(owner, amount)?;

        let approved = self.allowance(owner);
        self.transfer(owner, to, amount)?;
        self.approve(owner, approved - amount);
        Ok(())
    }

    fn set_balance(&mut self, holder: &str, balance: u64) {
        if balance == 0 {
            self.balances.remove(holder);
        } else {
            self.balances.insert(holder.to_string(), balance);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_and_transfer() {
        let mut token = CollateralToken::new();
        token.mint_to("alice", 1_000).unwrap();

        token.transfer("alice", "bob", 400).unwrap();

        assert_eq!(token.balance_of("alice"), 600);
        assert_eq!(token.balance_of("bob"), 400);
        assert_eq!(token.total_supply(), 1_000);
    }

    #[test]
    fn test_transfer_insufficient() {
        let mut token = CollateralToken::new();
        token.mint_to("alice", 10).unwrap();

        let result = token.transfer("alice", "bob", 11);

        assert_eq!(result, Err(LedgerError::InsufficientFunds { available: 10, requested: 11 }));
        assert_eq!(token.balance_of("alice"), 10);
    }

    #[test]
    fn test_transfer_from_spends_allowance() {
        let mut token = CollateralToken::new();
        token.mint_to("alice", 1_000).unwrap();
        token.approve("alice", 300);

        token.transfer_from("alice", "vault", 200).unwrap();

        assert_eq!(token.allowance("alice"), 100);
        assert_eq!(token.balance_of("vault"), 200);

        let result = token.transfer_from("alice", "vault", 101);
        assert_eq!(result, Err(LedgerError::InsufficientAllowance { approved: 100, requested: 101 }));
        assert_eq!(token.balance_of("alice"), 800);
    }

    #[test]
    fn test_transfer_from_without_funds() {
        let mut token = CollateralToken::new();
        token.approve("alice", 500);

        let result = token.transfer_from("alice", "vault", 1);
        assert_eq!(result, Err(LedgerError::InsufficientFunds { available: 0, requested: 1 }));
        assert_eq!(token.allowance("alice"), 500);
    }

    #[test]
    fn test_supply_overflow_rejected() {
        let mut token = CollateralToken::new();
        token.mint_to("alice", u64::MAX).unwrap();
        assert_eq!(token.mint_to("bob", 1), Err(LedgerError::ArithmeticOverflow));
        assert_eq!(token.balance_of("bob"), 0);
    }
}
