// Per-market collateral held by the engine vault

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::CollateralToken;
use crate::error::{LedgerError, LedgerResult};

/// Collateral bookkeeping for one market
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketCollateral {
    /// Currently backing outstanding shares (fees excluded)
    pub held: u64,
    /// Gross collateral ever deposited
    pub deposited: u128,
    /// Collateral ever paid back to holders
    pub paid_out: u128,
    /// Collateral carved out of deposits into the fee pot
    pub carved_out: u128,
}

/// Collateral held per market. The tokens themselves sit in the vault
/// account of the collateral token; this tracks which market owns what.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollateralAccount {
    vault: String,
    markets: BTreeMap<u64, MarketCollateral>,
}

impl CollateralAccount {
    pub fn new(vault: impl Into<String>) -> Self {
        Self {
            vault: vault.into(),
            markets: BTreeMap::new(),
        }
    }

    pub fn vault(&self) -> &str {
        &self.vault
    }

    pub fn get(&self, market_id: u64) -> MarketCollateral {
        self.markets.get(&market_id).copied().unwrap_or_default()
    }

    pub fn held(&self, market_id: u64) -> u64 {
        self.get(market_id).held
    }

    /// Sum of collateral held across every market
    pub fn total_held(&self) -> u128 {
        self.markets.values().map(|m| u128::from(m.held)).sum()
    }

    /// Record `amount` of collateral arriving in the vault for a market
    pub fn deposit(&mut self, market_id: u64, amount: u64) -> LedgerResult<()> {
        let entry = self.markets.entry(market_id).or_default();
        entry.held = entry.held.checked_add(amount).ok_or(LedgerError::ArithmeticOverflow)?;
        entry.deposited += u128::from(amount);
        Ok(())
    }

    /// Move `amount` out of the market's backing into the fee pot.
    /// The tokens stay in the vault.
    pub fn carve_out(&mut self, market_id: u64, amount: u64) -> LedgerResult<()> {
        self.ensure_held(market_id, amount)?;
        let entry = self.markets.entry(market_id).or_default();
        entry.held -= amount;
        entry.carved_out += u128::from(amount);
        Ok(())
    }

    /// Transfer `amount` of the market's collateral from the vault to `to`
    pub fn pay_out(&mut self, market_id: u64, amount: u64, to: &str, token: &mut CollateralToken) -> LedgerResult<()> {
        self.ensure_held(market_id, amount)?;
        token.transfer(&self.vault, to, amount)?;

        let entry = self.markets.entry(market_id).or_default();
        entry.held -= amount;
        entry.paid_out += u128::from(amount);
        Ok(())
    }

    fn ensure_held(&self, market_id: u64, amount: u64) -> LedgerResult<()> {
        let held = self.held(market_id);
        if held < amount {
            return Err(LedgerError::InsufficientCollateral {
                market_id,
                held,
                requested: amount,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded_vault(amount: u64) -> CollateralToken {
        let mut token = CollateralToken::new();
        token.mint_to("vault", amount).unwrap();
        token
    }

    #[test]
    fn test_deposit_carve_and_pay_out() {
        let mut token = funded_vault(100);
        let mut account = CollateralAccount::new("vault");

        account.deposit(0, 100).unwrap();
        account.carve_out(0, 2).unwrap();
        account.pay_out(0, 49, "alice", &mut token).unwrap();

        let m = account.get(0);
        assert_eq!(m.held, 49);
        assert_eq!(m.deposited, 100);
        assert_eq!(m.carved_out, 2);
        assert_eq!(m.paid_out, 49);
        assert_eq!(token.balance_of("alice"), 49);
        assert_eq!(token.balance_of("vault"), 51);
    }

    #[test]
    fn test_pay_out_more_than_held_fails_cleanly() {
        let mut token = funded_vault(100);
        let mut account = CollateralAccount::new("vault");
        account.deposit(0, 10).unwrap();
        account.deposit(1, 90).unwrap();

        let result = account.pay_out(0, 11, "alice", &mut token);

        assert_eq!(
            result,
            Err(LedgerError::InsufficientCollateral { market_id: 0, held: 10, requested: 11 })
        );
        assert_eq!(account.held(0), 10);
        assert_eq!(token.balance_of("alice"), 0);
    }

    #[test]
    fn test_markets_are_isolated() {
        let mut account = CollateralAccount::new("vault");
        account.deposit(3, 40).unwrap();

        assert_eq!(account.held(3), 40);
        assert_eq!(account.held(4), 0);
        assert_eq!(account.total_held(), 40);
    }
}
