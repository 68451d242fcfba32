// Conservation checks over the whole ledger

use serde::Serialize;

use super::MarketEngine;
use crate::error::LedgerResult;
use crate::shares::Side;

/// Accounting snapshot of one market and whether its invariants hold
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketAudit {
    pub market_id: u64,
    pub held: u64,
    pub fees_collected: u64,
    pub deposited: u128,
    pub paid_out: u128,
    pub total_yes_shares: u64,
    pub total_no_shares: u64,
    pub resolved: bool,
    /// held + fees == deposited - paid_out
    pub conserved: bool,
    /// Before resolution held == yes + no; after, held covers the winning side
    pub backed: bool,
    /// Holder balances sum to the stored side totals
    pub balances_match: bool,
}

impl MarketAudit {
    pub fn is_sound(&self) -> bool {
        self.conserved && self.backed && self.balances_match
    }
}

/// Audit of every market plus the vault itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerAudit {
    pub markets: Vec<MarketAudit>,
    pub vault_balance: u64,
    /// Sum of held collateral plus the unwithdrawn fee pot
    pub vault_expected: u128,
}

impl LedgerAudit {
    pub fn is_sound(&self) -> bool {
        u128::from(self.vault_balance) == self.vault_expected && self.markets.iter().all(MarketAudit::is_sound)
    }
}

impl MarketEngine {
    pub fn audit(&self, market_id: u64) -> LedgerResult<MarketAudit> {
        let market = self.registry.get(market_id)?;
        let collateral = self.collateral.get(market_id);
        let fees_collected = self.fees.fees_collected(market_id);

        let yes = market.total_yes_shares();
        let no = market.total_no_shares();

        let conserved = collateral.deposited >= collateral.paid_out
            && u128::from(collateral.held) + u128::from(fees_collected) == collateral.deposited - collateral.paid_out
            && collateral.carved_out == u128::from(fees_collected);

        let backed = match market.winning_outcome {
            None => u128::from(collateral.held) == u128::from(yes) + u128::from(no),
            Some(winner) => collateral.held >= market.total_shares(winner),
        };

        let balances_match = self.shares.sum_of_balances(market_id, Side::Yes) == u128::from(yes)
            && self.shares.sum_of_balances(market_id, Side::No) == u128::from(no);

        Ok(MarketAudit {
            market_id,
            held: collateral.held,
            fees_collected,
            deposited: collateral.deposited,
            paid_out: collateral.paid_out,
            total_yes_shares: yes,
            total_no_shares: no,
            resolved: market.is_resolved(),
            conserved,
            backed,
            balances_match,
        })
    }

    pub fn audit_all(&self) -> LedgerAudit {
        let markets = self
            .registry
            .iter()
            .filter_map(|m| self.audit(m.id).ok())
            .collect();

        LedgerAudit {
            markets,
            vault_balance: self.token.balance_of(self.collateral.vault()),
            vault_expected: self.collateral.total_held() + u128::from(self.fees.total_fees_collected()),
        }
    }
}
