// ============================================================================
// Market Engine - Binary Market Ledger
// ============================================================================
//
// The only component allowed to move collateral, outcome tokens and fees
// together. Every public operation either completes entirely or returns an
// error with no state changed.
//
//   create_market  -> registry
//   buy_shares     -> pull collateral, carve fee, mint net shares
//   sell_shares    -> burn shares, return collateral 1:1 (no fee)
//   resolve_market -> operator records the winning side (no funds move)
//   redeem         -> burn winning shares, pay pro-rata share of the pool
//   withdraw_fees  -> operator drains the fee pot
//
// Buys and sells check the pause gate; nothing else does.
//
// ============================================================================

pub mod audit;
pub mod snapshot;

pub use audit::*;
pub use snapshot::*;

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::collateral::{CollateralAccount, CollateralToken, FeeLedger, VAULT_ACCOUNT};
use crate::config::EngineConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::events::{EventLog, EventRecord, LedgerEvent};
use crate::markets::{Category, Market, MarketPhase, MarketRegistry};
use crate::pause::PauseGate;
use crate::shares::{quote_mint, redemption_payout, MintQuote, OutcomeTokenLedger, RedeemResult, Side};

/// Read-only view of a market with its derived phase and collateral
#[derive(Debug, Clone, Serialize)]
pub struct MarketSummary {
    #[serde(flatten)]
    pub market: Market,
    pub phase: MarketPhase,
    pub collateral_held: u64,
    pub fees_collected: u64,
}

#[derive(Debug)]
pub struct MarketEngine {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    registry: MarketRegistry,
    shares: OutcomeTokenLedger,
    collateral: CollateralAccount,
    fees: FeeLedger,
    pause: PauseGate,
    token: CollateralToken,
    events: EventLog,
}

impl MarketEngine {
    pub fn new(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        info!(
            operator = config.operator.address(),
            fee_bps = config.fee_bps,
            "market engine initialized"
        );

        Self {
            config,
            clock,
            registry: MarketRegistry::new(),
            shares: OutcomeTokenLedger::new(),
            collateral: CollateralAccount::new(VAULT_ACCOUNT),
            fees: FeeLedger::new(),
            pause: PauseGate::new(),
            token: CollateralToken::new(),
            events: EventLog::new(),
        }
    }

    pub fn with_system_clock(config: EngineConfig) -> Self {
        Self::new(config, Arc::new(SystemClock))
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // MARKET LIFECYCLE
    // ========================================================================

    /// Open a new market. Anyone may create one.
    pub fn create_market(
        &mut self,
        creator: &str,
        question: impl Into<String>,
        duration: u64,
        category: Category,
    ) -> LedgerResult<u64> {
        let now = self.now();
        let question = question.into();

        let market_id = self
            .registry
            .create_market(question.clone(), duration, category, creator, now)?;
        let end_time = self.registry.get(market_id)?.end_time;

        self.events.emit(
            now,
            LedgerEvent::MarketCreated {
                market_id,
                creator: creator.to_string(),
                question,
                category,
                end_time,
            },
        );

        Ok(market_id)
    }

    /// Operator records the winning side once trading has ended
    pub fn resolve_market(&mut self, caller: &str, market_id: u64, winning_side: Side) -> LedgerResult<()> {
        self.config.operator.authorize(caller)?;

        let now = self.now();
        self.registry.resolve(market_id, winning_side, now)?;

        self.events
            .emit(now, LedgerEvent::MarketResolved { market_id, winning_side });
        Ok(())
    }

    // ========================================================================
    // TRADING
    // ========================================================================

    /// Pull `amount` collateral from the caller, carve the fee, and mint the
    /// remainder as `side` tokens.
    pub fn buy_shares(&mut self, caller: &str, market_id: u64, side: Side, amount: u64) -> LedgerResult<MintQuote> {
        self.pause.require_not_paused()?;
        self.reject_vault(caller)?;

        let now = self.now();
        self.registry.get(market_id)?.ensure_trading(now)?;

        if amount == 0 {
            return Err(LedgerError::InvalidAmount("buy amount must be greater than zero".to_string()));
        }

        let quote = quote_mint(amount, self.config.fee_bps)?;
        self.token.ensure_can_pull(caller, amount)?;
        self.fees.ensure_can_accrue(market_id, quote.fee)?;

        // Held collateral and side totals are bounded by the vault balance,
        // which is bounded by the token supply. Once the pull is covered the
        // remaining steps cannot fail.
        self.token.transfer_from(caller, self.collateral.vault(), amount)?;
        self.collateral.deposit(market_id, amount)?;
        self.collateral.carve_out(market_id, quote.fee)?;
        self.fees.accrue(market_id, quote.fee)?;

        let market = self.registry.get_mut(market_id)?;
        self.shares.mint(market, side, caller, quote.net_shares)?;

        debug!(market_id, caller, %side, amount, fee = quote.fee, "shares bought");
        self.events.emit(
            now,
            LedgerEvent::SharesBought {
                market_id,
                buyer: caller.to_string(),
                side,
                shares: quote.net_shares,
                fee: quote.fee,
            },
        );

        Ok(quote)
    }

    /// Burn `amount` of the caller's `side` tokens and return the same amount
    /// of collateral. Only allowed while trading.
    pub fn sell_shares(&mut self, caller: &str, market_id: u64, side: Side, amount: u64) -> LedgerResult<u64> {
        self.pause.require_not_paused()?;
        self.reject_vault(caller)?;

        let now = self.now();
        self.registry.get(market_id)?.ensure_trading(now)?;

        if amount == 0 {
            return Err(LedgerError::InvalidAmount("sell amount must be greater than zero".to_string()));
        }

        let market = self.registry.get_mut(market_id)?;
        self.shares.burn(market, side, caller, amount)?;

        if let Err(e) = self.collateral.pay_out(market_id, amount, caller, &mut self.token) {
            self.restore_shares(market_id, side, caller, amount);
            return Err(e);
        }

        debug!(market_id, caller, %side, amount, "shares sold");
        self.events.emit(
            now,
            LedgerEvent::SharesSold {
                market_id,
                seller: caller.to_string(),
                side,
                shares: amount,
            },
        );

        Ok(amount)
    }

    /// Exchange the holder's winning tokens for their pro-rata share of the
    /// market's remaining collateral
    pub fn redeem(&mut self, holder: &str, market_id: u64) -> LedgerResult<RedeemResult> {
        self.reject_vault(holder)?;
        let market = self.registry.get(market_id)?;
        let winning_side = market.winning_outcome.ok_or(LedgerError::NotResolved(market_id))?;

        let shares = self.shares.balance_of(market_id, winning_side, holder);
        if shares == 0 {
            return Err(LedgerError::NothingToRedeem(market_id));
        }

        let pool = self.collateral.held(market_id);
        let payout = redemption_payout(shares, pool, market.total_shares(winning_side))?;

        let market = self.registry.get_mut(market_id)?;
        self.shares.burn(market, winning_side, holder, shares)?;

        if payout > 0 {
            if let Err(e) = self.collateral.pay_out(market_id, payout, holder, &mut self.token) {
                self.restore_shares(market_id, winning_side, holder, shares);
                return Err(e);
            }
        }

        let now = self.now();
        self.events.emit(
            now,
            LedgerEvent::SharesRedeemed {
                market_id,
                holder: holder.to_string(),
                side: winning_side,
                shares,
                payout,
            },
        );

        Ok(RedeemResult {
            market_id,
            holder: holder.to_string(),
            winning_side,
            shares_burned: shares,
            payout,
        })
    }

    /// The vault only moves collateral on the engine's behalf
    fn reject_vault(&self, who: &str) -> LedgerResult<()> {
        if who == self.collateral.vault() {
            return Err(LedgerError::Unauthorized("the vault account cannot act as a holder".to_string()));
        }
        Ok(())
    }

    /// Put burned tokens back after a later step failed
    fn restore_shares(&mut self, market_id: u64, side: Side, holder: &str, amount: u64) {
        let restored = self
            .registry
            .get_mut(market_id)
            .and_then(|market| self.shares.mint(market, side, holder, amount));

        if let Err(e) = restored {
            error!(market_id, holder, %side, amount, error = %e, "failed to restore burned shares");
        }
    }

    // ========================================================================
    // OPERATOR
    // ========================================================================

    /// Send the whole fee pot to `to`
    pub fn withdraw_fees(&mut self, caller: &str, to: &str) -> LedgerResult<u64> {
        self.config.operator.authorize(caller)?;
        self.reject_vault(to)?;

        let amount = self.fees.withdraw(self.collateral.vault(), to, &mut self.token)?;

        let now = self.now();
        self.events.emit(
            now,
            LedgerEvent::FeesWithdrawn {
                to: to.to_string(),
                amount,
            },
        );
        Ok(amount)
    }

    /// Returns whether the flag changed; pausing twice is not an error
    pub fn pause(&mut self, caller: &str) -> LedgerResult<bool> {
        self.config.operator.authorize(caller)?;

        let changed = self.pause.pause();
        if changed {
            warn!(by = caller, "trading paused");
            let now = self.now();
            self.events.emit(now, LedgerEvent::Paused { by: caller.to_string() });
        }
        Ok(changed)
    }

    pub fn unpause(&mut self, caller: &str) -> LedgerResult<bool> {
        self.config.operator.authorize(caller)?;

        let changed = self.pause.unpause();
        if changed {
            info!(by = caller, "trading resumed");
            let now = self.now();
            self.events.emit(now, LedgerEvent::Unpaused { by: caller.to_string() });
        }
        Ok(changed)
    }

    /// Credit new collateral to a wallet (faucet / deposit bridge)
    pub fn fund(&mut self, caller: &str, address: &str, amount: u64) -> LedgerResult<u64> {
        self.config.operator.authorize(caller)?;

        if amount == 0 {
            return Err(LedgerError::InvalidAmount("funding amount must be greater than zero".to_string()));
        }
        self.reject_vault(address)?;

        let balance = self.token.mint_to(address, amount)?;

        let now = self.now();
        self.events.emit(
            now,
            LedgerEvent::WalletFunded {
                address: address.to_string(),
                amount,
            },
        );
        Ok(balance)
    }

    // ========================================================================
    // HOLDER WALLET
    // ========================================================================

    /// Authorize the engine to pull up to `amount` collateral from `holder`
    pub fn approve(&mut self, holder: &str, amount: u64) -> LedgerResult<()> {
        self.reject_vault(holder)?;
        debug!(holder, amount, "collateral allowance set");
        self.token.approve(holder, amount);
        Ok(())
    }

    pub fn collateral_balance(&self, holder: &str) -> u64 {
        self.token.balance_of(holder)
    }

    pub fn allowance(&self, holder: &str) -> u64 {
        self.token.allowance(holder)
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn market(&self, market_id: u64) -> LedgerResult<&Market> {
        self.registry.get(market_id)
    }

    pub fn market_summary(&self, market_id: u64) -> LedgerResult<MarketSummary> {
        let market = self.registry.get(market_id)?;
        Ok(MarketSummary {
            market: market.clone(),
            phase: market.phase(self.now()),
            collateral_held: self.collateral.held(market_id),
            fees_collected: self.fees.fees_collected(market_id),
        })
    }

    pub fn market_summaries(&self) -> Vec<MarketSummary> {
        self.registry
            .iter()
            .filter_map(|m| self.market_summary(m.id).ok())
            .collect()
    }

    pub fn markets_by_category(&self, category: Category) -> &[u64] {
        self.registry.markets_by_category(category)
    }

    pub fn market_phase(&self, market_id: u64) -> LedgerResult<MarketPhase> {
        Ok(self.registry.get(market_id)?.phase(self.now()))
    }

    pub fn balance_of(&self, market_id: u64, side: Side, holder: &str) -> u64 {
        self.shares.balance_of(market_id, side, holder)
    }

    pub fn collateral_held(&self, market_id: u64) -> u64 {
        self.collateral.held(market_id)
    }

    pub fn fees_collected(&self, market_id: u64) -> u64 {
        self.fees.fees_collected(market_id)
    }

    pub fn total_fees_collected(&self) -> u64 {
        self.fees.total_fees_collected()
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    pub fn events_since(&self, after: u64) -> &[EventRecord] {
        self.events.since(after)
    }

    pub fn events_page(&self, after: u64, limit: usize) -> &[EventRecord] {
        self.events.page(after, limit)
    }
}

// ============================================================================
// TESTS
// ============================================================================
