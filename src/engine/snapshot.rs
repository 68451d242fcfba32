// Serializable copy of the full ledger state

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::MarketEngine;
use crate::clock::Clock;
use crate::collateral::{CollateralAccount, CollateralToken, FeeLedger};
use crate::config::EngineConfig;
use crate::events::EventLog;
use crate::markets::MarketRegistry;
use crate::pause::PauseGate;
use crate::shares::OutcomeTokenLedger;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u32,
    pub saved_at: u64,
    pub registry: MarketRegistry,
    pub shares: OutcomeTokenLedger,
    pub collateral: CollateralAccount,
    pub fees: FeeLedger,
    pub pause: PauseGate,
    pub token: CollateralToken,
    pub events: EventLog,
}

impl MarketEngine {
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: self.now(),
            registry: self.registry.clone(),
            shares: self.shares.clone(),
            collateral: self.collateral.clone(),
            fees: self.fees.clone(),
            pause: self.pause,
            token: self.token.clone(),
            events: self.events.clone(),
        }
    }

    /// Rebuild an engine from a snapshot. Operator and fee rate always come
    /// from the current configuration, not from the snapshot.
    pub fn restore(config: EngineConfig, clock: Arc<dyn Clock>, snapshot: LedgerSnapshot) -> Self {
        let mut engine = MarketEngine::new(config, clock);
        engine.registry = snapshot.registry;
        engine.shares = snapshot.shares;
        engine.collateral = snapshot.collateral;
        engine.fees = snapshot.fees;
        engine.pause = snapshot.pause;
        engine.token = snapshot.token;
        engine.events = snapshot.events;
        engine
    }
}
