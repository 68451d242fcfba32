// Market catalog with a category index

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Category, Market};
use crate::error::{LedgerError, LedgerResult};
use crate::shares::Side;

/// Catalog of all markets, indexed by id and by category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketRegistry {
    /// Markets in creation order; a market's id is its position here
    markets: Vec<Market>,

    /// Category -> market ids in creation order
    by_category: BTreeMap<Category, Vec<u64>>,
}

impl MarketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new market and return its id
    pub fn create_market(
        &mut self,
        question: String,
        duration: u64,
        category: Category,
        creator: &str,
        now: u64,
    ) -> LedgerResult<u64> {
        if duration == 0 {
            return Err(LedgerError::InvalidDuration("duration must be greater than zero".to_string()));
        }

        let end_time = now
            .checked_add(duration)
            .ok_or_else(|| LedgerError::InvalidDuration(format!("duration {} overflows the clock", duration)))?;

        let id = self.markets.len() as u64;

        self.markets.push(Market {
            id,
            question,
            category,
            creator: creator.to_string(),
            created_at: now,
            end_time,
            total_yes_shares: 0,
            total_no_shares: 0,
            winning_outcome: None,
            resolved_at: None,
        });

        self.by_category.entry(category).or_default().push(id);

        Ok(id)
    }

    pub fn get(&self, market_id: u64) -> LedgerResult<&Market> {
        usize::try_from(market_id)
            .ok()
            .and_then(|idx| self.markets.get(idx))
            .ok_or(LedgerError::MarketNotFound(market_id))
    }

    pub fn get_mut(&mut self, market_id: u64) -> LedgerResult<&mut Market> {
        usize::try_from(market_id)
            .ok()
            .and_then(|idx| self.markets.get_mut(idx))
            .ok_or(LedgerError::MarketNotFound(market_id))
    }

    /// Market ids in a category, in creation order
    pub fn markets_by_category(&self, category: Category) -> &[u64] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Record the winning side. Only allowed once the trading period has ended.
    pub fn resolve(&mut self, market_id: u64, winning: Side, now: u64) -> LedgerResult<&Market> {
        let market = self.get_mut(market_id)?;

        if market.is_resolved() {
            return Err(LedgerError::AlreadyResolved(market_id));
        }
        if now < market.end_time {
            return Err(LedgerError::TradingStillOpen(market_id));
        }

        market.winning_outcome = Some(winning);
        market.resolved_at = Some(now);

        Ok(market)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Market> {
        self.markets.iter()
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential() {
        let mut registry = MarketRegistry::new();

        let a = registry.create_market("A?".into(), 10, Category::DeFi, "alice", 0).unwrap();
        let b = registry.create_market("B?".into(), 10, Category::Sports, "bob", 0).unwrap();
        let c = registry.create_market("C?".into(), 10, Category::DeFi, "alice", 0).unwrap();

        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(1).unwrap().question, "B?");
    }

    #[test]
    fn test_zero_duration_rejected() {
        let mut registry = MarketRegistry::new();
        let result = registry.create_market("A?".into(), 0, Category::Other, "alice", 0);
        assert!(matches!(result, Err(LedgerError::InvalidDuration(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_overflowing_duration_rejected() {
        let mut registry = MarketRegistry::new();
        let result = registry.create_market("A?".into(), u64::MAX, Category::Other, "alice", 10);
        assert!(matches!(result, Err(LedgerError::InvalidDuration(_))));
    }

    #[test]
    fn test_category_index_keeps_creation_order() {
        let mut registry = MarketRegistry::new();
        registry.create_market("A?".into(), 10, Category::DeFi, "alice", 0).unwrap();
        registry.create_market("B?".into(), 10, Category::Politics, "alice", 0).unwrap();
        registry.create_market("C?".into(), 10, Category::DeFi, "alice", 0).unwrap();

        assert_eq!(registry.markets_by_category(Category::DeFi), &[0, 2]);
        assert_eq!(registry.markets_by_category(Category::Politics), &[1]);
        assert!(registry.markets_by_category(Category::Sports).is_empty());
    }

    #[test]
    fn test_resolve_lifecycle() {
        let mut registry = MarketRegistry::new();
        let id = registry.create_market("A?".into(), 100, Category::Crypto, "alice", 1_000).unwrap();

        assert_eq!(registry.resolve(id, Side::Yes, 1_099), Err(LedgerError::TradingStillOpen(id)));

        let market = registry.resolve(id, Side::Yes, 1_100).unwrap();
        assert_eq!(market.winning_outcome, Some(Side::Yes));
        assert_eq!(market.resolved_at, Some(1_100));

        assert_eq!(registry.resolve(id, Side::No, 2_000), Err(LedgerError::AlreadyResolved(id)));
        assert_eq!(registry.get(id).unwrap().winning_outcome, Some(Side::Yes));
    }

    #[test]
    fn test_unknown_market() {
        let mut registry = MarketRegistry::new();
        assert_eq!(registry.get(7).err(), Some(LedgerError::MarketNotFound(7)));
        assert_eq!(registry.resolve(7, Side::No, 0).err(), Some(LedgerError::MarketNotFound(7)));
    }
}
