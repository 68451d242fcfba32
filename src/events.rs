// ============================================================================
// Ledger Events - Binary Market Ledger
// ============================================================================
//
// Append-only record of everything observable that the engine did.
// Off-chain indexers and UIs page through it with `since(seq)`.
//
// ============================================================================

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::markets::Category;
use crate::shares::Side;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    MarketCreated {
        market_id: u64,
        creator: String,
        question: String,
        category: Category,
        end_time: u64,
    },
    SharesBought {
        market_id: u64,
        buyer: String,
        side: Side,
        shares: u64,
        fee: u64,
    },
    SharesSold {
        market_id: u64,
        seller: String,
        side: Side,
        shares: u64,
    },
    MarketResolved {
        market_id: u64,
        winning_side: Side,
    },
    SharesRedeemed {
        market_id: u64,
        holder: String,
        side: Side,
        shares: u64,
        payout: u64,
    },
    FeesWithdrawn {
        to: String,
        amount: u64,
    },
    Paused {
        by: String,
    },
    Unpaused {
        by: String,
    },
    WalletFunded {
        address: String,
        amount: u64,
    },
}

impl LedgerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::MarketCreated { .. } => "market_created",
            LedgerEvent::SharesBought { .. } => "shares_bought",
            LedgerEvent::SharesSold { .. } => "shares_sold",
            LedgerEvent::MarketResolved { .. } => "market_resolved",
            LedgerEvent::SharesRedeemed { .. } => "shares_redeemed",
            LedgerEvent::FeesWithdrawn { .. } => "fees_withdrawn",
            LedgerEvent::Paused { .. } => "paused",
            LedgerEvent::Unpaused { .. } => "unpaused",
            LedgerEvent::WalletFunded { .. } => "wallet_funded",
        }
    }
}

/// An event with its position in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Strictly increasing, starting at 1
    pub seq: u64,
    pub id: String,
    pub timestamp: u64,
    #[serde(flatten)]
    pub event: LedgerEvent,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, timestamp: u64, event: LedgerEvent) -> &EventRecord {
        let seq = self.last_seq() + 1;
        tracing::info!(seq, kind = event.name(), ?event, "ledger event");

        self.records.push(EventRecord {
            seq,
            id: format!("evt_{}", Uuid::new_v4().simple()),
            timestamp,
            event,
        });
        &self.records[self.records.len() - 1]
    }

    /// Records with `seq > after`, oldest first
    pub fn since(&self, after: u64) -> &[EventRecord] {
        let start = self.records.partition_point(|r| r.seq <= after);
        &self.records[start..]
    }

    /// At most `limit` records with `seq > after`, oldest first
    pub fn page(&self, after: u64, limit: usize) -> &[EventRecord] {
        let records = self.since(after);
        &records[..records.len().min(limit)]
    }

    pub fn last_seq(&self) -> u64 {
        self.records.last().map(|r| r.seq).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_and_paging() {
        let mut log = EventLog::new();
        log.emit(10, LedgerEvent::Paused { by: "op".into() });
        log.emit(11, LedgerEvent::Unpaused { by: "op".into() });
        log.emit(12, LedgerEvent::FeesWithdrawn { to: "op".into(), amount: 5 });

        assert_eq!(log.last_seq(), 3);
        assert_eq!(log.since(0).len(), 3);
        assert_eq!(log.since(1)[0].seq, 2);
        assert!(log.since(3).is_empty());
        assert!(log.since(99).is_empty());
    }

    #[test]
    fn test_page_is_bounded() {
        let mut log = EventLog::new();
        for i in 0..5 {
            log.emit(i, LedgerEvent::Paused { by: "op".into() });
        }

        let first = log.page(0, 2);
        assert_eq!(first.iter().map(|r| r.seq).collect::<Vec<_>>(), vec![1, 2]);
        let next = log.page(2, 2);
        assert_eq!(next[0].seq, 3);
        assert_eq!(log.page(4, 10).len(), 1);
        assert!(log.page(0, 0).is_empty());
    }

    #[test]
    fn test_record_serializes_flat() {
        let mut log = EventLog::new();
        let record = log
            .emit(
                7,
                LedgerEvent::MarketResolved {
                    market_id: 0,
                    winning_side: Side::Yes,
                },
            )
            .clone();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "market_resolved");
        assert_eq!(json["winning_side"], "yes");
        assert_eq!(json["seq"], 1);

        let back: EventRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
