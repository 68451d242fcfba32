/// Engine-level integration tests with Alice & Bob trading one market
/// end to end on a manual clock.

use std::sync::Arc;

use binary_market_ledger::{
    Category, EngineConfig, LedgerError, LedgerEvent, ManualClock, MarketEngine, MarketPhase, Side,
};

// ============================================================================
// TEST ACCOUNT CONSTANTS
// ============================================================================

const OPERATOR: &str = "operator";
const ALICE: &str = "L1ALICE000000001";
const BOB: &str = "L1BOB00000000001";

const START: u64 = 1_750_000_000;
const WEEK: u64 = 604_800;

/// 1 unit of a 6-decimal collateral asset
const UNIT: u64 = 1_000000;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn engine_with_wallets() -> (MarketEngine, ManualClock) {
    let clock = ManualClock::new(START);
    let mut engine = MarketEngine::new(EngineConfig::default(), Arc::new(clock.clone()));

    for holder in [ALICE, BOB] {
        engine.fund(OPERATOR, holder, 1_000 * UNIT).unwrap();
        engine.approve(holder, 1_000 * UNIT).unwrap();
    }

    (engine, clock)
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_alice_full_lifecycle() {
    let (mut engine, clock) = engine_with_wallets();

    let id = engine
        .create_market(ALICE, "Will the protocol reach 1B TVL?", WEEK, Category::DeFi)
        .unwrap();
    assert_eq!(id, 0);
    assert_eq!(engine.markets_by_category(Category::DeFi), &[0]);

    // Buy 100 YES with a 2% fee
    let quote = engine.buy_shares(ALICE, id, Side::Yes, 100 * UNIT).unwrap();
    assert_eq!(quote.fee, 2 * UNIT);
    assert_eq!(engine.balance_of(id, Side::Yes, ALICE), 98 * UNIT);
    assert_eq!(engine.fees_collected(id), 2 * UNIT);

    // Sell half back 1:1
    let wallet_before = engine.collateral_balance(ALICE);
    let returned = engine.sell_shares(ALICE, id, Side::Yes, 49 * UNIT).unwrap();
    assert_eq!(returned, 49 * UNIT);
    assert_eq!(engine.balance_of(id, Side::Yes, ALICE), 49 * UNIT);
    assert_eq!(engine.collateral_balance(ALICE), wallet_before + 49 * UNIT);

    // Trading window closes
    clock.set(START + WEEK + 1);
    assert_eq!(engine.market_phase(id).unwrap(), MarketPhase::Ended);
    assert_eq!(
        engine.sell_shares(ALICE, id, Side::Yes, UNIT),
        Err(LedgerError::TradingClosed(id))
    );

    engine.resolve_market(OPERATOR, id, Side::Yes).unwrap();
    assert_eq!(
        engine.resolve_market(OPERATOR, id, Side::Yes),
        Err(LedgerError::AlreadyResolved(id))
    );

    // Alice is the only YES holder, so she takes the whole remaining pool
    let redemption = engine.redeem(ALICE, id).unwrap();
    assert_eq!(redemption.shares_burned, 49 * UNIT);
    assert_eq!(redemption.payout, 49 * UNIT);
    assert_eq!(engine.collateral_balance(ALICE), 1_000 * UNIT - 2 * UNIT);

    assert!(engine.audit_all().is_sound());
}

#[test]
fn test_alice_and_bob_split_pool() {
    let (mut engine, clock) = engine_with_wallets();
    let id = engine.create_market(BOB, "Rate cut in June?", WEEK, Category::Politics).unwrap();

    engine.buy_shares(ALICE, id, Side::Yes, 100 * UNIT).unwrap();
    engine.buy_shares(BOB, id, Side::Yes, 50 * UNIT).unwrap();
    engine.buy_shares(BOB, id, Side::No, 200 * UNIT).unwrap();

    // YES: alice 98, bob 49. NO: bob 196. Pool = 343.
    assert_eq!(engine.collateral_held(id), 343 * UNIT);

    clock.advance(WEEK);
    engine.resolve_market(OPERATOR, id, Side::Yes).unwrap();

    let alice = engine.redeem(ALICE, id).unwrap();
    // 98 * 343 / 147
    assert_eq!(alice.payout, 228_666666);

    let bob = engine.redeem(BOB, id).unwrap();
    assert_eq!(bob.payout, 343 * UNIT - 228_666666);
    assert_eq!(engine.collateral_held(id), 0);

    // Bob's NO tokens stay but are worth nothing
    assert_eq!(engine.balance_of(id, Side::No, BOB), 196 * UNIT);
    assert_eq!(engine.redeem(BOB, id).err(), Some(LedgerError::NothingToRedeem(id)));

    let fees = engine.withdraw_fees(OPERATOR, OPERATOR).unwrap();
    assert_eq!(fees, 7 * UNIT);
    assert_eq!(engine.withdraw_fees(OPERATOR, OPERATOR), Err(LedgerError::NoFeesToWithdraw));
    assert_eq!(engine.fees_collected(id), 7 * UNIT);

    let audit = engine.audit_all();
    assert!(audit.is_sound(), "{:?}", audit);
    assert_eq!(audit.vault_balance, 0);
}

#[test]
fn test_pause_during_emergency() {
    let (mut engine, clock) = engine_with_wallets();
    let id = engine.create_market(ALICE, "BTC above 100k?", WEEK, Category::Crypto).unwrap();
    engine.buy_shares(ALICE, id, Side::No, 10 * UNIT).unwrap();

    engine.pause(OPERATOR).unwrap();

    let err = engine.buy_shares(BOB, id, Side::Yes, UNIT).unwrap_err();
    assert_eq!(err, LedgerError::SystemPaused);
    assert!(err.is_temporary());
    assert_eq!(engine.sell_shares(ALICE, id, Side::No, UNIT), Err(LedgerError::SystemPaused));

    // Fee accounting and resolution keep working
    assert_eq!(engine.withdraw_fees(OPERATOR, OPERATOR).unwrap(), 200_000);
    clock.advance(WEEK);
    engine.resolve_market(OPERATOR, id, Side::No).unwrap();
    assert_eq!(engine.redeem(ALICE, id).unwrap().payout, 9_800_000);

    let names: Vec<&str> = engine.events_since(0).iter().map(|r| r.event.name()).collect();
    assert!(names.contains(&"paused"));
    assert!(names.contains(&"fees_withdrawn"));
    assert!(names.contains(&"market_resolved"));
}

#[test]
fn test_events_describe_trades() {
    let (mut engine, _) = engine_with_wallets();
    let id = engine.create_market(ALICE, "q", WEEK, Category::Sports).unwrap();
    let mark = engine.events_since(0).last().map(|r| r.seq).unwrap();

    engine.buy_shares(BOB, id, Side::Yes, 100 * UNIT).unwrap();
    engine.sell_shares(BOB, id, Side::Yes, 8 * UNIT).unwrap();

    let events: Vec<&LedgerEvent> = engine.events_since(mark).iter().map(|r| &r.event).collect();
    assert_eq!(
        events,
        vec![
            &LedgerEvent::SharesBought {
                market_id: id,
                buyer: BOB.to_string(),
                side: Side::Yes,
                shares: 98 * UNIT,
                fee: 2 * UNIT,
            },
            &LedgerEvent::SharesSold {
                market_id: id,
                seller: BOB.to_string(),
                side: Side::Yes,
                shares: 8 * UNIT,
            },
        ]
    );
}

// ============================================================================
// CONSERVATION UNDER ARBITRARY ORDERING
// ============================================================================

/// Small deterministic generator so the sequence is reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

#[test]
fn test_conservation_holds_for_random_operations() {
    let (mut engine, clock) = engine_with_wallets();
    let holders = [ALICE, BOB];
    let a = engine.create_market(ALICE, "a", 1_000, Category::DeFi).unwrap();
    let b = engine.create_market(BOB, "b", 2_000, Category::Other).unwrap();

    let mut rng = Lcg(42);
    for step in 0..400 {
        let holder = holders[(rng.next() % 2) as usize];
        let market = if rng.next() % 2 == 0 { a } else { b };
        let side = if rng.next() % 2 == 0 { Side::Yes } else { Side::No };
        let amount = rng.next() % (5 * UNIT) + 1;

        // Failures are fine; they must simply leave the ledger consistent
        let _ = match rng.next() % 6 {
            0 | 1 => engine.buy_shares(holder, market, side, amount).map(|_| ()),
            2 => engine.sell_shares(holder, market, side, amount).map(|_| ()),
            3 => engine.redeem(holder, market).map(|_| ()),
            4 => engine.resolve_market(OPERATOR, market, side),
            _ => engine.withdraw_fees(OPERATOR, OPERATOR).map(|_| ()),
        };

        if step % 50 == 49 {
            clock.advance(500);
        }

        let audit = engine.audit_all();
        assert!(audit.is_sound(), "step {}: {:?}", step, audit);
    }

    // Every unit of collateral is either in a wallet or in the vault
    let in_wallets: u64 = [ALICE, BOB, OPERATOR]
        .iter()
        .map(|h| engine.collateral_balance(h))
        .sum();
    let audit = engine.audit_all();
    assert_eq!(u128::from(in_wallets) + u128::from(audit.vault_balance), 2_000 * UNIT as u128);
}
