// ============================================================================
// Resolution Redemption - Binary Market Ledger
// ============================================================================
//
// After resolution, winning tokens claim the market's whole remaining
// collateral pool (both sides' backing, fees already carved out) pro rata:
//
//   payout = holder_winning * remaining_pool / total_winning   (floor)
//
// Rounding dust stays in the pool, so the last winner to redeem
// (holder_winning == total_winning) collects exactly what is left.
// Losing tokens are never redeemable and never burned; they are inert.
//
// ============================================================================

use serde::{Deserialize, Serialize};

use super::Side;
use crate::error::{LedgerError, LedgerResult};

/// Result of a redemption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemResult {
    pub market_id: u64,
    pub holder: String,
    pub winning_side: Side,
    /// Winning tokens burned
    pub shares_burned: u64,
    /// Collateral paid to the holder
    pub payout: u64,
}

/// Pro-rata share of the remaining pool for `holder_balance` winning tokens
pub fn redemption_payout(holder_balance: u64, remaining_pool: u64, total_winning: u64) -> LedgerResult<u64> {
    if holder_balance > total_winning {
        return Err(LedgerError::InsufficientBalance {
            available: total_winning,
            requested: holder_balance,
        });
    }
    if total_winning == 0 {
        return Ok(0);
    }

    let payout = u128::from(holder_balance) * u128::from(remaining_pool) / u128::from(total_winning);

    // payout <= remaining_pool because holder_balance <= total_winning
    u64::try_from(payout).map_err(|_| LedgerError::ArithmeticOverflow)
}
