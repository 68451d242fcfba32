// ============================================================================
// Share Issuance - Binary Market Ledger
// ============================================================================
//
// Buying issues outcome tokens at a fixed 1:1 rate against collateral,
// minus a flat fee carved out up front:
//
//   fee        = amount * fee_bps / 10_000   (floor)
//   net_shares = amount - fee
//
// There is no pricing curve. Every issued share is backed by exactly one
// unit of collateral held for its market.
//
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// Basis-point denominator
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Default buy fee: 2%
pub const DEFAULT_FEE_BPS: u32 = 200;

/// Outcome of splitting a buy amount into fee and shares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintQuote {
    /// Collateral pulled from the buyer
    pub amount: u64,
    /// Carved out into the fee pot
    pub fee: u64,
    /// Tokens credited to the buyer
    pub net_shares: u64,
}

/// Reject fee rates above 100%
pub fn validate_fee_bps(fee_bps: u32) -> LedgerResult<()> {
    if u64::from(fee_bps) > BPS_DENOMINATOR {
        return Err(LedgerError::InvalidFeeRate(fee_bps));
    }
    Ok(())
}

/// Split a buy amount into fee and net shares using floor division
pub fn quote_mint(amount: u64, fee_bps: u32) -> LedgerResult<MintQuote> {
    validate_fee_bps(fee_bps)?;

    let fee = (u128::from(amount) * u128::from(fee_bps) / u128::from(BPS_DENOMINATOR)) as u64;

    Ok(MintQuote {
        amount,
        fee,
        net_shares: amount - fee,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_percent_fee_is_exact() {
        let quote = quote_mint(100_000000, DEFAULT_FEE_BPS).unwrap();
        assert_eq!(quote.fee, 2_000000);
        assert_eq!(quote.net_shares, 98_000000);
    }

    #[test]
    fn test_fee_floors() {
        // 49 * 200 / 10000 = 0.98 -> 0
        let quote = quote_mint(49, DEFAULT_FEE_BPS).unwrap();
        assert_eq!(quote.fee, 0);
        assert_eq!(quote.net_shares, 49);

        // 149 * 200 / 10000 = 2.98 -> 2
        let quote = quote_mint(149, DEFAULT_FEE_BPS).unwrap();
        assert_eq!(quote.fee, 2);
        assert_eq!(quote.net_shares, 147);
    }

    #[test]
    fn test_no_overflow_at_max_amount() {
        let quote = quote_mint(u64::MAX, 10_000).unwrap();
        assert_eq!(quote.fee, u64::MAX);
        assert_eq!(quote.net_shares, 0);
    }

    #[test]
    fn test_fee_rate_above_100_percent_rejected() {
        assert_eq!(quote_mint(100, 10_001), Err(LedgerError::InvalidFeeRate(10_001)));
        assert!(validate_fee_bps(0).is_ok());
    }
}
