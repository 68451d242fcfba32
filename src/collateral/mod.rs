// ============================================================================
// Collateral Module - Binary Market Ledger
// ============================================================================
//
// Everything that touches the collateral asset:
//   - token:   wallet balances and engine allowances for the asset itself
//   - account: which market owns which part of the vault
//   - fees:    per-market and global fee counters
//
// Conservation, per market:
//   held + fees_collected == deposited - paid_out
//
// ============================================================================

pub mod account;
pub mod fees;
pub mod token;

pub use account::*;
pub use fees::*;
pub use token::*;

/// Wallet holding every market's collateral and the fee pot
pub const VAULT_ACCOUNT: &str = "ledger:vault";
