//! Fixed-width amount arithmetic.
//!
//! All balances are unsigned 256-bit integers. The ledgers use two
//! subtraction policies: collateral recovery truncates a request to what is
//! available ([`capped_sub`]), while present-value and payment books refuse
//! to go below zero ([`checked_sub`]). Additions are always checked.

use primitive_types::U256;
use thiserror::Error;

/// Unsigned 256-bit ledger amount.
pub type Amount = U256;

/// Errors arising from strict amount arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    #[error("subtraction overflow: cannot remove {requested} from balance {balance}")]
    SubtractionOverflow { balance: Amount, requested: Amount },
    #[error("addition overflow")]
    AdditionOverflow,
}

/// Remove up to `requested` from `balance`.
///
/// Returns `(new_balance, removed)` where `removed = min(requested, balance)`.
pub fn capped_sub(balance: Amount, requested: Amount) -> (Amount, Amount) {
    let removed = requested.min(balance);
    (balance - removed, removed)
}

/// Remove exactly `requested` from `balance`, failing if it would go negative.
pub fn checked_sub(balance: Amount, requested: Amount) -> Result<Amount, ArithmeticError> {
    balance
        .checked_sub(requested)
        .ok_or(ArithmeticError::SubtractionOverflow { balance, requested })
}

/// Add `amount` to `balance`, failing on 256-bit overflow.
pub fn checked_add(balance: Amount, amount: Amount) -> Result<Amount, ArithmeticError> {
    balance
        .checked_add(amount)
        .ok_or(ArithmeticError::AdditionOverflow)
}
