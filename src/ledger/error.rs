use crate::core::amount::{Amount, ArithmeticError};
use crate::core::pair::PackError;
use primitive_types::H256;
use thiserror::Error;

/// Errors arising from bilateral ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Pair(#[from] PackError),
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
    #[error("TIMESLOT SETTLED ALREADY")]
    SlotSettled,
    #[error("payment overflow: verified {verified} plus {amount} exceeds net payment {net_payment}")]
    PaymentOverflow {
        verified: Amount,
        amount: Amount,
        net_payment: Amount,
    },
    #[error("no net payment to verify")]
    NoNetPayment,
    #[error("payment proof {0:#x} already confirmed for this slot")]
    DuplicateConfirmation(H256),
    #[error("invalid settlement date {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: u16, month: u8, day: u8 },
}
