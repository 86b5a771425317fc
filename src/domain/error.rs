//! Domain validation errors for core domain types.
//!
//! These errors are returned by `try_new` constructors and by
//! [`Transaction::validate`](crate::domain::Transaction::validate). A record
//! rejected here never enters processing and never advances account state.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone)]
pub enum DomainError {
    /// Transaction ids are the dedup key for the whole pipeline.
    #[error("transaction id cannot be empty")]
    EmptyTransactionId,

    /// Amounts are monetary values; negatives indicate upstream corruption.
    #[error("amount must be non-negative, got {amount}")]
    NegativeAmount {
        /// The invalid amount that was provided.
        amount: Decimal,
    },

    /// Amounts carry at most 2 fractional digits.
    #[error("amount must have at most 2 fractional digits, got {amount}")]
    ExcessAmountScale {
        /// The invalid amount that was provided.
        amount: Decimal,
    },

    /// The location change rule needs a usable location on every record.
    #[error("location cannot be empty")]
    EmptyLocation,

    /// Unrecognized transaction type code.
    #[error("unknown transaction kind: {code}")]
    UnknownKind { code: String },

    /// Unrecognized alert reason string.
    #[error("unknown alert reason: {code}")]
    UnknownReason { code: String },
}
