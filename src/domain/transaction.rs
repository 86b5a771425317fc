//! Immutable transaction records entering the detection pipeline.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Timelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::id::{AccountId, TransactionId};

/// Short enumerated transaction type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Purchase,
    Withdrawal,
    Deposit,
    Transfer,
    Refund,
}

impl TransactionKind {
    /// Get the persisted code for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Purchase => "purchase",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::Deposit => "deposit",
            TransactionKind::Transfer => "transfer",
            TransactionKind::Refund => "refund",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "purchase" => Ok(TransactionKind::Purchase),
            "withdrawal" => Ok(TransactionKind::Withdrawal),
            "deposit" => Ok(TransactionKind::Deposit),
            "transfer" => Ok(TransactionKind::Transfer),
            "refund" => Ok(TransactionKind::Refund),
            other => Err(DomainError::UnknownKind {
                code: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable financial transaction record.
///
/// Appended once, never mutated. The ground-truth `fraud_flag` is
/// evaluation-only: it feeds the reporting aggregator and must never reach
/// the baseline calculator or the rule evaluators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub account: AccountId,
    /// Fixed-point amount with at most 2 fractional digits.
    pub amount: Decimal,
    /// Second-precision event time.
    pub occurred_at: DateTime<Utc>,
    pub merchant: String,
    pub location: String,
    pub kind: TransactionKind,
    /// Ground-truth label, present only for evaluation datasets.
    #[serde(default)]
    pub fraud_flag: bool,
}

impl Transaction {
    /// Validate and construct a transaction.
    ///
    /// Sub-second precision on `occurred_at` is truncated.
    #[allow(clippy::too_many_arguments)]
    pub fn try_new(
        id: impl Into<TransactionId>,
        account: AccountId,
        amount: Decimal,
        occurred_at: DateTime<Utc>,
        merchant: impl Into<String>,
        location: impl Into<String>,
        kind: TransactionKind,
        fraud_flag: bool,
    ) -> Result<Self, DomainError> {
        let transaction = Self {
            id: id.into(),
            account,
            amount,
            occurred_at: occurred_at.with_nanosecond(0).unwrap_or(occurred_at),
            merchant: merchant.into(),
            location: location.into(),
            kind,
            fraud_flag,
        };
        transaction.validate()?;
        Ok(transaction)
    }

    /// Check the record invariants without consuming the record.
    ///
    /// Used by `try_new` and by the engine on records that bypassed it
    /// (deserialized feeds, rows read back from a store).
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.as_str().is_empty() {
            return Err(DomainError::EmptyTransactionId);
        }
        if self.amount.is_sign_negative() {
            return Err(DomainError::NegativeAmount {
                amount: self.amount,
            });
        }
        if self.amount.round_dp(2) != self.amount {
            return Err(DomainError::ExcessAmountScale {
                amount: self.amount,
            });
        }
        if self.location.trim().is_empty() {
            return Err(DomainError::EmptyLocation);
        }
        Ok(())
    }
}
