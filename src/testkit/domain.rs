//! Builders for domain primitives used across tests.
//!
//! Concise factory functions for [`Transaction`] records so tests focus on
//! assertions rather than construction boilerplate. Fields not covered by
//! a factory are public and can be adjusted in place.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::domain::{AccountId, Transaction, TransactionKind};

/// Fixed anchor timestamp shared by tests that only care about deltas.
#[must_use]
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

/// A purchase at "NY" with the given id, account, amount, and time.
#[must_use]
pub fn transaction(id: &str, account: i64, amount: Decimal, at: DateTime<Utc>) -> Transaction {
    Transaction {
        id: id.into(),
        account: AccountId::new(account),
        amount,
        occurred_at: at,
        merchant: "acme".to_string(),
        location: "NY".to_string(),
        kind: TransactionKind::Purchase,
        fraud_flag: false,
    }
}

/// Same as [`transaction`], at an explicit location.
#[must_use]
pub fn located(
    id: &str,
    account: i64,
    amount: Decimal,
    at: DateTime<Utc>,
    location: &str,
) -> Transaction {
    Transaction {
        location: location.to_string(),
        ..transaction(id, account, amount, at)
    }
}

/// Same as [`transaction`], carrying the ground-truth fraud label.
#[must_use]
pub fn fraudulent(id: &str, account: i64, amount: Decimal, at: DateTime<Utc>) -> Transaction {
    Transaction {
        fraud_flag: true,
        ..transaction(id, account, amount, at)
    }
}
