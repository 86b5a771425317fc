//! Alert records produced by the detection engine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::id::{AccountId, AlertId, TransactionId};

/// Why an alert was raised.
///
/// Persisted verbatim as `alert_reason`, so the codes here are a stable
/// storage contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertReason {
    /// Amount exceeded the anomaly multiplier times the prior mean.
    HighTransactionAmount,
    /// Location differs from the previous transaction's location.
    LocationChange,
    /// Gap to the previous transaction was below the rapid-succession
    /// threshold.
    RapidSuccession,
}

impl AlertReason {
    /// Get the persisted reason code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertReason::HighTransactionAmount => "HighTransactionAmount",
            AlertReason::LocationChange => "LocationChange",
            AlertReason::RapidSuccession => "RapidSuccession",
        }
    }

    /// All reasons an alert can carry.
    pub const ALL: [AlertReason; 3] = [
        AlertReason::HighTransactionAmount,
        AlertReason::LocationChange,
        AlertReason::RapidSuccession,
    ];
}

impl FromStr for AlertReason {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HighTransactionAmount" => Ok(AlertReason::HighTransactionAmount),
            "LocationChange" => Ok(AlertReason::LocationChange),
            "RapidSuccession" => Ok(AlertReason::RapidSuccession),
            other => Err(DomainError::UnknownReason {
                code: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for AlertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An alert raised against a single transaction.
///
/// Immutable once created. A transaction can carry several alerts, one per
/// firing rule; the `(transaction_id, reason)` pair is unique store-wide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub transaction_id: TransactionId,
    pub account: AccountId,
    pub reason: AlertReason,
    /// Assigned at emission time, not at transaction time.
    pub created_at: DateTime<Utc>,
}

impl Alert {
    /// Create a new alert with a generated id and the current time.
    #[must_use]
    pub fn new(transaction_id: TransactionId, account: AccountId, reason: AlertReason) -> Self {
        Self {
            id: AlertId::new(),
            transaction_id,
            account,
            reason,
            created_at: Utc::now(),
        }
    }
}
