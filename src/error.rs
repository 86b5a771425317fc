use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::id::{AccountId, TransactionId};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Store-level errors surfaced through the persistence ports.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("duplicate transaction id: {id}")]
    DuplicateId { id: TransactionId },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl StoreError {
    /// Whether the bounded backoff at the store boundary should retry.
    ///
    /// Only transient unavailability is retried; everything else is a
    /// terminal answer from the store.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Ordering failures raised by the engine.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    /// Two transactions share both timestamp and id: store-level
    /// corruption. Processing for the account halts until resolved.
    #[error("ordering ambiguous for account {account}: transactions share timestamp {at} and id {id}")]
    OrderingAmbiguous {
        account: AccountId,
        id: TransactionId,
        at: DateTime<Utc>,
    },

    /// A transaction arrived below the account's finalized watermark.
    /// Policy-dependent diagnostic: skip-and-continue, never fatal.
    #[error("out-of-order transaction {id} for account {account}: {at} precedes watermark {watermark}")]
    OutOfOrder {
        account: AccountId,
        id: TransactionId,
        at: DateTime<Utc>,
        watermark: DateTime<Utc>,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
