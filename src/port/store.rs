//! Persistence ports for transactions and alerts.
//!
//! The engine treats both stores as potentially slow I/O: reads and appends
//! are the only suspension points in a worker's loop.

use std::future::Future;

use crate::domain::{AccountId, Alert, AlertReason, Transaction, TransactionId};
use crate::error::Result;

/// Storage operations for transactions.
pub trait TransactionStore: Send + Sync {
    /// Append a new transaction. Fails with
    /// [`StoreError::DuplicateId`](crate::error::StoreError::DuplicateId)
    /// if the id already exists; the record never enters processing.
    fn append(&self, transaction: &Transaction) -> impl Future<Output = Result<()>> + Send;

    /// All transactions recorded for an account, in storage order.
    /// Chronological ordering is the sequencer's job, not the store's.
    fn list_by_account(
        &self,
        account: AccountId,
    ) -> impl Future<Output = Result<Vec<Transaction>>> + Send;

    /// Accounts with at least one recorded transaction.
    fn accounts(&self) -> impl Future<Output = Result<Vec<AccountId>>> + Send;
}

/// Storage operations for alerts.
pub trait AlertStore: Send + Sync {
    /// Append an alert. The caller is responsible for dedup via [`exists`].
    ///
    /// [`exists`]: AlertStore::exists
    fn append(&self, alert: &Alert) -> impl Future<Output = Result<()>> + Send;

    /// Whether an alert with this `(transaction id, reason)` pair exists.
    fn exists(
        &self,
        transaction_id: &TransactionId,
        reason: AlertReason,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// All alerts raised for an account.
    fn list_by_account(&self, account: AccountId)
        -> impl Future<Output = Result<Vec<Alert>>> + Send;
}
