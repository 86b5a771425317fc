//! In-memory store implementation for tests and embedded use.

use parking_lot::RwLock;

use crate::domain::{AccountId, Alert, AlertReason, Transaction, TransactionId};
use crate::error::{Result, StoreError};
use crate::port::{AlertStore, TransactionStore};

/// In-memory transaction and alert store.
///
/// Records are kept in append order. Both port traits are implemented on
/// the same store so a single instance can back a whole pipeline in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    transactions: RwLock<Vec<Transaction>>,
    alerts: RwLock<Vec<Alert>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of alerts across all accounts.
    pub fn alert_count(&self) -> usize {
        self.alerts.read().len()
    }
}

impl TransactionStore for MemoryStore {
    async fn append(&self, transaction: &Transaction) -> Result<()> {
        let mut transactions = self.transactions.write();
        if transactions.iter().any(|t| t.id == transaction.id) {
            return Err(StoreError::DuplicateId {
                id: transaction.id.clone(),
            }
            .into());
        }
        transactions.push(transaction.clone());
        Ok(())
    }

    async fn list_by_account(&self, account: AccountId) -> Result<Vec<Transaction>> {
        Ok(self
            .transactions
            .read()
            .iter()
            .filter(|t| t.account == account)
            .cloned()
            .collect())
    }

    async fn accounts(&self) -> Result<Vec<AccountId>> {
        let mut accounts: Vec<AccountId> = Vec::new();
        for transaction in self.transactions.read().iter() {
            if !accounts.contains(&transaction.account) {
                accounts.push(transaction.account);
            }
        }
        Ok(accounts)
    }
}

impl AlertStore for MemoryStore {
    async fn append(&self, alert: &Alert) -> Result<()> {
        self.alerts.write().push(alert.clone());
        Ok(())
    }

    async fn exists(&self, transaction_id: &TransactionId, reason: AlertReason) -> Result<bool> {
        Ok(self
            .alerts
            .read()
            .iter()
            .any(|a| &a.transaction_id == transaction_id && a.reason == reason))
    }

    async fn list_by_account(&self, account: AccountId) -> Result<Vec<Alert>> {
        Ok(self
            .alerts
            .read()
            .iter()
            .filter(|a| a.account == account)
            .cloned()
            .collect())
    }
}
