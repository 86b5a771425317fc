//! Read-only per-account reporting.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::AccountId;
use crate::error::Result;
use crate::port::{AlertStore, TransactionStore};

/// Audit summary for one account.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountReport {
    pub account: AccountId,
    pub transaction_count: u64,
    /// Mean amount recomputed directly from the transaction store,
    /// independent of the engine's running baseline.
    pub average_amount: Option<Decimal>,
    /// Transactions carrying the ground-truth fraud label.
    pub fraud_attempts: u64,
    pub alerts_raised: u64,
}

/// Stateless aggregator over both stores.
///
/// Never mutates anything; safe to run while workers are processing. It
/// may undercount alerts written during the scan.
pub struct ReportingAggregator<T: TransactionStore, A: AlertStore> {
    transactions: Arc<T>,
    alerts: Arc<A>,
}

impl<T: TransactionStore, A: AlertStore> ReportingAggregator<T, A> {
    /// Create an aggregator over the given stores.
    pub fn new(transactions: Arc<T>, alerts: Arc<A>) -> Self {
        Self {
            transactions,
            alerts,
        }
    }

    /// Summarize one account.
    pub async fn report(&self, account: AccountId) -> Result<AccountReport> {
        let transactions = self.transactions.list_by_account(account).await?;
        let alerts = self.alerts.list_by_account(account).await?;

        let count = transactions.len();
        let average_amount = (count > 0).then(|| {
            transactions.iter().map(|t| t.amount).sum::<Decimal>() / Decimal::from(count)
        });
        let fraud_attempts = transactions.iter().filter(|t| t.fraud_flag).count() as u64;

        Ok(AccountReport {
            account,
            transaction_count: count as u64,
            average_amount,
            fraud_attempts,
            alerts_raised: alerts.len() as u64,
        })
    }
}
