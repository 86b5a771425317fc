//! SQLite store implementations.
//!
//! Provides persistent storage for transactions and alerts using SQLite
//! and Diesel ORM.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::adapter::sqlite::connection::DbPool;
use crate::adapter::sqlite::model::{AlertRow, TransactionRow};
use crate::adapter::sqlite::schema::{alerts, transactions};
use crate::domain::{
    AccountId, Alert, AlertId, AlertReason, Transaction, TransactionId, TransactionKind,
};
use crate::error::{Result, StoreError};
use crate::port::{AlertStore, TransactionStore};

/// SQLite-backed transaction store.
pub struct SqliteTransactionStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteTransactionStore {
    /// Create a new SQLite transaction store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn to_row(transaction: &Transaction) -> TransactionRow {
        TransactionRow {
            id: transaction.id.to_string(),
            account_id: transaction.account.value(),
            amount: transaction.amount.to_string(),
            occurred_at: transaction.occurred_at.to_rfc3339(),
            merchant: transaction.merchant.clone(),
            location: transaction.location.clone(),
            kind: transaction.kind.as_str().to_string(),
            fraud_flag: i32::from(transaction.fraud_flag),
        }
    }

    fn from_row(row: TransactionRow) -> Result<Transaction> {
        let amount =
            Decimal::from_str(&row.amount).map_err(|e| StoreError::Parse(e.to_string()))?;
        let occurred_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&row.occurred_at)
            .map_err(|e| StoreError::Parse(e.to_string()))?
            .with_timezone(&Utc);
        let kind = TransactionKind::from_str(&row.kind)
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        Ok(Transaction {
            id: TransactionId::from(row.id),
            account: AccountId::new(row.account_id),
            amount,
            occurred_at,
            merchant: row.merchant,
            location: row.location,
            kind,
            fraud_flag: row.fraud_flag != 0,
        })
    }
}

impl TransactionStore for SqliteTransactionStore {
    async fn append(&self, transaction: &Transaction) -> Result<()> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let existing: Option<String> = transactions::table
            .find(transaction.id.to_string())
            .select(transactions::id)
            .first(&mut conn)
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        if existing.is_some() {
            return Err(StoreError::DuplicateId {
                id: transaction.id.clone(),
            }
            .into());
        }

        diesel::insert_into(transactions::table)
            .values(Self::to_row(transaction))
            .execute(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    async fn list_by_account(&self, account: AccountId) -> Result<Vec<Transaction>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let rows: Vec<TransactionRow> = transactions::table
            .filter(transactions::account_id.eq(account.value()))
            .load(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(Self::from_row).collect()
    }

    async fn accounts(&self) -> Result<Vec<AccountId>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let ids: Vec<i64> = transactions::table
            .select(transactions::account_id)
            .distinct()
            .order(transactions::account_id.asc())
            .load(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(ids.into_iter().map(AccountId::new).collect())
    }
}

/// SQLite-backed alert store.
pub struct SqliteAlertStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteAlertStore {
    /// Create a new SQLite alert store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn to_row(alert: &Alert) -> AlertRow {
        AlertRow {
            alert_id: alert.id.to_string(),
            transaction_id: alert.transaction_id.to_string(),
            account_id: alert.account.value(),
            alert_reason: alert.reason.as_str().to_string(),
            created_at: alert.created_at.to_rfc3339(),
        }
    }

    fn from_row(row: AlertRow) -> Result<Alert> {
        let reason =
            AlertReason::from_str(&row.alert_reason).map_err(|e| StoreError::Parse(e.to_string()))?;
        let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| StoreError::Parse(e.to_string()))?
            .with_timezone(&Utc);

        Ok(Alert {
            id: AlertId::from(row.alert_id),
            transaction_id: TransactionId::from(row.transaction_id),
            account: AccountId::new(row.account_id),
            reason,
            created_at,
        })
    }
}

impl AlertStore for SqliteAlertStore {
    async fn append(&self, alert: &Alert) -> Result<()> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        diesel::insert_into(alerts::table)
            .values(Self::to_row(alert))
            .execute(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    async fn exists(&self, transaction_id: &TransactionId, reason: AlertReason) -> Result<bool> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let count: i64 = alerts::table
            .filter(alerts::transaction_id.eq(transaction_id.as_str()))
            .filter(alerts::alert_reason.eq(reason.as_str()))
            .count()
            .get_result(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    async fn list_by_account(&self, account: AccountId) -> Result<Vec<Alert>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let rows: Vec<AlertRow> = alerts::table
            .filter(alerts::account_id.eq(account.value()))
            .load(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(Self::from_row).collect()
    }
}
