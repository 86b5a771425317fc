//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{alerts, transactions};

/// Database row for a transaction.
///
/// Amounts are stored as canonical decimal text so 2-digit fixed-point
/// values survive the roundtrip exactly; timestamps are RFC 3339 text.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionRow {
    pub id: String,
    pub account_id: i64,
    pub amount: String,
    pub occurred_at: String,
    pub merchant: String,
    pub location: String,
    pub kind: String,
    pub fraud_flag: i32,
}

/// Database row for an alert.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = alerts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AlertRow {
    pub alert_id: String,
    pub transaction_id: String,
    pub account_id: i64,
    pub alert_reason: String,
    pub created_at: String,
}
