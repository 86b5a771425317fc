//! Full pipeline over the SQLite adapter: seed, process, report.

use std::sync::Arc;

use chrono::Duration;
use ledgerhawk::adapter::sqlite::{create_pool, run_migrations, SqliteAlertStore, SqliteTransactionStore};
use ledgerhawk::config::Config;
use ledgerhawk::domain::{AccountId, AlertReason};
use ledgerhawk::engine::{Engine, ReportingAggregator};
use ledgerhawk::port::{AlertStore, TransactionStore};
use ledgerhawk::testkit;
use rust_decimal_macros::dec;

fn stores() -> (Arc<SqliteTransactionStore>, Arc<SqliteAlertStore>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let url = dir.path().join("pipeline.db").to_string_lossy().into_owned();
    let pool = create_pool(&url).unwrap();
    run_migrations(&pool).unwrap();
    (
        Arc::new(SqliteTransactionStore::new(pool.clone())),
        Arc::new(SqliteAlertStore::new(pool)),
        dir,
    )
}

#[tokio::test]
async fn detection_pipeline_persists_alerts_durably() {
    let (transactions, alerts, _dir) = stores();
    let t0 = testkit::base_time();

    transactions
        .append(&testkit::located("tx-1", 9, dec!(50), t0, "NY"))
        .await
        .unwrap();
    transactions
        .append(&testkit::located(
            "tx-2",
            9,
            dec!(200),
            t0 + Duration::minutes(2),
            "LA",
        ))
        .await
        .unwrap();

    let engine = Engine::new(transactions.clone(), alerts.clone(), &Config::default());
    let report = engine.process_account(AccountId::new(9)).await.unwrap();
    assert_eq!(report.alerts_emitted, 3);

    let persisted = alerts.list_by_account(AccountId::new(9)).await.unwrap();
    assert_eq!(persisted.len(), 3);
    assert!(persisted
        .iter()
        .all(|a| a.transaction_id.as_str() == "tx-2"));
    for reason in [
        AlertReason::HighTransactionAmount,
        AlertReason::LocationChange,
        AlertReason::RapidSuccession,
    ] {
        assert!(alerts
            .exists(&"tx-2".into(), reason)
            .await
            .unwrap());
    }
}

#[tokio::test]
async fn replay_over_sqlite_is_idempotent() {
    let (transactions, alerts, _dir) = stores();
    let t0 = testkit::base_time();

    transactions
        .append(&testkit::located("tx-1", 3, dec!(10), t0, "NY"))
        .await
        .unwrap();
    transactions
        .append(&testkit::located(
            "tx-2",
            3,
            dec!(12),
            t0 + Duration::minutes(1),
            "LA",
        ))
        .await
        .unwrap();

    for _ in 0..3 {
        // fresh engine each time: dedup comes from the store, not memory
        let engine = Engine::new(transactions.clone(), alerts.clone(), &Config::default());
        engine.process_account(AccountId::new(3)).await.unwrap();
    }

    let persisted = alerts.list_by_account(AccountId::new(3)).await.unwrap();
    // tx-2: location change + rapid succession, exactly once each
    assert_eq!(persisted.len(), 2);
}

#[tokio::test]
async fn report_over_sqlite_cross_checks_the_baseline() {
    let (transactions, alerts, _dir) = stores();
    let t0 = testkit::base_time();

    for (i, amount) in [dec!(10), dec!(20), dec!(30)].iter().enumerate() {
        transactions
            .append(&testkit::transaction(
                &format!("tx-{i}"),
                5,
                *amount,
                t0 + Duration::hours(i as i64),
            ))
            .await
            .unwrap();
    }

    let engine = Engine::new(transactions.clone(), alerts.clone(), &Config::default());
    engine.process_account(AccountId::new(5)).await.unwrap();

    let aggregator = ReportingAggregator::new(transactions, alerts);
    let report = aggregator.report(AccountId::new(5)).await.unwrap();

    assert_eq!(report.transaction_count, 3);
    assert_eq!(report.average_amount, Some(dec!(20)));
    assert_eq!(report.alerts_raised, 0);
}
