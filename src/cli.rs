//! Command-line interface over the engine entry points.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tabled::{Table, Tabled};
use tracing::{info, warn};

use crate::adapter::sqlite::{create_pool, run_migrations, SqliteAlertStore, SqliteTransactionStore};
use crate::config::Config;
use crate::domain::{AccountId, Transaction};
use crate::engine::{AccountReport, Engine, ProcessReport, ReportingAggregator};
use crate::error::{Error, Result, StoreError};
use crate::port::TransactionStore;

#[derive(Parser)]
#[command(name = "ledgerhawk", version, about = "Transaction anomaly detection")]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run detection over the currently available data.
    Process {
        /// Restrict processing to a single account.
        #[arg(long)]
        account: Option<i64>,
    },
    /// Print an account's audit summary.
    Report {
        #[arg(long)]
        account: i64,
    },
    /// Append transactions from a JSON file into the store.
    Seed {
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "account")]
    account: i64,
    #[tabled(rename = "transactions")]
    transactions: u64,
    #[tabled(rename = "avg amount")]
    average_amount: String,
    #[tabled(rename = "fraud attempts")]
    fraud_attempts: u64,
    #[tabled(rename = "alerts")]
    alerts: u64,
}

impl From<AccountReport> for ReportRow {
    fn from(report: AccountReport) -> Self {
        Self {
            account: report.account.value(),
            transactions: report.transaction_count,
            average_amount: report
                .average_amount
                .map_or_else(|| "n/a".to_string(), |a| a.round_dp(2).to_string()),
            fraud_attempts: report.fraud_attempts,
            alerts: report.alerts_raised,
        }
    }
}

fn print_process_report(report: &ProcessReport) {
    println!(
        "account {}: processed {}, deferred {}, skipped {}, alerts {}",
        report.account,
        report.processed,
        report.deferred,
        report.diagnostics.len(),
        report.alerts_emitted,
    );
}

/// Execute one CLI command against the configured SQLite stores.
pub async fn run(command: Command, config: &Config) -> Result<()> {
    let pool = create_pool(&config.store.database_url)?;
    run_migrations(&pool)?;
    let transactions = Arc::new(SqliteTransactionStore::new(pool.clone()));
    let alerts = Arc::new(SqliteAlertStore::new(pool));

    match command {
        Command::Process { account } => {
            let engine = Arc::new(Engine::new(transactions, alerts, config));
            match account {
                Some(id) => {
                    let report = engine.process_account(AccountId::new(id)).await?;
                    print_process_report(&report);
                }
                None => {
                    let outcomes = engine.process_all().await?;
                    for outcome in &outcomes {
                        match &outcome.result {
                            Ok(report) => print_process_report(report),
                            Err(e) => println!("account {}: failed: {e}", outcome.account),
                        }
                    }
                }
            }
        }
        Command::Report { account } => {
            let aggregator = ReportingAggregator::new(transactions, alerts);
            let report = aggregator.report(AccountId::new(account)).await?;
            println!("{}", Table::new([ReportRow::from(report)]));
        }
        Command::Seed { file } => {
            let content = std::fs::read_to_string(file)?;
            let records: Vec<Transaction> = serde_json::from_str(&content)?;
            let total = records.len();

            let mut appended = 0usize;
            for record in records {
                if let Err(e) = record.validate() {
                    warn!(transaction_id = %record.id, error = %e, "Skipping invalid record");
                    continue;
                }
                match transactions.append(&record).await {
                    Ok(()) => appended += 1,
                    Err(Error::Store(StoreError::DuplicateId { id })) => {
                        warn!(transaction_id = %id, "Skipping duplicate record");
                    }
                    Err(e) => return Err(e),
                }
            }
            info!(appended, total, "Seed complete");
            println!("appended {appended} of {total} records");
        }
    }
    Ok(())
}
