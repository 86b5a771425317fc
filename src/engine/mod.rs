//! The transaction anomaly detection engine.
//!
//! Processing is partitioned by account: each account's feed is evaluated
//! strictly in sequencer order by a worker that exclusively owns that
//! account's state. Workers for different accounts run concurrently and
//! never synchronize with each other; they meet only at the shared,
//! append-only stores.

pub mod account;
pub mod baseline;
pub mod emitter;
pub mod history;
pub mod report;
pub mod rules;
pub mod sequencer;

use std::sync::Arc;

use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::config::{Config, DetectionConfig, OrderingConfig, OrderingMode, RetryConfig};
use crate::domain::{AccountId, DomainError, TransactionId};
use crate::error::{EngineError, Result};
use crate::port::{AlertStore, TransactionStore};

pub use account::AccountState;
pub use baseline::{BaselineCalculator, BaselineSnapshot};
pub use emitter::AlertEmitter;
pub use history::{HistoryTracker, Observation};
pub use report::{AccountReport, ReportingAggregator};
pub use rules::{AmountWindow, Evaluation};
pub use sequencer::Sequencer;

use emitter::with_backoff;

/// Why a transaction was skipped without advancing account state.
#[derive(Debug, Clone)]
pub enum SkipCause {
    /// Arrived at or below the finalized watermark (policy-dependent).
    OutOfOrder(EngineError),
    /// Failed record validation.
    Invalid(DomainError),
}

/// A skipped transaction, recorded on the run report.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub transaction_id: TransactionId,
    pub cause: SkipCause,
}

/// Rank score for one processed transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct AmountRank {
    pub transaction_id: TransactionId,
    pub rank: Decimal,
}

/// Summary of one `process_account` run.
#[derive(Debug, Clone)]
pub struct ProcessReport {
    pub account: AccountId,
    /// Transactions evaluated and finalized this run.
    pub processed: u64,
    /// Transactions held back by the lenient grace window.
    pub deferred: u64,
    /// Alerts newly appended (deduplicated replays excluded).
    pub alerts_emitted: u64,
    /// Rank scores for the transactions processed this run.
    pub ranks: Vec<AmountRank>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ProcessReport {
    fn new(account: AccountId) -> Self {
        Self {
            account,
            processed: 0,
            deferred: 0,
            alerts_emitted: 0,
            ranks: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

/// Outcome of one account's worker in a `process_all` sweep.
#[derive(Debug)]
pub struct AccountOutcome {
    pub account: AccountId,
    pub result: Result<ProcessReport>,
}

/// Requests a stop between transactions.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    /// Ask every worker to stop after its current transaction.
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

/// Per-account anomaly detection over a transaction store.
pub struct Engine<T: TransactionStore, A: AlertStore> {
    transactions: Arc<T>,
    emitter: AlertEmitter<A>,
    states: DashMap<AccountId, Arc<Mutex<AccountState>>>,
    detection: DetectionConfig,
    ordering: OrderingConfig,
    retry: RetryConfig,
    shutdown_tx: watch::Sender<bool>,
    shutdown: watch::Receiver<bool>,
}

impl<T: TransactionStore, A: AlertStore> Engine<T, A> {
    /// Create an engine over the given stores.
    pub fn new(transactions: Arc<T>, alerts: Arc<A>, config: &Config) -> Self {
        let (shutdown_tx, shutdown) = watch::channel(false);
        Self {
            transactions,
            emitter: AlertEmitter::new(alerts, config.retry.clone()),
            states: DashMap::new(),
            detection: config.detection.clone(),
            ordering: config.ordering.clone(),
            retry: config.retry.clone(),
            shutdown_tx,
            shutdown,
        }
    }

    /// Handle for requesting a stop between transactions.
    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    fn state_for(&self, account: AccountId) -> Arc<Mutex<AccountState>> {
        self.states
            .entry(account)
            .or_insert_with(|| Arc::new(Mutex::new(AccountState::new(self.detection.rank_window()))))
            .clone()
    }

    /// Run the full sequencer-rules-emitter pipeline once over the
    /// currently available data for one account.
    ///
    /// Holds the account's state lock for the whole run, so concurrent
    /// calls for the same account serialize while other accounts proceed.
    pub async fn process_account(&self, account: AccountId) -> Result<ProcessReport> {
        let state = self.state_for(account);
        let mut state = state.lock().await;

        let feed = with_backoff(&self.retry, "transaction read", || {
            self.transactions.list_by_account(account)
        })
        .await?;
        let sequence = Sequencer::sequence(account, feed)?;

        let mut report = ProcessReport::new(account);
        let Some(newest) = sequence.last().map(|t| t.occurred_at) else {
            return Ok(report);
        };
        // Everything at or below the run watermark is finalized by this
        // run; in lenient mode the newest transactions wait out the grace
        // window first so late arrivals can still slot in.
        let run_watermark = match self.ordering.mode {
            OrderingMode::Strict => newest,
            OrderingMode::Lenient => newest - self.ordering.grace(),
        };

        let mut completed = true;
        for transaction in &sequence {
            if *self.shutdown.borrow() {
                info!(account = %account, "Shutdown requested, stopping between transactions");
                completed = false;
                break;
            }
            if state.is_seen(&transaction.id) {
                continue;
            }
            if let Err(cause) = transaction.validate() {
                warn!(
                    account = %account,
                    transaction_id = %transaction.id,
                    error = %cause,
                    "Invalid transaction skipped"
                );
                report.diagnostics.push(Diagnostic {
                    transaction_id: transaction.id.clone(),
                    cause: SkipCause::Invalid(cause),
                });
                continue;
            }
            if let Some(watermark) = state.watermark() {
                if transaction.occurred_at < watermark {
                    let cause = EngineError::OutOfOrder {
                        account,
                        id: transaction.id.clone(),
                        at: transaction.occurred_at,
                        watermark,
                    };
                    warn!(account = %account, error = %cause, "Out-of-order transaction skipped");
                    report.diagnostics.push(Diagnostic {
                        transaction_id: transaction.id.clone(),
                        cause: SkipCause::OutOfOrder(cause),
                    });
                    continue;
                }
            }
            if transaction.occurred_at > run_watermark {
                report.deferred += 1;
                continue;
            }

            // One transaction's evaluate-and-emit cycle is the atomic
            // unit: state advances, then every firing emits before the
            // worker moves on.
            let (baseline, prior) = state.observe(transaction);
            let evaluation = rules::evaluate(
                transaction,
                &baseline,
                prior.as_ref(),
                state.window(),
                &self.detection,
            );
            for reason in &evaluation.reasons {
                if self.emitter.emit(transaction, *reason).await? {
                    report.alerts_emitted += 1;
                }
            }
            state.mark_seen(transaction.id.clone());
            report.processed += 1;
            report.ranks.push(AmountRank {
                transaction_id: transaction.id.clone(),
                rank: evaluation.amount_rank,
            });
        }

        if completed {
            state.advance_watermark(run_watermark);
        }

        info!(
            account = %account,
            processed = report.processed,
            deferred = report.deferred,
            alerts = report.alerts_emitted,
            skipped = report.diagnostics.len(),
            "Account processed"
        );
        Ok(report)
    }

    /// Process every known account, one concurrent worker per account.
    ///
    /// A failing account never blocks the others; each outcome carries its
    /// own result.
    pub async fn process_all(self: Arc<Self>) -> Result<Vec<AccountOutcome>>
    where
        T: 'static,
        A: 'static,
    {
        let accounts = with_backoff(&self.retry, "account enumeration", || {
            self.transactions.accounts()
        })
        .await?;

        let mut workers = JoinSet::new();
        for account in accounts {
            let engine = Arc::clone(&self);
            workers.spawn(async move { (account, engine.process_account(account).await) });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((account, result)) => {
                    if let Err(e) = &result {
                        error!(account = %account, error = %e, "Account worker failed");
                    }
                    outcomes.push(AccountOutcome { account, result });
                }
                Err(e) => error!(error = %e, "Account worker panicked"),
            }
        }
        outcomes.sort_by_key(|o| o.account.value());
        Ok(outcomes)
    }
}
