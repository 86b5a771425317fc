//! Idempotent alert emission with bounded retry.

use std::future::Future;
use std::sync::Arc;

use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

use crate::config::RetryConfig;
use crate::domain::{Alert, AlertReason, Transaction};
use crate::error::{Error, Result};
use crate::port::AlertStore;

/// Run a store operation, retrying transient unavailability with bounded
/// exponential backoff. Terminal errors and exhausted retries propagate.
pub(crate) async fn with_backoff<T, F, Fut>(retry: &RetryConfig, what: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut delay_ms = retry.initial_delay_ms;
    let mut attempt: u32 = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(Error::Store(e)) if e.is_retryable() && attempt < retry.max_attempts => {
                warn!(
                    attempt,
                    delay_ms,
                    error = %e,
                    "{what} unavailable, backing off"
                );
                sleep(Duration::from_millis(delay_ms)).await;
                delay_ms =
                    ((delay_ms as f64 * retry.backoff_multiplier) as u64).min(retry.max_delay_ms);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Converts rule firings into alert records.
///
/// Emission is idempotent under reprocessing: an alert with the same
/// `(transaction id, reason)` pair is appended at most once.
pub struct AlertEmitter<A: AlertStore> {
    store: Arc<A>,
    retry: RetryConfig,
}

impl<A: AlertStore> AlertEmitter<A> {
    /// Create an emitter over the given alert store.
    pub fn new(store: Arc<A>, retry: RetryConfig) -> Self {
        Self { store, retry }
    }

    /// The underlying alert store.
    #[must_use]
    pub fn store(&self) -> &Arc<A> {
        &self.store
    }

    /// Emit an alert for a rule firing. Returns `true` when a new alert
    /// was appended, `false` when an identical one already existed.
    pub async fn emit(&self, transaction: &Transaction, reason: AlertReason) -> Result<bool> {
        let exists = with_backoff(&self.retry, "alert lookup", || {
            self.store.exists(&transaction.id, reason)
        })
        .await?;
        if exists {
            debug!(
                transaction_id = %transaction.id,
                reason = %reason,
                "Alert already recorded, skipping"
            );
            return Ok(false);
        }

        let alert = Alert::new(transaction.id.clone(), transaction.account, reason);
        with_backoff(&self.retry, "alert append", || self.store.append(&alert)).await?;

        info!(
            transaction_id = %transaction.id,
            account = %transaction.account,
            reason = %reason,
            "Alert raised"
        );
        Ok(true)
    }
}
