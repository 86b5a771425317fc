//! Per-account mutable evaluation state.

use std::collections::HashSet;
use std::num::NonZeroUsize;

use chrono::{DateTime, Utc};

use crate::domain::{Transaction, TransactionId};
use crate::engine::baseline::{BaselineCalculator, BaselineSnapshot};
use crate::engine::history::{HistoryTracker, Observation};
use crate::engine::rules::AmountWindow;

/// Everything the engine remembers about one account.
///
/// Owned exclusively by the account's worker while a run is in flight;
/// created on the first transaction and kept for the account's lifetime.
#[derive(Debug)]
pub struct AccountState {
    baseline: BaselineCalculator,
    history: HistoryTracker,
    window: AmountWindow,
    /// Timestamp up to which this account's order is finalized.
    watermark: Option<DateTime<Utc>>,
    /// Ids already incorporated, so replays and late re-reads are no-ops.
    seen: HashSet<TransactionId>,
}

impl AccountState {
    /// Create empty state with the configured rank window cap.
    #[must_use]
    pub fn new(rank_cap: Option<NonZeroUsize>) -> Self {
        Self {
            baseline: BaselineCalculator::new(),
            history: HistoryTracker::new(),
            window: AmountWindow::new(rank_cap),
            watermark: None,
            seen: HashSet::new(),
        }
    }

    /// Incorporate one transaction: returns the prior baseline and the
    /// prior observation, then records the transaction's amount, location,
    /// and timestamp. The rank window includes the new amount afterwards.
    pub fn observe(&mut self, transaction: &Transaction) -> (BaselineSnapshot, Option<Observation>) {
        let baseline = self.baseline.update(transaction.amount);
        let prior = self
            .history
            .update(&transaction.location, transaction.occurred_at);
        self.window.push(transaction.amount);
        (baseline, prior)
    }

    /// The recent-amounts window, for rank evaluation.
    #[must_use]
    pub fn window(&self) -> &AmountWindow {
        &self.window
    }

    /// Current baseline without applying anything.
    #[must_use]
    pub fn baseline(&self) -> BaselineSnapshot {
        self.baseline.snapshot()
    }

    /// The finalized-order watermark, if any run has completed.
    #[must_use]
    pub fn watermark(&self) -> Option<DateTime<Utc>> {
        self.watermark
    }

    /// Move the watermark forward; never backwards.
    pub fn advance_watermark(&mut self, to: DateTime<Utc>) {
        match self.watermark {
            Some(current) if current >= to => {}
            _ => self.watermark = Some(to),
        }
    }

    /// Whether a transaction id was already incorporated.
    #[must_use]
    pub fn is_seen(&self, id: &TransactionId) -> bool {
        self.seen.contains(id)
    }

    /// Record a transaction id as incorporated.
    pub fn mark_seen(&mut self, id: TransactionId) {
        self.seen.insert(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0).unwrap()
    }

    #[test]
    fn observe_returns_prior_state_then_records() {
        let mut state = AccountState::new(None);

        let tx1 = testkit::located("tx-1", 1, dec!(50), at(0), "NY");
        let (baseline, prior) = state.observe(&tx1);
        assert_eq!(baseline.prior_count, 0);
        assert!(prior.is_none());

        let tx2 = testkit::located("tx-2", 1, dec!(200), at(2), "LA");
        let (baseline, prior) = state.observe(&tx2);
        assert_eq!(baseline.prior_mean, Some(dec!(50)));
        assert_eq!(prior.unwrap().location, "NY");
        assert_eq!(state.window().len(), 2);
    }

    #[test]
    fn watermark_never_moves_backwards() {
        let mut state = AccountState::new(None);
        state.advance_watermark(at(30));
        state.advance_watermark(at(10));
        assert_eq!(state.watermark(), Some(at(30)));
    }

    #[test]
    fn seen_ids_are_remembered() {
        let mut state = AccountState::new(None);
        let id = TransactionId::new("tx-1");
        assert!(!state.is_seen(&id));
        state.mark_seen(id.clone());
        assert!(state.is_seen(&id));
    }
}
