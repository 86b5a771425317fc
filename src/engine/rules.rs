//! Detection rules evaluated against a prior-state snapshot.
//!
//! Each rule is a pure function of the current transaction and the
//! account's state as it stood *before* this transaction. A transaction
//! can fire zero, one, or several rules; the first transaction of an
//! account fires none.

use std::collections::{BTreeMap, VecDeque};
use std::num::NonZeroUsize;
use std::ops::Bound::{Excluded, Unbounded};

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::config::DetectionConfig;
use crate::domain::{AlertReason, Transaction};
use crate::engine::baseline::BaselineSnapshot;
use crate::engine::history::Observation;

/// Flags and rank score produced by evaluating one transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Alert-producing rule firings, in emission order.
    pub reasons: Vec<AlertReason>,
    /// Continuous percentile score: 0 = highest amount the account has
    /// seen. Exposed for downstream thresholding and reporting, never an
    /// alert by itself.
    pub amount_rank: Decimal,
}

/// Flags when the previous location exists and differs from the current
/// one. Case-sensitive exact match.
#[must_use]
pub fn location_change(current_location: &str, prior: Option<&Observation>) -> bool {
    prior.is_some_and(|p| p.location != current_location)
}

/// Flags when the amount exceeds `multiplier x prior mean`.
#[must_use]
pub fn amount_anomaly(amount: Decimal, baseline: &BaselineSnapshot, multiplier: Decimal) -> bool {
    match baseline.prior_mean {
        Some(mean) if baseline.prior_count > 0 => amount > multiplier * mean,
        _ => false,
    }
}

/// Flags when the gap to the previous transaction is strictly below the
/// threshold. A gap of exactly the threshold does not flag.
#[must_use]
pub fn rapid_succession(at: DateTime<Utc>, prior: Option<&Observation>, threshold: Duration) -> bool {
    prior.is_some_and(|p| at - p.at < threshold)
}

/// Run every rule against one transaction and its prior-state snapshot.
///
/// `window` must already include the current amount: the rank is defined
/// over the recent-amounts set including the transaction being scored.
#[must_use]
pub fn evaluate(
    transaction: &Transaction,
    baseline: &BaselineSnapshot,
    prior: Option<&Observation>,
    window: &AmountWindow,
    detection: &DetectionConfig,
) -> Evaluation {
    let mut reasons = Vec::new();
    if amount_anomaly(transaction.amount, baseline, detection.anomaly_multiplier) {
        reasons.push(AlertReason::HighTransactionAmount);
    }
    if location_change(&transaction.location, prior) {
        reasons.push(AlertReason::LocationChange);
    }
    if rapid_succession(transaction.occurred_at, prior, detection.rapid_succession()) {
        reasons.push(AlertReason::RapidSuccession);
    }

    Evaluation {
        reasons,
        amount_rank: window.rank(transaction.amount),
    }
}

/// Bounded multiset of an account's recent amounts.
///
/// Keeps insertion order for eviction and an ordered count map for rank
/// lookups. With no cap the window covers the account's full history.
#[derive(Debug, Clone, Default)]
pub struct AmountWindow {
    recency: VecDeque<Decimal>,
    counts: BTreeMap<Decimal, usize>,
    cap: Option<NonZeroUsize>,
}

impl AmountWindow {
    /// Create a window with an optional size cap.
    #[must_use]
    pub fn new(cap: Option<NonZeroUsize>) -> Self {
        Self {
            recency: VecDeque::new(),
            counts: BTreeMap::new(),
            cap,
        }
    }

    /// Record an amount, evicting the oldest one past the cap.
    pub fn push(&mut self, amount: Decimal) {
        self.recency.push_back(amount);
        *self.counts.entry(amount).or_insert(0) += 1;

        if let Some(cap) = self.cap {
            while self.recency.len() > cap.get() {
                if let Some(evicted) = self.recency.pop_front() {
                    if let Some(count) = self.counts.get_mut(&evicted) {
                        *count -= 1;
                        if *count == 0 {
                            self.counts.remove(&evicted);
                        }
                    }
                }
            }
        }
    }

    /// Number of amounts currently in the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recency.len()
    }

    /// Whether the window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recency.is_empty()
    }

    /// Descending percentile rank of an amount within the window:
    /// `count_strictly_greater / max(len - 1, 1)`. The highest amount
    /// scores 0; ties take the minimum rank; a single sample scores 0.
    #[must_use]
    pub fn rank(&self, amount: Decimal) -> Decimal {
        let n = self.recency.len();
        if n <= 1 {
            return Decimal::ZERO;
        }
        let greater: usize = self
            .counts
            .range((Excluded(amount), Unbounded))
            .map(|(_, count)| *count)
            .sum();
        Decimal::from(greater) / Decimal::from(n - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at(minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, second).unwrap()
    }

    fn observation(location: &str, minute: u32) -> Observation {
        Observation {
            location: location.to_string(),
            at: at(minute, 0),
        }
    }

    fn empty_baseline() -> BaselineSnapshot {
        BaselineSnapshot {
            prior_mean: None,
            prior_count: 0,
        }
    }

    fn baseline(mean: Decimal, count: u64) -> BaselineSnapshot {
        BaselineSnapshot {
            prior_mean: Some(mean),
            prior_count: count,
        }
    }

    // -------------------------------------------------------------------------
    // Location change
    // -------------------------------------------------------------------------

    #[test]
    fn location_change_requires_prior_observation() {
        assert!(!location_change("NY", None));
    }

    #[test]
    fn location_change_is_case_sensitive() {
        let prior = observation("NY", 0);
        assert!(!location_change("NY", Some(&prior)));
        assert!(location_change("ny", Some(&prior)));
        assert!(location_change("LA", Some(&prior)));
    }

    // -------------------------------------------------------------------------
    // Amount anomaly
    // -------------------------------------------------------------------------

    #[test]
    fn amount_anomaly_never_fires_without_baseline() {
        assert!(!amount_anomaly(dec!(1000000), &empty_baseline(), dec!(3)));
    }

    #[test]
    fn amount_anomaly_boundary_at_three_times_mean() {
        // prior amounts 10, 20, 30 -> mean 20; threshold 60
        let snapshot = baseline(dec!(20), 3);
        assert!(!amount_anomaly(dec!(59), &snapshot, dec!(3)));
        assert!(!amount_anomaly(dec!(60), &snapshot, dec!(3)));
        assert!(amount_anomaly(dec!(61), &snapshot, dec!(3)));
    }

    // -------------------------------------------------------------------------
    // Rapid succession
    // -------------------------------------------------------------------------

    #[test]
    fn rapid_succession_requires_prior_observation() {
        assert!(!rapid_succession(at(0, 0), None, Duration::minutes(5)));
    }

    #[test]
    fn rapid_succession_boundary_at_threshold() {
        let prior = observation("NY", 0);
        let threshold = Duration::minutes(5);

        // exactly 5 minutes: no flag
        assert!(!rapid_succession(at(5, 0), Some(&prior), threshold));
        // 4 minutes 59 seconds: flag
        assert!(rapid_succession(at(4, 59), Some(&prior), threshold));
    }

    // -------------------------------------------------------------------------
    // Amount rank
    // -------------------------------------------------------------------------

    #[test]
    fn rank_of_single_sample_is_zero() {
        let mut window = AmountWindow::new(None);
        window.push(dec!(50));
        assert_eq!(window.rank(dec!(50)), Decimal::ZERO);
    }

    #[test]
    fn rank_of_highest_amount_is_zero() {
        let mut window = AmountWindow::new(None);
        for amount in [dec!(10), dec!(20), dec!(30), dec!(40)] {
            window.push(amount);
        }
        assert_eq!(window.rank(dec!(40)), Decimal::ZERO);
    }

    #[test]
    fn rank_of_lowest_amount_is_one() {
        let mut window = AmountWindow::new(None);
        for amount in [dec!(10), dec!(20), dec!(30), dec!(40)] {
            window.push(amount);
        }
        assert_eq!(window.rank(dec!(10)), Decimal::ONE);
    }

    #[test]
    fn rank_interpolates_between_extremes() {
        let mut window = AmountWindow::new(None);
        for amount in [dec!(10), dec!(20), dec!(30), dec!(40), dec!(50)] {
            window.push(amount);
        }
        // one amount strictly greater than 40, four positions
        assert_eq!(window.rank(dec!(40)), dec!(0.25));
    }

    #[test]
    fn rank_ties_take_minimum_rank() {
        let mut window = AmountWindow::new(None);
        for amount in [dec!(10), dec!(20), dec!(20)] {
            window.push(amount);
        }
        // nothing strictly greater than 20
        assert_eq!(window.rank(dec!(20)), Decimal::ZERO);
    }

    #[test]
    fn bounded_window_evicts_oldest_amounts() {
        let mut window = AmountWindow::new(NonZeroUsize::new(2));
        window.push(dec!(100));
        window.push(dec!(10));
        window.push(dec!(20));

        assert_eq!(window.len(), 2);
        // 100 was evicted, so 20 is now the highest
        assert_eq!(window.rank(dec!(20)), Decimal::ZERO);
        assert_eq!(window.rank(dec!(10)), Decimal::ONE);
    }

    // -------------------------------------------------------------------------
    // Combined evaluation
    // -------------------------------------------------------------------------

    #[test]
    fn first_transaction_fires_no_rules() {
        let tx = testkit::transaction("tx-1", 1, dec!(5000), at(0, 0));
        let mut window = AmountWindow::new(None);
        window.push(tx.amount);

        let evaluation = evaluate(
            &tx,
            &empty_baseline(),
            None,
            &window,
            &DetectionConfig::default(),
        );

        assert!(evaluation.reasons.is_empty());
        assert_eq!(evaluation.amount_rank, Decimal::ZERO);
    }

    #[test]
    fn multiple_rules_can_fire_on_one_transaction() {
        // prior: single transaction of 50 at t0 in NY
        let tx = testkit::located("tx-2", 1, dec!(200), at(2, 0), "LA");
        let prior = observation("NY", 0);
        let mut window = AmountWindow::new(None);
        window.push(dec!(50));
        window.push(tx.amount);

        let evaluation = evaluate(
            &tx,
            &baseline(dec!(50), 1),
            Some(&prior),
            &window,
            &DetectionConfig::default(),
        );

        assert_eq!(
            evaluation.reasons,
            vec![
                AlertReason::HighTransactionAmount,
                AlertReason::LocationChange,
                AlertReason::RapidSuccession,
            ]
        );
    }
}
