//! Incremental per-account baseline maintenance.

use rust_decimal::Decimal;

/// Baseline as of the moment just before a transaction was applied.
///
/// `prior_mean` is `None` until the account has seen at least one
/// transaction, so the amount anomaly rule can never score a transaction
/// against itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineSnapshot {
    pub prior_mean: Option<Decimal>,
    pub prior_count: u64,
}

/// Incrementally maintained mean transaction amount for one account.
///
/// Uses the standard single-pass update
/// `mean += (amount - mean) / (count + 1)` so the baseline never needs a
/// replay over the account's history.
#[derive(Debug, Clone, Default)]
pub struct BaselineCalculator {
    mean: Decimal,
    count: u64,
}

impl BaselineCalculator {
    /// Create an empty baseline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the baseline built from previously seen transactions, then
    /// fold the new amount into the running mean.
    pub fn update(&mut self, amount: Decimal) -> BaselineSnapshot {
        let snapshot = self.snapshot();
        let next_count = Decimal::from(self.count + 1);
        self.mean += (amount - self.mean) / next_count;
        self.count += 1;
        snapshot
    }

    /// The baseline without applying anything.
    #[must_use]
    pub fn snapshot(&self) -> BaselineSnapshot {
        BaselineSnapshot {
            prior_mean: (self.count > 0).then_some(self.mean),
            prior_count: self.count,
        }
    }
}
