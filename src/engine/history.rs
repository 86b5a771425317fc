//! Previous-transaction tracking for delta comparisons.

use chrono::{DateTime, Utc};

/// The last observation recorded for an account: a single-slot cache of
/// the previous transaction's location and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub location: String,
    pub at: DateTime<Utc>,
}

/// Tracks the previous transaction's location and timestamp per account.
#[derive(Debug, Clone, Default)]
pub struct HistoryTracker {
    last: Option<Observation>,
}

impl HistoryTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the previous observation (absent for the first transaction),
    /// then store the current one.
    pub fn update(&mut self, location: &str, at: DateTime<Utc>) -> Option<Observation> {
        self.last.replace(Observation {
            location: location.to_string(),
            at,
        })
    }

    /// The previous observation without recording anything.
    #[must_use]
    pub fn last(&self) -> Option<&Observation> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0).unwrap()
    }

    #[test]
    fn first_update_returns_none() {
        let mut history = HistoryTracker::new();
        assert_eq!(history.update("NY", at(0)), None);
    }

    #[test]
    fn update_returns_previous_observation() {
        let mut history = HistoryTracker::new();
        history.update("NY", at(0));
        let prior = history.update("LA", at(30)).unwrap();

        assert_eq!(prior.location, "NY");
        assert_eq!(prior.at, at(0));
        assert_eq!(history.last().unwrap().location, "LA");
    }
}
