//! Deterministic per-account ordering.

use crate::domain::{AccountId, Transaction};
use crate::error::EngineError;

/// Orders an account's feed into a deterministic total order.
pub struct Sequencer;

impl Sequencer {
    /// Order a feed by timestamp ascending, ties broken by id in ascending
    /// lexicographic order. The input is consumed, never mutated in place
    /// elsewhere; re-invocation over the same records always yields the
    /// same order, and the returned sequence can be iterated repeatedly.
    ///
    /// Two transactions sharing both timestamp and id indicate store-level
    /// corruption and surface as [`EngineError::OrderingAmbiguous`].
    pub fn sequence(
        account: AccountId,
        mut feed: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, EngineError> {
        feed.sort_by(|a, b| {
            a.occurred_at
                .cmp(&b.occurred_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });

        for pair in feed.windows(2) {
            if pair[0].occurred_at == pair[1].occurred_at && pair[0].id == pair[1].id {
                return Err(EngineError::OrderingAmbiguous {
                    account,
                    id: pair[1].id.clone(),
                    at: pair[1].occurred_at,
                });
            }
        }

        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0).unwrap()
    }

    #[test]
    fn orders_by_timestamp_ascending() {
        let feed = vec![
            testkit::transaction("tx-b", 1, dec!(1), at(30)),
            testkit::transaction("tx-a", 1, dec!(1), at(10)),
            testkit::transaction("tx-c", 1, dec!(1), at(20)),
        ];

        let ordered = Sequencer::sequence(AccountId::new(1), feed).unwrap();
        let ids: Vec<_> = ordered.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["tx-a", "tx-c", "tx-b"]);
    }

    #[test]
    fn ties_break_by_id_lexicographically() {
        let feed = vec![
            testkit::transaction("tx-z", 1, dec!(1), at(10)),
            testkit::transaction("tx-a", 1, dec!(1), at(10)),
            testkit::transaction("tx-m", 1, dec!(1), at(10)),
        ];

        let ordered = Sequencer::sequence(AccountId::new(1), feed).unwrap();
        let ids: Vec<_> = ordered.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["tx-a", "tx-m", "tx-z"]);
    }

    #[test]
    fn reinvocation_yields_identical_order() {
        let feed = vec![
            testkit::transaction("tx-2", 1, dec!(1), at(10)),
            testkit::transaction("tx-1", 1, dec!(1), at(10)),
            testkit::transaction("tx-3", 1, dec!(1), at(5)),
        ];

        let first = Sequencer::sequence(AccountId::new(1), feed.clone()).unwrap();
        let second = Sequencer::sequence(AccountId::new(1), feed).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn identical_timestamp_and_id_is_ambiguous() {
        let feed = vec![
            testkit::transaction("tx-1", 1, dec!(1), at(10)),
            testkit::transaction("tx-1", 1, dec!(2), at(10)),
        ];

        let result = Sequencer::sequence(AccountId::new(1), feed);
        assert!(matches!(
            result,
            Err(EngineError::OrderingAmbiguous { .. })
        ));
    }

    #[test]
    fn duplicate_id_with_distinct_timestamps_is_not_ambiguous() {
        // Ambiguity is the (timestamp, id) pair, not the id alone; duplicate
        // ids alone are the store's DuplicateId concern.
        let feed = vec![
            testkit::transaction("tx-1", 1, dec!(1), at(10)),
            testkit::transaction("tx-1", 1, dec!(2), at(20)),
        ];

        assert!(Sequencer::sequence(AccountId::new(1), feed).is_ok());
    }
}
